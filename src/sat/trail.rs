#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The trail: every assigned literal in assignment order, with the decision
//! level it was assigned at and the reason it was assigned.
//!
//! Levels along the trail never decrease, so backjumping is a truncation.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::DecisionLevel;
use crate::sat::literal::{Literal, Variable};
use std::ops::Index;
use std::vec::Drain;

#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// A free choice made by the search.
    #[default]
    Decision,
    /// Forced by an original unit clause at level 0.
    Unit(usize),
    /// Forced by the clause at this index (propagated or asserted after a conflict).
    Clause(usize),
    /// Assigned by pure literal elimination.
    Pure,
}

impl Reason {
    /// The clause that justifies the assignment, if any.
    #[must_use]
    pub const fn clause(self) -> Option<usize> {
        match self {
            Self::Unit(c) | Self::Clause(c) => Some(c),
            Self::Decision | Self::Pure => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step<L: Literal> {
    pub lit: L,
    pub decision_level: DecisionLevel,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail<L: Literal> {
    t: Vec<Step<L>>,
    /// Propagation head: steps before it have been propagated.
    pub curr_idx: usize,
    lit_to_level: Vec<DecisionLevel>,
    propagations: usize,
}

impl<L: Literal> Index<usize> for Trail<L> {
    type Output = Step<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl<L: Literal> Trail<L> {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
            curr_idx: 0,
            lit_to_level: vec![0; num_vars + 1],
            propagations: 0,
        }
    }

    /// Level of the most recent step, or 0 on an empty trail.
    #[must_use]
    pub fn decision_level(&self) -> DecisionLevel {
        self.t.last().map_or(0, |s| s.decision_level)
    }

    #[must_use]
    pub fn level(&self, var: Variable) -> DecisionLevel {
        self.lit_to_level[var as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step<L>> {
        self.t.iter()
    }

    /// Number of steps pushed with a clause as their reason.
    #[must_use]
    pub const fn num_propagations(&self) -> usize {
        self.propagations
    }

    /// Records `lit` and makes it true in `assignment`.
    pub fn push<A: Assignment>(
        &mut self,
        assignment: &mut A,
        lit: L,
        decision_level: DecisionLevel,
        reason: Reason,
    ) {
        debug_assert!(!assignment.is_assigned(lit.variable()));

        if reason.clause().is_some() {
            self.propagations += 1;
        }

        assignment.assign(lit);
        self.lit_to_level[lit.variable() as usize] = decision_level;
        self.t.push(Step {
            lit,
            decision_level,
            reason,
        });
    }

    /// Drops every step above `level`, unassigning their variables.
    /// The removed steps are returned so callers can react to them.
    pub fn backstep_to<A: Assignment>(
        &mut self,
        assignment: &mut A,
        level: DecisionLevel,
    ) -> Drain<'_, Step<L>> {
        let keep = self.t.partition_point(|s| s.decision_level <= level);
        self.backstep_to_len(assignment, keep)
    }

    /// Truncates the trail to its first `len` steps.
    pub fn backstep_to_len<A: Assignment>(
        &mut self,
        assignment: &mut A,
        len: usize,
    ) -> Drain<'_, Step<L>> {
        let len = len.min(self.t.len());
        for step in &self.t[len..] {
            let var = step.lit.variable();
            assignment.unassign(var);
            self.lit_to_level[var as usize] = 0;
        }
        self.curr_idx = self.curr_idx.min(len);
        self.t.drain(len..)
    }
}
