#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Formulas in conjunctive normal form.
//!
//! A `Cnf` owns its clauses in a single vector that acts as an arena: clause
//! indices handed out by `add_clause` stay valid as the formula grows, so
//! watch lists and trail reasons can refer to clauses by index. Original
//! clauses occupy `0..num_original_clauses()`; anything after is learned.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::error::SolverError;
use crate::sat::literal::{DoubleLiteral, Literal};
use core::ops::{Index, IndexMut};
use std::fmt::{self, Display};

pub type DecisionLevel = usize;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf<L: Literal = DoubleLiteral> {
    pub clauses: Vec<Clause<L>>,
    /// Highest variable id; variables are `1..=num_vars`.
    pub num_vars: usize,
    non_learnt_idx: usize,
}

impl<L: Literal> Cnf<L> {
    /// Builds a formula from DIMACS-style signed integer clauses.
    ///
    /// # Errors
    ///
    /// `MalformedInstance` if a clause mentions variable 0 or `i32::MIN`, or is
    /// empty.
    pub fn new(clauses: Vec<Vec<i32>>) -> Result<Self, SolverError> {
        Self::with_num_vars(clauses, 0)
    }

    /// Like [`Cnf::new`], but declares at least `num_vars` variables even if
    /// some of them never occur in a clause.
    ///
    /// # Errors
    ///
    /// `MalformedInstance` if a clause mentions variable 0 or `i32::MIN`, or is
    /// empty.
    pub fn with_num_vars(clauses: Vec<Vec<i32>>, num_vars: usize) -> Result<Self, SolverError> {
        let mut max_var = num_vars;
        let mut kept = Vec::with_capacity(clauses.len());

        for (i, raw) in clauses.into_iter().enumerate() {
            if raw.is_empty() {
                return Err(SolverError::empty_clause(i));
            }
            if raw.contains(&0) {
                return Err(SolverError::zero_variable(i));
            }
            if raw.contains(&i32::MIN) {
                return Err(SolverError::variable_out_of_range(i));
            }

            let clause: Clause<L> = Clause::from_i32s(&raw);
            if clause.is_tautology() {
                continue;
            }

            max_var = clause
                .iter()
                .map(|l| l.variable() as usize)
                .fold(max_var, usize::max);
            kept.push(clause);
        }

        Ok(Self::from_clauses(kept, max_var))
    }

    /// The explicit UNSAT witness: a formula holding only the empty clause.
    #[must_use]
    pub fn contradiction() -> Self {
        Self::from_clauses(vec![Clause::default()], 0)
    }

    /// Wraps already validated clauses.
    #[must_use]
    pub fn from_clauses(clauses: Vec<Clause<L>>, num_vars: usize) -> Self {
        let num_vars = clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|l| l.variable() as usize)
            .fold(num_vars, usize::max);

        Self {
            non_learnt_idx: clauses.len(),
            clauses,
            num_vars,
        }
    }

    /// Appends a clause and returns its stable index.
    pub fn add_clause(&mut self, clause: Clause<L>) -> usize {
        let idx = self.clauses.len();
        self.num_vars = clause
            .iter()
            .map(|l| l.variable() as usize)
            .fold(self.num_vars, usize::max);
        self.clauses.push(clause);
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub const fn num_original_clauses(&self) -> usize {
        self.non_learnt_idx
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause<L>> {
        self.clauses.iter()
    }

    pub fn original_clauses(&self) -> impl Iterator<Item = &Clause<L>> {
        self.clauses[..self.non_learnt_idx].iter()
    }

    pub fn learnt_clauses(&self) -> impl Iterator<Item = &Clause<L>> {
        self.clauses[self.non_learnt_idx..].iter()
    }

    #[must_use]
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Checks that `solutions` satisfies every original clause.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.original_clauses()
            .all(|clause| clause.iter().any(|lit| solutions.check(lit.to_i32())))
    }

    /// Converts to another literal representation.
    #[must_use]
    pub fn convert<T: Literal>(&self) -> Cnf<T> {
        let clauses = self
            .clauses
            .iter()
            .map(|c| Clause {
                literals: c.iter().map(|l| T::from_i32(l.to_i32())).collect(),
                learnt: c.learnt,
            })
            .collect();

        Cnf {
            clauses,
            num_vars: self.num_vars,
            non_learnt_idx: self.non_learnt_idx,
        }
    }
}

impl<L: Literal> Index<usize> for Cnf<L> {
    type Output = Clause<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl<L: Literal> IndexMut<usize> for Cnf<L> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.clauses[index]
    }
}

impl<L: Literal> TryFrom<Vec<Vec<i32>>> for Cnf<L> {
    type Error = SolverError;

    fn try_from(clauses: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        Self::new(clauses)
    }
}

/// Writes the original clauses in DIMACS format.
impl<L: Literal> Display for Cnf<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.non_learnt_idx)?;
        for clause in self.original_clauses() {
            for lit in clause.iter() {
                write!(f, "{} ", lit.to_i32())?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}
