#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial assignments of truth values to variables, and the total models
//! (`Solutions`) extracted from them.

use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::fmt::{self, Debug, Display};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

pub trait Assignment: Debug + Clone + Send {
    fn new(num_vars: usize) -> Self;
    fn num_vars(&self) -> usize;
    fn set(&mut self, var: Variable, b: bool);
    fn unassign(&mut self, var: Variable);
    fn reset(&mut self);
    fn state(&self, var: Variable) -> VarState;

    fn assign<L: Literal>(&mut self, lit: L) {
        self.set(lit.variable(), lit.polarity());
    }

    fn var_value(&self, var: Variable) -> Option<bool> {
        self.state(var).value()
    }

    fn is_assigned(&self, var: Variable) -> bool {
        self.state(var).is_assigned()
    }

    fn literal_value<L: Literal>(&self, lit: L) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b == lit.polarity())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn unassigned(&self) -> impl Iterator<Item = Variable> + '_ {
        (1..=self.num_vars() as Variable).filter(|&v| !self.is_assigned(v))
    }

    fn all_assigned(&self) -> bool {
        self.unassigned().next().is_none()
    }

    /// Total model over `1..=num_vars`; unassigned variables are completed as `true`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn get_solutions(&self) -> Solutions {
        Solutions::new(
            (1..=self.num_vars() as Variable)
                .map(|v| match self.var_value(v) {
                    Some(false) => -(v as i32),
                    _ => v as i32,
                })
                .collect(),
        )
    }
}

/// Dense assignment indexed directly by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VecAssignment {
    states: Vec<VarState>,
    num_vars: usize,
}

impl Assignment for VecAssignment {
    fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unassigned; num_vars + 1],
            num_vars,
        }
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn set(&mut self, var: Variable, b: bool) {
        self.states[var as usize] = VarState::Assigned(b);
    }

    fn unassign(&mut self, var: Variable) {
        self.states[var as usize] = VarState::Unassigned;
    }

    fn reset(&mut self) {
        self.states.fill(VarState::Unassigned);
    }

    fn state(&self, var: Variable) -> VarState {
        self.states.get(var as usize).copied().unwrap_or_default()
    }
}

/// Sparse assignment; only assigned variables are stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HashMapAssignment {
    map: FxHashMap<Variable, bool>,
    num_vars: usize,
}

impl Assignment for HashMapAssignment {
    fn new(num_vars: usize) -> Self {
        Self {
            map: FxHashMap::default(),
            num_vars,
        }
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn set(&mut self, var: Variable, b: bool) {
        self.map.insert(var, b);
    }

    fn unassign(&mut self, var: Variable) {
        self.map.remove(&var);
    }

    fn reset(&mut self) {
        self.map.clear();
    }

    fn state(&self, var: Variable) -> VarState {
        self.map
            .get(&var)
            .map_or(VarState::Unassigned, |&b| VarState::Assigned(b))
    }

    fn all_assigned(&self) -> bool {
        self.map.len() == self.num_vars
    }
}

/// A model as signed DIMACS literals, one per variable, ordered by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Solutions {
    assignments: Vec<i32>,
}

impl Solutions {
    #[must_use]
    pub fn new(assignments: Vec<i32>) -> Self {
        let assignments = assignments
            .into_iter()
            .sorted_by_key(|l| l.unsigned_abs())
            .dedup_by(|a, b| a.unsigned_abs() == b.unsigned_abs())
            .collect();

        Self { assignments }
    }

    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.assignments.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.assignments
            .binary_search_by_key(&var, |l| l.unsigned_abs())
            .ok()
            .map(|i| self.assignments[i] > 0)
    }

    /// True if the signed literal `lit` holds in this model.
    #[must_use]
    pub fn check(&self, lit: i32) -> bool {
        self.value(lit.unsigned_abs()) == Some(lit > 0)
    }

    /// Checks the model directly against DIMACS-style clauses.
    #[must_use]
    pub fn satisfies(&self, clauses: &[Vec<i32>]) -> bool {
        clauses
            .iter()
            .all(|clause| clause.iter().any(|&lit| self.check(lit)))
    }
}

impl Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.assignments.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::DoubleLiteral;

    fn exercise<A: Assignment>() {
        let mut a = A::new(3);
        assert_eq!(a.num_vars(), 3);
        assert!(!a.all_assigned());

        a.assign(DoubleLiteral::from_i32(-2));
        assert_eq!(a.var_value(2), Some(false));
        assert_eq!(a.literal_value(DoubleLiteral::from_i32(2)), Some(false));
        assert_eq!(a.literal_value(DoubleLiteral::from_i32(-2)), Some(true));
        assert_eq!(a.literal_value(DoubleLiteral::from_i32(1)), None);
        assert_eq!(a.unassigned().collect::<Vec<_>>(), vec![1, 3]);

        a.set(1, true);
        a.set(3, false);
        assert!(a.all_assigned());
        assert_eq!(a.get_solutions(), Solutions::new(vec![1, -2, -3]));

        a.unassign(3);
        assert_eq!(a.get_solutions(), Solutions::new(vec![1, -2, 3]));

        a.reset();
        assert_eq!(a.unassigned().count(), 3);
    }

    #[test]
    fn test_vec_assignment() {
        exercise::<VecAssignment>();
    }

    #[test]
    fn test_hash_map_assignment() {
        exercise::<HashMapAssignment>();
    }

    #[test]
    fn test_solutions() {
        let s = Solutions::new(vec![3, -1, 2]);
        assert_eq!(s.to_string(), "-1 2 3");
        assert_eq!(s.value(1), Some(false));
        assert_eq!(s.value(4), None);
        assert!(s.check(-1));
        assert!(!s.check(1));
        assert!(s.satisfies(&[vec![1, 2], vec![-1]]));
        assert!(!s.satisfies(&[vec![1, -2]]));
    }
}
