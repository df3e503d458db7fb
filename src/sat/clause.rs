#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clauses: disjunctions of literals stored inline for short clauses.

use crate::sat::literal::{DoubleLiteral, Literal, Variable};
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use smallvec::SmallVec;

pub type LiteralStorage<L> = SmallVec<[L; 8]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause<L: Literal = DoubleLiteral> {
    pub literals: LiteralStorage<L>,
    pub learnt: bool,
}

impl<L: Literal> Clause<L> {
    /// Builds an original clause. Literals are sorted by variable and
    /// duplicates removed; a tautology keeps both of its complementary literals.
    #[must_use]
    pub fn new<I: IntoIterator<Item = L>>(literals: I) -> Self {
        let mut literals: LiteralStorage<L> = literals.into_iter().collect();
        literals.sort_unstable_by_key(|l| (l.variable(), l.polarity()));
        literals.dedup();

        Self {
            literals,
            learnt: false,
        }
    }

    /// Builds a learned clause keeping the given order. The asserting literal
    /// is expected at position 0 and the second watch at position 1.
    #[must_use]
    pub fn learnt<I: IntoIterator<Item = L>>(literals: I) -> Self {
        Self {
            literals: literals.into_iter().collect(),
            learnt: true,
        }
    }

    #[must_use]
    pub fn from_i32s(values: &[i32]) -> Self {
        Self::new(values.iter().copied().map(L::from_i32))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.literals.iter()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.literals.swap(i, j);
    }

    #[must_use]
    pub fn contains(&self, lit: L) -> bool {
        self.literals.contains(&lit)
    }

    #[must_use]
    pub fn contains_var(&self, var: Variable) -> bool {
        self.literals.iter().any(|l| l.variable() == var)
    }

    /// True if some variable occurs with both polarities.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .map(|l| (l.variable(), l.polarity()))
            .sorted_unstable()
            .tuple_windows()
            .any(|((a, pa), (b, pb))| a == b && pa != pb)
    }

    /// Resolves `self` and `other` on `var`. `self` must hold the positive
    /// literal and `other` the negative one. Tautological resolvents are
    /// reported as `None`.
    #[must_use]
    pub fn resolve(&self, other: &Self, var: Variable) -> Option<Self> {
        let resolvent = Self::new(
            self.iter()
                .chain(other.iter())
                .copied()
                .filter(|l| l.variable() != var),
        );

        if resolvent.is_tautology() {
            None
        } else {
            Some(resolvent)
        }
    }

    #[must_use]
    pub fn to_i32s(&self) -> Vec<i32> {
        self.iter().map(|l| l.to_i32()).collect()
    }
}

impl<L: Literal> Index<usize> for Clause<L> {
    type Output = L;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl<L: Literal> IndexMut<usize> for Clause<L> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.literals[index]
    }
}

impl<L: Literal> From<Vec<i32>> for Clause<L> {
    fn from(literals: Vec<i32>) -> Self {
        Self::from_i32s(&literals)
    }
}

impl<L: Literal> FromIterator<L> for Clause<L> {
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        Self::new(iter)
    }
}
