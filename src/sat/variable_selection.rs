#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Decision heuristics.
//!
//! Every selector is deterministic: ties are always broken towards the lower
//! variable id, so repeated runs on the same formula make identical choices.
//!
//! - [`FixedOrder`]: first unassigned variable by id, positive polarity.
//! - [`MostFrequent`]: variable with the most literal occurrences in the
//!   original formula, positive polarity.
//! - [`Vsids`]: highest activity by linear scan.
//! - [`VsidsHeap`]: highest activity through a lazily maintained max-heap.
//!
//! Every selector offers the positive literal; the engines try the negation
//! when that branch fails.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};
use bit_vec::BitVec;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::ops::Range;

const DEFAULT_DECAY: f64 = 0.95;
const RESCALE_LIMIT: f64 = 1e100;
/// The heap is compacted once it holds this many entries per variable.
const HEAP_SLACK: usize = 4;

pub trait VariableSelection<L: Literal>: Debug + Clone + Send {
    fn new(num_vars: usize, clauses: &[Clause<L>]) -> Self;

    /// Picks the next decision literal, or `None` once every variable is assigned.
    fn pick<A: Assignment>(&mut self, assignment: &A) -> Option<L>;

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T);

    fn decay(&mut self);

    /// Called for every variable that backtracking unassigns.
    fn on_unassign(&mut self, _var: Variable) {}
}

#[allow(clippy::cast_possible_truncation)]
fn occurrences<L: Literal>(num_vars: usize, clauses: &[Clause<L>]) -> Vec<(u32, u32)> {
    let mut counts = vec![(0u32, 0u32); num_vars + 1];
    for lit in clauses.iter().flat_map(Clause::iter) {
        let entry = &mut counts[lit.variable() as usize];
        if lit.polarity() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedOrder;

impl<L: Literal> VariableSelection<L> for FixedOrder {
    fn new(_: usize, _: &[Clause<L>]) -> Self {
        Self
    }

    fn pick<A: Assignment>(&mut self, assignment: &A) -> Option<L> {
        assignment.unassigned().next().map(|v| L::new(v, true))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MostFrequent {
    counts: Vec<(u32, u32)>,
}

impl<L: Literal> VariableSelection<L> for MostFrequent {
    fn new(num_vars: usize, clauses: &[Clause<L>]) -> Self {
        Self {
            counts: occurrences(num_vars, clauses),
        }
    }

    fn pick<A: Assignment>(&mut self, assignment: &A) -> Option<L> {
        let mut best: Option<(Variable, u32)> = None;
        for var in assignment.unassigned() {
            let (pos, neg) = self.counts.get(var as usize).copied().unwrap_or_default();
            let total = pos + neg;
            if best.is_none_or(|(_, t)| total > t) {
                best = Some((var, total));
            }
        }

        best.map(|(var, _)| L::new(var, true))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self) {}
}

/// Activity scores shared by both VSIDS variants. Bumps add an increment
/// that grows by `1 / DEFAULT_DECAY` on every decay; scores are rescaled
/// before they overflow.
#[derive(Debug, Clone, PartialEq, Default)]
struct Activity {
    scores: Vec<f64>,
    increment: f64,
}

impl Activity {
    fn new<L: Literal>(num_vars: usize, clauses: &[Clause<L>]) -> Self {
        let scores = occurrences(num_vars, clauses)
            .into_iter()
            .map(|(pos, neg)| f64::from(pos + neg))
            .collect();

        Self {
            scores,
            increment: 1.0,
        }
    }

    /// Returns `true` when all scores were rescaled.
    fn bump(&mut self, var: Variable) -> bool {
        let score = &mut self.scores[var as usize];
        *score += self.increment;

        if *score >= RESCALE_LIMIT {
            for s in &mut self.scores {
                *s /= RESCALE_LIMIT;
            }
            self.increment /= RESCALE_LIMIT;
            return true;
        }
        false
    }

    fn decay(&mut self) {
        self.increment /= DEFAULT_DECAY;
    }

    fn get(&self, var: Variable) -> f64 {
        self.scores.get(var as usize).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vsids {
    activity: Activity,
}

impl Vsids {
    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activity.get(var)
    }
}

impl<L: Literal> VariableSelection<L> for Vsids {
    fn new(num_vars: usize, clauses: &[Clause<L>]) -> Self {
        Self {
            activity: Activity::new(num_vars, clauses),
        }
    }

    fn pick<A: Assignment>(&mut self, assignment: &A) -> Option<L> {
        let mut best: Option<(Variable, f64)> = None;
        for var in assignment.unassigned() {
            let score = self.activity.get(var);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((var, score));
            }
        }
        best.map(|(var, _)| L::new(var, true))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        for var in vars {
            self.activity.bump(var);
        }
    }

    fn decay(&mut self) {
        self.activity.decay();
    }
}

type HeapEntry = (OrderedFloat<f64>, Reverse<Variable>);

/// Max-heap of `(activity, Reverse(var))`. Entries are never updated in
/// place: a bump pushes a fresh entry, and entries whose score no longer
/// matches the variable's activity are discarded when popped.
///
/// `in_heap` marks variables holding a live entry. Only those get a fresh
/// entry on a bump; the rest are pushed again when unassigned. Once the heap
/// outgrows `HEAP_SLACK` entries per variable it is rebuilt from the live set.
#[derive(Debug, Clone, Default)]
pub struct VsidsHeap {
    activity: Activity,
    heap: BinaryHeap<HeapEntry>,
    in_heap: BitVec,
}

impl VsidsHeap {
    fn entry(&self, var: Variable) -> HeapEntry {
        (OrderedFloat(self.activity.get(var)), Reverse(var))
    }

    fn is_live(&self, var: Variable) -> bool {
        self.in_heap.get(var as usize).unwrap_or(false)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn vars(&self) -> Range<Variable> {
        1..self.activity.scores.len() as Variable
    }

    /// Refills the heap with every variable.
    fn rebuild(&mut self) {
        let entries: Vec<_> = self.vars().map(|v| self.entry(v)).collect();
        self.heap = BinaryHeap::from(entries);
        self.in_heap = BitVec::from_elem(self.activity.scores.len(), true);
        self.in_heap.set(0, false);
    }

    /// Drops stale entries, keeping one per live variable.
    fn compact(&mut self) {
        let entries: Vec<_> = self
            .vars()
            .filter(|&v| self.is_live(v))
            .map(|v| self.entry(v))
            .collect();
        self.heap = BinaryHeap::from(entries);
    }

    fn push(&mut self, var: Variable) {
        let entry = self.entry(var);
        self.heap.push(entry);
        self.in_heap.set(var as usize, true);

        if self.heap.len() > HEAP_SLACK * self.activity.scores.len() {
            self.compact();
        }
    }

    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activity.get(var)
    }
}

impl<L: Literal> VariableSelection<L> for VsidsHeap {
    fn new(num_vars: usize, clauses: &[Clause<L>]) -> Self {
        let mut selector = Self {
            activity: Activity::new(num_vars, clauses),
            heap: BinaryHeap::new(),
            in_heap: BitVec::new(),
        };
        selector.rebuild();
        selector
    }

    fn pick<A: Assignment>(&mut self, assignment: &A) -> Option<L> {
        while let Some((score, Reverse(var))) = self.heap.pop() {
            if score.0 != self.activity.get(var) {
                continue;
            }
            self.in_heap.set(var as usize, false);
            if assignment.is_assigned(var) {
                continue;
            }
            return Some(L::new(var, true));
        }
        None
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        for var in vars {
            if self.activity.bump(var) {
                self.rebuild();
            } else if self.is_live(var) {
                self.push(var);
            }
        }
    }

    fn decay(&mut self) {
        self.activity.decay();
    }

    fn on_unassign(&mut self, var: Variable) {
        if !self.is_live(var) {
            self.push(var);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::VecAssignment;
    use crate::sat::literal::DoubleLiteral;

    type L = DoubleLiteral;

    fn clauses(raw: &[&[i32]]) -> Vec<Clause<L>> {
        raw.iter().map(|c| Clause::from_i32s(c)).collect()
    }

    #[test]
    fn test_fixed_order() {
        let mut a = VecAssignment::new(3);
        let mut s = <FixedOrder as VariableSelection<L>>::new(3, &[]);
        assert_eq!(s.pick(&a), Some(L::from_i32(1)));
        a.set(1, false);
        assert_eq!(s.pick(&a), Some(L::from_i32(2)));
        a.set(2, true);
        a.set(3, true);
        assert_eq!(VariableSelection::<L>::pick(&mut s, &a), None);
    }

    #[test]
    fn test_most_frequent() {
        let cs = clauses(&[&[1, -3], &[-3, 2], &[-3, -2], &[2, 1], &[-3, 1]]);
        let mut a = VecAssignment::new(3);
        let mut s = MostFrequent::new(3, &cs);

        assert_eq!(s.pick(&a), Some(L::from_i32(3)));
        a.set(3, false);
        // 1 and 2 both occur three times; the lower id wins.
        assert_eq!(s.pick(&a), Some(L::from_i32(1)));
    }

    #[test]
    fn test_vsids_ties_and_bumps() {
        let cs = clauses(&[&[1, 2], &[-1, -2], &[3]]);
        let mut a = VecAssignment::new(3);
        let mut s = Vsids::new(3, &cs);

        assert_eq!(s.pick(&a), Some(L::from_i32(1)));
        VariableSelection::<L>::bumps(&mut s, [3, 3]);
        assert_eq!(s.pick(&a), Some(L::from_i32(3)));
        a.set(3, true);
        assert_eq!(s.pick(&a), Some(L::from_i32(1)));
    }

    #[test]
    fn test_heap_matches_linear_scan() {
        let cs = clauses(&[&[1, 2, 3], &[-2, 4], &[4, -5], &[5, 1], &[-4]]);
        let mut linear = Vsids::new(5, &cs);
        let mut heap = VsidsHeap::new(5, &cs);
        let mut a = VecAssignment::new(5);

        for round in 0..5u32 {
            let bumped = [round % 5 + 1, (round * 3) % 5 + 1];
            VariableSelection::<L>::bumps(&mut linear, bumped);
            VariableSelection::<L>::bumps(&mut heap, bumped);
            VariableSelection::<L>::decay(&mut linear);
            VariableSelection::<L>::decay(&mut heap);

            let expected: Option<L> = linear.pick(&a);
            let got: Option<L> = heap.pick(&a);
            assert_eq!(got, expected);

            let lit = got.unwrap();
            a.assign(lit);
        }

        a.unassign(2);
        VariableSelection::<L>::on_unassign(&mut heap, 2);
        let got: Option<L> = heap.pick(&a);
        assert_eq!(got, Some(L::from_i32(2)));
    }

    #[test]
    fn test_rescale_keeps_order() {
        let cs = clauses(&[&[1, 2]]);
        let mut s = VsidsHeap::new(2, &cs);
        s.activity.increment = RESCALE_LIMIT;
        VariableSelection::<L>::bumps(&mut s, [2]);

        assert!((s.activity(2) - 1.0).abs() < 1e-9);
        assert!((s.activity(1) - 1e-100).abs() < 1e-109);
        assert!((s.activity.increment - 1.0).abs() < 1e-9);
        assert_eq!(s.heap.len(), 2);

        let a = VecAssignment::new(2);
        let got: Option<L> = s.pick(&a);
        assert_eq!(got, Some(L::from_i32(2)));

        s.activity.increment = 2.0 * RESCALE_LIMIT;
        VariableSelection::<L>::bumps(&mut s, [1]);
        assert!((s.activity(1) - 2.0).abs() < 1e-9);
        let got: Option<L> = s.pick(&a);
        assert_eq!(got, Some(L::from_i32(1)));
    }

    #[test]
    fn test_heap_stays_bounded() {
        let cs = clauses(&[&[1, 2, 3], &[-1, 4], &[-2, -4], &[3, -4]]);
        let mut linear = Vsids::new(4, &cs);
        let mut heap = VsidsHeap::new(4, &cs);
        let mut a = VecAssignment::new(4);

        for round in 0..2_000u32 {
            let mut picked = Vec::new();
            for _ in 0..4 {
                let expected: Option<L> = linear.pick(&a);
                let got: Option<L> = heap.pick(&a);
                assert_eq!(got, expected);
                let lit = got.unwrap();
                a.assign(lit);
                picked.push(lit.variable());
            }
            assert_eq!(VariableSelection::<L>::pick(&mut heap, &a), None);

            let bumped = [round % 4 + 1, (round * 7) % 4 + 1];
            VariableSelection::<L>::bumps(&mut linear, bumped);
            VariableSelection::<L>::bumps(&mut heap, bumped);
            VariableSelection::<L>::decay(&mut linear);
            VariableSelection::<L>::decay(&mut heap);

            for var in picked {
                a.unassign(var);
                VariableSelection::<L>::on_unassign(&mut heap, var);
            }
            assert!(heap.heap.len() <= HEAP_SLACK * 5 + 1);
        }
    }
}
