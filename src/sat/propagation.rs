#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation and pure literal elimination.
//!
//! Two propagators implement [`Propagator`]:
//! - [`WatchedLiterals`]: the two-watched-literal scheme. Each clause of two
//!   or more literals is watched through its first two positions; a clause is
//!   only visited when one of its watches becomes false.
//! - [`UnitSearch`]: rescans every clause until a fixpoint. Slow, but it needs
//!   no bookkeeping at all.
//!
//! Both extend the trail from its propagation head and report the index of a
//! falsified clause on conflict.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::trail::{Reason, Trail};
use smallvec::SmallVec;
use std::fmt::Debug;

pub trait Propagator<L: Literal>: Debug + Clone + Send {
    fn new(cnf: &Cnf<L>) -> Self;

    /// Registers a clause appended to the formula after construction.
    fn add_clause(&mut self, clause: &Clause<L>, idx: usize);

    /// Propagates every unprocessed trail step. Returns the falsified clause on conflict.
    fn propagate<A: Assignment>(
        &mut self,
        trail: &mut Trail<L>,
        assignment: &mut A,
        cnf: &mut Cnf<L>,
    ) -> Option<usize>;
}

/// Seeds the trail with the formula's unit clauses at level 0.
/// Returns the second of two contradicting unit clauses, if any.
pub fn enqueue_units<L: Literal, A: Assignment>(
    cnf: &Cnf<L>,
    trail: &mut Trail<L>,
    assignment: &mut A,
) -> Option<usize> {
    for (idx, clause) in cnf.iter().enumerate().filter(|(_, c)| c.is_unit()) {
        let lit = clause[0];
        match assignment.literal_value(lit) {
            Some(true) => {}
            Some(false) => return Some(idx),
            None => trail.push(assignment, lit, 0, Reason::Unit(idx)),
        }
    }
    None
}

/// Literals that occur in only one polarity among the clauses not yet
/// satisfied, ordered by variable.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn pure_literals<L: Literal, A: Assignment>(cnf: &Cnf<L>, assignment: &A) -> Vec<L> {
    const POS: u8 = 0b01;
    const NEG: u8 = 0b10;

    let mut seen = vec![0u8; cnf.num_vars + 1];

    for clause in cnf.iter() {
        if clause
            .iter()
            .any(|&l| assignment.literal_value(l) == Some(true))
        {
            continue;
        }
        for &lit in clause.iter() {
            if assignment.literal_value(lit).is_none() {
                seen[lit.variable() as usize] |= if lit.polarity() { POS } else { NEG };
            }
        }
    }

    seen.iter()
        .enumerate()
        .filter_map(|(var, &mask)| match mask {
            POS => Some(L::new(var as u32, true)),
            NEG => Some(L::new(var as u32, false)),
            _ => None,
        })
        .collect()
}

type WatchList = SmallVec<[usize; 6]>;

/// Watch lists indexed by `Literal::index`. A clause index sits in the lists
/// of exactly the two literals at positions 0 and 1 of that clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchedLiterals {
    watches: Vec<WatchList>,
}

impl WatchedLiterals {
    fn watch<L: Literal>(&mut self, lit: L, idx: usize) {
        let i = lit.index();
        if i >= self.watches.len() {
            self.watches.resize_with(i + 1, WatchList::new);
        }
        self.watches[i].push(idx);
    }

    #[must_use]
    pub fn watchers<L: Literal>(&self, lit: L) -> &[usize] {
        self.watches.get(lit.index()).map_or(&[][..], |w| w.as_slice())
    }
}

impl<L: Literal> Propagator<L> for WatchedLiterals {
    fn new(cnf: &Cnf<L>) -> Self {
        let mut wl = Self {
            watches: vec![WatchList::new(); (cnf.num_vars + 1) * 2],
        };
        for (i, clause) in cnf.iter().enumerate() {
            Propagator::<L>::add_clause(&mut wl, clause, i);
        }
        wl
    }

    fn add_clause(&mut self, clause: &Clause<L>, idx: usize) {
        if clause.len() < 2 {
            return;
        }
        debug_assert_ne!(clause[0], clause[1]);

        self.watch(clause[0], idx);
        self.watch(clause[1], idx);
    }

    fn propagate<A: Assignment>(
        &mut self,
        trail: &mut Trail<L>,
        assignment: &mut A,
        cnf: &mut Cnf<L>,
    ) -> Option<usize> {
        while trail.curr_idx < trail.len() {
            let false_lit = trail[trail.curr_idx].lit.negated();
            trail.curr_idx += 1;

            let Some(list) = self.watches.get_mut(false_lit.index()) else {
                continue;
            };
            let mut watchers = std::mem::take(list);
            let mut conflict = None;
            let mut i = 0;

            while i < watchers.len() {
                let c_ref = watchers[i];
                let clause = &mut cnf[c_ref];

                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }

                let other = clause[0];
                if assignment.literal_value(other) == Some(true) {
                    i += 1;
                    continue;
                }

                let replacement = (2..clause.len())
                    .find(|&k| assignment.literal_value(clause[k]) != Some(false));

                if let Some(k) = replacement {
                    clause.swap(1, k);
                    let new_watch = clause[1];
                    watchers.swap_remove(i);
                    self.watch(new_watch, c_ref);
                    continue;
                }

                if assignment.literal_value(other) == Some(false) {
                    conflict = Some(c_ref);
                    break;
                }

                let level = trail.decision_level();
                trail.push(assignment, other, level, Reason::Clause(c_ref));
                i += 1;
            }

            self.watches[false_lit.index()].extend(watchers);

            if conflict.is_some() {
                return conflict;
            }
        }

        None
    }
}

/// Propagation by repeatedly scanning every clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitSearch;

impl<L: Literal> Propagator<L> for UnitSearch {
    fn new(_: &Cnf<L>) -> Self {
        Self
    }

    fn add_clause(&mut self, _: &Clause<L>, _: usize) {}

    fn propagate<A: Assignment>(
        &mut self,
        trail: &mut Trail<L>,
        assignment: &mut A,
        cnf: &mut Cnf<L>,
    ) -> Option<usize> {
        loop {
            let mut changed = false;

            for (c_ref, clause) in cnf.iter().enumerate() {
                let mut open = None;
                let mut open_count = 0usize;
                let mut satisfied = false;

                for &lit in clause.iter() {
                    match assignment.literal_value(lit) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open_count += 1;
                            open = Some(lit);
                        }
                    }
                }

                if satisfied {
                    continue;
                }

                match (open_count, open) {
                    (0, _) => {
                        trail.curr_idx = trail.len();
                        return Some(c_ref);
                    }
                    (1, Some(lit)) => {
                        let level = trail.decision_level();
                        trail.push(assignment, lit, level, Reason::Clause(c_ref));
                        changed = true;
                    }
                    _ => {}
                }
            }

            if !changed {
                trail.curr_idx = trail.len();
                return None;
            }
        }
    }
}
