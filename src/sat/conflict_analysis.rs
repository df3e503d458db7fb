#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! First-UIP conflict analysis.
//!
//! Starting from the falsified clause, literals of the current decision level
//! are resolved away against their reasons, walking the trail backwards, until
//! exactly one current-level literal is left. Its negation becomes the
//! asserting literal of the learned clause. Level-0 literals are dropped: they
//! are false under every assignment reachable from the formula.

use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, DecisionLevel};
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::Trail;
use bit_vec::BitVec;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Conflict<L: Literal> {
    /// The conflict does not depend on any decision: the formula is unsatisfiable.
    Ground,
    /// A learned clause with the asserting literal at position 0 and, if there
    /// is a second literal, the one with the highest level at position 1.
    Learned {
        clause: Clause<L>,
        backjump_level: DecisionLevel,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis<L: Literal> {
    pub conflict: Conflict<L>,
    /// Variables met while resolving, for activity bumping.
    pub to_bump: Vec<Variable>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyser;

impl Analyser {
    #[must_use]
    pub fn analyse<L: Literal>(cnf: &Cnf<L>, trail: &Trail<L>, c_ref: usize) -> Analysis<L> {
        let dl = trail.decision_level();
        if dl == 0 {
            return Analysis {
                conflict: Conflict::Ground,
                to_bump: Vec::new(),
            };
        }

        let mut seen = BitVec::from_elem(cnf.num_vars + 1, false);
        let mut to_bump = Vec::new();
        // Slot 0 is reserved for the asserting literal.
        let mut learned: Vec<L> = vec![L::default()];
        let mut open = 0usize;
        let mut idx = trail.len();
        let mut reason = c_ref;
        let mut resolved: Option<L> = None;

        let uip = loop {
            for &lit in cnf[reason].iter() {
                if Some(lit) == resolved {
                    continue;
                }
                let var = lit.variable();
                if seen[var as usize] || trail.level(var) == 0 {
                    continue;
                }

                seen.set(var as usize, true);
                to_bump.push(var);
                if trail.level(var) >= dl {
                    open += 1;
                } else {
                    learned.push(lit);
                }
            }

            loop {
                idx -= 1;
                if seen[trail[idx].lit.variable() as usize] {
                    break;
                }
            }

            let step = &trail[idx];
            seen.set(step.lit.variable() as usize, false);
            open -= 1;

            if open == 0 {
                break step.lit;
            }

            resolved = Some(step.lit);
            reason = step
                .reason
                .clause()
                .unwrap_or_else(|| unreachable!("current-level literal without a reason"));
        };

        learned[0] = uip.negated();

        let backjump_level = if learned.len() == 1 {
            0
        } else {
            let (pos, level) = learned
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, l)| (i, trail.level(l.variable())))
                .max_by_key(|&(i, level)| (level, std::cmp::Reverse(i)))
                .unwrap_or((1, 0));
            learned.swap(1, pos);
            level
        };

        Analysis {
            conflict: Conflict::Learned {
                clause: Clause::learnt(learned),
                backjump_level,
            },
            to_bump,
        }
    }
}
