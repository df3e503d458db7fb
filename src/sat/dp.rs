#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Davis-Putnam: satisfiability by variable elimination.
//!
//! Variables are eliminated in ascending id order. Eliminating `x` replaces
//! every clause mentioning `x` with all non-tautological resolvents on `x`.
//! Deriving the empty clause proves unsatisfiability; running out of
//! variables proves satisfiability.
//!
//! The clause set can grow exponentially. There is no internal limit: callers
//! that need one run the solver under a timeout.
//!
//! A model is rebuilt afterwards by back-substitution: walking the eliminated
//! variables in reverse, each one is set so that the clauses removed with it
//! are satisfied by the values already fixed for later variables.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{DoubleLiteral, Literal, Variable};
use crate::sat::solver::{SolutionStats, Solver, SolverConfig};
use itertools::{Either, Itertools};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dp<L: Literal = DoubleLiteral> {
    cnf: Cnf<L>,
    /// Each eliminated variable with the clauses that mentioned it, in
    /// elimination order.
    eliminated: Vec<(Variable, Vec<Clause<L>>)>,
    model: Option<Vec<bool>>,
    resolvents: usize,
}

impl<L: Literal> Dp<L> {
    /// Eliminates every variable. Returns `false` once the empty clause is derived.
    fn eliminate_all(&mut self) -> bool {
        let mut clauses: FxHashSet<Clause<L>> = self.cnf.original_clauses().cloned().collect();

        #[allow(clippy::cast_possible_truncation)]
        for var in 1..=self.cnf.num_vars as Variable {
            let (mentioning, rest): (Vec<_>, FxHashSet<_>) =
                clauses.into_iter().partition_map(|c| {
                    if c.contains_var(var) {
                        Either::Left(c)
                    } else {
                        Either::Right(c)
                    }
                });
            clauses = rest;

            let (pos, neg): (Vec<_>, Vec<_>) = mentioning
                .iter()
                .partition(|c| c.contains(L::new(var, true)));

            for (p, n) in pos.iter().cartesian_product(&neg) {
                let Some(resolvent) = p.resolve(n, var) else {
                    continue;
                };
                self.resolvents += 1;
                if resolvent.is_empty() {
                    debug!(var, resolvents = self.resolvents, "dp derived the empty clause");
                    return false;
                }
                clauses.insert(resolvent);
            }

            trace!(
                var,
                removed = mentioning.len(),
                remaining = clauses.len(),
                "eliminated variable"
            );
            self.eliminated.push((var, mentioning));
        }

        true
    }

    /// Back-substitution over the eliminated clause sets, latest first.
    fn reconstruct(&self) -> Vec<bool> {
        let mut model = vec![true; self.cnf.num_vars + 1];

        for (var, clauses) in self.eliminated.iter().rev() {
            let needs_true = clauses.iter().any(|clause| {
                clause.contains(L::new(*var, true))
                    && !clause
                        .iter()
                        .filter(|l| l.variable() != *var)
                        .any(|l| model[l.variable() as usize] == l.polarity())
            });
            model[*var as usize] = needs_true;
        }

        model
    }
}

impl<C: SolverConfig> Solver<C> for Dp<C::Literal> {
    fn new(cnf: Cnf<C::Literal>) -> Self {
        Self {
            cnf,
            eliminated: Vec::new(),
            model: None,
            resolvents: 0,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        debug!(
            vars = self.cnf.num_vars,
            clauses = self.cnf.len(),
            "dp solve started"
        );

        if self.cnf.has_empty_clause() || !self.eliminate_all() {
            return None;
        }

        self.model = Some(self.reconstruct());
        debug!(resolvents = self.resolvents, "dp found a model");
        Some(Solver::<C>::solutions(self))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn solutions(&self) -> Solutions {
        self.model.as_ref().map_or_else(Solutions::default, |model| {
            Solutions::new(
                (1..model.len())
                    .map(|v| if model[v] { v as i32 } else { -(v as i32) })
                    .collect(),
            )
        })
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            resolvents: self.resolvents,
            ..SolutionStats::default()
        }
    }
}
