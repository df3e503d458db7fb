#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Davis-Putnam-Logemann-Loveland search.
//!
//! Each node of the recursion:
//! 1. propagates units (a conflict closes the branch),
//! 2. assigns pure literals until none are left,
//! 3. stops with a model once every clause holds a true literal,
//! 4. otherwise branches on the selector's literal, first as given, then negated.
//!
//! Backtracking truncates the shared trail to the length it had when the
//! branch was entered. Recursion depth is bounded by the variable count.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::propagation::{Propagator, enqueue_units, pure_literals};
use crate::sat::solver::{DpllConfig, SolutionStats, Solutions, Solver, SolverConfig};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::VariableSelection;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct Dpll<Config: SolverConfig = DpllConfig> {
    pub trail: Trail<Config::Literal>,
    pub assignment: Config::Assignment,
    pub cnf: Cnf<Config::Literal>,
    pub selector: Config::VariableSelector,
    pub propagator: Config::Propagator,
    decisions: usize,
    conflicts: usize,
}

impl<Config: SolverConfig> Dpll<Config> {
    fn is_sat(&self) -> bool {
        self.cnf.iter().all(|clause| {
            clause
                .iter()
                .any(|&lit| self.assignment.literal_value(lit) == Some(true))
        })
    }

    fn is_unsat(&self) -> bool {
        self.cnf.iter().any(|clause| {
            clause
                .iter()
                .all(|&lit| self.assignment.literal_value(lit) == Some(false))
        })
    }

    fn eliminate_pure_literals(&mut self) {
        loop {
            let pures = pure_literals(&self.cnf, &self.assignment);
            if pures.is_empty() {
                return;
            }
            let level = self.trail.decision_level();
            for lit in pures {
                self.trail
                    .push(&mut self.assignment, lit, level, Reason::Pure);
            }
        }
    }

    fn undo_to(&mut self, len: usize) {
        for step in self.trail.backstep_to_len(&mut self.assignment, len) {
            self.selector.on_unassign(step.lit.variable());
        }
    }

    fn search(&mut self) -> bool {
        if self
            .propagator
            .propagate(&mut self.trail, &mut self.assignment, &mut self.cnf)
            .is_some()
        {
            self.conflicts += 1;
            return false;
        }

        self.eliminate_pure_literals();

        if self.is_sat() {
            return true;
        }
        if self.is_unsat() {
            self.conflicts += 1;
            return false;
        }

        let Some(lit) = self.selector.pick(&self.assignment) else {
            return false;
        };

        let level = self.trail.decision_level() + 1;
        let mark = self.trail.len();

        for choice in [lit, lit.negated()] {
            self.decisions += 1;
            trace!(lit = choice.to_i32(), level, "dpll branch");
            self.trail
                .push(&mut self.assignment, choice, level, Reason::Decision);

            if self.search() {
                return true;
            }
            self.undo_to(mark);
        }

        false
    }
}

impl<Config: SolverConfig> Solver<Config> for Dpll<Config> {
    fn new(cnf: Cnf<Config::Literal>) -> Self {
        let propagator = Config::Propagator::new(&cnf);
        let assignment = Config::Assignment::new(cnf.num_vars);
        let trail = Trail::new(cnf.num_vars);
        let selector = Config::VariableSelector::new(cnf.num_vars, &cnf.clauses);

        Self {
            trail,
            assignment,
            cnf,
            selector,
            propagator,
            decisions: 0,
            conflicts: 0,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        debug!(
            vars = self.cnf.num_vars,
            clauses = self.cnf.len(),
            "dpll solve started"
        );

        if self.cnf.has_empty_clause() {
            return None;
        }
        if enqueue_units(&self.cnf, &mut self.trail, &mut self.assignment).is_some() {
            self.conflicts += 1;
            return None;
        }

        let sat = self.search();
        debug!(
            sat,
            decisions = self.decisions,
            conflicts = self.conflicts,
            "dpll solve finished"
        );
        sat.then(|| self.solutions())
    }

    fn solutions(&self) -> Solutions {
        self.assignment.get_solutions()
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            decisions: self.decisions,
            propagations: self.trail.num_propagations(),
            conflicts: self.conflicts,
            ..SolutionStats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::propagation::WatchedLiterals;
    use crate::sat::restarter::Never;
    use crate::sat::solver::Configured;
    use crate::sat::variable_selection::FixedOrder;

    type Watched = Configured<FixedOrder, WatchedLiterals, Never>;

    fn solve<C: SolverConfig<Literal = crate::sat::literal::DoubleLiteral>>(
        clauses: Vec<Vec<i32>>,
    ) -> (Option<Solutions>, SolutionStats) {
        let cnf = Cnf::new(clauses).unwrap();
        let mut solver: Dpll<C> = Dpll::new(cnf);
        let result = solver.solve();
        (result, solver.stats())
    }

    #[test]
    fn test_unique_model() {
        let (result, _) = solve::<DpllConfig>(vec![vec![1, 2], vec![-1, 2], vec![1, -2]]);
        assert_eq!(result, Some(Solutions::new(vec![1, 2])));
    }

    #[test]
    fn test_contradicting_units() {
        let (result, stats) = solve::<DpllConfig>(vec![vec![1], vec![-1]]);
        assert_eq!(result, None);
        assert_eq!(stats.decisions, 0);
        assert_eq!(stats.conflicts, 1);
    }

    #[test]
    fn test_branching_backtracks() {
        // x1 = true is refuted only after propagation, forcing the false branch.
        let clauses = vec![vec![-1, 2], vec![-1, -2], vec![1, 3], vec![1, -3, 4], vec![-4, 3]];
        for (result, stats) in [
            solve::<DpllConfig>(clauses.clone()),
            solve::<Watched>(clauses.clone()),
        ] {
            let model = result.unwrap();
            assert_eq!(model.value(1), Some(false));
            assert!(model.satisfies(&clauses));
            assert!(stats.decisions >= 1);
        }
    }

    #[test]
    fn test_fixed_order_unsat() {
        let clauses = vec![vec![1, 2], vec![1, -2], vec![-1, 2], vec![-1, -2]];
        let (result, stats) = solve::<Watched>(clauses);
        assert_eq!(result, None);
        assert_eq!(stats.decisions, 2);
        assert_eq!(stats.conflicts, 2);
    }

    #[test]
    fn test_pure_literals_settle_formula() {
        let (result, stats) = solve::<DpllConfig>(vec![vec![1, 2], vec![1, -3], vec![2, -3]]);
        assert_eq!(result, Some(Solutions::new(vec![1, 2, -3])));
        assert_eq!(stats.decisions, 0);
    }
}
