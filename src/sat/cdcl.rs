#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict-driven clause learning.
//!
//! The search is a single loop over an explicit trail:
//! - propagate from the trail head;
//! - on conflict at level 0, stop with UNSAT; otherwise learn a first-UIP
//!   clause, backjump to its assertion level and assert its first literal;
//! - with no conflict, decide on the highest-activity unassigned variable,
//!   or stop with a model when none is left.
//!
//! Learned clauses are appended to the formula and never removed. A restart
//! only clears the trail down to level 0.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, DecisionLevel};
use crate::sat::conflict_analysis::{Analyser, Conflict};
use crate::sat::literal::Literal;
use crate::sat::propagation::{Propagator, enqueue_units};
use crate::sat::restarter::Restarter;
use crate::sat::solver::{DefaultConfig, SolutionStats, Solutions, Solver, SolverConfig};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::VariableSelection;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct Cdcl<Config: SolverConfig = DefaultConfig> {
    pub assignment: Config::Assignment,
    pub trail: Trail<Config::Literal>,
    pub cnf: Cnf<Config::Literal>,
    pub selector: Config::VariableSelector,
    pub propagator: Config::Propagator,
    pub restarter: Config::Restarter,
    decisions: usize,
    conflicts: usize,
    learnt: usize,
}

impl<Config: SolverConfig> Cdcl<Config> {
    /// Clauses learned so far, in the order they were derived.
    pub fn learnt_clauses(&self) -> impl Iterator<Item = &Clause<Config::Literal>> {
        self.cnf.learnt_clauses()
    }

    fn backjump(&mut self, level: DecisionLevel) {
        for step in self.trail.backstep_to(&mut self.assignment, level) {
            self.selector.on_unassign(step.lit.variable());
        }
    }

    /// Learns from the conflict in clause `c_ref`. Returns `false` when the
    /// conflict proves the formula unsatisfiable.
    fn resolve_conflict(&mut self, c_ref: usize) -> bool {
        self.conflicts += 1;

        let analysis = Analyser::analyse(&self.cnf, &self.trail, c_ref);
        let Conflict::Learned {
            clause,
            backjump_level,
        } = analysis.conflict
        else {
            return false;
        };

        self.selector.bumps(analysis.to_bump);
        self.selector.decay();

        trace!(
            conflict = self.conflicts,
            from = self.trail.decision_level(),
            to = backjump_level,
            len = clause.len(),
            "backjump"
        );
        self.backjump(backjump_level);

        let asserting = clause[0];
        let idx = self.cnf.add_clause(clause);
        self.propagator.add_clause(&self.cnf[idx], idx);
        self.learnt += 1;
        self.trail.push(
            &mut self.assignment,
            asserting,
            backjump_level,
            Reason::Clause(idx),
        );

        if self.restarter.should_restart() {
            trace!(restarts = self.restarter.num_restarts(), "restart");
            self.backjump(0);
        }

        true
    }
}

impl<Config: SolverConfig> Solver<Config> for Cdcl<Config> {
    fn new(cnf: Cnf<Config::Literal>) -> Self {
        let propagator = Config::Propagator::new(&cnf);
        let selector = Config::VariableSelector::new(cnf.num_vars, &cnf.clauses);

        Self {
            assignment: Config::Assignment::new(cnf.num_vars),
            trail: Trail::new(cnf.num_vars),
            cnf,
            selector,
            propagator,
            restarter: Config::Restarter::new(),
            decisions: 0,
            conflicts: 0,
            learnt: 0,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        debug!(
            vars = self.cnf.num_vars,
            clauses = self.cnf.len(),
            "cdcl solve started"
        );

        if self.cnf.has_empty_clause() {
            return None;
        }
        if enqueue_units(&self.cnf, &mut self.trail, &mut self.assignment).is_some() {
            self.conflicts += 1;
            debug!("conflicting unit clauses");
            return None;
        }

        loop {
            if let Some(c_ref) =
                self.propagator
                    .propagate(&mut self.trail, &mut self.assignment, &mut self.cnf)
            {
                if !self.resolve_conflict(c_ref) {
                    debug!(
                        conflicts = self.conflicts,
                        learnt = self.learnt,
                        "cdcl proved unsat"
                    );
                    return None;
                }
                continue;
            }

            let Some(lit) = self.selector.pick(&self.assignment) else {
                debug!(
                    decisions = self.decisions,
                    conflicts = self.conflicts,
                    "cdcl found a model"
                );
                return Some(self.solutions());
            };

            self.decisions += 1;
            let level = self.trail.decision_level() + 1;
            self.trail
                .push(&mut self.assignment, lit, level, Reason::Decision);
        }
    }

    fn solutions(&self) -> Solutions {
        self.assignment.get_solutions()
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            decisions: self.decisions,
            propagations: self.trail.num_propagations(),
            conflicts: self.conflicts,
            learnt_clauses: self.learnt,
            restarts: self.restarter.num_restarts(),
            resolvents: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::DoubleLiteral;
    use crate::sat::propagation::{UnitSearch, WatchedLiterals};
    use crate::sat::restarter::{Fixed, Never};
    use crate::sat::solver::Configured;
    use crate::sat::variable_selection::{FixedOrder, Vsids};

    type Plain = Configured<Vsids, WatchedLiterals, Never>;
    type Restarting = Configured<FixedOrder, WatchedLiterals, Fixed<1>>;
    type Scanning = Configured<Vsids, UnitSearch, Never>;

    fn cdcl<C: SolverConfig<Literal = DoubleLiteral>>(clauses: Vec<Vec<i32>>) -> Cdcl<C> {
        Cdcl::new(Cnf::new(clauses).unwrap())
    }

    /// 3 pigeons, 2 holes.
    fn php2() -> Vec<Vec<i32>> {
        vec![
            vec![1, 2],
            vec![3, 4],
            vec![5, 6],
            vec![-1, -3],
            vec![-1, -5],
            vec![-3, -5],
            vec![-2, -4],
            vec![-2, -6],
            vec![-4, -6],
        ]
    }

    #[test]
    fn test_contradicting_units_at_level_zero() {
        let mut solver: Cdcl = cdcl(vec![vec![1], vec![-1]]);
        assert_eq!(solver.solve(), None);
        let stats = solver.stats();
        assert_eq!(stats.decisions, 0);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.learnt_clauses, 0);
    }

    #[test]
    fn test_unique_model() {
        let mut solver: Cdcl = cdcl(vec![vec![1, 2], vec![-1, 2], vec![1, -2]]);
        assert_eq!(solver.solve(), Some(Solutions::new(vec![1, 2])));
    }

    #[test]
    fn test_empty_formula() {
        let mut solver: Cdcl = Cdcl::new(Cnf::default());
        assert_eq!(solver.solve(), Some(Solutions::default()));

        let mut solver: Cdcl = Cdcl::new(Cnf::contradiction());
        assert_eq!(solver.solve(), None);
    }

    #[test]
    fn test_pigeonhole_learns() {
        fn check<C: SolverConfig<Literal = DoubleLiteral>>() {
            let mut solver = cdcl::<C>(php2());
            assert_eq!(solver.solve(), None);
            let stats = solver.stats();
            assert!(stats.conflicts > 0);
            assert_eq!(stats.learnt_clauses, solver.learnt_clauses().count());
            assert!(solver.learnt_clauses().all(|c| c.learnt && !c.is_empty()));
        }

        check::<DefaultConfig>();
        check::<Plain>();
        check::<Restarting>();
        check::<Scanning>();
    }

    #[test]
    fn test_restarts_are_counted() {
        let mut solver = cdcl::<Restarting>(php2());
        assert_eq!(solver.solve(), None);
        let stats = solver.stats();
        assert_eq!(stats.restarts, stats.learnt_clauses);
    }

    #[test]
    fn test_model_verifies() {
        let clauses = vec![
            vec![1, -2, 3],
            vec![-1, 2],
            vec![-3, -2],
            vec![2, 4, -5],
            vec![-4, 5],
            vec![-1, -4],
            vec![3, 5],
        ];
        let cnf = Cnf::new(clauses).unwrap();
        let mut solver: Cdcl = Cdcl::new(cnf.clone());
        let model = solver.solve().unwrap();
        assert!(cnf.verify(&model));
    }

    #[test]
    fn test_is_deterministic() {
        let run = || {
            let mut solver: Cdcl = cdcl(php2());
            (solver.solve(), solver.stats())
        };
        assert_eq!(run(), run());
    }
}
