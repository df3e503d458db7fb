#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The uniform entry point over the three engines.
//!
//! Engines are generic over a [`SolverConfig`], which fixes the literal
//! representation, the assignment store, the decision heuristic, the
//! propagator and the restart schedule at compile time. [`SolverOptions`]
//! chooses among the provided components at run time and dispatches to the
//! matching monomorphised engine.

use crate::sat::assignment::{Assignment, VecAssignment};
use crate::sat::cdcl::Cdcl;
use crate::sat::cnf::Cnf;
use crate::sat::dp::Dp;
use crate::sat::dpll::Dpll;
use crate::sat::error::SolverError;
use crate::sat::literal::{DoubleLiteral, Literal};
use crate::sat::propagation::{Propagator, UnitSearch, WatchedLiterals};
use crate::sat::restarter::{Fixed, Geometric, Luby, Never, Restarter};
use crate::sat::variable_selection::{FixedOrder, MostFrequent, VariableSelection, Vsids, VsidsHeap};
use clap::ValueEnum;
use std::fmt::{self, Debug, Display};
use std::marker::PhantomData;
use std::str::FromStr;

pub use crate::sat::assignment::Solutions;

pub trait SolverConfig: Debug + Clone {
    type Literal: Literal;
    type Assignment: Assignment;
    type VariableSelector: VariableSelection<Self::Literal>;
    type Propagator: Propagator<Self::Literal>;
    type Restarter: Restarter;
}

/// A configuration assembled from its decision heuristic, propagator and
/// restart schedule, over `DoubleLiteral` and `VecAssignment`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Configured<V, P, R>(PhantomData<(V, P, R)>);

impl<V, P, R> SolverConfig for Configured<V, P, R>
where
    V: VariableSelection<DoubleLiteral>,
    P: Propagator<DoubleLiteral>,
    R: Restarter,
{
    type Literal = DoubleLiteral;
    type Assignment = VecAssignment;
    type VariableSelector = V;
    type Propagator = P;
    type Restarter = R;
}

/// CDCL defaults: heap-backed VSIDS, watched literals, Luby restarts.
pub type DefaultConfig = Configured<VsidsHeap, WatchedLiterals, Luby<100>>;

/// DPLL defaults: most-frequent literal, full-scan propagation, no restarts.
pub type DpllConfig = Configured<MostFrequent, UnitSearch, Never>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SolutionStats {
    pub decisions: usize,
    pub propagations: usize,
    pub conflicts: usize,
    pub learnt_clauses: usize,
    pub restarts: usize,
    /// Non-tautological resolvents produced by DP.
    pub resolvents: usize,
}

pub trait Solver<C: SolverConfig = DefaultConfig> {
    fn new(cnf: Cnf<C::Literal>) -> Self;

    /// Runs the search to completion. `Some` carries a total model.
    fn solve(&mut self) -> Option<Solutions>;

    fn solutions(&self) -> Solutions;

    fn stats(&self) -> SolutionStats;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ValueEnum)]
pub enum Algorithm {
    Dp,
    Dpll,
    #[default]
    Cdcl,
}

impl Algorithm {
    pub const ALL: [Self; 3] = [Self::Dp, Self::Dpll, Self::Cdcl];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dp => "dp",
            Self::Dpll => "dpll",
            Self::Cdcl => "cdcl",
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dp" => Ok(Self::Dp),
            "dpll" => Ok(Self::Dpll),
            "cdcl" => Ok(Self::Cdcl),
            _ => Err(SolverError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum VariableSelectionType {
    FixedOrder,
    MostFrequent,
    Vsids,
    VsidsHeap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PropagatorType {
    WatchedLiterals,
    UnitSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum RestarterType {
    Never,
    Fixed,
    Geometric,
    Luby,
}

/// Run-time component choice. `None` fields fall back to the algorithm's
/// defaults ([`DefaultConfig`] for CDCL, [`DpllConfig`] for DPLL). DP has no
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SolverOptions {
    pub algorithm: Algorithm,
    pub selector: Option<VariableSelectionType>,
    pub propagator: Option<PropagatorType>,
    pub restarter: Option<RestarterType>,
}

impl SolverOptions {
    #[must_use]
    pub const fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            selector: None,
            propagator: None,
            restarter: None,
        }
    }

    /// The component choice with the algorithm's defaults filled in.
    #[must_use]
    pub fn components(&self) -> (VariableSelectionType, PropagatorType, RestarterType) {
        let (selector, propagator, restarter) = match self.algorithm {
            Algorithm::Dpll => (
                VariableSelectionType::MostFrequent,
                PropagatorType::UnitSearch,
                RestarterType::Never,
            ),
            Algorithm::Dp | Algorithm::Cdcl => (
                VariableSelectionType::VsidsHeap,
                PropagatorType::WatchedLiterals,
                RestarterType::Luby,
            ),
        };

        (
            self.selector.unwrap_or(selector),
            self.propagator.unwrap_or(propagator),
            self.restarter.unwrap_or(restarter),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SolveResult {
    pub satisfiable: bool,
    /// A total model when `satisfiable`.
    pub assignment: Option<Solutions>,
    pub stats: SolutionStats,
}

fn run<C: SolverConfig, S: Solver<C>>(cnf: Cnf<C::Literal>) -> SolveResult {
    let mut solver = S::new(cnf);
    let assignment = solver.solve();
    SolveResult {
        satisfiable: assignment.is_some(),
        assignment,
        stats: solver.stats(),
    }
}

/// Solves a copy of `cnf` with the algorithm's default configuration.
#[must_use]
pub fn solve(cnf: &Cnf, algorithm: Algorithm) -> SolveResult {
    match algorithm {
        Algorithm::Dp => run::<DefaultConfig, Dp>(cnf.clone()),
        Algorithm::Dpll => run::<DpllConfig, Dpll<DpllConfig>>(cnf.clone()),
        Algorithm::Cdcl => run::<DefaultConfig, Cdcl<DefaultConfig>>(cnf.clone()),
    }
}

/// Like [`solve`], selecting the algorithm by name.
///
/// # Errors
///
/// `UnknownAlgorithm` if `name` is not one of `dp`, `dpll`, `cdcl`. No solving
/// work is done in that case.
pub fn solve_named(cnf: &Cnf, name: &str) -> Result<SolveResult, SolverError> {
    let algorithm = name.parse()?;
    Ok(solve(cnf, algorithm))
}

fn run_configured<V, P, R>(cnf: &Cnf, algorithm: Algorithm) -> SolveResult
where
    V: VariableSelection<DoubleLiteral>,
    P: Propagator<DoubleLiteral>,
    R: Restarter,
{
    match algorithm {
        Algorithm::Dp => run::<DefaultConfig, Dp>(cnf.clone()),
        Algorithm::Dpll => {
            run::<Configured<V, P, R>, Dpll<Configured<V, P, R>>>(cnf.clone())
        }
        Algorithm::Cdcl => {
            run::<Configured<V, P, R>, Cdcl<Configured<V, P, R>>>(cnf.clone())
        }
    }
}

fn with_restarter<V, P>(cnf: &Cnf, algorithm: Algorithm, restarter: RestarterType) -> SolveResult
where
    V: VariableSelection<DoubleLiteral>,
    P: Propagator<DoubleLiteral>,
{
    match restarter {
        RestarterType::Never => run_configured::<V, P, Never>(cnf, algorithm),
        RestarterType::Fixed => run_configured::<V, P, Fixed<100>>(cnf, algorithm),
        RestarterType::Geometric => run_configured::<V, P, Geometric<2>>(cnf, algorithm),
        RestarterType::Luby => run_configured::<V, P, Luby<100>>(cnf, algorithm),
    }
}

fn with_propagator<V>(
    cnf: &Cnf,
    algorithm: Algorithm,
    propagator: PropagatorType,
    restarter: RestarterType,
) -> SolveResult
where
    V: VariableSelection<DoubleLiteral>,
{
    match propagator {
        PropagatorType::WatchedLiterals => {
            with_restarter::<V, WatchedLiterals>(cnf, algorithm, restarter)
        }
        PropagatorType::UnitSearch => with_restarter::<V, UnitSearch>(cnf, algorithm, restarter),
    }
}

/// Solves a copy of `cnf` with the components named in `options`.
#[must_use]
pub fn solve_with_options(cnf: &Cnf, options: &SolverOptions) -> SolveResult {
    let algorithm = options.algorithm;
    let (selector, propagator, restarter) = options.components();

    match selector {
        VariableSelectionType::FixedOrder => {
            with_propagator::<FixedOrder>(cnf, algorithm, propagator, restarter)
        }
        VariableSelectionType::MostFrequent => {
            with_propagator::<MostFrequent>(cnf, algorithm, propagator, restarter)
        }
        VariableSelectionType::Vsids => {
            with_propagator::<Vsids>(cnf, algorithm, propagator, restarter)
        }
        VariableSelectionType::VsidsHeap => {
            with_propagator::<VsidsHeap>(cnf, algorithm, propagator, restarter)
        }
    }
}
