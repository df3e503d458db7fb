#![deny(missing_docs)]
//! Three complete SAT procedures, Davis-Putnam, DPLL and CDCL, behind one
//! entry point, together with the instance generators and timing harness used
//! to compare them.

/// The `sat` module holds the formula model, the propagation and decision
/// machinery shared by the engines, and the engines themselves.
#[allow(missing_docs)]
pub mod sat;

/// The `generators` module builds pigeonhole and random k-SAT instances.
pub mod generators;

/// The `benchmark` module times solver runs and renders the results as CSV
/// rows or a LaTeX table.
pub mod benchmark;
