#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Benchmark instance generators.
//!
//! Generators produce plain DIMACS-style clause lists wrapped in an
//! [`Instance`]; they never build solver state themselves.

use crate::sat::cnf::Cnf;
use crate::sat::error::SolverError;
use itertools::Itertools;
use std::fmt::Write;

mod pigeonhole;
mod random_ksat;

pub use pigeonhole::pigeonhole;
pub use random_ksat::{DEFAULT_K, random_ksat};

/// A generated formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance {
    /// Identifier used in benchmark output, e.g. `php-3`.
    pub name: String,
    /// Declared variable count; variables are `1..=num_vars`.
    pub num_vars: usize,
    /// Clauses as signed DIMACS literals.
    pub clauses: Vec<Vec<i32>>,
}

impl Instance {
    /// Number of clauses.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Builds the solver-facing formula.
    ///
    /// # Errors
    ///
    /// `MalformedInstance` if a clause is empty or mentions variable 0.
    pub fn to_cnf(&self) -> Result<Cnf, SolverError> {
        Cnf::with_num_vars(self.clauses.clone(), self.num_vars)
    }

    /// Renders the instance as a DIMACS file, with the name as a comment.
    #[must_use]
    pub fn to_dimacs(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "c {}", self.name);
        let _ = writeln!(out, "p cnf {} {}", self.num_vars, self.clauses.len());
        for clause in &self.clauses {
            let _ = writeln!(out, "{} 0", clause.iter().join(" "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dimacs::parse_dimacs;
    use std::io::Cursor;

    #[test]
    fn test_dimacs_output_parses_back() {
        let instance = pigeonhole(2).unwrap();
        let text = instance.to_dimacs();
        assert!(text.starts_with("c php-2\np cnf 6 9\n"));

        let parsed: Cnf = parse_dimacs(Cursor::new(text)).unwrap();
        assert_eq!(parsed, instance.to_cnf().unwrap());
    }
}
