//! Error types surfaced by the core.
//!
//! Resource exhaustion (time, memory, stack depth) is deliberately absent: the
//! engines run to completion and limits are imposed by whoever calls them.

use thiserror::Error;

/// Errors reported before any solving work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// A clause referenced variable 0, or was empty without being built as an
    /// explicit contradiction witness.
    #[error("malformed instance: clause {clause} {reason}")]
    MalformedInstance {
        /// Position of the offending clause in the input.
        clause: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The algorithm selector named none of `dp`, `dpll`, `cdcl`.
    #[error("unknown algorithm `{0}` (expected one of: dp, dpll, cdcl)")]
    UnknownAlgorithm(String),

    /// An instance generator was asked for something it cannot build.
    #[error("invalid generator parameters: {0}")]
    InvalidGenerator(String),
}

impl SolverError {
    pub(crate) const fn zero_variable(clause: usize) -> Self {
        Self::MalformedInstance {
            clause,
            reason: "references variable 0",
        }
    }

    pub(crate) const fn variable_out_of_range(clause: usize) -> Self {
        Self::MalformedInstance {
            clause,
            reason: "references a variable above i32::MAX",
        }
    }

    pub(crate) const fn empty_clause(clause: usize) -> Self {
        Self::MalformedInstance {
            clause,
            reason: "is empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SolverError::zero_variable(3).to_string(),
            "malformed instance: clause 3 references variable 0"
        );
        assert_eq!(
            SolverError::UnknownAlgorithm("walksat".to_string()).to_string(),
            "unknown algorithm `walksat` (expected one of: dp, dpll, cdcl)"
        );
    }
}
