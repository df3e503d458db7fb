#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Reading and locating DIMACS CNF files.
//!
//! The accepted format:
//! - lines starting with `c` are comments;
//! - `p cnf <vars> <clauses>` declares the variable count (the clause count
//!   is informational);
//! - clauses are whitespace separated signed integers terminated by `0`, and
//!   may span several lines;
//! - a line starting with `%` ends the input.
//!
//! Writing DIMACS is the `Display` impl of [`Cnf`].

use crate::sat::cnf::Cnf;
use crate::sat::error::SolverError;
use crate::sat::literal::Literal;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read DIMACS input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid token `{token}`")]
    InvalidToken { line: usize, token: String },

    #[error("line {line}: malformed problem line")]
    InvalidHeader { line: usize },

    #[error(transparent)]
    Malformed(#[from] SolverError),
}

fn parse_header(line_no: usize, rest: &str) -> Result<usize, DimacsError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next().map(str::parse::<usize>)) {
        (Some("cnf"), Some(Ok(vars))) => Ok(vars),
        _ => Err(DimacsError::InvalidHeader { line: line_no }),
    }
}

/// Parses a DIMACS formula.
///
/// # Errors
///
/// I/O failures, non-integer tokens, a malformed `p` line, and clauses that
/// are empty or mention variable 0 are all reported.
pub fn parse_dimacs<R: BufRead, L: Literal>(reader: R) -> Result<Cnf<L>, DimacsError> {
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();
    let mut declared_vars = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let trimmed = line.trim_start();

        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.starts_with('c') {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('p') {
            declared_vars = parse_header(line_no, rest)?;
            continue;
        }

        for token in trimmed.split_whitespace() {
            let value = token
                .parse::<i32>()
                .map_err(|_| DimacsError::InvalidToken {
                    line: line_no,
                    token: token.to_string(),
                })?;

            if value == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                current.push(value);
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }

    Ok(Cnf::with_num_vars(clauses, declared_vars)?)
}

/// Parses the DIMACS file at `path`.
///
/// # Errors
///
/// See [`parse_dimacs`]; opening the file can fail as well.
pub fn parse_file<L: Literal, P: AsRef<Path>>(path: P) -> Result<Cnf<L>, DimacsError> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}

/// Every `.cnf` file below `dir`, sorted by path.
///
/// # Errors
///
/// Fails if the directory tree cannot be walked.
pub fn cnf_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, DimacsError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "cnf") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
