#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! # satcompare
//!
//! Command-line front end for the three SAT engines of the `satcompare`
//! library: Davis-Putnam resolution, DPLL and CDCL.
//!
//! ```sh
//! # Solve a DIMACS file with CDCL
//! satcompare problem.cnf
//!
//! # Solve with DPLL on watched literals, printing the model
//! satcompare file --path problem.cnf --solver dpll --propagator watched-literals -p
//!
//! # Solve every .cnf file below a directory with DP
//! satcompare dir --path instances/ --solver dp
//!
//! # Solve inline DIMACS text
//! satcompare text --input "1 2 0
//! -1 0"
//!
//! # Time all engines on PHP(2)..PHP(6), writing CSV and a LaTeX table
//! satcompare bench --suite pigeonhole --min 2 --max 6 --csv out.csv --latex out.tex
//!
//! # Write random 3-SAT with 30 variables and 128 clauses as DIMACS
//! satcompare generate random --vars 30 --clauses 128 --seed 7 -o r.cnf
//! ```
//!
//! Logs go to stderr. `-v` raises the level to info, `-vv` to debug and
//! `-vvv` to trace; `RUST_LOG` takes precedence when set.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod command_line {
    pub(crate) mod cli;
}

use command_line::cli::{Cli, run};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
