#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Timing harness for comparing the engines.
//!
//! Engines never limit themselves, so every run happens on a worker thread
//! that the harness waits on with a deadline. A run that misses its deadline
//! is recorded as [`Status::Timeout`]; the worker is left to finish in the
//! background since the engines have no cancellation point.
//!
//! Within a suite, an algorithm that timed out is not started again on larger
//! sizes; those rows are recorded as timeouts directly. Workers still running
//! from earlier timeouts are counted and logged before each measurement.

use crate::generators::{DEFAULT_K, Instance, pigeonhole, random_ksat};
use crate::sat::cnf::Cnf;
use crate::sat::error::SolverError;
use crate::sat::solver::{Algorithm, SolveResult, solve};
use clap::ValueEnum;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Write};
use std::sync::mpsc;
use std::collections::BTreeSet;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one timed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The engine found a model.
    Sat,
    /// The engine proved unsatisfiability.
    Unsat,
    /// The engine did not answer before the deadline.
    Timeout,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sat => "SAT",
            Self::Unsat => "UNSAT",
            Self::Timeout => "TIMEOUT",
        })
    }
}

/// One row of benchmark output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BenchRow {
    /// Name of the instance.
    pub instance: String,
    /// Size parameter the instance was generated from, if any.
    pub size: Option<usize>,
    /// Engine that ran.
    pub algorithm: Algorithm,
    /// Variables in the instance.
    pub num_vars: usize,
    /// Clauses in the instance.
    pub num_clauses: usize,
    /// Wall-clock time; the deadline itself for timeouts.
    pub elapsed: Duration,
    /// Decisions made, 0 for timeouts.
    pub decisions: usize,
    /// Conflicts met, 0 for timeouts.
    pub conflicts: usize,
    /// How the run ended.
    pub status: Status,
}

impl BenchRow {
    /// Column names matching [`BenchRow::to_csv_line`].
    #[must_use]
    pub const fn csv_header() -> &'static str {
        "instance,algorithm,vars,clauses,seconds,decisions,conflicts,status"
    }

    /// The row as comma separated values, time in seconds.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{:.6},{},{},{}",
            self.instance,
            self.algorithm,
            self.num_vars,
            self.num_clauses,
            self.elapsed.as_secs_f64(),
            self.decisions,
            self.conflicts,
            self.status
        )
    }
}

/// Solves a copy of `cnf` with `algorithm` on a worker thread, waiting at most `timeout`.
#[must_use]
pub fn run_with_timeout(
    name: &str,
    cnf: &Cnf,
    algorithm: Algorithm,
    timeout: Duration,
) -> BenchRow {
    run_timed(name, cnf, algorithm, timeout).0
}

fn timeout_row(name: &str, cnf: &Cnf, algorithm: Algorithm, timeout: Duration) -> BenchRow {
    BenchRow {
        instance: name.to_string(),
        size: None,
        algorithm,
        num_vars: cnf.num_vars,
        num_clauses: cnf.num_original_clauses(),
        elapsed: timeout,
        decisions: 0,
        conflicts: 0,
        status: Status::Timeout,
    }
}

/// Like [`run_with_timeout`], also handing back the worker if it is still running.
fn run_timed(
    name: &str,
    cnf: &Cnf,
    algorithm: Algorithm,
    timeout: Duration,
) -> (BenchRow, Option<JoinHandle<()>>) {
    let (tx, rx) = mpsc::channel::<(SolveResult, Duration)>();
    let owned = cnf.clone();

    let worker = thread::spawn(move || {
        let start = Instant::now();
        let result = solve(&owned, algorithm);
        // The receiver is gone if the run already timed out.
        let _ = tx.send((result, start.elapsed()));
    });

    let mut row = timeout_row(name, cnf, algorithm, timeout);

    match rx.recv_timeout(timeout) {
        Ok((result, elapsed)) => {
            row.elapsed = elapsed;
            row.decisions = result.stats.decisions;
            row.conflicts = result.stats.conflicts;
            row.status = if result.satisfiable {
                Status::Sat
            } else {
                Status::Unsat
            };
            debug!(instance = name, %algorithm, ?elapsed, status = %row.status, "run finished");
            (row, None)
        }
        Err(_) => {
            warn!(instance = name, %algorithm, ?timeout, "run timed out");
            (row, Some(worker))
        }
    }
}

/// Instance family of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SuiteKind {
    /// PHP(n) for each size n.
    Pigeonhole,
    /// Random 3-SAT with `3n` variables and `5n` clauses for each size n.
    #[value(name = "3sat")]
    Random3Sat,
}

/// A family of instances over a size range, each run with every algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suite {
    /// Instance family.
    pub kind: SuiteKind,
    /// Smallest size, inclusive.
    pub min: usize,
    /// Largest size, inclusive.
    pub max: usize,
    /// Seed for random families; size n uses `seed + n`.
    pub seed: u64,
    /// Per-run deadline.
    pub timeout: Duration,
    /// Engines to run, in order.
    pub algorithms: Vec<Algorithm>,
}

impl Suite {
    /// A suite over `min..=max` running every algorithm with a 10 second deadline.
    #[must_use]
    pub fn new(kind: SuiteKind, min: usize, max: usize) -> Self {
        Self {
            kind,
            min,
            max,
            seed: 0,
            timeout: Duration::from_secs(10),
            algorithms: Algorithm::ALL.to_vec(),
        }
    }

    /// The instance of size `n`.
    ///
    /// # Errors
    ///
    /// `InvalidGenerator` if the family cannot be built at this size.
    pub fn instance(&self, n: usize) -> Result<Instance, SolverError> {
        match self.kind {
            SuiteKind::Pigeonhole => pigeonhole(n),
            SuiteKind::Random3Sat => random_ksat(3 * n, 5 * n, DEFAULT_K, self.seed + n as u64),
        }
    }
}

/// Runs every instance of `suite` with each of its algorithms. Once an
/// algorithm times out, its rows for larger sizes are recorded as timeouts
/// without running it.
///
/// # Errors
///
/// Fails before running anything if an instance of the range cannot be generated.
pub fn run_suite(suite: &Suite) -> Result<Vec<BenchRow>, SolverError> {
    let instances: Vec<(usize, Instance)> = (suite.min..=suite.max)
        .map(|n| suite.instance(n).map(|i| (n, i)))
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::with_capacity(instances.len() * suite.algorithms.len());
    let mut timed_out: BTreeSet<Algorithm> = BTreeSet::new();
    let mut stragglers: Vec<JoinHandle<()>> = Vec::new();

    for (n, instance) in instances {
        let cnf = instance.to_cnf()?;
        info!(
            instance = %instance.name,
            vars = instance.num_vars,
            clauses = instance.num_clauses(),
            "benchmarking"
        );

        for &algorithm in &suite.algorithms {
            let mut row = if timed_out.contains(&algorithm) {
                debug!(instance = %instance.name, %algorithm, "skipped after an earlier timeout");
                timeout_row(&instance.name, &cnf, algorithm, suite.timeout)
            } else {
                stragglers.retain(|w| !w.is_finished());
                if !stragglers.is_empty() {
                    warn!(
                        outstanding = stragglers.len(),
                        "timed-out workers still running"
                    );
                }

                let (row, worker) = run_timed(&instance.name, &cnf, algorithm, suite.timeout);
                if let Some(worker) = worker {
                    timed_out.insert(algorithm);
                    stragglers.push(worker);
                }
                row
            };
            row.size = Some(n);
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Pivots elapsed times by size and algorithm into a LaTeX table. Rows
/// without a size are left out; missing cells read `N/A`.
#[must_use]
pub fn latex_table(rows: &[BenchRow]) -> String {
    let mut by_size: BTreeMap<usize, Vec<&BenchRow>> = BTreeMap::new();
    for row in rows {
        if let Some(size) = row.size {
            by_size.entry(size).or_default().push(row);
        }
    }

    let mut out = String::new();
    let cols = "|c".repeat(Algorithm::ALL.len() + 1);
    let _ = writeln!(out, "\\begin{{table}}[H]\n\\centering");
    let _ = writeln!(out, "\\begin{{tabular}}{{{cols}|}}\n\\hline");
    let header = Algorithm::ALL
        .iter()
        .map(|a| format!("{} Time (s)", a.name().to_uppercase()))
        .join(" & ");
    let _ = writeln!(out, "Problem Size & {header} \\\\\n\\hline");

    for (size, cells) in &by_size {
        let times = Algorithm::ALL
            .iter()
            .map(|&a| {
                cells
                    .iter()
                    .find(|r| r.algorithm == a)
                    .map_or_else(
                        || "N/A".to_string(),
                        |r| match r.status {
                            Status::Timeout => "timeout".to_string(),
                            Status::Sat | Status::Unsat => {
                                format!("{:.6}", r.elapsed.as_secs_f64())
                            }
                        },
                    )
            })
            .join(" & ");
        let _ = writeln!(out, "{size} & {times} \\\\");
    }

    let _ = writeln!(out, "\\hline\n\\end{{tabular}}");
    let _ = writeln!(out, "\\caption{{Benchmark results for SAT solvers}}");
    let _ = writeln!(out, "\\label{{tab:sat_benchmarks}}\n\\end{{table}}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(size: usize, algorithm: Algorithm, millis: u64, status: Status) -> BenchRow {
        BenchRow {
            instance: format!("php-{size}"),
            size: Some(size),
            algorithm,
            num_vars: 6,
            num_clauses: 9,
            elapsed: Duration::from_millis(millis),
            decisions: 4,
            conflicts: 2,
            status,
        }
    }

    #[test]
    fn test_csv_line() {
        let r = row(2, Algorithm::Dpll, 1500, Status::Unsat);
        assert_eq!(r.to_csv_line(), "php-2,dpll,6,9,1.500000,4,2,UNSAT");
        assert_eq!(
            BenchRow::csv_header().split(',').count(),
            r.to_csv_line().split(',').count()
        );
    }

    #[test]
    fn test_run_with_timeout_finishes() {
        let cnf = pigeonhole(2).unwrap().to_cnf().unwrap();
        let r = run_with_timeout("php-2", &cnf, Algorithm::Cdcl, Duration::from_secs(30));
        assert_eq!(r.status, Status::Unsat);
        assert!(r.conflicts > 0);
        assert_eq!(r.num_vars, 6);
        assert_eq!(r.num_clauses, 9);
    }

    #[test]
    fn test_run_with_timeout_expires() {
        let cnf = pigeonhole(9).unwrap().to_cnf().unwrap();
        let r = run_with_timeout("php-9", &cnf, Algorithm::Dpll, Duration::from_millis(1));
        assert_eq!(r.status, Status::Timeout);
        assert_eq!(r.elapsed, Duration::from_millis(1));
    }

    #[test]
    fn test_run_suite() {
        let suite = Suite {
            timeout: Duration::from_secs(30),
            ..Suite::new(SuiteKind::Pigeonhole, 1, 2)
        };
        let rows = run_suite(&suite).unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.status == Status::Unsat));
        assert_eq!(rows[0].size, Some(1));
        assert_eq!(rows[5].algorithm, Algorithm::Cdcl);

        let random = Suite::new(SuiteKind::Random3Sat, 1, 2).instance(2).unwrap();
        assert_eq!(random.num_vars, 6);
        assert_eq!(random.num_clauses(), 10);
    }

    #[test]
    fn test_run_suite_stops_after_timeout() {
        let suite = Suite {
            timeout: Duration::from_millis(20),
            algorithms: vec![Algorithm::Dpll],
            ..Suite::new(SuiteKind::Pigeonhole, 1, 10)
        };
        let rows = run_suite(&suite).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].status, Status::Unsat);

        let first = rows
            .iter()
            .position(|r| r.status == Status::Timeout)
            .unwrap();
        for row in &rows[first..] {
            assert_eq!(row.status, Status::Timeout);
            assert_eq!(row.elapsed, suite.timeout);
            assert_eq!((row.decisions, row.conflicts), (0, 0));
        }
        assert_eq!(rows[9].size, Some(10));
        assert_eq!(rows[9].num_vars, 110);
    }

    #[test]
    fn test_run_suite_rejects_bad_range() {
        let suite = Suite::new(SuiteKind::Pigeonhole, 0, 1);
        assert!(matches!(
            run_suite(&suite),
            Err(SolverError::InvalidGenerator(_))
        ));
    }

    #[test]
    fn test_latex_table() {
        let rows = vec![
            row(2, Algorithm::Dp, 250, Status::Unsat),
            row(2, Algorithm::Cdcl, 1, Status::Unsat),
            row(3, Algorithm::Dp, 0, Status::Timeout),
        ];
        let table = latex_table(&rows);
        assert!(table.contains("\\begin{tabular}{|c|c|c|c|}"));
        assert!(table.contains("Problem Size & DP Time (s) & DPLL Time (s) & CDCL Time (s) \\\\"));
        assert!(table.contains("2 & 0.250000 & N/A & 0.001000 \\\\"));
        assert!(table.contains("3 & timeout & N/A & N/A \\\\"));
    }
}
