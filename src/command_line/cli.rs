#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use satcompare::benchmark::{BenchRow, Suite, SuiteKind, latex_table, run_suite};
use satcompare::generators::{DEFAULT_K, Instance, pigeonhole, random_ksat};
use satcompare::sat::cnf::Cnf;
use satcompare::sat::dimacs::{DimacsError, cnf_files, parse_dimacs, parse_file};
use satcompare::sat::error::SolverError;
use satcompare::sat::solver::{
    Algorithm, PropagatorType, RestarterType, SolutionStats, Solutions, SolverOptions,
    VariableSelectionType, solve_with_options,
};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::{debug, info};

/// Defines the command-line interface of the satcompare binary.
#[derive(Parser, Debug)]
#[command(
    name = "satcompare",
    version,
    about = "Davis-Putnam, DPLL and CDCL side by side"
)]
pub(crate) struct Cli {
    /// A DIMACS .cnf file to solve when no subcommand is given.
    pub path: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula given as DIMACS text (e.g. "1 -2 0\n2 3 0").
    Text {
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf file below a directory.
    Dir {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Time every algorithm over a generated instance family.
    Bench(BenchArgs),

    /// Write a generated instance as DIMACS.
    Generate {
        #[command(subcommand)]
        family: Family,

        /// Output file; stdout when absent.
        #[arg(short, long, global = true)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub(crate) enum Family {
    /// n + 1 pigeons into n holes.
    Pigeonhole {
        #[arg(short, long)]
        n: usize,
    },
    /// Uniform random k-SAT.
    Random {
        #[arg(long)]
        vars: usize,
        #[arg(long)]
        clauses: usize,
        #[arg(short, long, default_value_t = DEFAULT_K)]
        k: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct BenchArgs {
    #[arg(long, value_enum, default_value_t = SuiteKind::Pigeonhole)]
    suite: SuiteKind,

    #[arg(long, default_value_t = 2)]
    min: usize,

    #[arg(long, default_value_t = 6)]
    max: usize,

    /// Per-run deadline in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Algorithms to run; all three when absent.
    #[arg(long, value_enum, value_delimiter = ',')]
    algorithms: Vec<Algorithm>,

    /// Write the rows as CSV to this file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the size × algorithm timing table as LaTeX to this file.
    #[arg(long)]
    latex: Option<PathBuf>,
}

/// Options shared by every solving subcommand.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Check a found model against the original clauses.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the model when the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    #[arg(short, long, value_enum, default_value_t = Algorithm::Cdcl)]
    solver: Algorithm,

    /// Decision heuristic; the algorithm's default when absent.
    #[arg(long, value_enum)]
    variable_selection: Option<VariableSelectionType>,

    #[arg(long, value_enum)]
    propagator: Option<PropagatorType>,

    #[arg(long, value_enum)]
    restart_strategy: Option<RestarterType>,
}

impl CommonOptions {
    const fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            algorithm: self.solver,
            selector: self.variable_selection,
            propagator: self.propagator,
            restarter: self.restart_strategy,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Dimacs(#[from] DimacsError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("{path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("model failed verification")]
    VerificationFailed,

    #[error("no input given; see --help")]
    NoInput,
}

/// Dispatches the parsed command line.
pub(crate) fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_file(&path, &common),
        Some(Commands::Text { input, common }) => {
            let time = Instant::now();
            let cnf = parse_dimacs(Cursor::new(input))?;
            solve_and_report(&cnf, &common, None, time.elapsed())
        }
        Some(Commands::Dir { path, common }) => solve_dir(&path, &common),
        Some(Commands::Bench(args)) => bench(&args),
        Some(Commands::Generate { family, output }) => generate(family, output.as_deref()),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "satcompare", &mut io::stdout());
            Ok(())
        }
        None => match cli.path {
            Some(path) => solve_file(&path, &cli.common),
            None => Err(CliError::NoInput),
        },
    }
}

fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), CliError> {
    let time = Instant::now();
    let cnf = parse_file(path)?;
    solve_and_report(&cnf, common, Some(path), time.elapsed())
}

pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), CliError> {
    if !path.is_dir() {
        return Err(CliError::NotADirectory(path.to_path_buf()));
    }

    for file in cnf_files(path)? {
        solve_file(&file, common)?;
    }

    Ok(())
}

/// Allocated and resident memory in MiB, when jemalloc can report them.
fn memory_mib() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::read().ok()?;
    let resident = stats::resident::read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<(), CliError> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    let options = common.solver_options();
    debug!(?options, vars = cnf.num_vars, clauses = cnf.len(), "solving");

    let time = Instant::now();
    let result = solve_with_options(cnf, &options);
    let elapsed = time.elapsed();

    if common.verify {
        verify_solution(cnf, result.assignment.as_ref())?;
    }

    if common.stats {
        print_stats(parse_time, elapsed, cnf, &result.stats, memory_mib());
    }

    if let Some(model) = result.assignment.as_ref().filter(|_| common.print_solution) {
        println!("v {model} 0");
    }

    println!(
        "\n{}",
        if result.satisfiable {
            "SATISFIABLE"
        } else {
            "UNSATISFIABLE"
        }
    );
    Ok(())
}

pub(crate) fn verify_solution(cnf: &Cnf, sol: Option<&Solutions>) -> Result<(), CliError> {
    let Some(model) = sol else {
        return Ok(());
    };

    let ok = cnf.verify(model);
    println!("Verified: {ok}");
    if ok {
        Ok(())
    } else {
        Err(CliError::VerificationFailed)
    }
}

pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    memory: Option<(f64, f64)>,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses (original)", cnf.num_original_clauses());

    println!("========================[ Search Statistics ]========================");
    stat_line("Learnt clauses", s.learnt_clauses);
    stat_line("Resolvents", s.resolvents);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Restarts", s.restarts, elapsed_secs);
    if let Some((allocated, resident)) = memory {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn bench(args: &BenchArgs) -> Result<(), CliError> {
    let suite = Suite {
        seed: args.seed,
        timeout: Duration::from_secs(args.timeout),
        algorithms: if args.algorithms.is_empty() {
            Algorithm::ALL.to_vec()
        } else {
            args.algorithms.clone()
        },
        ..Suite::new(args.suite, args.min, args.max)
    };

    info!(?suite, "running benchmark suite");
    let rows = run_suite(&suite)?;

    for row in &rows {
        println!(
            "{} | {} | size {}: {} in {:.6}s",
            row.instance,
            row.algorithm.name().to_uppercase(),
            row.size.unwrap_or_default(),
            row.status,
            row.elapsed.as_secs_f64()
        );
    }

    if let Some(path) = &args.csv {
        let mut csv = String::from(BenchRow::csv_header());
        csv.push('\n');
        for row in &rows {
            csv.push_str(&row.to_csv_line());
            csv.push('\n');
        }
        write_file(path, &csv)?;
        println!("CSV written to: {}", path.display());
    }

    if let Some(path) = &args.latex {
        write_file(path, &latex_table(&rows))?;
        println!("LaTeX table written to: {}", path.display());
    }

    Ok(())
}

fn generate(family: Family, output: Option<&Path>) -> Result<(), CliError> {
    let instance: Instance = match family {
        Family::Pigeonhole { n } => pigeonhole(n)?,
        Family::Random {
            vars,
            clauses,
            k,
            seed,
        } => random_ksat(vars, clauses, k, seed)?,
    };

    let dimacs = instance.to_dimacs();
    match output {
        Some(path) => {
            write_file(path, &dimacs)?;
            println!("{} written to: {}", instance.name, path.display());
        }
        None => print!("{dimacs}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_solver_options() {
        let cli = Cli::try_parse_from([
            "satcompare",
            "file",
            "--path",
            "x.cnf",
            "--solver",
            "dpll",
            "--variable-selection",
            "fixed-order",
            "--verify",
            "false",
        ])
        .unwrap();

        let Some(Commands::File { common, .. }) = cli.command else {
            panic!("expected the file subcommand");
        };
        assert!(!common.verify);
        assert!(common.stats);
        let options = common.solver_options();
        assert_eq!(options.algorithm, Algorithm::Dpll);
        assert_eq!(options.selector, Some(VariableSelectionType::FixedOrder));
        assert_eq!(options.propagator, None);
    }

    #[test]
    fn test_parses_bench() {
        let cli = Cli::try_parse_from([
            "satcompare",
            "bench",
            "--suite",
            "3sat",
            "--algorithms",
            "dpll,cdcl",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Some(Commands::Bench(args)) = cli.command else {
            panic!("expected the bench subcommand");
        };
        assert_eq!(args.suite, SuiteKind::Random3Sat);
        assert_eq!(args.algorithms, vec![Algorithm::Dpll, Algorithm::Cdcl]);
        assert_eq!((args.min, args.max), (2, 6));
    }

    #[test]
    fn test_unknown_solver_is_rejected() {
        assert!(Cli::try_parse_from(["satcompare", "x.cnf", "--solver", "walksat"]).is_err());
    }

    #[test]
    fn test_verification_failure() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1]]).unwrap();
        assert!(verify_solution(&cnf, Some(&Solutions::new(vec![-1, 2]))).is_ok());
        assert!(matches!(
            verify_solution(&cnf, Some(&Solutions::new(vec![1, 2]))),
            Err(CliError::VerificationFailed)
        ));
        assert!(verify_solution(&cnf, None).is_ok());
    }
}
