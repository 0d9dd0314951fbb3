#![warn(missing_docs)]
//! rvregress CLI Library
//!
//! Argument parsing, configuration layering, and the top-level run driver
//! for the ISA regression harness. The flow is:
//!
//! ```text
//! CLI args + rvregress.toml
//!        │
//!        ▼
//!   build_setup          validate paths, decode architecture
//!        │
//!        ▼
//!   run_harness          select families → discover → worker pool
//!        │
//!        ▼
//!   Report               per-worker tallies + aggregate summary
//! ```
//!
//! Exit behavior: configuration and validation failures surface as errors
//! from [`run`] (the binary maps them to exit code 1); a run that finds zero
//! relevant tests completes successfully with no work dispatched.

mod config;

pub use config::{FileConfig, MemoryConfig, RunnerConfig, SelectionConfig};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use regex::Regex;
use rvregress_core::{
    discover_tests, run_pool, select_families, ArchSpec, HarnessConfig, Selection, Verbosity,
};
use rvregress_report::{
    aggregate, format_summary, generate_json_report, OutputFormat, Report, ReportMeta,
};

/// Hard ceiling on the worker pool, regardless of CPU count or request.
const MAX_WORKERS: usize = 8;

/// rvregress CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "rvregress")]
#[command(
    author,
    version,
    about = "Parallel ISA regression harness for RISC-V simulators",
    long_about = "Runs a RISC-V simulation executable on all ISA tests (ELF files) relevant \
                  for the specified architecture, converting each test image to the memory \
                  geometry the simulator expects and collecting per-test logs plus a \
                  pass/fail tally."
)]
pub struct Cli {
    /// Simulation executable (Bluesim, Verilator sim, ...)
    pub sim_path: PathBuf,

    /// Architecture string for the simulator, such as RV64GC_MSU
    pub arch: String,

    /// Directory containing the ISA test ELF files
    pub tests_dir: PathBuf,

    /// Directory into which to place logs (created if absent)
    pub logs_dir: PathBuf,

    /// Program converting an ELF file to a generic memhex32 file
    pub elf_to_memhex32: PathBuf,

    /// Program converting a generic memhex32 file to the memhex file
    /// expected by the simulation executable
    pub memhex32_to_memhex: PathBuf,

    /// Simulation verbosity: v1 prints an instruction trace, v2 prints
    /// pipeline stage state
    #[arg(long)]
    pub verbosity: Option<Verbosity>,

    /// Number of parallel workers (default: half the detected CPUs; at most 8)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Only run tests whose basename additionally matches this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Output format for the final report: human, json
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose diagnostic logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs: the immutable harness configuration plus the
/// selection criteria applied during discovery.
#[derive(Debug)]
pub struct Setup {
    /// Validated harness configuration.
    pub config: HarnessConfig,
    /// Optional basename regex from `--filter` or the file config.
    pub filter: Option<Regex>,
    /// Basenames to skip.
    pub exclude: Vec<String>,
}

/// Run the rvregress CLI. This is the binary's entry point.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the rvregress CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let format: OutputFormat = cli
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let file_config = FileConfig::discover().unwrap_or_default();
    let setup = build_setup(&cli, &file_config)?;

    let report = run_harness(&setup)?;

    if format == OutputFormat::Json {
        let json = generate_json_report(&report)?;
        match &cli.output {
            Some(path) => {
                fs::write(path, json)
                    .with_context(|| format!("failed to write report to {}", path.display()))?;
                println!("Report written to: {}", path.display());
            }
            None => print!("{json}"),
        }
    }

    Ok(())
}

/// Validate the CLI arguments against the filesystem and fold in the file
/// configuration, producing the immutable run setup.
///
/// All failures here are configuration errors: the caller aborts before any
/// test work begins.
pub fn build_setup(cli: &Cli, file_config: &FileConfig) -> anyhow::Result<Setup> {
    let sim_path = existing_path(&cli.sim_path, "simulation executable")?;
    let arch = ArchSpec::parse(&cli.arch)?;
    let tests_dir = existing_path(&cli.tests_dir, "ISA-tests directory")?;
    if !tests_dir.is_dir() {
        bail!("ISA-tests path {} is not a directory", tests_dir.display());
    }
    let elf_to_memhex32 = existing_path(&cli.elf_to_memhex32, "elf_to_memhex32 program")?;
    let memhex32_to_memhex = existing_path(&cli.memhex32_to_memhex, "memhex32_to_memhex program")?;

    if !cli.logs_dir.exists() {
        println!("Creating dir: {}", cli.logs_dir.display());
        fs::create_dir_all(&cli.logs_dir)
            .with_context(|| format!("cannot create logs directory {}", cli.logs_dir.display()))?;
    }
    let logs_dir = cli
        .logs_dir
        .canonicalize()
        .with_context(|| format!("cannot resolve logs directory {}", cli.logs_dir.display()))?;

    let detected_cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let n_workers = resolve_worker_count(cli.workers.or(file_config.runner.workers), detected_cpus);

    let filter_source = cli.filter.as_ref().or(file_config.selection.filter.as_ref());
    let filter = filter_source
        .map(|f| Regex::new(f).with_context(|| format!("invalid test filter regex {f:?}")))
        .transpose()?;

    let config = HarnessConfig {
        sim_path,
        arch,
        tests_dir,
        logs_dir,
        elf_to_memhex32,
        memhex32_to_memhex,
        verbosity: cli.verbosity.unwrap_or_default(),
        n_workers,
        memory: file_config.resolve_memory(),
        work_root: PathBuf::from("."),
    };
    tracing::debug!(workers = config.n_workers, arch = %config.arch, "configuration validated");

    Ok(Setup {
        config,
        filter,
        exclude: file_config.selection.exclude.clone(),
    })
}

/// Resolve the worker count: the explicit request if any, otherwise half
/// the detected CPUs; clamped to `[1, 8]`.
pub fn resolve_worker_count(requested: Option<usize>, detected_cpus: usize) -> usize {
    requested
        .unwrap_or(detected_cpus / 2)
        .min(MAX_WORKERS)
        .max(1)
}

/// Execute a fully-validated run: family selection, discovery, the worker
/// pool, and the final summary. Returns the run report.
///
/// Finding zero relevant tests is a successful run with no work dispatched
/// (and no worker directories created).
pub fn run_harness(setup: &Setup) -> anyhow::Result<Report> {
    let config = &setup.config;

    print!("{}", parameter_summary(config));

    let families = select_families(&config.arch);
    println!("Testing the following families of ISA tests");
    for family in &families {
        println!("    {family}");
    }

    let selection = Selection {
        families: &families,
        filter: setup.filter.as_ref(),
        exclude: &setup.exclude,
    };
    let candidates = discover_tests(&config.tests_dir, &selection)?;

    if candidates.is_empty() {
        println!(
            "No relevant isa tests found under {}; quitting",
            config.tests_dir.display()
        );
        return Ok(make_report(config, families, 0, Vec::new()));
    }

    println!("{} relevant isa tests found", candidates.len());
    println!("Using {} worker processes", config.n_workers);

    let tallies = run_pool(config, &candidates);
    let report = make_report(config, families, candidates.len(), tallies);

    print!("{}", format_summary(&report));

    Ok(report)
}

fn make_report(
    config: &HarnessConfig,
    families: Vec<String>,
    total: usize,
    tallies: Vec<rvregress_core::WorkerTally>,
) -> Report {
    Report {
        meta: ReportMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            arch: config.arch.to_string(),
            families,
            workers: config.n_workers,
        },
        summary: aggregate(total, &tallies),
        worker_tallies: tallies,
    }
}

fn existing_path(path: &Path, what: &str) -> anyhow::Result<PathBuf> {
    if !path.exists() {
        bail!("{what} {} does not exist", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("cannot resolve {what} {}", path.display()))
}

/// Console block echoing the validated configuration before work begins.
fn parameter_summary(config: &HarnessConfig) -> String {
    let mut summary = String::from("Parameters:\n");
    let mut push = |key: &str, value: String| {
        summary.push_str(&format!("  {key}:\n      {value}\n"));
    };

    push("sim_path", config.sim_path.display().to_string());
    push("arch", config.arch.to_string());
    push("tests_dir", config.tests_dir.display().to_string());
    push("logs_dir", config.logs_dir.display().to_string());
    push("elf_to_memhex32", config.elf_to_memhex32.display().to_string());
    push("memhex32_to_memhex", config.memhex32_to_memhex.display().to_string());
    push("verbosity", config.verbosity.to_string());
    push("n_workers", config.n_workers.to_string());

    summary
}
