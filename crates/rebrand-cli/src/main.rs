//! rebrand CLI - rule-based codebase rebranding
//!
//! Rewrites identifiers, import paths and strings across a source tree using
//! the built-in rule catalog. Categories run in the order given with `--type`.

use anyhow::{bail, Result};
use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rebrand_cli::config::Config;
use rebrand_cli::output::{write_json_report, Reporter};
use rebrand_cli::process::{self, CancelToken, RunOptions};
use rebrand_rules::Catalog;

#[derive(Parser)]
#[command(name = "rebrand")]
#[command(version)]
#[command(about = "Rule-based codebase rebranding tool")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Rule categories to apply, in order (comma-separated, or `all`)
    #[arg(long = "type", short = 't', value_name = "CATEGORY", value_delimiter = ',')]
    types: Vec<String>,

    /// Show what would change without writing any file
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// File extensions to process (comma-separated, e.g. .ts,.tsx)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Write a JSON report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Print every change and enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Print a unified diff for each changed file
    #[arg(long)]
    diff: bool,

    /// Worker threads (default: one per core)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// Path to config file (default: auto-detect .rebrand.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// List rule categories and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let catalog = Catalog::builtin()?;

    if cli.list_rules {
        println!("{}", "Rule categories (in `all` order):".bold());
        for (category, description, count) in catalog.list() {
            println!(
                "  {:<10} {} ({} rules)",
                category.name().green(),
                description,
                count
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if cli.verbose {
            println!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if cli.verbose {
                    println!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    let types = config.effective_types(&cli.types);
    let rules = catalog.rules_for_names(&types)?;
    if rules.is_empty() {
        bail!("No rules selected");
    }

    let extensions = config.effective_extensions(&cli.extensions);
    if extensions.is_empty() {
        bail!("No file extensions selected");
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
        jobs: config.effective_jobs(cli.jobs),
        cancel: CancelToken::new(),
        exclude: config.paths.exclude.clone(),
    };

    if cli.verbose {
        println!(
            "{}: {}",
            "Mode".bold(),
            if options.dry_run { "dry run" } else { "write" }
        );
        println!("{}: {}", "Categories".bold(), rules.categories().join(", "));
        println!("{}: {}", "Extensions".bold(), extensions.join(", "));
        println!();
    }

    let report = process::run(&cli.paths, &extensions, &rules, &options)?;

    for path in &report.missing {
        eprintln!(
            "{}: Path does not exist: {}",
            "Warning".yellow(),
            path.display()
        );
    }

    let reporter = Reporter::new(cli.verbose, cli.diff);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    reporter.render_files(&report, &mut out)?;
    reporter.render_errors(&report, &mut io::stderr())?;
    reporter.render_summary(&report, &mut out)?;

    if let Some(report_path) = &cli.report {
        write_json_report(&report, report_path)?;
        writeln!(out, "{}: {}", "Report written".bold(), report_path.display())?;
    }

    Ok(ExitCode::SUCCESS)
}
