use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use event_vec_migrate::config::{Overrides, load_config};
use event_vec_migrate::process::{BatchSummary, ProcessOutcome, Progress, WriteMode, run_batch};
use event_vec_migrate::rules::RuleSet;

#[derive(Parser)]
#[command(name = "migrate-events")]
#[command(
	author,
	version,
	about = "Migrate chip state sources from Option<StateEvent> to Option<Vec<StateEvent>>"
)]
struct Cli {
	/// Directory holding the state sources (default: crates/soundlog/src/chip/state)
	#[arg(value_name = "DIRECTORY")]
	directory: Option<PathBuf>,

	/// Read settings from this TOML file instead of ./.event-migrate.toml
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// File name to skip; repeat to skip several (replaces the configured list)
	#[arg(long, value_name = "NAME")]
	exclude: Vec<String>,

	/// File extension to process, without the dot
	#[arg(long, value_name = "EXT")]
	extension: Option<String>,

	/// Report files that would change without writing them; exits 1 if any would
	#[arg(long)]
	check: bool,

	/// Only print the summary line
	#[arg(short, long)]
	quiet: bool,

	/// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn setup_logging(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	setup_logging(cli.verbose);

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let overrides = Overrides {
		directory: cli.directory,
		extension: cli.extension,
		exclude: (!cli.exclude.is_empty()).then_some(cli.exclude),
	};
	let config =
		load_config(cli.config.as_deref(), &cwd, overrides).context("Failed to load configuration")?;

	let rules = RuleSet::standard().context("Failed to build rewrite rules")?;
	let mode = if cli.check {
		WriteMode::Check
	} else {
		WriteMode::Write
	};

	let quiet = cli.quiet;
	let summary = run_batch(&config, &rules, mode, |event| {
		if !quiet {
			print_progress(&event);
		}
	})
	.with_context(|| format!("Migration failed in {}", config.directory.display()))?;

	print_summary(&summary, mode);

	if mode == WriteMode::Check && summary.fixed > 0 {
		return Ok(ExitCode::FAILURE);
	}
	Ok(ExitCode::SUCCESS)
}

fn print_progress(event: &Progress<'_>) {
	match event {
		Progress::Found(count) => println!("Found {} files to process\n", count),
		Progress::Processing(path) => println!("Processing {}...", path.display()),
		Progress::Done(report) => match report.outcome {
			ProcessOutcome::Fixed => println!("  ✓ Fixed {}", report.path.display()),
			ProcessOutcome::WouldFix => println!("  ! Would fix {}", report.path.display()),
			ProcessOutcome::Unchanged => {
				println!("  - No changes needed for {}", report.path.display())
			}
		},
	}
}

fn print_summary(summary: &BatchSummary, mode: WriteMode) {
	println!();
	match mode {
		WriteMode::Write => println!(
			"✓ Processed {} files, fixed {} files",
			summary.examined, summary.fixed
		),
		WriteMode::Check => println!(
			"Checked {} files, {} files need fixing",
			summary.examined, summary.fixed
		),
	}

	let unmatched = summary.unmatched();
	if unmatched > 0 {
		println!(
			"Warning: {} construction(s) had no closing line and were left unchanged",
			unmatched
		);
	}
}
