use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{LevelFilter, info, warn};

use ltr_gen_core::model::generation_input::GenerationInput;
use ltr_gen_core::model::generator::Generator;
use ltr_gen_core::model::reconstructor::Diagnostic;
use ltr_gen_core::presenter::TableDump;

/// Generate one or more names from an .ltr file
#[derive(Parser, Debug)]
#[command(name = "ltr-gen", version, about, long_about = None)]
struct Cli {
	/// LTR letter-frequency file
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Number of names to generate
	#[arg(value_name = "COUNT", default_value_t = 1)]
	count: usize,

	/// Seed of the name stream (random when omitted)
	#[arg(short, long)]
	seed: Option<u32>,

	/// Keep the singles tables as written, even when corrupted
	#[arg(long)]
	no_repair: bool,

	/// Skip count reconstruction (also disables repair)
	#[arg(long)]
	no_reconstruct: bool,

	/// Print the model tables before the names
	#[arg(long)]
	dump: bool,

	/// Include zero-probability rows in the dump
	#[arg(long, requires = "dump")]
	all: bool,

	/// Cache the processed model next to the input file
	#[arg(long)]
	cache: bool,

	/// Increase verbosity (-v, -vv)
	#[arg(short = 'v', long, global = true, action = ArgAction::Count)]
	verbose: u8,

	/// Decrease verbosity (-q, -qq)
	#[arg(short = 'q', long, global = true, action = ArgAction::Count)]
	quiet: u8,
}

impl Cli {
	/// Translates the command line into generation settings.
	fn generation_input(&self) -> GenerationInput {
		let mut input = GenerationInput::default();
		if let Some(seed) = self.seed {
			input.set_seed(seed);
		}
		input.repair = !self.no_repair;
		input.reconstruct = !self.no_reconstruct;
		input.cache = self.cache;
		input
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	let input = cli.generation_input();
	let mut generator = Generator::new(&cli.file, &input)
		.with_context(|| format!("unable to load {}", cli.file.display()))?;

	report_diagnostics(&generator);

	if cli.dump {
		print!("{}", TableDump::new(generator.model(), cli.all));
	}

	for name in generator.predict_many(cli.count).context("name generation failed")? {
		println!("{}", name);
	}

	Ok(())
}

/// Level forced by `-v`/`-q`; without either, `RUST_LOG` (or `info`) decides.
fn level_override(verbose: u8, quiet: u8) -> Option<LevelFilter> {
	match (quiet, verbose) {
		(0, 0) => None,
		(1, _) => Some(LevelFilter::Warn),
		(q, _) if q > 1 => Some(LevelFilter::Error),
		(_, 1) => Some(LevelFilter::Debug),
		_ => Some(LevelFilter::Trace),
	}
}

fn init_logging(verbose: u8, quiet: u8) {
	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
	builder.format_timestamp_millis();
	if let Some(level) = level_override(verbose, quiet) {
		builder.filter_level(level);
	}
	let _ = builder.try_init();
}

/// Summarizes repair and reconstruction outcomes on the log.
fn report_diagnostics(generator: &Generator) {
	if let Some(report) = generator.correction_report() {
		for context in &report.repaired {
			info!("repaired corrupted singles.{} table", context.name());
		}
	}

	let Some(report) = generator.reconstruction_report() else { return };
	let unresolved = report
		.diagnostics
		.iter()
		.filter(|d| matches!(d, Diagnostic::NoIntegerRatio { .. }))
		.count();
	if unresolved > 0 {
		warn!("{} count/total pairs left unreconciled", unresolved);
	}
	info!(
		"reconstructed counts: {} propagation passes, {} columns rescaled",
		report.passes, report.scaled
	);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_usage_line() {
		let cli = Cli::try_parse_from(["ltr-gen", "names.ltr"]).unwrap();
		assert_eq!(cli.count, 1);
		assert!(cli.seed.is_none());

		let cli = Cli::try_parse_from(["ltr-gen", "names.ltr", "10", "--seed", "1", "--no-repair"]).unwrap();
		assert_eq!(cli.count, 10);
		let input = cli.generation_input();
		assert_eq!(input.seed(), Some(1));
		assert!(!input.repair_enabled());
		assert!(input.reconstruct);
	}

	#[test]
	fn rejects_bad_arguments() {
		assert!(Cli::try_parse_from(["ltr-gen"]).is_err());
		assert!(Cli::try_parse_from(["ltr-gen", "names.ltr", "many"]).is_err());
		assert!(Cli::try_parse_from(["ltr-gen", "names.ltr", "--all"]).is_err());

		assert!(Cli::try_parse_from(["ltr-gen", "names.ltr", "--seed", "-1"]).is_err());
	}

	#[test]
	fn high_seeds_are_accepted() {
		let cli = Cli::try_parse_from(["ltr-gen", "names.ltr", "--seed", "4000000000"]).unwrap();
		assert_eq!(cli.generation_input().seed(), Some(4_000_000_000));
	}

	#[test]
	fn log_level_only_forced_by_flags() {
		assert_eq!(level_override(0, 0), None);
		assert_eq!(level_override(1, 0), Some(LevelFilter::Debug));
		assert_eq!(level_override(2, 0), Some(LevelFilter::Trace));
		assert_eq!(level_override(0, 1), Some(LevelFilter::Warn));
		assert_eq!(level_override(3, 2), Some(LevelFilter::Error));
	}
}
