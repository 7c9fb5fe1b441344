use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use splice_cli::config::{CONFIG_FILE_NAME, load_merged_config, user_config_path};
use splice_cli::job::template::generate_init_template;
use splice_cli::job::{JobOptions, run_job};
use splice_cli::rules::{CompiledRule, compile_ruleset, parse_substitution};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "splice")]
#[command(
	author,
	version,
	about = "CLI tool for rewriting source files with ordered regex rule sets"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Rule set to apply to the given paths
	#[arg(short, long, value_name = "ID", conflicts_with = "expressions")]
	ruleset: Option<String>,

	/// Sed-like substitution, e.g. 's/foo/bar/g' (repeatable, applied in order)
	#[arg(short = 'e', long = "expression", value_name = "EXPR")]
	expressions: Vec<String>,

	/// Report what would change without writing any file
	#[arg(long)]
	dry_run: bool,

	/// Log every rule application to stderr
	#[arg(short, long)]
	verbose: bool,

	/// Create a template .splice.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .splice.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Files to rewrite (defaults to the configured jobs)
	paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display every config file in the cascade with its rule sets and jobs
	Show,
	/// Check all config files and rules for errors without rewriting anything
	Validate,
}

/// A target file paired with the rules to run on it.
struct PlannedJob {
	path: PathBuf,
	rules: Vec<CompiledRule>,
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

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(ref command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
		};
	}

	let (banner, jobs) = plan_jobs(&cli)?;
	run_jobs(&banner, &jobs, JobOptions {
		dry_run: cli.dry_run,
	});

	Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
	// RUST_LOG overrides; --verbose => debug; else warnings only
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(if verbose {
			"splice_cli=debug,splice=debug"
		} else {
			"splice_cli=warn,splice=warn"
		})
	});
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
}

/// Resolve the command line into an ordered job list.
///
/// Every rule is compiled up front so a bad pattern fails before any file
/// is touched.
fn plan_jobs(cli: &Cli) -> Result<(String, Vec<PlannedJob>)> {
	if !cli.expressions.is_empty() {
		anyhow::ensure!(!cli.paths.is_empty(), "--expression needs at least one PATH");

		let rules = cli
			.expressions
			.iter()
			.map(|expr| parse_substitution(expr))
			.collect::<splice_cli::Result<Vec<_>>>()
			.context("Failed to parse expression")?;

		let banner = format!(
			"Applying {} expression(s) to {} file(s)...",
			rules.len(),
			cli.paths.len()
		);
		let jobs = cli
			.paths
			.iter()
			.map(|path| PlannedJob {
				path: path.clone(),
				rules: rules.clone(),
			})
			.collect();
		return Ok((banner, jobs));
	}

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let config = load_merged_config(&cwd).context("Failed to load configuration")?;

	if let Some(ref name) = cli.ruleset {
		anyhow::ensure!(!cli.paths.is_empty(), "--ruleset needs at least one PATH");

		let rules = compile_ruleset(name, config.ruleset(name)?)
			.with_context(|| format!("Failed to compile rule set {}", name))?;

		let banner = format!(
			"Applying rule set '{}' to {} file(s)...",
			name,
			cli.paths.len()
		);
		let jobs = cli
			.paths
			.iter()
			.map(|path| PlannedJob {
				path: path.clone(),
				rules: rules.clone(),
			})
			.collect();
		return Ok((banner, jobs));
	}

	anyhow::ensure!(
		cli.paths.is_empty(),
		"PATH arguments need --ruleset or --expression"
	);

	config.validate_jobs()?;
	anyhow::ensure!(
		!config.jobs.is_empty(),
		"No jobs configured. Add [[jobs]] to {} or pass --ruleset/--expression.",
		CONFIG_FILE_NAME
	);

	let mut jobs = Vec::with_capacity(config.jobs.len());
	for job in &config.jobs {
		let rules = compile_ruleset(&job.ruleset, config.ruleset(&job.ruleset)?)
			.with_context(|| format!("Failed to compile rule set {}", job.ruleset))?;
		jobs.push(PlannedJob {
			path: job.path.clone(),
			rules,
		});
	}

	let banner = format!("Running {} configured job(s)...", jobs.len());
	Ok((banner, jobs))
}

/// Run each job in turn. A failed job is reported and the next one still runs.
fn run_jobs(banner: &str, jobs: &[PlannedJob], options: JobOptions) {
	println!("{}", banner);
	println!("{}", SEPARATOR);

	let names = display_names(jobs.iter().map(|job| job.path.as_path()));

	let mut succeeded = 0;
	for (job, name) in jobs.iter().zip(names) {

		match run_job(&job.path, &job.rules, options) {
			Ok(report) => {
				succeeded += 1;
				println!("Original {} length: {} bytes", name, report.original_len);
				println!("Cleaned {} length: {} bytes", name, report.final_len);
				if options.dry_run {
					println!(
						"✅ {} checked ({} replacement(s), dry run)",
						name,
						report.total_matches()
					);
				} else if report.written {
					println!("✅ {} rewritten", name);
				} else {
					println!("✅ {} unchanged", name);
				}
			}
			Err(e) => {
				let e = anyhow::Error::new(e);
				tracing::warn!(path = %job.path.display(), "job failed: {e:#}");
				println!("❌ {} rewrite failed: {:#}", name, e);
			}
		}

		println!("{}", SEPARATOR);
	}

	println!("Done: {} of {} job(s) succeeded.", succeeded, jobs.len());
}

/// Short name per job: the bare file name, or the full path when two jobs
/// share a file name.
fn display_names<'a>(paths: impl Iterator<Item = &'a Path> + Clone) -> Vec<String> {
	let file_name = |path: &Path| {
		path.file_name()
			.map(|name| name.to_string_lossy().to_string())
			.unwrap_or_else(|| path.display().to_string())
	};

	let mut seen: HashMap<String, usize> = HashMap::new();
	for path in paths.clone() {
		*seen.entry(file_name(path)).or_default() += 1;
	}

	paths
		.map(|path| {
			let name = file_name(path);
			if seen[&name] > 1 { path.display().to_string() } else { name }
		})
		.collect()
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{} already exists. Use --force to overwrite.", CONFIG_FILE_NAME);
	}

	let template = generate_init_template();
	std::fs::write(&config_path, template)
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {}", CONFIG_FILE_NAME);
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs =
		splice_cli::config::discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", loaded.config.root);
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var {
			println!("# root-config-lookup-disable-env-var: {}", env_var);
		}
		println!("# rulesets: {}", loaded.config.rulesets.len());
		println!("# jobs: {}", loaded.config.jobs.len());
		println!();

		for (name, ruleset) in &loaded.config.rulesets {
			println!("  Rule set {}:", name);
			if let Some(ref description) = ruleset.description {
				println!("    description: {}", description);
			}
			for (i, rule) in ruleset.rules.iter().enumerate() {
				println!("    Rule {}:", i + 1);
				if let Some(ref description) = rule.description {
					println!("      description: {}", description);
				}
				println!("      {}", rule.matcher_label());
				println!("      replacement: {:?}", rule.replacement);
				if rule.dot_all {
					println!("      dot_all: true");
				}
				if let Some(count) = rule.count {
					println!("      count: {}", count);
				}
			}
			println!();
		}

		for job in &loaded.config.jobs {
			println!("  Job: {} <- {}", job.path.display(), job.ruleset);
		}
		if !loaded.config.jobs.is_empty() {
			println!();
		}
	}

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	match validate_cascade(&cwd) {
		Ok(configs) => {
			if configs.is_empty() {
				println!("No configuration files found.");
			} else {
				println!("All configuration files are valid:");
				for (path, rulesets, jobs) in &configs {
					println!(
						"  {} ({} rule sets, {} jobs)",
						path.display(),
						rulesets,
						jobs
					);
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {:#}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}

/// Parse, compile, and cross-check every config in the cascade.
fn validate_cascade(cwd: &Path) -> Result<Vec<(PathBuf, usize, usize)>> {
	let configs = splice_cli::config::discover_configs(cwd)?;

	for loaded in &configs {
		for (name, ruleset) in &loaded.config.rulesets {
			compile_ruleset(name, ruleset).with_context(|| {
				format!("Rule set {} in {}", name, loaded.path.display())
			})?;
		}
	}

	splice_cli::config::merge_configs(&configs).validate_jobs()?;

	Ok(configs
		.iter()
		.map(|loaded| {
			(
				loaded.path.clone(),
				loaded.config.rulesets.len(),
				loaded.config.jobs.len(),
			)
		})
		.collect())
}
