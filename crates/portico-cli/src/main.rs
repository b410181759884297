//! Portico CLI
//!
//! Command-line driver for portal navigation.
//!
//! ## Usage
//!
//! ```bash
//! portico decode '?tab=profile&uid=42'
//! portico encode tab=profile uid=42
//! portico --config portal.toml fetch profile uid=42
//! portico summary registrants.json
//! ```

mod output;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use portico_nav::query::{self, QueryMap};
use portico_nav::{
	EnvSource, FetchOutcome, FileStore, KeyValueStore, MemoryBrowser, MemoryStore, NavPanel,
	NavigationRouter, NavigationTarget, PortalSettings, ReqwestTransport, SettingsBuilder,
	TomlFileSource,
};
use portico_widgets::{FeeSummary, Registrant};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "portico")]
#[command(about = "Portal navigation and content-loading utility", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Settings file (TOML)
	#[arg(short, long, global = true, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Deployment profile the settings start from
	#[arg(short, long, global = true, value_enum, default_value = "bootstrap")]
	profile: Profile,

	/// Verbosity level (can be repeated)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbosity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Profile {
	/// Body-marker login detection, uid link matching
	Bootstrap,
	/// Anchor-content login detection, tab link matching
	Advising,
}

#[derive(Subcommand)]
enum Commands {
	/// Decode a query string into its parameters
	Decode {
		/// Query string, with or without the leading `?`
		#[arg(value_name = "QUERY")]
		query: String,

		/// Print the parameters as a JSON object
		#[arg(long)]
		json: bool,
	},

	/// Encode parameters as a query string
	Encode {
		/// Parameters as KEY=VALUE
		#[arg(value_name = "KEY=VALUE")]
		pairs: Vec<String>,
	},

	/// Load a view from the portal and print its fragment
	Fetch {
		/// View identifier
		#[arg(value_name = "TAB")]
		tab: String,

		/// Extra parameters as KEY=VALUE
		#[arg(value_name = "KEY=VALUE")]
		params: Vec<String>,

		/// File persisting nested tab selection between runs
		#[arg(long, value_name = "FILE")]
		state: Option<PathBuf>,
	},

	/// Print the fee summary for a registrants JSON file
	Summary {
		/// JSON array of registrants
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Decode { query, json } => run_decode(&query, json),
		Commands::Encode { pairs } => run_encode(&pairs),
		Commands::Fetch { tab, params, state } => {
			run_fetch(cli.config.as_deref(), cli.profile, tab, &params, state).await
		}
		Commands::Summary { file } => run_summary(&file),
	};

	if let Err(e) = result {
		eprintln!("{} {:#}", "Error:".red().bold(), e);
		process::exit(1);
	}
}

fn init_tracing(verbosity: u8) {
	let default = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn load_settings(config: Option<&Path>, profile: Profile) -> anyhow::Result<PortalSettings> {
	let base = match profile {
		Profile::Bootstrap => PortalSettings::bootstrap(),
		Profile::Advising => PortalSettings::advising(),
	};
	let mut builder = SettingsBuilder::from_profile(base);
	if let Some(path) = config {
		builder = builder.add_source(TomlFileSource::new(path));
	}
	builder
		.add_source(EnvSource::new())
		.build()
		.context("Failed to load settings")
}

/// Splits `KEY=VALUE` arguments. A bare `KEY` has an empty value.
fn parse_pairs(pairs: &[String]) -> QueryMap {
	pairs
		.iter()
		.map(|pair| match pair.split_once('=') {
			Some((k, v)) => (k.to_string(), v.to_string()),
			None => (pair.clone(), String::new()),
		})
		.collect()
}

fn run_decode(raw: &str, json: bool) -> anyhow::Result<()> {
	let decoded = query::decode(raw);
	if json {
		println!("{}", serde_json::to_string_pretty(&decoded)?);
	} else {
		output::print_params(&decoded);
	}
	Ok(())
}

fn run_encode(pairs: &[String]) -> anyhow::Result<()> {
	println!("{}", query::encode(&parse_pairs(pairs)));
	Ok(())
}

async fn run_fetch(
	config: Option<&Path>,
	profile: Profile,
	tab: String,
	params: &[String],
	state: Option<PathBuf>,
) -> anyhow::Result<()> {
	let settings = load_settings(config, profile)?;
	let transport = Arc::new(ReqwestTransport::new(&settings)?);
	let browser = Arc::new(MemoryBrowser::new(settings.base_url.clone()));
	let store: Arc<dyn KeyValueStore> = match state {
		Some(path) => Arc::new(FileStore::new(path)),
		None => Arc::new(MemoryStore::new()),
	};

	let fetcher = portico_nav::ContentFetcher::new(&settings, transport, browser.clone())?;
	let router = NavigationRouter::new(fetcher, NavPanel::empty(), store)
		.with_link_match(settings.link_match)
		.with_sub_tabs(settings.sub_tab_key.clone(), settings.restore_sub_tabs);

	let target = NavigationTarget::new(tab).with_parameters(parse_pairs(params));
	let outcome = router.navigate(target, true).await;
	output::print_address(&browser.address());

	match outcome {
		FetchOutcome::Loaded(fragment) => {
			println!("{}", fragment);
			if let Some(sub_tab) = router.content().shown_sub_tab() {
				output::print_sub_tab(&sub_tab);
			}
			Ok(())
		}
		FetchOutcome::Redirected(location) | FetchOutcome::LoginDetected(location) => {
			output::print_redirect(&location);
			Ok(())
		}
		other => Err(anyhow::anyhow!("{}", output::describe_failure(other))),
	}
}

fn run_summary(file: &Path) -> anyhow::Result<()> {
	let raw = std::fs::read_to_string(file)
		.with_context(|| format!("Failed to read {}", file.display()))?;
	let registrants: Vec<Registrant> =
		serde_json::from_str(&raw).with_context(|| format!("Invalid registrants in {}", file.display()))?;
	let summary = FeeSummary::build(&registrants)?;
	output::print_summary(&summary);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_pairs() {
		let pairs = vec!["uid=42".to_string(), "flag".to_string(), "q=a=b".to_string()];

		let parsed = parse_pairs(&pairs);

		assert_eq!(parsed.get("uid").map(String::as_str), Some("42"));
		assert_eq!(parsed.get("flag").map(String::as_str), Some(""));
		assert_eq!(parsed.get("q").map(String::as_str), Some("a=b"));
	}

	#[rstest]
	fn test_cli_parses_fetch() {
		let cli = Cli::try_parse_from([
			"portico", "-vv", "--profile", "advising", "fetch", "profile", "uid=42",
		])
		.unwrap();

		assert_eq!(cli.verbosity, 2);
		assert_eq!(cli.profile, Profile::Advising);
		assert!(matches!(
			cli.command,
			Commands::Fetch { ref tab, ref params, .. } if tab == "profile" && params == &["uid=42".to_string()]
		));
	}

	#[rstest]
	fn test_load_settings_from_toml() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("portal.toml");
		std::fs::write(&path, "base_url = \"https://portal.example.edu/portal\"\n").unwrap();

		let settings = load_settings(Some(&path), Profile::Advising).unwrap();

		assert_eq!(settings.base_url, "https://portal.example.edu/portal");
		assert_eq!(settings.link_match, portico_nav::LinkMatch::Tab);
	}
}
