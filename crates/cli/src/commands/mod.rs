mod devices;
mod formats;
mod scan;

use std::path::Path;

use anyhow::Context;
use barscan::ScanConfig;
use scan_protocol::ScanScript;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::error::Result;

/// How a successful dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Success,
	/// The scan session ended without a decoded code.
	NoResult,
}

pub async fn dispatch(cli: Cli) -> Result<Outcome> {
	let config = load_config(cli.config.as_deref(), cli.prefer, cli.only)?;
	debug!(target: "barscan.cli", command = cli.command.name(), preferred_label = %config.preferred_label, formats = config.formats.len(), "dispatching");

	match cli.command {
		Commands::Formats => formats::run(&config, cli.format),
		Commands::Devices { script } => devices::run(&config, &load_script(&script)?, cli.format).await,
		Commands::Scan { script, timeout_ms, stop_after_ms } => {
			let options = scan::ScanOptions { timeout_ms, stop_after_ms };
			scan::run(config, &load_script(&script)?, options, cli.format).await
		}
	}
}

/// Defaults, then the config file, then `BARSCAN_*`, then command-line flags.
fn load_config(path: Option<&Path>, prefer: Option<String>, only: Option<String>) -> Result<ScanConfig> {
	let config = match path {
		Some(path) => ScanConfig::from_file(path)?,
		None => ScanConfig::default(),
	};
	Ok(config.apply_env()?.apply_overrides(prefer, only)?)
}

fn load_script(path: &Path) -> Result<ScanScript> {
	let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read script {}", path.display()))?;
	let script = ScanScript::from_json(&raw).with_context(|| format!("invalid script {}", path.display()))?;
	Ok(script)
}
