use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "barscan")]
#[command(about = "Barcode scan sessions against a scripted camera host")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Scan configuration file (JSON)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Preferred camera label, matched case-insensitively
	#[arg(long, global = true, value_name = "LABEL")]
	pub prefer: Option<String>,

	/// Comma-separated barcode formats to recognize (e.g. QR_CODE,EAN_13)
	#[arg(long = "only", global = true, value_name = "FORMATS")]
	pub only: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List the barcode formats the decoder will recognize
	Formats,

	/// List the cameras in a script and show which one would be used
	Devices {
		/// Scripted host description (JSON)
		#[arg(long, value_name = "FILE")]
		script: PathBuf,
	},

	/// Run one scan session against a scripted host
	Scan {
		/// Scripted host description (JSON)
		#[arg(long, value_name = "FILE")]
		script: PathBuf,

		/// Give up when no code was decoded after this long
		#[arg(long, default_value_t = 5000)]
		timeout_ms: u64,

		/// Stop the session after this long, as a caller would
		#[arg(long)]
		stop_after_ms: Option<u64>,
	},
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Formats => "formats",
			Commands::Devices { .. } => "devices",
			Commands::Scan { .. } => "scan",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scan_defaults() {
		let cli = Cli::try_parse_from(["barscan", "scan", "--script", "s.json"]).unwrap();
		assert_eq!(cli.format, OutputFormat::Text);
		match cli.command {
			Commands::Scan { timeout_ms, stop_after_ms, .. } => {
				assert_eq!(timeout_ms, 5000);
				assert_eq!(stop_after_ms, None);
			}
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn global_flags_follow_subcommand() {
		let cli = Cli::try_parse_from(["barscan", "devices", "--script", "s.json", "-vv", "-f", "json", "--prefer", "front"]).unwrap();
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.format, OutputFormat::Json);
		assert_eq!(cli.prefer.as_deref(), Some("front"));
		assert_eq!(cli.command.name(), "devices");
	}

	#[test]
	fn script_is_required() {
		assert!(Cli::try_parse_from(["barscan", "scan"]).is_err());
	}
}
