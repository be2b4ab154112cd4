use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, Diagnostic, DiagnosticLevel, ErrorCode, SCHEMA_VERSION};

/// Human-readable rendering of a command's data.
pub trait RenderText {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl RenderText for () {
	fn render_text(&self, _out: &mut dyn Write) -> io::Result<()> {
		Ok(())
	}
}

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	diagnostics: Vec<Diagnostic>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
			diagnostics: Vec::new(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn diagnostic(mut self, level: DiagnosticLevel, message: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
		});
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		CommandResult {
			schema_version: SCHEMA_VERSION,
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
			diagnostics: self.diagnostics,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize + RenderText>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			let mut stdout = io::stdout().lock();
			let _ = write_text(result, &mut stdout);
		}
	}
}

fn write_text<T: Serialize + RenderText>(result: &CommandResult<T>, out: &mut dyn Write) -> io::Result<()> {
	if let Some(ref data) = result.data {
		data.render_text(out)?;
	}
	if let Some(ref error) = result.error {
		writeln!(out, "{} [{}]: {}", "Error".red().bold(), error.code, error.message)?;
	}
	for diag in &result.diagnostics {
		let prefix = match diag.level {
			DiagnosticLevel::Info => "info".normal(),
			DiagnosticLevel::Warning => "warning".yellow(),
			DiagnosticLevel::Error => "error".red(),
		};
		writeln!(out, "[{prefix}] {}", diag.message)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Line(&'static str);

	impl Serialize for Line {
		fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
			serializer.serialize_str(self.0)
		}
	}

	impl RenderText for Line {
		fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
			writeln!(out, "{}", self.0)
		}
	}

	#[test]
	fn ok_requires_data_and_no_error() {
		assert!(ResultBuilder::new("formats").data(Line("x")).build().ok);
		assert!(!ResultBuilder::<Line>::new("formats").build().ok);
		assert!(!ResultBuilder::new("scan").data(Line("x")).error(ErrorCode::Timeout, "late").build().ok);
	}

	#[test]
	fn text_output_renders_data_then_error() {
		colored::control::set_override(false);
		let result = ResultBuilder::new("scan")
			.data(Line("Scanned Code: —"))
			.error(ErrorCode::NoCamera, "No camera found.")
			.diagnostic(DiagnosticLevel::Warning, "script had no frames")
			.build();
		let mut out = Vec::new();
		write_text(&result, &mut out).unwrap();
		let text = String::from_utf8(out).unwrap();
		assert_eq!(text, "Scanned Code: —\nError [NO_CAMERA]: No camera found.\n[warning] script had no frames\n");
	}
}
