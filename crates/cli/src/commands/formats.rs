use std::io::{self, Write};

use barscan::ScanConfig;
use scan_protocol::{BarcodeFormat, FormatFamily};
use serde::Serialize;

use crate::commands::Outcome;
use crate::error::Result;
use crate::output::{OutputFormat, RenderText, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormatsData {
	formats: Vec<FormatEntry>,
	try_harder: bool,
}

#[derive(Debug, Serialize)]
struct FormatEntry {
	name: BarcodeFormat,
	family: FormatFamily,
}

impl RenderText for FormatsData {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		for entry in &self.formats {
			writeln!(out, "{:<18} {}", entry.name.wire_name(), entry.family)?;
		}
		writeln!(out, "try harder: {}", if self.try_harder { "yes" } else { "no" })
	}
}

pub fn run(config: &ScanConfig, format: OutputFormat) -> Result<Outcome> {
	let hints = config.decode_hints();
	let data = FormatsData {
		formats: hints
			.formats
			.iter()
			.map(|&name| FormatEntry { name, family: name.family() })
			.collect(),
		try_harder: hints.try_harder,
	};
	print_result(&ResultBuilder::new("formats").data(data).build(), format);
	Ok(Outcome::Success)
}
