use std::io::{self, Write};

use barscan::error::NO_CAMERA_MESSAGE;
use barscan::sim::SimulatedEngineBuilder;
use barscan::{DecodingEngine, DeviceHandle, ScanConfig, ScanError, select_device};
use colored::Colorize;
use scan_protocol::ScanScript;
use serde::Serialize;

use crate::commands::Outcome;
use crate::error::Result;
use crate::output::{ErrorCode, OutputFormat, RenderText, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DevicesData {
	preferred_label: String,
	devices: Vec<DeviceHandle>,
	#[serde(skip_serializing_if = "Option::is_none")]
	selected: Option<DeviceHandle>,
}

impl RenderText for DevicesData {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		for device in &self.devices {
			let marker = if self.selected.as_ref() == Some(device) { "*".green().bold() } else { " ".normal() };
			writeln!(out, "{marker} {device}")?;
		}
		Ok(())
	}
}

pub async fn run(config: &ScanConfig, script: &ScanScript, format: OutputFormat) -> Result<Outcome> {
	let (engine, _) = SimulatedEngineBuilder::from_script(script).build();
	let devices = engine.enumerate_video_inputs().await.map_err(ScanError::from)?;

	let selected = select_device(&devices, &config.preferred_label).ok().cloned();
	let mut result = ResultBuilder::new("devices");
	if selected.is_none() {
		result = result.error(ErrorCode::NoCamera, NO_CAMERA_MESSAGE);
	}
	let result = result
		.data(DevicesData {
			preferred_label: config.preferred_label.clone(),
			devices,
			selected,
		})
		.build();
	print_result(&result, format);
	Ok(Outcome::Success)
}
