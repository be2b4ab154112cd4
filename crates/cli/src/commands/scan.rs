use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use barscan::sim::SimulatedEngineBuilder;
use barscan::{DeviceHandle, RenderSurface, ScanConfig, ScanSessionController, SessionError, SessionStatus};
use colored::Colorize;
use scan_protocol::ScanScript;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::Outcome;
use crate::error::Result;
use crate::output::{DiagnosticLevel, ErrorCode, OutputFormat, RenderText, ResultBuilder, print_result};

/// Grace period for the completion signal after a stop.
const COMPLETION_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
	pub timeout_ms: u64,
	pub stop_after_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport {
	code: Option<String>,
	status: SessionStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	device: Option<DeviceHandle>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<SessionError>,
	engine_faults: u64,
	timed_out: bool,
}

impl RenderText for ScanReport {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		match &self.code {
			Some(code) => writeln!(out, "Scanned Code: {}", code.green().bold())?,
			None => writeln!(out, "Scanned Code: —")?,
		}
		writeln!(out, "Status: {}", self.status)?;
		if let Some(device) = &self.device {
			writeln!(out, "Camera: {device}")?;
		}
		if let (Some(_), Some(error)) = (&self.code, &self.error) {
			writeln!(out, "{}", error.message.yellow())?;
		}
		Ok(())
	}
}

enum Ending {
	Completed,
	Stopped,
	TimedOut,
}

pub async fn run(config: ScanConfig, script: &ScanScript, options: ScanOptions, format: OutputFormat) -> Result<Outcome> {
	let (engine, sim) = SimulatedEngineBuilder::from_script(script).build();
	let controller = ScanSessionController::new(Arc::new(engine), config, RenderSurface::new())?;
	let replay = sim.play(script);

	let (result_tx, mut result_rx) = mpsc::unbounded_channel();
	let (complete_tx, mut complete_rx) = mpsc::unbounded_channel();
	let started = controller
		.start_session(
			move |code| {
				let _ = result_tx.send(code.to_string());
			},
			move |delivered| {
				let _ = complete_tx.send(delivered);
			},
		)
		.await;

	let mut stop_error = None;
	let mut timed_out = false;
	if started.status.is_active() {
		let stop_after = options.stop_after_ms.map(Duration::from_millis);
		let ending = tokio::select! {
			_ = complete_rx.recv() => Ending::Completed,
			_ = sleep_opt(stop_after) => Ending::Stopped,
			_ = tokio::time::sleep(Duration::from_millis(options.timeout_ms)) => Ending::TimedOut,
		};

		match ending {
			Ending::Completed => debug!(target: "barscan.cli", "session completed"),
			Ending::Stopped | Ending::TimedOut => {
				timed_out = matches!(ending, Ending::TimedOut);
				info!(target: "barscan.cli", timed_out, "stopping session");
				if let Err(err) = controller.stop_session().await {
					warn!(target: "barscan.cli", error = %err, "stop did not release cleanly");
					stop_error = Some(err);
				}
				if tokio::time::timeout(COMPLETION_GRACE, complete_rx.recv()).await.is_err() {
					warn!(target: "barscan.cli", "no completion signal after stop");
				}
			}
		}
	}

	let snapshot = controller.snapshot();
	if let Err(err) = controller.shutdown().await {
		warn!(target: "barscan.cli", error = %err, "shutdown release incomplete");
	}
	replay.abort();

	let code = result_rx.try_recv().ok();
	let report = ScanReport {
		code: code.clone(),
		status: snapshot.status,
		device: snapshot.device,
		error: snapshot.last_error.clone(),
		engine_faults: snapshot.engine_faults,
		timed_out,
	};

	let mut result = ResultBuilder::new("scan");
	if code.is_none() {
		result = match (&snapshot.last_error, timed_out) {
			(Some(error), _) => result.error(ErrorCode::from(error.kind), error.message.clone()),
			(None, true) => result.error(ErrorCode::Timeout, format!("no code decoded within {}ms", options.timeout_ms)),
			(None, false) => result,
		};
	}
	if let Some(err) = stop_error {
		result = result.diagnostic(DiagnosticLevel::Warning, err.to_string());
	}
	if snapshot.engine_faults > 0 {
		result = result.diagnostic(DiagnosticLevel::Info, format!("{} frame(s) failed to decode", snapshot.engine_faults));
	}
	print_result(&result.data(report).build(), format);

	let no_result = code.is_none() && (snapshot.status == SessionStatus::Failed || timed_out);
	Ok(if no_result { Outcome::NoResult } else { Outcome::Success })
}

async fn sleep_opt(duration: Option<Duration>) {
	match duration {
		Some(duration) => tokio::time::sleep(duration).await,
		None => std::future::pending().await,
	}
}
