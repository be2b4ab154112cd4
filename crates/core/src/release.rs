//! Lifecycle guard: ordered, idempotent release of session resources.
//!
//! Release runs the same four steps whatever triggered it (successful scan,
//! explicit stop, acquisition failure, owner disposal):
//!
//! 1. stop and clear the capture control handle
//! 2. stop every live track of the session's stream and clear it from the surface
//! 3. clear the decoder reference
//! 4. reset the delivery guard
//!
//! Each step is attempted even when an earlier one failed. A second release
//! of the same resources finds every handle already cleared and does nothing.

use std::sync::Arc;

use scan_protocol::ReleaseStep;
use tracing::{debug, warn};

use crate::capture::{CaptureLoop, DeliveryGuard};
use crate::engine::{MediaStream, ScanControl, TrackState};
use crate::error::{ReleaseError, ReleaseFailure};
use crate::surface::RenderSurface;

/// Handles acquired during one session.
#[derive(Default)]
pub struct SessionResources {
	pub control: Option<Arc<dyn ScanControl>>,
	pub stream: Option<Arc<dyn MediaStream>>,
	pub capture: Option<CaptureLoop>,
}

impl SessionResources {
	pub fn is_empty(&self) -> bool {
		self.control.is_none() && self.stream.is_none() && self.capture.is_none()
	}
}

/// What a release pass actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseReport {
	pub control_stopped: bool,
	pub tracks_stopped: usize,
	pub surface_cleared: bool,
	pub decoder_cleared: bool,
}

impl ReleaseReport {
	/// `true` when there was nothing left to release.
	pub fn is_noop(&self) -> bool {
		*self == ReleaseReport::default()
	}
}

/// Releases everything in `resources`.
pub async fn release(resources: &mut SessionResources, surface: &RenderSurface, guard: &DeliveryGuard) -> Result<ReleaseReport, ReleaseError> {
	let mut report = ReleaseReport::default();
	let mut failures = Vec::new();

	if let Some(control) = resources.control.take() {
		match control.stop().await {
			Ok(()) => report.control_stopped = true,
			Err(err) => failures.push(ReleaseFailure {
				step: ReleaseStep::StopControl,
				message: err.to_string(),
			}),
		}
	}

	if let Some(stream) = resources.stream.take() {
		for track in stream.tracks() {
			if track.ready_state() != TrackState::Live {
				continue;
			}
			match track.stop() {
				Ok(()) => report.tracks_stopped += 1,
				Err(err) => failures.push(ReleaseFailure {
					step: ReleaseStep::StopTracks,
					message: format!("track {}: {err}", track.id()),
				}),
			}
		}
		report.surface_cleared = surface.detach_if(&stream);
	}

	if resources.capture.take().is_some() {
		report.decoder_cleared = true;
	}

	guard.reset();

	if failures.is_empty() {
		if !report.is_noop() {
			debug!(
				target: "barscan.release",
				control_stopped = report.control_stopped,
				tracks_stopped = report.tracks_stopped,
				surface_cleared = report.surface_cleared,
				"session resources released"
			);
		}
		return Ok(report);
	}

	for failure in &failures {
		warn!(target: "barscan.release", step = %failure.step, error = %failure.message, "release step failed");
	}
	Err(ReleaseError { failures })
}
