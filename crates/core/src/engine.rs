//! Host capability traits consumed by the session controller.
//!
//! A host (browser shim, native camera stack, or [`crate::sim`]) implements
//! [`DecodingEngine`] to enumerate cameras and hand out one [`Decoder`] per
//! session. The decoder opens the camera stream, attaches it to the
//! [`RenderSurface`], and reports every frame through an [`AttemptHandler`]
//! until its [`ScanControl`] is stopped.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use scan_protocol::{BarcodeFormat, DeviceHandle};
use thiserror::Error;

use crate::surface::RenderSurface;

/// Failures reported by the host capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
	#[error("camera permission denied: {0}")]
	PermissionDenied(String),

	#[error("video input not found: {0}")]
	DeviceNotFound(String),

	#[error("camera stream unavailable: {0}")]
	StreamUnavailable(String),

	#[error("decoding engine error: {0}")]
	Internal(String),
}

/// Decoder configuration, fixed for the lifetime of a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeHints {
	pub formats: Vec<BarcodeFormat>,
	/// Spend more time per frame looking for a symbol.
	pub try_harder: bool,
}

impl DecodeHints {
	pub fn recognizes(&self, format: BarcodeFormat) -> bool {
		self.formats.contains(&format)
	}
}

impl Default for DecodeHints {
	fn default() -> Self {
		Self {
			formats: BarcodeFormat::DEFAULT.to_vec(),
			try_harder: true,
		}
	}
}

/// Outcome of one decode attempt on one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
	/// A symbol was recognized.
	Decoded(String),
	/// No symbol in this frame.
	NotFound,
	/// The engine failed internally while processing this frame.
	Fault(String),
}

/// Per-frame callback installed by the capture loop.
pub type AttemptHandler = Arc<dyn Fn(DecodeAttempt) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
	Live,
	Ended,
}

impl fmt::Display for TrackState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TrackState::Live => write!(f, "live"),
			TrackState::Ended => write!(f, "ended"),
		}
	}
}

/// One constituent track of a camera stream.
pub trait MediaTrack: Send + Sync {
	fn id(&self) -> &str;
	fn kind(&self) -> &str;
	fn ready_state(&self) -> TrackState;
	fn stop(&self) -> Result<(), EngineError>;
}

/// A live camera stream.
pub trait MediaStream: Send + Sync {
	fn id(&self) -> &str;
	fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;
}

/// Cancellation capability for an in-progress capture.
#[async_trait]
pub trait ScanControl: Send + Sync {
	async fn stop(&self) -> Result<(), EngineError>;
}

/// Decoder instance bound to one set of [`DecodeHints`].
#[async_trait]
pub trait Decoder: Send + Sync {
	fn hints(&self) -> &DecodeHints;

	/// Opens `device_id`, attaches its stream to `surface`, and starts
	/// reporting attempts to `on_attempt` at the host's frame cadence.
	///
	/// Opening may wait on a user permission prompt.
	async fn decode_from_device(&self, device_id: &str, surface: &RenderSurface, on_attempt: AttemptHandler) -> Result<Arc<dyn ScanControl>, EngineError>;
}

/// Host capability: camera enumeration and decoder construction.
#[async_trait]
pub trait DecodingEngine: Send + Sync {
	async fn enumerate_video_inputs(&self) -> Result<Vec<DeviceHandle>, EngineError>;

	fn create_decoder(&self, hints: DecodeHints) -> Result<Arc<dyn Decoder>, EngineError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_hints_recognize_retail_and_matrix_codes() {
		let hints = DecodeHints::default();
		assert!(hints.recognizes(BarcodeFormat::Ean13));
		assert!(hints.recognizes(BarcodeFormat::UpcA));
		assert!(hints.recognizes(BarcodeFormat::DataMatrix));
		assert!(hints.recognizes(BarcodeFormat::RssExpanded));
		assert!(!hints.recognizes(BarcodeFormat::QrCode));
		assert!(hints.try_harder);
	}

	#[test]
	fn narrowed_hints_reject_other_formats() {
		let hints = DecodeHints {
			formats: vec![BarcodeFormat::Code128],
			try_harder: false,
		};
		assert!(hints.recognizes(BarcodeFormat::Code128));
		assert!(!hints.recognizes(BarcodeFormat::QrCode));
	}
}
