//! Error taxonomy for scan sessions.

use scan_protocol::{ErrorKind, ReleaseStep, SessionError};
use thiserror::Error;

use crate::engine::EngineError;

/// Message shown when the camera could not be acquired.
pub const CAMERA_ACCESS_MESSAGE: &str = "Camera access error. Please allow permission and reload.";
/// Message shown when enumeration found no video input.
pub const NO_CAMERA_MESSAGE: &str = "No camera found.";
/// Message shown when a release step failed.
pub const RELEASE_FAILED_MESSAGE: &str = "Failed to stop the camera properly.";

#[derive(Debug, Error)]
pub enum ScanError {
	#[error("no camera found")]
	NoCamera,

	#[error("camera permission denied: {0}")]
	Permission(String),

	#[error("camera acquisition failed: {0}")]
	Acquisition(String),

	#[error(transparent)]
	Release(#[from] ReleaseError),

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl ScanError {
	/// Session-level error class, or `None` for errors outside the session taxonomy.
	pub fn kind(&self) -> Option<ErrorKind> {
		match self {
			ScanError::NoCamera => Some(ErrorKind::NoCamera),
			ScanError::Permission(_) => Some(ErrorKind::Permission),
			ScanError::Acquisition(_) => Some(ErrorKind::Acquisition),
			ScanError::Release(_) => Some(ErrorKind::Release),
			ScanError::Config(_) | ScanError::Io(_) | ScanError::Json(_) => None,
		}
	}

	/// Message suitable for the caller's status area.
	pub fn user_message(&self) -> String {
		match self {
			ScanError::NoCamera => NO_CAMERA_MESSAGE.to_string(),
			ScanError::Permission(_) | ScanError::Acquisition(_) => CAMERA_ACCESS_MESSAGE.to_string(),
			ScanError::Release(_) => RELEASE_FAILED_MESSAGE.to_string(),
			other => other.to_string(),
		}
	}

	pub fn to_session_error(&self) -> Option<SessionError> {
		self.kind().map(|kind| SessionError {
			kind,
			message: self.user_message(),
		})
	}
}

impl From<EngineError> for ScanError {
	fn from(err: EngineError) -> Self {
		match err {
			EngineError::PermissionDenied(msg) => ScanError::Permission(msg),
			other => ScanError::Acquisition(other.to_string()),
		}
	}
}

/// One release step that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
	pub step: ReleaseStep,
	pub message: String,
}

/// Aggregate of every release step that failed during one release pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("release incomplete: {}", summarize(.failures))]
pub struct ReleaseError {
	pub failures: Vec<ReleaseFailure>,
}

impl ReleaseError {
	pub fn failed_steps(&self) -> impl Iterator<Item = ReleaseStep> + '_ {
		self.failures.iter().map(|failure| failure.step)
	}
}

fn summarize(failures: &[ReleaseFailure]) -> String {
	failures
		.iter()
		.map(|failure| format!("{}: {}", failure.step, failure.message))
		.collect::<Vec<_>>()
		.join("; ")
}

pub type Result<T> = std::result::Result<T, ScanError>;
