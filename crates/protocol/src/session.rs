use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::DeviceHandle;

/// Lifecycle state of one scan session.
///
/// ```text
/// Idle -> Acquiring -> Scanning -> Completed
///             |           |----> Stopped
///             |----------------> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
	#[default]
	Idle,
	/// Enumerating devices or opening the camera stream.
	Acquiring,
	/// Decode attempts are flowing.
	Scanning,
	/// A result was delivered.
	Completed,
	/// Cancelled by the caller before any result.
	Stopped,
	/// Device or permission error during acquisition.
	Failed,
}

impl SessionStatus {
	/// Returns `true` while the session may still hold camera resources.
	pub fn is_active(self) -> bool {
		matches!(self, SessionStatus::Acquiring | SessionStatus::Scanning)
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionStatus::Idle => write!(f, "idle"),
			SessionStatus::Acquiring => write!(f, "acquiring"),
			SessionStatus::Scanning => write!(f, "scanning"),
			SessionStatus::Completed => write!(f, "completed"),
			SessionStatus::Stopped => write!(f, "stopped"),
			SessionStatus::Failed => write!(f, "failed"),
		}
	}
}

/// Error classes that can reach the caller's status area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	/// Enumeration returned no video inputs.
	NoCamera,
	/// Camera access was denied or revoked.
	Permission,
	/// Any other device or stream acquisition failure.
	Acquisition,
	/// A release step failed.
	Release,
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ErrorKind::NoCamera => write!(f, "NO_CAMERA"),
			ErrorKind::Permission => write!(f, "PERMISSION"),
			ErrorKind::Acquisition => write!(f, "ACQUISITION"),
			ErrorKind::Release => write!(f, "RELEASE"),
		}
	}
}

/// User-visible error record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
	pub kind: ErrorKind,
	pub message: String,
}

impl fmt::Display for SessionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)
	}
}

/// Observable state of the current (or most recent) session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	/// Monotonic session counter; `0` before the first session starts.
	pub session_id: u64,
	pub status: SessionStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_error: Option<SessionError>,
	/// Mirrors the delivery guard: set when a result is accepted, cleared on release.
	pub has_delivered: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub device: Option<DeviceHandle>,
	/// Engine-internal per-frame faults observed during the session.
	#[serde(default)]
	pub engine_faults: u64,
}

/// Release steps that can fail. Clearing the decoder and resetting the
/// delivery guard cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStep {
	StopControl,
	StopTracks,
}

impl fmt::Display for ReleaseStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ReleaseStep::StopControl => write!(f, "stop_control"),
			ReleaseStep::StopTracks => write!(f, "stop_tracks"),
		}
	}
}
