//! Scripted capture sessions for the simulated host.
//!
//! A script describes what a camera host would report: the enumerated
//! devices, whether opening the stream is allowed, which tracks the stream
//! carries, and the sequence of per-frame decode outcomes.

use serde::{Deserialize, Serialize};

use crate::device::DeviceHandle;

/// Replayable description of one camera host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanScript {
	#[serde(default)]
	pub devices: Vec<DeviceHandle>,
	/// When set, opening the stream fails with this permission message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deny_permission: Option<String>,
	/// When set, device enumeration itself fails with this message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub enumeration_error: Option<String>,
	/// Track kinds of the opened stream. Defaults to a single video track.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub track_kinds: Vec<String>,
	#[serde(default)]
	pub frames: Vec<ScriptedFrame>,
}

/// One frame of a scripted capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedFrame {
	/// Delay before this frame is delivered, relative to the previous one.
	#[serde(default)]
	pub delay_ms: u64,
	pub attempt: ScriptedAttempt,
}

/// Outcome of decoding one scripted frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptedAttempt {
	NotFound,
	Decoded { text: String },
	Fault { message: String },
}

impl ScanScript {
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}
}
