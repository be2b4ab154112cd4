use barscan::ErrorKind;
use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	NoCamera,
	PermissionDenied,
	CameraUnavailable,
	ReleaseFailed,
	Timeout,
	InvalidInput,
	IoError,
	InternalError,
}

impl From<ErrorKind> for ErrorCode {
	fn from(kind: ErrorKind) -> Self {
		match kind {
			ErrorKind::NoCamera => ErrorCode::NoCamera,
			ErrorKind::Permission => ErrorCode::PermissionDenied,
			ErrorKind::Acquisition => ErrorCode::CameraUnavailable,
			ErrorKind::Release => ErrorCode::ReleaseFailed,
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::NoCamera => write!(f, "NO_CAMERA"),
			ErrorCode::PermissionDenied => write!(f, "PERMISSION_DENIED"),
			ErrorCode::CameraUnavailable => write!(f, "CAMERA_UNAVAILABLE"),
			ErrorCode::ReleaseFailed => write!(f, "RELEASE_FAILED"),
			ErrorCode::Timeout => write!(f, "TIMEOUT"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Diagnostic message attached to a command result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_code_display_matches_wire_name() {
		for code in [ErrorCode::NoCamera, ErrorCode::ReleaseFailed, ErrorCode::Timeout] {
			let wire = serde_json::to_value(code).unwrap();
			assert_eq!(wire, serde_json::Value::String(code.to_string()));
		}
	}

	#[test]
	fn envelope_omits_empty_fields() {
		let result = CommandResult::<()> {
			schema_version: SCHEMA_VERSION,
			ok: false,
			command: "scan".to_string(),
			data: None,
			error: Some(CommandError {
				code: ErrorCode::NoCamera,
				message: "No camera found.".to_string(),
			}),
			duration_ms: None,
			diagnostics: Vec::new(),
		};
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(json["error"]["code"], "NO_CAMERA");
		assert!(json.get("data").is_none());
		assert!(json.get("diagnostics").is_none());
	}
}
