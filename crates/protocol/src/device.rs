use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to one camera input as reported by device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle {
	/// Host-assigned device identifier passed back when opening the device.
	pub id: String,
	/// Human-readable label. May be empty before permission is granted.
	#[serde(default)]
	pub label: String,
}

impl DeviceHandle {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
		}
	}
}

impl fmt::Display for DeviceHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.label.is_empty() {
			write!(f, "{}", self.id)
		} else {
			write!(f, "{} ({})", self.label, self.id)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_includes_label_when_present() {
		assert_eq!(DeviceHandle::new("2", "Back Camera").to_string(), "Back Camera (2)");
		assert_eq!(DeviceHandle::new("7", "").to_string(), "7");
	}

	#[test]
	fn label_defaults_to_empty() {
		let device: DeviceHandle = serde_json::from_str(r#"{"id": "cam0"}"#).unwrap();
		assert_eq!(device.id, "cam0");
		assert!(device.label.is_empty());
	}
}
