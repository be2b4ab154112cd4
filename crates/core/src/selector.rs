//! Device selection policy.

use scan_protocol::DeviceHandle;
use tracing::debug;

use crate::engine::DecodingEngine;
use crate::error::{Result, ScanError};

/// Picks the first device whose label contains `preferred_label`
/// (case-insensitive), otherwise the first device enumerated.
pub fn select_device<'a>(devices: &'a [DeviceHandle], preferred_label: &str) -> Result<&'a DeviceHandle> {
	let needle = preferred_label.to_lowercase();
	devices
		.iter()
		.find(|device| device.label.to_lowercase().contains(&needle))
		.or_else(|| devices.first())
		.ok_or(ScanError::NoCamera)
}

/// Enumerates video inputs and applies [`select_device`].
///
/// Enumeration failures are terminal for the session; there is no retry.
pub async fn resolve_device(engine: &dyn DecodingEngine, preferred_label: &str) -> Result<DeviceHandle> {
	let devices = engine.enumerate_video_inputs().await?;
	debug!(target: "barscan.device", count = devices.len(), "enumerated video inputs");

	let device = select_device(&devices, preferred_label)?;
	debug!(target: "barscan.device", id = %device.id, label = %device.label, "selected video input");
	Ok(device.clone())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn devices(entries: &[(&str, &str)]) -> Vec<DeviceHandle> {
		entries.iter().map(|(id, label)| DeviceHandle::new(*id, *label)).collect()
	}

	#[test]
	fn prefers_back_camera_regardless_of_position() {
		let list = devices(&[("1", "Front"), ("2", "Back Camera"), ("3", "USB Webcam")]);
		assert_eq!(select_device(&list, "back").unwrap().id, "2");

		let list = devices(&[("9", "camera2 0, facing BACK"), ("1", "Front")]);
		assert_eq!(select_device(&list, "back").unwrap().id, "9");
	}

	#[test]
	fn first_match_wins_among_several_back_cameras() {
		let list = devices(&[("1", "Front"), ("2", "Back Ultra Wide"), ("3", "Back Camera")]);
		assert_eq!(select_device(&list, "back").unwrap().id, "2");
	}

	#[test]
	fn falls_back_to_first_device() {
		let list = devices(&[("a", "Integrated Camera"), ("b", "")]);
		assert_eq!(select_device(&list, "back").unwrap().id, "a");
	}

	#[test]
	fn empty_list_is_no_camera() {
		let err = select_device(&[], "back").unwrap_err();
		assert!(matches!(err, ScanError::NoCamera));
	}

	#[test]
	fn preferred_label_is_case_insensitive() {
		let list = devices(&[("1", "front"), ("2", "rear camera")]);
		assert_eq!(select_device(&list, "REAR").unwrap().id, "2");
	}
}
