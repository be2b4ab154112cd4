//! Scanner configuration.
//!
//! Configuration is fixed when a [`crate::ScanSessionController`] is built.
//! It can come from defaults, a JSON file, and environment overrides:
//!
//! ```json
//! {
//!   "formats": ["EAN_13", "UPC_A", "CODE_128"],
//!   "preferredLabel": "back",
//!   "tryHarder": true
//! }
//! ```

use std::path::Path;

use scan_protocol::BarcodeFormat;
use serde::{Deserialize, Serialize};

use crate::engine::DecodeHints;
use crate::error::{Result, ScanError};

/// Overrides [`ScanConfig::preferred_label`].
pub const PREFERRED_LABEL_ENV: &str = "BARSCAN_PREFERRED_LABEL";
/// Overrides [`ScanConfig::formats`] with a comma-separated list of wire names.
pub const FORMATS_ENV: &str = "BARSCAN_FORMATS";

/// Label fragment that marks a rear-facing camera.
pub const DEFAULT_PREFERRED_LABEL: &str = "back";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanConfig {
	/// Symbol formats the decoder recognizes.
	pub formats: Vec<BarcodeFormat>,
	/// Case-insensitive label fragment preferred during device selection.
	pub preferred_label: String,
	pub try_harder: bool,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			formats: BarcodeFormat::DEFAULT.to_vec(),
			preferred_label: DEFAULT_PREFERRED_LABEL.to_string(),
			try_harder: true,
		}
	}
}

impl ScanConfig {
	/// Loads and validates a JSON configuration file.
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path)?;
		let config: ScanConfig = serde_json::from_str(&raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Applies `BARSCAN_*` environment overrides.
	pub fn apply_env(self) -> Result<Self> {
		self.apply_overrides(std::env::var(PREFERRED_LABEL_ENV).ok(), std::env::var(FORMATS_ENV).ok())
	}

	pub fn apply_overrides(mut self, preferred_label: Option<String>, formats: Option<String>) -> Result<Self> {
		if let Some(label) = preferred_label {
			self.preferred_label = label;
		}
		if let Some(list) = formats {
			self.formats = parse_format_list(&list)?;
		}
		self.validate()?;
		Ok(self)
	}

	pub fn validate(&self) -> Result<()> {
		if self.formats.is_empty() {
			return Err(ScanError::Config("at least one barcode format is required".to_string()));
		}
		if self.preferred_label.trim().is_empty() {
			return Err(ScanError::Config("preferred camera label must not be empty".to_string()));
		}
		Ok(())
	}

	pub fn decode_hints(&self) -> DecodeHints {
		let mut formats = self.formats.clone();
		formats.sort();
		formats.dedup();
		DecodeHints {
			formats,
			try_harder: self.try_harder,
		}
	}
}

fn parse_format_list(list: &str) -> Result<Vec<BarcodeFormat>> {
	list.split(',')
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.map(|name| name.parse::<BarcodeFormat>().map_err(ScanError::Config))
		.collect()
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn defaults_are_valid() {
		let config = ScanConfig::default();
		config.validate().unwrap();
		assert_eq!(config.preferred_label, "back");
		assert_eq!(config.formats.len(), 16);
		assert!(!config.formats.contains(&BarcodeFormat::QrCode));
	}

	#[test]
	fn file_fields_fall_back_to_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"formats": ["EAN_13", "UPC_A"]}}"#).unwrap();

		let config = ScanConfig::from_file(file.path()).unwrap();
		assert_eq!(config.formats, vec![BarcodeFormat::Ean13, BarcodeFormat::UpcA]);
		assert_eq!(config.preferred_label, DEFAULT_PREFERRED_LABEL);
		assert!(config.try_harder);
	}

	#[test]
	fn empty_format_set_is_rejected() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"formats": []}}"#).unwrap();

		let err = ScanConfig::from_file(file.path()).unwrap_err();
		assert!(matches!(err, ScanError::Config(_)));
	}

	#[test]
	fn missing_file_is_io_error() {
		let err = ScanConfig::from_file(Path::new("/nonexistent/barscan.json")).unwrap_err();
		assert!(matches!(err, ScanError::Io(_)));
	}

	#[test]
	fn overrides_replace_label_and_formats() {
		let config = ScanConfig::default()
			.apply_overrides(Some("rear".to_string()), Some("code_128, ean-8,".to_string()))
			.unwrap();
		assert_eq!(config.preferred_label, "rear");
		assert_eq!(config.formats, vec![BarcodeFormat::Code128, BarcodeFormat::Ean8]);
	}

	#[test]
	fn unknown_override_format_is_config_error() {
		let err = ScanConfig::default().apply_overrides(None, Some("EAN_13,CODE_11".to_string())).unwrap_err();
		assert!(err.to_string().contains("CODE_11"));
	}

	#[test]
	fn hints_are_sorted_and_deduplicated() {
		let config = ScanConfig {
			formats: vec![BarcodeFormat::UpcA, BarcodeFormat::Ean13, BarcodeFormat::UpcA],
			..Default::default()
		};
		assert_eq!(config.decode_hints().formats, vec![BarcodeFormat::Ean13, BarcodeFormat::UpcA]);
	}
}
