use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Symbol formats the decoder may be configured to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BarcodeFormat {
	#[serde(rename = "AZTEC")]
	Aztec,
	#[serde(rename = "CODABAR")]
	Codabar,
	#[serde(rename = "CODE_39")]
	Code39,
	#[serde(rename = "CODE_93")]
	Code93,
	#[serde(rename = "CODE_128")]
	Code128,
	#[serde(rename = "DATA_MATRIX")]
	DataMatrix,
	#[serde(rename = "EAN_8")]
	Ean8,
	#[serde(rename = "EAN_13")]
	Ean13,
	#[serde(rename = "ITF")]
	Itf,
	#[serde(rename = "MAXICODE")]
	MaxiCode,
	#[serde(rename = "PDF_417")]
	Pdf417,
	#[serde(rename = "QR_CODE")]
	QrCode,
	#[serde(rename = "RSS_14")]
	Rss14,
	#[serde(rename = "RSS_EXPANDED")]
	RssExpanded,
	#[serde(rename = "UPC_A")]
	UpcA,
	#[serde(rename = "UPC_E")]
	UpcE,
	#[serde(rename = "UPC_EAN_EXTENSION")]
	UpcEanExtension,
}

/// Broad symbology families, used for grouping in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatFamily {
	/// One-dimensional retail and industrial codes.
	Linear,
	/// Two-dimensional matrix codes.
	Matrix,
	/// Stacked and extended variants.
	Stacked,
}

impl BarcodeFormat {
	/// Every recognized format, in wire-name order.
	pub const ALL: [BarcodeFormat; 17] = [
		BarcodeFormat::Aztec,
		BarcodeFormat::Codabar,
		BarcodeFormat::Code39,
		BarcodeFormat::Code93,
		BarcodeFormat::Code128,
		BarcodeFormat::DataMatrix,
		BarcodeFormat::Ean8,
		BarcodeFormat::Ean13,
		BarcodeFormat::Itf,
		BarcodeFormat::MaxiCode,
		BarcodeFormat::Pdf417,
		BarcodeFormat::QrCode,
		BarcodeFormat::Rss14,
		BarcodeFormat::RssExpanded,
		BarcodeFormat::UpcA,
		BarcodeFormat::UpcE,
		BarcodeFormat::UpcEanExtension,
	];

	/// Formats a decoder recognizes unless configured otherwise. QR codes are
	/// opt-in.
	pub const DEFAULT: [BarcodeFormat; 16] = [
		BarcodeFormat::Aztec,
		BarcodeFormat::Codabar,
		BarcodeFormat::Code39,
		BarcodeFormat::Code93,
		BarcodeFormat::Code128,
		BarcodeFormat::DataMatrix,
		BarcodeFormat::Ean8,
		BarcodeFormat::Ean13,
		BarcodeFormat::Itf,
		BarcodeFormat::MaxiCode,
		BarcodeFormat::Pdf417,
		BarcodeFormat::Rss14,
		BarcodeFormat::RssExpanded,
		BarcodeFormat::UpcA,
		BarcodeFormat::UpcE,
		BarcodeFormat::UpcEanExtension,
	];

	/// Stable identifier used on the wire and in configuration.
	pub fn wire_name(self) -> &'static str {
		match self {
			BarcodeFormat::Aztec => "AZTEC",
			BarcodeFormat::Codabar => "CODABAR",
			BarcodeFormat::Code39 => "CODE_39",
			BarcodeFormat::Code93 => "CODE_93",
			BarcodeFormat::Code128 => "CODE_128",
			BarcodeFormat::DataMatrix => "DATA_MATRIX",
			BarcodeFormat::Ean8 => "EAN_8",
			BarcodeFormat::Ean13 => "EAN_13",
			BarcodeFormat::Itf => "ITF",
			BarcodeFormat::MaxiCode => "MAXICODE",
			BarcodeFormat::Pdf417 => "PDF_417",
			BarcodeFormat::QrCode => "QR_CODE",
			BarcodeFormat::Rss14 => "RSS_14",
			BarcodeFormat::RssExpanded => "RSS_EXPANDED",
			BarcodeFormat::UpcA => "UPC_A",
			BarcodeFormat::UpcE => "UPC_E",
			BarcodeFormat::UpcEanExtension => "UPC_EAN_EXTENSION",
		}
	}

	pub fn family(self) -> FormatFamily {
		match self {
			BarcodeFormat::Aztec | BarcodeFormat::DataMatrix | BarcodeFormat::MaxiCode | BarcodeFormat::QrCode => FormatFamily::Matrix,
			BarcodeFormat::Pdf417 | BarcodeFormat::Rss14 | BarcodeFormat::RssExpanded | BarcodeFormat::UpcEanExtension => FormatFamily::Stacked,
			_ => FormatFamily::Linear,
		}
	}
}

impl fmt::Display for BarcodeFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.wire_name())
	}
}

impl FromStr for BarcodeFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
		BarcodeFormat::ALL
			.into_iter()
			.find(|format| format.wire_name() == wanted)
			.ok_or_else(|| format!("unknown barcode format: {s}"))
	}
}

impl fmt::Display for FormatFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FormatFamily::Linear => write!(f, "linear"),
			FormatFamily::Matrix => write!(f, "matrix"),
			FormatFamily::Stacked => write!(f, "stacked"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_names_match_serde() {
		for format in BarcodeFormat::ALL {
			let json = serde_json::to_string(&format).unwrap();
			assert_eq!(json, format!("\"{}\"", format.wire_name()));
		}
	}

	#[test]
	fn parses_loose_spelling() {
		assert_eq!("ean-13".parse::<BarcodeFormat>(), Ok(BarcodeFormat::Ean13));
		assert_eq!(" qr_code ".parse::<BarcodeFormat>(), Ok(BarcodeFormat::QrCode));
		assert!("code_11".parse::<BarcodeFormat>().is_err());
	}

	#[test]
	fn default_set_leaves_out_qr_only() {
		assert!(!BarcodeFormat::DEFAULT.contains(&BarcodeFormat::QrCode));
		let missing: Vec<_> = BarcodeFormat::ALL.into_iter().filter(|f| !BarcodeFormat::DEFAULT.contains(f)).collect();
		assert_eq!(missing, vec![BarcodeFormat::QrCode]);
	}

	#[test]
	fn default_set_covers_every_family() {
		let families: Vec<_> = BarcodeFormat::DEFAULT.iter().map(|f| f.family()).collect();
		assert!(families.contains(&FormatFamily::Linear));
		assert!(families.contains(&FormatFamily::Matrix));
		assert!(families.contains(&FormatFamily::Stacked));
	}
}
