use barscan::ScanError;
use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Scan(#[from] ScanError),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Scan(ScanError::Config(_)) => ErrorCode::InvalidInput,
			CliError::Scan(ScanError::Io(_)) | CliError::Io(_) => ErrorCode::IoError,
			CliError::Scan(err) => err.kind().map(ErrorCode::from).unwrap_or(ErrorCode::InternalError),
			CliError::Json(_) | CliError::Other(_) => ErrorCode::InvalidInput,
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
