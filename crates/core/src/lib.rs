//! Camera barcode scan sessions.
//!
//! A [`ScanSessionController`] picks a camera, runs a capture loop until the
//! first code is decoded, delivers that code exactly once, and releases the
//! camera on every exit path.
//!
//! The camera and decoder live behind the [`DecodingEngine`] trait. [`sim`]
//! provides an in-memory host for tests and scripted replays.
//!
//! ```ignore
//! use std::sync::Arc;
//! use barscan::{RenderSurface, ScanConfig, ScanSessionController};
//!
//! let controller = ScanSessionController::new(engine, ScanConfig::default(), RenderSurface::new())?;
//! controller
//!     .start_session(|code| println!("Scanned Code: {code}"), |delivered| println!("done: {delivered}"))
//!     .await;
//! ```

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod release;
pub mod selector;
pub mod session;
pub mod sim;
pub mod surface;

pub use capture::{CaptureLoop, DeliveryGuard};
pub use config::ScanConfig;
pub use engine::{AttemptHandler, DecodeAttempt, DecodeHints, Decoder, DecodingEngine, EngineError, MediaStream, MediaTrack, ScanControl, TrackState};
pub use error::{ReleaseError, ReleaseFailure, Result, ScanError};
pub use release::{ReleaseReport, SessionResources};
pub use scan_protocol::{BarcodeFormat, DeviceHandle, ErrorKind, ReleaseStep, SessionError, SessionSnapshot, SessionStatus};
pub use selector::select_device;
pub use session::{CompleteCallback, ResultCallback, ScanSessionController};
pub use surface::RenderSurface;
