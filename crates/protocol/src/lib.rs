//! Data types for the barscan session controller.
//!
//! This crate contains the serde-serializable types exchanged between the
//! scan session controller and whoever drives it: device descriptors, the
//! recognized symbol formats, the observable session record, and the
//! scripted-host format used for replaying capture sessions.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization and display
//! * Stable: Changes only when the observable session contract changes
//!
//! Session orchestration is built on top of these types in `scan-rs`.

pub mod device;
pub mod format;
pub mod script;
pub mod session;

pub use device::*;
pub use format::*;
pub use script::*;
pub use session::*;
