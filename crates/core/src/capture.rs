//! Capture loop: one decoder per session and exactly-once delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use scan_protocol::DeviceHandle;
use tracing::{debug, trace};

use crate::engine::{AttemptHandler, DecodeAttempt, DecodeHints, Decoder, DecodingEngine, ScanControl};
use crate::error::Result;
use crate::surface::RenderSurface;

/// Check-and-set flag recording that a result was delivered.
#[derive(Debug, Default)]
pub struct DeliveryGuard {
	delivered: AtomicBool,
}

impl DeliveryGuard {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the guard, returning `true` only for the caller that flipped it.
	pub fn try_claim(&self) -> bool {
		self.delivered.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
	}

	pub fn is_set(&self) -> bool {
		self.delivered.load(Ordering::Acquire)
	}

	pub fn reset(&self) {
		self.delivered.store(false, Ordering::Release);
	}
}

/// Per-session gate consulted synchronously by the attempt handler.
///
/// `closed` is flipped exactly once, by whichever of "first decode", "stop",
/// "failure", or "teardown" gets there first.
#[derive(Debug)]
pub(crate) struct CaptureGate {
	session_id: u64,
	pub(crate) guard: DeliveryGuard,
	closed: AtomicBool,
	faults: AtomicU64,
}

impl CaptureGate {
	pub(crate) fn new(session_id: u64) -> Self {
		Self {
			session_id,
			guard: DeliveryGuard::new(),
			closed: AtomicBool::new(false),
			faults: AtomicU64::new(0),
		}
	}

	/// Closes the gate; returns `true` if this call closed it.
	pub(crate) fn close(&self) -> bool {
		!self.closed.swap(true, Ordering::AcqRel)
	}

	pub(crate) fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	pub(crate) fn faults(&self) -> u64 {
		self.faults.load(Ordering::Relaxed)
	}
}

/// Builds the handler the decoder invokes for every frame.
///
/// The guard is checked and set before `on_accept` runs, so attempts that
/// race in behind the first success observe it already set.
pub(crate) fn attempt_handler<A, F>(gate: Arc<CaptureGate>, on_accept: A, on_fault: F) -> AttemptHandler
where
	A: Fn(String) + Send + Sync + 'static,
	F: Fn(u64) + Send + Sync + 'static,
{
	Arc::new(move |attempt| match attempt {
		DecodeAttempt::Decoded(text) => {
			if gate.is_closed() {
				trace!(target: "barscan.capture", session = gate.session_id, "ignoring attempt after session closed");
				return;
			}
			if !gate.guard.try_claim() {
				trace!(target: "barscan.capture", session = gate.session_id, "ignoring duplicate decode");
				return;
			}
			if !gate.close() {
				trace!(target: "barscan.capture", session = gate.session_id, "session closed while accepting decode");
				return;
			}
			on_accept(text);
		}
		DecodeAttempt::NotFound => {}
		DecodeAttempt::Fault(message) => {
			let count = gate.faults.fetch_add(1, Ordering::Relaxed) + 1;
			debug!(target: "barscan.capture", session = gate.session_id, count, %message, "engine fault on frame; continuing");
			on_fault(count);
		}
	})
}

/// Owns the session's decoder and binds it to a device and surface.
#[derive(Clone)]
pub struct CaptureLoop {
	decoder: Arc<dyn Decoder>,
}

impl CaptureLoop {
	/// Creates a fresh decoder configured with `hints`.
	pub fn new(engine: &dyn DecodingEngine, hints: DecodeHints) -> Result<Self> {
		let decoder = engine.create_decoder(hints)?;
		Ok(Self { decoder })
	}

	pub fn hints(&self) -> &DecodeHints {
		self.decoder.hints()
	}

	/// Opens `device`, attaches its stream to `surface`, and starts attempts.
	pub async fn begin_capture(&self, device: &DeviceHandle, surface: &RenderSurface, on_attempt: AttemptHandler) -> Result<Arc<dyn ScanControl>> {
		debug!(
			target: "barscan.capture",
			device = %device.id,
			formats = self.hints().formats.len(),
			"opening camera stream"
		);
		let control = self.decoder.decode_from_device(&device.id, surface, on_attempt).await?;
		debug!(target: "barscan.capture", device = %device.id, "capture started");
		Ok(control)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;

	fn counting_handler(gate: Arc<CaptureGate>) -> (AttemptHandler, Arc<parking_lot::Mutex<Vec<String>>>, Arc<AtomicUsize>) {
		let accepted = Arc::new(parking_lot::Mutex::new(Vec::new()));
		let faults = Arc::new(AtomicUsize::new(0));
		let handler = attempt_handler(
			gate,
			{
				let accepted = Arc::clone(&accepted);
				move |text| accepted.lock().push(text)
			},
			{
				let faults = Arc::clone(&faults);
				move |_| {
					faults.fetch_add(1, Ordering::SeqCst);
				}
			},
		);
		(handler, accepted, faults)
	}

	#[test]
	fn guard_claims_once_until_reset() {
		let guard = DeliveryGuard::new();
		assert!(guard.try_claim());
		assert!(!guard.try_claim());
		assert!(guard.is_set());
		guard.reset();
		assert!(!guard.is_set());
		assert!(guard.try_claim());
	}

	#[test]
	fn only_first_decode_is_accepted() {
		let gate = Arc::new(CaptureGate::new(1));
		let (handler, accepted, _) = counting_handler(Arc::clone(&gate));

		handler(DecodeAttempt::NotFound);
		handler(DecodeAttempt::Decoded("first".to_string()));
		handler(DecodeAttempt::Decoded("second".to_string()));
		handler(DecodeAttempt::Decoded("first".to_string()));

		assert_eq!(*accepted.lock(), vec!["first".to_string()]);
		assert!(gate.is_closed());
		assert!(gate.guard.is_set());
	}

	#[test]
	fn decode_after_reset_on_closed_gate_is_ignored() {
		let gate = Arc::new(CaptureGate::new(1));
		let (handler, accepted, _) = counting_handler(Arc::clone(&gate));

		handler(DecodeAttempt::Decoded("first".to_string()));
		gate.guard.reset();
		handler(DecodeAttempt::Decoded("late".to_string()));

		assert_eq!(accepted.lock().len(), 1);
	}

	#[test]
	fn closed_gate_rejects_everything() {
		let gate = Arc::new(CaptureGate::new(1));
		assert!(gate.close());
		assert!(!gate.close());

		let (handler, accepted, _) = counting_handler(Arc::clone(&gate));
		handler(DecodeAttempt::Decoded("012345678905".to_string()));
		assert!(accepted.lock().is_empty());
		assert!(!gate.guard.is_set());
	}

	#[test]
	fn faults_are_counted_not_accepted() {
		let gate = Arc::new(CaptureGate::new(1));
		let (handler, accepted, faults) = counting_handler(Arc::clone(&gate));

		handler(DecodeAttempt::Fault("checksum".to_string()));
		handler(DecodeAttempt::Fault("format".to_string()));

		assert!(accepted.lock().is_empty());
		assert_eq!(faults.load(Ordering::SeqCst), 2);
		assert_eq!(gate.faults(), 2);
		assert!(!gate.is_closed());
	}

	#[test]
	fn concurrent_decodes_deliver_once() {
		let gate = Arc::new(CaptureGate::new(1));
		let (handler, accepted, _) = counting_handler(Arc::clone(&gate));

		let threads: Vec<_> = (0..8)
			.map(|i| {
				let handler = Arc::clone(&handler);
				std::thread::spawn(move || handler(DecodeAttempt::Decoded(format!("code-{i}"))))
			})
			.collect();
		for thread in threads {
			thread.join().unwrap();
		}

		assert_eq!(accepted.lock().len(), 1);
	}
}
