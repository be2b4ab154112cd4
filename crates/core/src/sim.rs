//! Simulated camera host for tests and scripted replays.
//!
//! Provides an in-memory [`DecodingEngine`] so the session controller can be
//! exercised without a camera.
//!
//! # Example
//!
//! ```ignore
//! let (engine, sim) = SimulatedEngineBuilder::new()
//!     .device(DeviceHandle::new("2", "Back Camera"))
//!     .build();
//! let controller = ScanSessionController::new(Arc::new(engine), ScanConfig::default(), RenderSurface::new())?;
//!
//! controller.start_session(|code| println!("{code}"), |_| {}).await;
//! sim.decoded("012345678905");
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scan_protocol::{DeviceHandle, ScanScript, ScriptedAttempt};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::{AttemptHandler, DecodeAttempt, DecodeHints, Decoder, DecodingEngine, EngineError, MediaStream, MediaTrack, ScanControl, TrackState};
use crate::surface::RenderSurface;

/// Builder for simulated hosts.
#[derive(Debug, Clone)]
pub struct SimulatedEngineBuilder {
	devices: Vec<DeviceHandle>,
	enumeration_error: Option<String>,
	deny_permission: Option<String>,
	track_kinds: Vec<String>,
	failing_tracks: Vec<usize>,
	control_stop_error: Option<String>,
	on_open: Vec<DecodeAttempt>,
	hang_on_open: bool,
}

impl SimulatedEngineBuilder {
	pub fn new() -> Self {
		Self {
			devices: Vec::new(),
			enumeration_error: None,
			deny_permission: None,
			track_kinds: vec!["video".to_string()],
			failing_tracks: Vec::new(),
			control_stop_error: None,
			on_open: Vec::new(),
			hang_on_open: false,
		}
	}

	/// Builder pre-populated from a script.
	pub fn from_script(script: &ScanScript) -> Self {
		let mut builder = Self::new().devices(script.devices.iter().cloned());
		builder.enumeration_error = script.enumeration_error.clone();
		builder.deny_permission = script.deny_permission.clone();
		if !script.track_kinds.is_empty() {
			builder.track_kinds = script.track_kinds.clone();
		}
		builder
	}

	pub fn device(mut self, device: DeviceHandle) -> Self {
		self.devices.push(device);
		self
	}

	pub fn devices(mut self, devices: impl IntoIterator<Item = DeviceHandle>) -> Self {
		self.devices.extend(devices);
		self
	}

	/// Enumeration fails with [`EngineError::Internal`].
	pub fn fail_enumeration(mut self, message: impl Into<String>) -> Self {
		self.enumeration_error = Some(message.into());
		self
	}

	/// Opening any device fails with [`EngineError::PermissionDenied`].
	pub fn deny_permission(mut self, message: impl Into<String>) -> Self {
		self.deny_permission = Some(message.into());
		self
	}

	/// Track kinds carried by each opened stream.
	pub fn track_kinds<I, S>(mut self, kinds: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.track_kinds = kinds.into_iter().map(Into::into).collect();
		self
	}

	/// The track at `index` refuses to stop.
	pub fn fail_track_stop(mut self, index: usize) -> Self {
		self.failing_tracks.push(index);
		self
	}

	/// Stopping the control handle reports an error (capture still halts).
	pub fn fail_control_stop(mut self, message: impl Into<String>) -> Self {
		self.control_stop_error = Some(message.into());
		self
	}

	/// Attempts delivered while the stream is still opening, before the
	/// control handle is returned.
	pub fn emit_on_open(mut self, attempt: DecodeAttempt) -> Self {
		self.on_open.push(attempt);
		self
	}

	/// Opening never resolves, like a permission prompt nobody answers.
	pub fn hang_on_open(mut self) -> Self {
		self.hang_on_open = true;
		self
	}

	pub fn build(self) -> (SimulatedEngine, SimulatedEngineController) {
		let host = Arc::new(Host {
			state: Mutex::new(HostState {
				config: self,
				decoders: Vec::new(),
				opened: Vec::new(),
				tracks: Vec::new(),
				capture: None,
				control_stops: 0,
				streams: 0,
				pending_opens: 0,
			}),
			capture_started: Notify::new(),
			open_pending: Notify::new(),
		});
		(
			SimulatedEngine { host: Arc::clone(&host) },
			SimulatedEngineController { host },
		)
	}
}

impl Default for SimulatedEngineBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct Host {
	state: Mutex<HostState>,
	capture_started: Notify,
	open_pending: Notify,
}

struct HostState {
	config: SimulatedEngineBuilder,
	decoders: Vec<DecodeHints>,
	opened: Vec<String>,
	tracks: Vec<Arc<SimulatedTrack>>,
	capture: Option<ActiveCapture>,
	control_stops: usize,
	streams: usize,
	pending_opens: usize,
}

struct ActiveCapture {
	handler: AttemptHandler,
	stopped: Arc<AtomicBool>,
}

impl HostState {
	fn live_handler(&self) -> Option<AttemptHandler> {
		self.capture
			.as_ref()
			.filter(|capture| !capture.stopped.load(Ordering::Acquire))
			.map(|capture| Arc::clone(&capture.handler))
	}
}

/// In-memory [`DecodingEngine`].
pub struct SimulatedEngine {
	host: Arc<Host>,
}

#[async_trait]
impl DecodingEngine for SimulatedEngine {
	async fn enumerate_video_inputs(&self) -> Result<Vec<DeviceHandle>, EngineError> {
		let state = self.host.state.lock();
		if let Some(message) = &state.config.enumeration_error {
			return Err(EngineError::Internal(message.clone()));
		}
		Ok(state.config.devices.clone())
	}

	fn create_decoder(&self, hints: DecodeHints) -> Result<Arc<dyn Decoder>, EngineError> {
		self.host.state.lock().decoders.push(hints.clone());
		Ok(Arc::new(SimulatedDecoder {
			hints,
			host: Arc::clone(&self.host),
		}))
	}
}

struct SimulatedDecoder {
	hints: DecodeHints,
	host: Arc<Host>,
}

#[async_trait]
impl Decoder for SimulatedDecoder {
	fn hints(&self) -> &DecodeHints {
		&self.hints
	}

	async fn decode_from_device(&self, device_id: &str, surface: &RenderSurface, on_attempt: AttemptHandler) -> Result<Arc<dyn ScanControl>, EngineError> {
		let hang = {
			let mut state = self.host.state.lock();
			if state.config.hang_on_open {
				state.pending_opens += 1;
			}
			state.config.hang_on_open
		};
		if hang {
			debug!(target: "barscan.sim", device = device_id, "open pending forever");
			self.host.open_pending.notify_waiters();
			std::future::pending::<()>().await;
		}

		let (stream, control, on_open) = {
			let mut state = self.host.state.lock();
			if let Some(message) = &state.config.deny_permission {
				return Err(EngineError::PermissionDenied(message.clone()));
			}
			if !state.config.devices.iter().any(|device| device.id == device_id) {
				return Err(EngineError::DeviceNotFound(device_id.to_string()));
			}

			state.streams += 1;
			let stream_id = format!("stream-{}", state.streams);
			let tracks: Vec<Arc<SimulatedTrack>> = state
				.config
				.track_kinds
				.iter()
				.enumerate()
				.map(|(index, kind)| {
					Arc::new(SimulatedTrack {
						id: format!("{stream_id}/{kind}-{index}"),
						kind: kind.clone(),
						state: Mutex::new(TrackState::Live),
						fail_stop: state.config.failing_tracks.contains(&index),
					})
				})
				.collect();
			state.tracks.extend(tracks.iter().cloned());

			let stopped = Arc::new(AtomicBool::new(false));
			state.capture = Some(ActiveCapture {
				handler: Arc::clone(&on_attempt),
				stopped: Arc::clone(&stopped),
			});
			state.opened.push(device_id.to_string());

			let control = SimulatedControl {
				host: Arc::clone(&self.host),
				stopped,
				error: state.config.control_stop_error.clone(),
			};
			(SimulatedStream { id: stream_id, tracks }, control, state.config.on_open.clone())
		};

		debug!(target: "barscan.sim", device = device_id, stream = %stream.id, "stream opened");
		surface.attach(Arc::new(stream));
		self.host.capture_started.notify_waiters();

		for attempt in on_open {
			on_attempt(attempt);
		}
		Ok(Arc::new(control))
	}
}

struct SimulatedControl {
	host: Arc<Host>,
	stopped: Arc<AtomicBool>,
	error: Option<String>,
}

#[async_trait]
impl ScanControl for SimulatedControl {
	async fn stop(&self) -> Result<(), EngineError> {
		self.stopped.store(true, Ordering::Release);
		{
			let mut state = self.host.state.lock();
			state.control_stops += 1;
			if state.capture.as_ref().is_some_and(|capture| Arc::ptr_eq(&capture.stopped, &self.stopped)) {
				state.capture = None;
			}
		}
		debug!(target: "barscan.sim", "capture control stopped");
		match &self.error {
			Some(message) => Err(EngineError::Internal(message.clone())),
			None => Ok(()),
		}
	}
}

struct SimulatedStream {
	id: String,
	tracks: Vec<Arc<SimulatedTrack>>,
}

impl MediaStream for SimulatedStream {
	fn id(&self) -> &str {
		&self.id
	}

	fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
		self.tracks.iter().map(|track| Arc::clone(track) as Arc<dyn MediaTrack>).collect()
	}
}

struct SimulatedTrack {
	id: String,
	kind: String,
	state: Mutex<TrackState>,
	fail_stop: bool,
}

impl MediaTrack for SimulatedTrack {
	fn id(&self) -> &str {
		&self.id
	}

	fn kind(&self) -> &str {
		&self.kind
	}

	fn ready_state(&self) -> TrackState {
		*self.state.lock()
	}

	fn stop(&self) -> Result<(), EngineError> {
		if self.fail_stop {
			return Err(EngineError::Internal("track is wedged".to_string()));
		}
		*self.state.lock() = TrackState::Ended;
		Ok(())
	}
}

/// Observed state of one simulated track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
	pub id: String,
	pub kind: String,
	pub state: TrackState,
}

/// Injects frame outcomes and inspects what the host was asked to do.
#[derive(Clone)]
pub struct SimulatedEngineController {
	host: Arc<Host>,
}

impl SimulatedEngineController {
	/// Delivers one attempt to the running capture.
	///
	/// Returns `false` when no capture is running (never started, or stopped).
	pub fn attempt(&self, attempt: DecodeAttempt) -> bool {
		let handler = self.host.state.lock().live_handler();
		match handler {
			Some(handler) => {
				handler(attempt);
				true
			}
			None => false,
		}
	}

	pub fn decoded(&self, text: &str) -> bool {
		self.attempt(DecodeAttempt::Decoded(text.to_string()))
	}

	pub fn is_capturing(&self) -> bool {
		self.host.state.lock().live_handler().is_some()
	}

	/// Device ids opened so far, in order.
	pub fn opened_devices(&self) -> Vec<String> {
		self.host.state.lock().opened.clone()
	}

	/// Most recently opened device id.
	pub fn opened_device(&self) -> Option<String> {
		self.host.state.lock().opened.last().cloned()
	}

	/// Every track ever created, across all streams.
	pub fn tracks(&self) -> Vec<TrackInfo> {
		self.host
			.state
			.lock()
			.tracks
			.iter()
			.map(|track| TrackInfo {
				id: track.id.clone(),
				kind: track.kind.clone(),
				state: track.ready_state(),
			})
			.collect()
	}

	pub fn control_stops(&self) -> usize {
		self.host.state.lock().control_stops
	}

	/// Hints of every decoder created so far.
	pub fn decoders_created(&self) -> Vec<DecodeHints> {
		self.host.state.lock().decoders.clone()
	}

	/// Waits until a capture is running.
	pub async fn wait_for_capture(&self) {
		loop {
			let notified = self.host.capture_started.notified();
			if self.is_capturing() {
				return;
			}
			notified.await;
		}
	}

	/// Waits until an open is stuck pending (see
	/// [`SimulatedEngineBuilder::hang_on_open`]).
	pub async fn wait_for_pending_open(&self) {
		loop {
			let notified = self.host.open_pending.notified();
			if self.host.state.lock().pending_opens > 0 {
				return;
			}
			notified.await;
		}
	}

	/// Replays `script` frames once capture begins, stopping early when the
	/// capture is cancelled.
	pub fn play(&self, script: &ScanScript) -> JoinHandle<usize> {
		let controller = self.clone();
		let frames = script.frames.clone();
		tokio::spawn(async move {
			controller.wait_for_capture().await;
			let mut delivered = 0;
			for frame in frames {
				if frame.delay_ms > 0 {
					tokio::time::sleep(Duration::from_millis(frame.delay_ms)).await;
				}
				let attempt = match frame.attempt {
					ScriptedAttempt::NotFound => DecodeAttempt::NotFound,
					ScriptedAttempt::Decoded { text } => DecodeAttempt::Decoded(text),
					ScriptedAttempt::Fault { message } => DecodeAttempt::Fault(message),
				};
				if !controller.attempt(attempt) {
					debug!(target: "barscan.sim", delivered, "capture ended; script replay stopped");
					break;
				}
				delivered += 1;
			}
			delivered
		})
	}
}
