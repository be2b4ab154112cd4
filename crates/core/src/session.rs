//! Scan session orchestration.
//!
//! [`ScanSessionController`] runs at most one session at a time:
//!
//! 1. retire any previous session (close, release, signal completion)
//! 2. create a fresh decoder and resolve a device
//! 3. begin capture; the first accepted decode is delivered via `on_result`
//! 4. release, then signal `on_complete(true)` whatever the release outcome
//!
//! Acquisition failures never escape [`ScanSessionController::start_session`];
//! they land in the session snapshot as a user-visible error.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use scan_protocol::{SessionSnapshot, SessionStatus};
use tokio::runtime::Handle;
use tokio::sync::{Notify, watch};
use tracing::{debug, info, warn};

use crate::capture::{CaptureGate, CaptureLoop, attempt_handler};
use crate::config::ScanConfig;
use crate::engine::{DecodeHints, DecodingEngine};
use crate::error::{ReleaseError, Result, ScanError};
use crate::release::{self, ReleaseReport, SessionResources};
use crate::selector;
use crate::surface::RenderSurface;

/// Receives the decoded text. Called at most once per session.
pub type ResultCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Signals the session has fully ended; `true` when a result was delivered.
pub type CompleteCallback = Arc<dyn Fn(bool) + Send + Sync>;

struct ActiveSession {
	id: u64,
	gate: Arc<CaptureGate>,
	resources: tokio::sync::Mutex<SessionResources>,
	on_complete: CompleteCallback,
	runtime: Handle,
	cancel: Notify,
}

impl ActiveSession {
	/// Runs `future` unless the session is cancelled first.
	async fn until_cancelled<F: Future>(&self, future: F) -> Option<F::Output> {
		tokio::select! {
			biased;
			_ = self.cancel.notified() => None,
			output = future => Some(output),
		}
	}
}

struct Shared {
	engine: Arc<dyn DecodingEngine>,
	config: ScanConfig,
	hints: DecodeHints,
	surface: RenderSurface,
	state: watch::Sender<SessionSnapshot>,
	active: Mutex<Option<Arc<ActiveSession>>>,
	next_id: AtomicU64,
}

/// Controller for camera scan sessions.
pub struct ScanSessionController {
	shared: Arc<Shared>,
	lifecycle: tokio::sync::Mutex<()>,
}

impl ScanSessionController {
	/// Builds a controller. `config` is validated and fixed from here on.
	pub fn new(engine: Arc<dyn DecodingEngine>, config: ScanConfig, surface: RenderSurface) -> Result<Self> {
		config.validate()?;
		let hints = config.decode_hints();
		let (state, _) = watch::channel(SessionSnapshot::default());
		Ok(Self {
			shared: Arc::new(Shared {
				engine,
				config,
				hints,
				surface,
				state,
				active: Mutex::new(None),
				next_id: AtomicU64::new(0),
			}),
			lifecycle: tokio::sync::Mutex::new(()),
		})
	}

	pub fn config(&self) -> &ScanConfig {
		&self.shared.config
	}

	pub fn surface(&self) -> &RenderSurface {
		&self.shared.surface
	}

	/// Current state of the most recent session.
	pub fn snapshot(&self) -> SessionSnapshot {
		self.shared.state.borrow().clone()
	}

	/// Status feed for the caller's message area.
	pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
		self.shared.state.subscribe()
	}

	/// Starts a new session, retiring any previous one first.
	///
	/// Returns the snapshot once the session is scanning, completed, or
	/// failed, or as soon as a concurrent stop cancels the acquisition.
	pub async fn start_session<R, C>(&self, on_result: R, on_complete: C) -> SessionSnapshot
	where
		R: Fn(&str) + Send + Sync + 'static,
		C: Fn(bool) + Send + Sync + 'static,
	{
		self.shared.interrupt();
		let _lifecycle = self.lifecycle.lock().await;

		let previous = self.shared.active.lock().take();
		if let Some(previous) = previous {
			if let Err(err) = self.shared.retire(previous).await {
				warn!(target: "barscan.session", error = %err, "previous session did not release cleanly");
			}
		}

		let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
		let session = Arc::new(ActiveSession {
			id,
			gate: Arc::new(CaptureGate::new(id)),
			resources: tokio::sync::Mutex::new(SessionResources::default()),
			on_complete: Arc::new(on_complete),
			runtime: Handle::current(),
			cancel: Notify::new(),
		});
		*self.shared.active.lock() = Some(Arc::clone(&session));
		self.shared.state.send_replace(SessionSnapshot {
			session_id: id,
			status: SessionStatus::Acquiring,
			..Default::default()
		});
		info!(target: "barscan.session", session = id, "scan session starting");

		if let Err(err) = Shared::acquire(&self.shared, &session, Arc::new(on_result)).await {
			self.shared.fail(&session, err).await;
		}

		self.snapshot()
	}

	/// Stops the current session without a result.
	///
	/// A session still waiting on the camera is cancelled first. Release
	/// failures are returned to the caller and recorded in the snapshot.
	pub async fn stop_session(&self) -> Result<()> {
		self.shared.interrupt();
		let _lifecycle = self.lifecycle.lock().await;

		let Some(session) = self.shared.active.lock().clone() else {
			debug!(target: "barscan.session", "stop requested with no session");
			return Ok(());
		};

		let won = session.gate.close();
		let released = self.shared.release_session(&session).await;
		if won {
			self.shared.update(session.id, |snapshot| snapshot.status = SessionStatus::Stopped);
			info!(target: "barscan.session", session = session.id, "scan session stopped");
			(session.on_complete)(false);
		}
		released.map(|_| ()).map_err(ScanError::from)
	}

	/// Releases the current session for good (owner disposal).
	///
	/// The error is logged and also returned so the owner knows cleanup was incomplete.
	pub async fn shutdown(&self) -> Result<()> {
		self.shared.interrupt();
		let _lifecycle = self.lifecycle.lock().await;

		let Some(session) = self.shared.active.lock().take() else {
			return Ok(());
		};
		self.shared.retire(session).await.map_err(|err| {
			warn!(target: "barscan.session", error = %err, "teardown release incomplete");
			ScanError::from(err)
		})
	}
}

impl Drop for ScanSessionController {
	fn drop(&mut self) {
		let Some(session) = self.shared.active.lock().take() else {
			return;
		};
		session.cancel.notify_one();
		if !session.gate.is_closed() || !session.resources.try_lock().is_ok_and(|resources| resources.is_empty()) {
			let shared = Arc::clone(&self.shared);
			let runtime = session.runtime.clone();
			runtime.spawn(async move {
				if let Err(err) = shared.retire(session).await {
					warn!(target: "barscan.session", error = %err, "teardown release incomplete");
				}
			});
		}
	}
}

impl Shared {
	/// Wakes an acquisition that is waiting on enumeration or the camera.
	fn interrupt(&self) {
		if let Some(session) = self.active.lock().as_ref() {
			session.cancel.notify_one();
		}
	}

	async fn acquire(this: &Arc<Self>, session: &Arc<ActiveSession>, on_result: ResultCallback) -> Result<()> {
		let capture = CaptureLoop::new(this.engine.as_ref(), this.hints.clone())?;
		session.resources.lock().await.capture = Some(capture.clone());

		let Some(device) = session.until_cancelled(selector::resolve_device(this.engine.as_ref(), &this.config.preferred_label)).await else {
			debug!(target: "barscan.session", session = session.id, "acquisition cancelled during enumeration");
			return Ok(());
		};
		let device = device?;
		this.update(session.id, |snapshot| snapshot.device = Some(device.clone()));

		let handler = attempt_handler(
			Arc::clone(&session.gate),
			Self::on_accept(Arc::downgrade(this), Arc::downgrade(session), on_result),
			{
				let shared = Arc::downgrade(this);
				let id = session.id;
				move |faults| {
					if let Some(shared) = shared.upgrade() {
						shared.update(id, |snapshot| snapshot.engine_faults = faults);
					}
				}
			},
		);

		// Locked until control and stream are recorded; a release spawned by an
		// early decode waits here.
		let mut resources = session.resources.lock().await;
		let Some(control) = session.until_cancelled(capture.begin_capture(&device, &this.surface, handler)).await else {
			resources.stream = this.surface.current();
			debug!(target: "barscan.session", session = session.id, "acquisition cancelled while opening the camera");
			return Ok(());
		};
		resources.control = Some(control?);
		resources.stream = this.surface.current();
		let late = session.gate.is_closed();
		drop(resources);

		if late {
			debug!(target: "barscan.session", session = session.id, "session closed while capture was starting; releasing late handles");
			if let Err(err) = this.release_session(session).await {
				warn!(target: "barscan.session", session = session.id, error = %err, "late release incomplete");
			}
			return Ok(());
		}

		this.update(session.id, |snapshot| {
			if snapshot.status == SessionStatus::Acquiring {
				snapshot.status = SessionStatus::Scanning;
			}
		});
		info!(target: "barscan.session", session = session.id, device = %device, "scanning");
		Ok(())
	}

	/// Runs synchronously inside the attempt handler after the guard was claimed.
	fn on_accept(shared: Weak<Self>, session: Weak<ActiveSession>, on_result: ResultCallback) -> impl Fn(String) + Send + Sync + 'static {
		move |text| {
			let (Some(shared), Some(session)) = (shared.upgrade(), session.upgrade()) else {
				return;
			};
			shared.update(session.id, |snapshot| {
				snapshot.status = SessionStatus::Completed;
				snapshot.has_delivered = true;
			});
			info!(target: "barscan.session", session = session.id, len = text.len(), "code decoded");
			on_result(&text);

			let runtime = session.runtime.clone();
			runtime.spawn(async move {
				if let Err(err) = shared.release_session(&session).await {
					warn!(target: "barscan.session", session = session.id, error = %err, "release after scan incomplete; completing anyway");
				}
				(session.on_complete)(true);
			});
		}
	}

	async fn fail(&self, session: &ActiveSession, err: ScanError) {
		warn!(target: "barscan.session", session = session.id, error = %err, "scan session failed");
		session.gate.close();
		if let Err(release_err) = self.release_session(session).await {
			warn!(target: "barscan.session", session = session.id, error = %release_err, "release after failure incomplete");
		}
		self.update(session.id, |snapshot| {
			snapshot.status = SessionStatus::Failed;
			snapshot.last_error = err.to_session_error();
		});
	}

	/// Closes, releases, and signals completion for a session being replaced or disposed.
	async fn retire(&self, session: Arc<ActiveSession>) -> std::result::Result<(), ReleaseError> {
		let won = session.gate.close();
		let released = self.release_session(&session).await;
		if won {
			self.update(session.id, |snapshot| snapshot.status = SessionStatus::Stopped);
			debug!(target: "barscan.session", session = session.id, "session retired before completing");
			(session.on_complete)(false);
		}
		released.map(|_| ())
	}

	async fn release_session(&self, session: &ActiveSession) -> std::result::Result<ReleaseReport, ReleaseError> {
		let mut resources = session.resources.lock().await;
		let released = release::release(&mut resources, &self.surface, &session.gate.guard).await;
		drop(resources);

		let error = released.as_ref().err().map(|err| ScanError::Release(err.clone()).to_session_error());
		self.update(session.id, |snapshot| {
			snapshot.has_delivered = session.gate.guard.is_set();
			snapshot.engine_faults = session.gate.faults();
			if let Some(error) = error {
				snapshot.last_error = error;
			}
		});
		released
	}

	/// Applies `f` only while the snapshot still belongs to session `id`.
	fn update(&self, id: u64, f: impl FnOnce(&mut SessionSnapshot)) {
		self.state.send_if_modified(|snapshot| {
			if snapshot.session_id != id {
				return false;
			}
			let before = snapshot.clone();
			f(snapshot);
			*snapshot != before
		});
	}
}
