//! Shared rendering surface slot.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::MediaStream;

/// Video rendering target holding at most one stream at a time.
///
/// Clones share the same slot. Decoders attach the stream they open; the
/// release routine clears it.
#[derive(Clone, Default)]
pub struct RenderSurface {
	slot: Arc<Mutex<Option<Arc<dyn MediaStream>>>>,
}

impl RenderSurface {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assigns `stream`, returning whatever it replaced.
	pub fn attach(&self, stream: Arc<dyn MediaStream>) -> Option<Arc<dyn MediaStream>> {
		self.slot.lock().replace(stream)
	}

	/// Clears the slot unconditionally.
	pub fn detach(&self) -> Option<Arc<dyn MediaStream>> {
		self.slot.lock().take()
	}

	/// Clears the slot only if it still holds `stream`.
	pub fn detach_if(&self, stream: &Arc<dyn MediaStream>) -> bool {
		let mut slot = self.slot.lock();
		match slot.as_ref() {
			Some(current) if Arc::ptr_eq(current, stream) => {
				*slot = None;
				true
			}
			_ => false,
		}
	}

	pub fn current(&self) -> Option<Arc<dyn MediaStream>> {
		self.slot.lock().clone()
	}

	pub fn is_clear(&self) -> bool {
		self.slot.lock().is_none()
	}
}

impl fmt::Debug for RenderSurface {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let slot = self.slot.lock();
		f.debug_struct("RenderSurface")
			.field("stream", &slot.as_ref().map(|stream| stream.id().to_string()))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::MediaTrack;

	struct BareStream(&'static str);

	impl MediaStream for BareStream {
		fn id(&self) -> &str {
			self.0
		}

		fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
			Vec::new()
		}
	}

	#[test]
	fn attach_overwrites_previous_stream() {
		let surface = RenderSurface::new();
		assert!(surface.is_clear());
		assert!(surface.attach(Arc::new(BareStream("a"))).is_none());

		let replaced = surface.attach(Arc::new(BareStream("b"))).unwrap();
		assert_eq!(replaced.id(), "a");
		assert_eq!(surface.current().unwrap().id(), "b");
	}

	#[test]
	fn clones_share_the_slot() {
		let surface = RenderSurface::new();
		let view = surface.clone();
		surface.attach(Arc::new(BareStream("a")));
		assert!(!view.is_clear());
		assert_eq!(view.detach().unwrap().id(), "a");
		assert!(surface.is_clear());
	}

	#[test]
	fn detach_if_leaves_foreign_stream_alone() {
		let surface = RenderSurface::new();
		let ours: Arc<dyn MediaStream> = Arc::new(BareStream("ours"));
		surface.attach(Arc::new(BareStream("theirs")));

		assert!(!surface.detach_if(&ours));
		assert_eq!(surface.current().unwrap().id(), "theirs");

		surface.attach(Arc::clone(&ours));
		assert!(surface.detach_if(&ours));
		assert!(surface.is_clear());
		assert_eq!(format!("{surface:?}"), "RenderSurface { stream: None }");
	}
}
