use std::sync::Arc;
use std::time::Duration;

use barscan::sim::SimulatedEngineBuilder;
use barscan::{DeviceHandle, RenderSurface, ScanConfig, ScanSessionController};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Clone, Default)]
struct TargetRecorder {
	events: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl<S: Subscriber> Layer<S> for TargetRecorder {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();
		let fields = metadata.fields().iter().map(|field| field.name().to_string()).collect();
		self.events.lock().push((metadata.target().to_string(), fields));
	}
}

#[tokio::test]
async fn scan_events_carry_subsystem_targets() {
	let recorder = TargetRecorder::default();
	let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(recorder.clone()));

	let (engine, sim) = SimulatedEngineBuilder::new().device(DeviceHandle::new("2", "Back Camera")).build();
	let controller = ScanSessionController::new(Arc::new(engine), ScanConfig::default(), RenderSurface::new()).expect("default config is valid");
	let (tx, mut completions) = mpsc::unbounded_channel();
	controller
		.start_session(|_code: &str| {}, move |delivered| {
			let _ = tx.send(delivered);
		})
		.await;
	assert!(sim.decoded("012345678905"));
	let delivered = tokio::time::timeout(Duration::from_secs(2), completions.recv()).await.expect("completion should be signalled");
	assert_eq!(delivered, Some(true));

	let events = recorder.events.lock().clone();
	let targets: Vec<&str> = events.iter().map(|(target, _)| target.as_str()).collect();
	assert!(targets.contains(&"barscan.session"), "targets: {targets:?}");
	assert!(targets.contains(&"barscan.device"), "targets: {targets:?}");
	for (target, fields) in &events {
		if target.starts_with("barscan") {
			assert!(!target.contains("::"), "event logged under module path {target}");
			assert!(!fields.iter().any(|field| field == "target"), "target recorded as a field on {target}");
		}
	}
}
