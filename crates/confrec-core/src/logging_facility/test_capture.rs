//! Test capture mode for deterministic logging assertions
//!
//! A subscriber layer that keeps every event in memory so tests can assert on
//! the canonical `op` / `event` / `package` fields.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use confrec_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, FIELD_EVENT, FIELD_OP, FIELD_PACKAGE, FIELD_RUN_ID,
};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One captured event, with the correlation fields pulled out
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub package: Option<String>,
    pub run_id: Option<String>,
    /// Every field, rendered as text
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn is_terminal(&self) -> bool {
        matches!(self.event.as_deref(), Some(EVENT_END) | Some(EVENT_END_ERROR))
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    log: EventLog,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let fields = visitor.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            package: fields.get(FIELD_PACKAGE).cloned(),
            run_id: fields.get(FIELD_RUN_ID).cloned(),
            fields,
        };

        if let Ok(mut log) = self.log.lock() {
            log.push(captured);
        }
    }
}

/// Shared handle on the captured events
///
/// The capture is process-global, so tests filter by a package name or run
/// id of their own.
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_for_package(&self, package: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.package.as_deref() == Some(package))
    }

    pub fn events_for_run(&self, run_id: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.run_id.as_deref() == Some(run_id))
    }

    /// `end` / `end_error` events for a package, oldest first
    pub fn outcomes_for_package(&self, package: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.package.as_deref() == Some(package) && e.is_terminal())
    }

    /// # Panics
    ///
    /// Panics if no event has this `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events
                .iter()
                .any(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event)),
            "Expected event op={} event={} among {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.filtered(predicate).len()
    }

    fn filtered<F>(&self, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Initialize test capture mode
///
/// Installs the capture layer as the global subscriber on first call and
/// returns the shared handle on every call.
///
/// ```
/// use confrec_core::logging_facility::test_capture::init_test_capture;
/// use confrec_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("normalize");
/// capture.assert_event_exists("normalize", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let log = EventLog::default();
            let layer = CaptureLayer { log: log.clone() };
            tracing_subscriber::registry().with(layer).try_init().ok();
            TestCapture { log }
        })
        .clone()
}
