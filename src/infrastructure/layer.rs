//! Tracing integration layer.
//!
//! Provides a `tracing::Layer` implementation that reports error events to
//! the Exceptional error tracking service.

use crate::application::{
    builder::ReportBuilder,
    dedup::{DedupCache, DedupDecision, DEFAULT_DEDUP_CAPACITY},
    dispatcher::{is_reporting_thread, BackgroundWorker, Dispatcher, ShutdownError},
    metrics::Metrics,
    pipeline::ReportPipeline,
    ports::{AcceptAll, Clock, HostProbe, HttpTransport, ReportCallback},
    submitter::{Submitter, DEFAULT_ENDPOINT, DEFAULT_FAILURE_BODY_PATH},
};
use crate::domain::event::{current_thread_name, LogEvent, SourceLocation};
use crate::domain::fingerprint::Fingerprint;
use crate::domain::sanitizer::{Sanitizer, SanitizerChain};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::host::SystemHostProbe;
use crate::infrastructure::transport::ReqwestTransport;
use crate::infrastructure::visitor::EventVisitor;

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level, Subscriber};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::Context, Layer};

/// API key that disables reporting entirely.
pub const NO_OP_KEY: &str = "no_op_key";

/// Default minimum severity that gets reported.
pub const DEFAULT_REPORTING_LEVEL: Level = Level::WARN;

/// Events from this crate are never reported.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Error returned when building an ExceptionalLayer fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Dedup capacity must be greater than zero
    ZeroDedupCapacity,
    /// The background reporting thread could not be started
    SpawnWorker(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ZeroDedupCapacity => {
                write!(f, "dedup capacity must be greater than 0")
            }
            BuildError::SpawnWorker(e) => {
                write!(f, "failed to spawn report worker: {}", e)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder for constructing an `ExceptionalLayer`.
pub struct ExceptionalLayerBuilder {
    api_key: String,
    reporting_level: Level,
    callback: Option<Arc<dyn ReportCallback>>,
    threading: bool,
    transport: Option<Arc<dyn HttpTransport>>,
    sanitizers: SanitizerChain,
    dedup_capacity: usize,
    endpoint: String,
    failure_body_path: PathBuf,
    ignored_targets: BTreeSet<String>,
    clock: Option<Arc<dyn Clock>>,
    host_probe: Option<Arc<dyn HostProbe>>,
}

impl ExceptionalLayerBuilder {
    /// Set the minimum severity that gets reported.
    ///
    /// Events less severe than this level are discarded. Default: `WARN`.
    pub fn with_reporting_level(mut self, level: Level) -> Self {
        self.reporting_level = level;
        self
    }

    /// Set the callback invoked with every report before it is sent.
    ///
    /// The callback can add or edit values in the `env` section, or return
    /// `false` to cancel the submission.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use tracing_exceptional::{ExceptionalLayer, Environment, LogEvent};
    /// let layer = ExceptionalLayer::builder("api-key")
    ///     .with_callback(|env: &mut Environment, event: &LogEvent| {
    ///         env.insert("service", "billing");
    ///         // Never report timeouts
    ///         !event.message.contains("timed out")
    ///     })
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn with_callback(mut self, callback: impl ReportCallback + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Choose between background (`true`, default) and inline submission.
    ///
    /// In background mode a single worker thread sends reports in the order
    /// they were accepted. Inline mode sends on the logging thread and blocks
    /// it for the duration of the HTTP round trip.
    pub fn with_threading(mut self, threading: bool) -> Self {
        self.threading = threading;
        self
    }

    /// Set the HTTP transport. Default: a blocking `reqwest` client.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Append a sanitizer to the chain.
    ///
    /// Sanitizers run in registration order over the message, every
    /// backtrace line and every extra field value.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use tracing_exceptional::{ExceptionalLayer, Ipv4Sanitizer, RegexSanitizer};
    /// let layer = ExceptionalLayer::builder("api-key")
    ///     .with_sanitizer(Ipv4Sanitizer::new())
    ///     .with_sanitizer(RegexSanitizer::new(r"password=\S+", "password=***").unwrap())
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizers.push(Arc::new(sanitizer));
        self
    }

    /// Set how many recently reported fingerprints are remembered.
    ///
    /// Default: 200. The value will be validated when `build()` is called.
    pub fn with_dedup_capacity(mut self, capacity: usize) -> Self {
        self.dedup_capacity = capacity;
        self
    }

    /// Override the service endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override where the body of a rejected submission is written.
    pub fn with_failure_body_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_body_path = path.into();
        self
    }

    /// Never report events from these targets.
    ///
    /// A target is ignored when it equals an entry or is a submodule of it
    /// (`hyper` ignores `hyper::proto::h1` but not `hyperlocal`). Empty
    /// entries are filtered out. This crate's own target is always ignored.
    pub fn with_ignored_targets(mut self, targets: Vec<String>) -> Self {
        self.ignored_targets
            .extend(targets.into_iter().filter(|t| !t.is_empty()));
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set a custom host probe (mainly for testing).
    pub fn with_host_probe(mut self, probe: Arc<dyn HostProbe>) -> Self {
        self.host_probe = Some(probe);
        self
    }

    /// Build the layer.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid or the worker
    /// thread cannot be spawned.
    pub fn build(self) -> Result<ExceptionalLayer, BuildError> {
        if self.dedup_capacity == 0 {
            return Err(BuildError::ZeroDedupCapacity);
        }

        let metrics = Metrics::new();
        let dedup = DedupCache::new(self.dedup_capacity).with_metrics(metrics.clone());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        let dispatcher = if self.api_key == NO_OP_KEY {
            info!("no-op API key configured, error reporting is disabled");
            None
        } else {
            let transport = self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
            let host = self
                .host_probe
                .unwrap_or_else(|| Arc::new(SystemHostProbe::new()));
            let callback = self.callback.unwrap_or_else(|| Arc::new(AcceptAll));

            let submitter = Submitter::new(transport, self.api_key)
                .with_endpoint(self.endpoint)
                .with_failure_body_path(self.failure_body_path)
                .with_metrics(metrics.clone());
            let pipeline = ReportPipeline::new(
                ReportBuilder::new(self.sanitizers, host),
                callback,
                submitter,
                metrics.clone(),
            );

            let dispatcher = if self.threading {
                let worker = BackgroundWorker::spawn(pipeline)
                    .map_err(|e| BuildError::SpawnWorker(e.to_string()))?;
                Dispatcher::Background(worker)
            } else {
                Dispatcher::Inline(pipeline)
            };
            Some(dispatcher)
        };

        debug!(
            reporting_level = %self.reporting_level,
            threading = self.threading,
            dedup_capacity = self.dedup_capacity,
            "error reporter configured"
        );

        let mut ignored_targets = self.ignored_targets;
        ignored_targets.insert(OWN_TARGET.to_string());

        Ok(ExceptionalLayer {
            inner: Arc::new(Inner {
                reporting_level: self.reporting_level,
                dedup,
                dispatcher,
                clock,
                ignored_targets,
                metrics,
            }),
        })
    }
}

struct Inner {
    reporting_level: Level,
    dedup: DedupCache,
    /// `None` when the no-op key disables reporting
    dispatcher: Option<Dispatcher>,
    clock: Arc<dyn Clock>,
    ignored_targets: BTreeSet<String>,
    metrics: Metrics,
}

/// A `tracing::Layer` that reports error events to Exceptional.
///
/// Events at or above the reporting level are deduplicated by source
/// location, turned into an error report and sent. Reporting never blocks
/// or fails the caller in background mode, and never fails it in inline mode.
///
/// Clones share the same dedup cache, metrics and worker.
#[derive(Clone)]
pub struct ExceptionalLayer {
    inner: Arc<Inner>,
}

impl ExceptionalLayer {
    /// Create a builder for configuring the layer.
    ///
    /// Defaults:
    /// - Reporting level: `WARN`
    /// - Threading: background worker
    /// - Transport: blocking `reqwest` client
    /// - Sanitizers: none
    /// - Callback: accept every report unchanged
    /// - Dedup capacity: 200 fingerprints
    /// - Endpoint: `https://www.exceptional.io/api/errors`
    /// - Failure body file: `bug_error.html` in the working directory
    ///
    /// Passing [`NO_OP_KEY`] as the API key disables all network activity.
    pub fn builder(api_key: impl Into<String>) -> ExceptionalLayerBuilder {
        ExceptionalLayerBuilder {
            api_key: api_key.into(),
            reporting_level: DEFAULT_REPORTING_LEVEL,
            callback: None,
            threading: true,
            transport: None,
            sanitizers: SanitizerChain::new(),
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            failure_body_path: PathBuf::from(DEFAULT_FAILURE_BODY_PATH),
            ignored_targets: BTreeSet::new(),
            clock: None,
            host_probe: None,
        }
    }

    /// Offer an event for reporting.
    ///
    /// When reporting is disabled every offered event only produces a notice.
    /// Otherwise filters by level, drops recently reported fingerprints and
    /// hands the rest to the dispatcher. Never panics or returns an error.
    pub fn append(&self, event: LogEvent) {
        let inner = &self.inner;

        let Some(dispatcher) = &inner.dispatcher else {
            info!(event = %event.format_brief(), "error reporting disabled, not reporting event");
            return;
        };

        if event.level > inner.reporting_level {
            inner.metrics.record_filtered();
            return;
        }

        let fingerprint = Fingerprint::from_location(&event.location);
        match inner.dedup.check_and_insert(fingerprint) {
            DedupDecision::Duplicate => {
                inner.metrics.record_duplicate();
                debug!(event = %event.format_brief(), "duplicate error, not reporting");
                return;
            }
            DedupDecision::Accepted { evicted } => {
                if let Some(evicted) = evicted {
                    debug!(fingerprint = %evicted, "evicted oldest fingerprint");
                }
                inner.metrics.record_accepted();
            }
        }

        dispatcher.dispatch(event);
    }

    /// Minimum severity that gets reported.
    pub fn reporting_level(&self) -> Level {
        self.inner.reporting_level
    }

    /// Check whether reports are actually sent (the API key is not the no-op key).
    pub fn is_active(&self) -> bool {
        self.inner.dispatcher.is_some()
    }

    /// Check whether reports are sent from the background worker.
    pub fn is_threaded(&self) -> bool {
        self.inner
            .dispatcher
            .as_ref()
            .is_some_and(Dispatcher::is_background)
    }

    /// Get a reference to the metrics.
    ///
    /// Returns metrics about reporting behavior including:
    /// - Events accepted, filtered and suppressed as duplicates
    /// - Reports delivered, rejected, failed and vetoed
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Get a reference to the dedup cache.
    pub fn dedup(&self) -> &DedupCache {
        &self.inner.dedup
    }

    /// Shut down the background worker after it sends every queued report.
    ///
    /// Events accepted afterwards are dropped with a warning. Does nothing in
    /// inline mode, when reporting is disabled, or when called again.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked.
    pub fn shutdown(&self) -> Result<(), ShutdownError> {
        match &self.inner.dispatcher {
            Some(dispatcher) => dispatcher.shutdown(),
            None => Ok(()),
        }
    }

    fn is_ignored_target(&self, target: &str) -> bool {
        self.inner
            .ignored_targets
            .iter()
            .any(|ignored| is_same_or_submodule(target, ignored))
    }

    /// Convert a tracing event into a [`LogEvent`].
    fn to_log_event<S>(&self, event: &tracing::Event<'_>, ctx: &Context<'_, S>) -> LogEvent
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        let metadata = event.metadata();

        let mut visitor = EventVisitor::new();
        event.record(&mut visitor);
        let visited = visitor.finish();

        let location = SourceLocation::new(
            Some(metadata.module_path().unwrap_or(metadata.target()).to_string()),
            ctx.event_span(event).map(|span| span.name().to_string()),
            metadata.line().map(|line| line.to_string()),
        );

        LogEvent {
            level: *metadata.level(),
            message: visited
                .message
                .unwrap_or_else(|| metadata.name().to_string()),
            timestamp: self.inner.clock.now(),
            thread_name: current_thread_name(),
            target: metadata.target().to_string(),
            location,
            backtrace: visited.trace,
            fields: visited.fields,
        }
    }
}

fn is_same_or_submodule(target: &str, module: &str) -> bool {
    target
        .strip_prefix(module)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl fmt::Debug for ExceptionalLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionalLayer")
            .field("reporting_level", &self.inner.reporting_level)
            .field("active", &self.is_active())
            .field("threaded", &self.is_threaded())
            .field("dedup_capacity", &self.inner.dedup.capacity())
            .field("ignored_targets", &self.inner.ignored_targets)
            .finish()
    }
}

impl<S> Layer<S> for ExceptionalLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Events logged while a report is built or sent would feed back into
        // the reporter.
        if is_reporting_thread() || self.is_ignored_target(metadata.target()) {
            return;
        }

        // Cheap level check before touching any fields. Disabled reporting
        // still sees every event so it can log the notice.
        if self.is_active() && *metadata.level() > self.inner.reporting_level {
            self.inner.metrics.record_filtered();
            return;
        }

        self.append(self.to_log_event(event, &ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::Environment;
    use crate::infrastructure::mocks::{FixedHostProbe, MockClock, MockTransport};
    use chrono::{TimeZone, Utc};
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tracing_subscriber::layer::SubscriberExt;

    fn inline_layer(transport: &Arc<MockTransport>) -> ExceptionalLayerBuilder {
        ExceptionalLayer::builder("test-key")
            .with_threading(false)
            .with_transport(transport.clone())
            .with_host_probe(Arc::new(FixedHostProbe::default()))
    }

    fn located(level: Level, line: u32) -> LogEvent {
        LogEvent::new(level, format!("failure at line {line}")).with_location(
            SourceLocation::new(
                Some("app::db".to_string()),
                Some("connect".to_string()),
                Some(line.to_string()),
            ),
        )
    }

    fn payload(transport: &MockTransport, index: usize) -> serde_json::Value {
        let mut json = String::new();
        GzDecoder::new(transport.requests()[index].body.as_slice())
            .read_to_string(&mut json)
            .unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_layer_builder_defaults() {
        let layer = ExceptionalLayer::builder("key").build().unwrap();

        assert_eq!(layer.reporting_level(), Level::WARN);
        assert!(layer.is_active());
        assert!(layer.is_threaded());
        assert_eq!(layer.dedup().capacity(), 200);
        assert!(layer.dedup().is_empty());
        layer.shutdown().unwrap();
    }

    #[test]
    fn test_zero_dedup_capacity_rejected() {
        let result = ExceptionalLayer::builder("key")
            .with_dedup_capacity(0)
            .build();

        assert_eq!(result.unwrap_err(), BuildError::ZeroDedupCapacity);
    }

    #[test]
    fn test_build_error_display() {
        assert_eq!(
            BuildError::ZeroDedupCapacity.to_string(),
            "dedup capacity must be greater than 0"
        );
        assert_eq!(
            BuildError::SpawnWorker("out of threads".to_string()).to_string(),
            "failed to spawn report worker: out of threads"
        );
    }

    #[test]
    fn test_events_below_reporting_level_are_filtered() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport).build().unwrap();

        layer.append(located(Level::INFO, 1));
        layer.append(located(Level::DEBUG, 2));

        assert_eq!(transport.request_count(), 0);
        assert!(layer.dedup().is_empty());
        assert_eq!(layer.metrics().events_filtered(), 2);
    }

    #[test]
    fn test_events_at_or_above_reporting_level_are_sent() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport).build().unwrap();

        layer.append(located(Level::WARN, 1));
        layer.append(located(Level::ERROR, 2));

        assert_eq!(transport.request_count(), 2);
        assert_eq!(layer.metrics().events_accepted(), 2);
        assert_eq!(layer.metrics().reports_delivered(), 2);
    }

    #[test]
    fn test_custom_reporting_level() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport)
            .with_reporting_level(Level::ERROR)
            .build()
            .unwrap();

        layer.append(located(Level::WARN, 1));
        layer.append(located(Level::ERROR, 2));

        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_duplicate_fingerprint_sent_once() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport).build().unwrap();

        layer.append(located(Level::ERROR, 42));
        let same_place = LogEvent::new(Level::ERROR, "a different message").with_location(
            SourceLocation::new(
                Some("app::db".to_string()),
                Some("connect".to_string()),
                Some("42".to_string()),
            ),
        );
        layer.append(same_place);

        assert_eq!(transport.request_count(), 1);
        assert_eq!(layer.metrics().duplicates_suppressed(), 1);
    }

    #[test]
    fn test_fingerprint_without_location() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport).build().unwrap();

        layer.append(LogEvent::new(Level::ERROR, "first"));
        layer.append(LogEvent::new(Level::ERROR, "second"));

        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_no_op_key_disables_reporting() {
        let transport = Arc::new(MockTransport::new());
        let layer = ExceptionalLayer::builder(NO_OP_KEY)
            .with_threading(false)
            .with_transport(transport.clone())
            .build()
            .unwrap();

        for line in 0..5 {
            layer.append(located(Level::ERROR, line));
        }

        assert!(!layer.is_active());
        assert!(!layer.is_threaded());
        assert_eq!(transport.request_count(), 0);
        assert!(layer.dedup().is_empty());
        assert!(layer.shutdown().is_ok());
    }

    #[test]
    fn test_no_op_key_notices_every_event_regardless_of_level() {
        use std::sync::Mutex;
        use tracing_subscriber::layer::Context as LayerContext;

        #[derive(Clone, Default)]
        struct Notices(Arc<Mutex<Vec<String>>>);

        impl<S: Subscriber> Layer<S> for Notices {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
                if event.metadata().target().starts_with(OWN_TARGET)
                    && *event.metadata().level() == Level::INFO
                {
                    let mut visitor = EventVisitor::new();
                    event.record(&mut visitor);
                    if let Some(message) = visitor.finish().message {
                        self.0.lock().unwrap().push(message);
                    }
                }
            }
        }

        let layer = ExceptionalLayer::builder(NO_OP_KEY)
            .with_threading(false)
            .build()
            .unwrap();
        let notices = Notices::default();

        let subscriber = tracing_subscriber::registry()
            .with(layer.clone())
            .with(notices.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "app::db", "verbose detail");
            tracing::error!(target: "app::db", "real failure");
            layer.append(located(Level::TRACE, 3));
        });

        let notices = notices.0.lock().unwrap();
        assert_eq!(notices.len(), 3);
        assert!(notices
            .iter()
            .all(|n| n == "error reporting disabled, not reporting event"));
        assert_eq!(layer.metrics().events_filtered(), 0);
    }

    #[test]
    fn test_ignored_target_matching() {
        assert!(is_same_or_submodule("hyper", "hyper"));
        assert!(is_same_or_submodule("hyper::proto::h1", "hyper"));
        assert!(!is_same_or_submodule("hyperlocal", "hyper"));
        assert!(!is_same_or_submodule("app", "hyper"));
    }

    #[test]
    fn test_tracing_event_is_reported() {
        let transport = Arc::new(MockTransport::new());
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let layer = inline_layer(&transport)
            .with_clock(Arc::new(MockClock::new(start)))
            .build()
            .unwrap();

        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::error_span!("load_profile");
            let _entered = span.enter();
            tracing::error!(target: "app::profile", user_id = 7, "profile missing");
        });

        assert_eq!(transport.request_count(), 1);
        let json = payload(&transport, 0);
        let env = &json["application_environment"]["env"];

        assert_eq!(json["exception"]["message"], "profile missing");
        assert_eq!(
            json["exception"]["exception_class"],
            "tracing_exceptional::infrastructure::layer::tests"
        );
        assert_eq!(
            json["exception"]["occurred_at"],
            "2024-01-15T10:30:00.000+00:00"
        );
        assert_eq!(env["methodName"], "load_profile");
        assert_eq!(env["logLevel"], "ERROR");
        assert_eq!(env["fields"]["user_id"], "7");
        assert!(env["lineNumber"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_own_and_ignored_targets_are_skipped() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport)
            .with_ignored_targets(vec!["noisy".to_string(), String::new()])
            .build()
            .unwrap();

        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, || {
            // Default target is this module, inside the crate.
            tracing::error!("internal failure");
            tracing::error!(target: "noisy::driver", "noisy failure");
        });

        assert_eq!(transport.request_count(), 0);
        assert_eq!(layer.metrics().events_filtered(), 0);
    }

    #[test]
    fn test_events_logged_by_callback_are_not_reported() {
        let transport = Arc::new(MockTransport::new());
        let layer = inline_layer(&transport)
            .with_callback(|_env: &mut Environment, _event: &LogEvent| {
                tracing::error!(target: "app::callback", "logged while reporting");
                true
            })
            .build()
            .unwrap();

        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "app::db", "original failure");
        });

        assert_eq!(transport.request_count(), 1);
        assert_eq!(payload(&transport, 0)["exception"]["message"], "original failure");
    }
}
