//! # tracing-exceptional
//!
//! Error reporting to the [Exceptional](https://www.exceptional.io) service for the
//! `tracing` ecosystem.
//!
//! This crate provides a `tracing::Layer` that turns error events into
//! Exceptional error reports (protocol version 6), gzips them and sends them
//! over HTTPS. Reporting is best effort: failures are logged and dropped, and
//! nothing ever propagates back to the code that logged the event.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tracing_exceptional::ExceptionalLayer;
//! use tracing_subscriber::prelude::*;
//!
//! // Report WARN and ERROR events from a background thread
//! let exceptional = ExceptionalLayer::builder("your-api-key")
//!     .build()
//!     .unwrap();
//!
//! tracing_subscriber::registry()
//!     .with(exceptional.clone())
//!     .init();
//!
//! tracing::error!("payment gateway unreachable");
//!
//! // Send whatever is still queued before exiting
//! exceptional.shutdown().unwrap();
//! ```
//!
//! ## What Gets Reported
//!
//! 1. Events less severe than the reporting level (default `WARN`) are ignored.
//! 2. Events are deduplicated by their **source location**: module path,
//!    enclosing span name and line. The message is not part of the
//!    fingerprint, so a loop logging the same error with different details
//!    produces one report.
//! 3. The last 200 fingerprints are remembered. Once the cache is full the
//!    oldest fingerprint is forgotten and can be reported again.
//!
//! ```rust,no_run
//! # use tracing::error;
//! for id in 0..1000 {
//!     error!(order_id = id, "order rejected");  // Reported once
//! }
//! ```
//!
//! Events from this crate, from ignored targets and from code running inside
//! the report pipeline (for example an HTTP client logging a warning while a
//! report is being sent) are never reported.
//!
//! ## Mapping `tracing` Events
//!
//! | Report value | Taken from |
//! |--------------|------------|
//! | message | the `message` field |
//! | exception class | module path (or target) |
//! | method name | innermost enclosing span, e.g. an `#[instrument]`ed function |
//! | line number | callsite line |
//! | backtrace | an error recorded as a field (with its `source()` chain), then the lines of a `backtrace` field |
//! | `env.fields` | all other fields |
//!
//! ```rust,no_run
//! # use tracing::error;
//! # let err = std::io::Error::other("disk full");
//! error!(error = &err as &(dyn std::error::Error + 'static), "could not save invoice");
//! ```
//!
//! ## Sanitizing
//!
//! Messages, backtrace lines and field values pass through a chain of
//! sanitizers before they leave the process:
//!
//! ```rust,no_run
//! # use tracing_exceptional::{ExceptionalLayer, Ipv4Sanitizer, RegexSanitizer};
//! let layer = ExceptionalLayer::builder("your-api-key")
//!     .with_sanitizer(Ipv4Sanitizer::new())                              // 10.0.0.1 -> ???.???.???.???
//!     .with_sanitizer(RegexSanitizer::new(r"token=\w+", "token=***").unwrap())
//!     .with_sanitizer(|text: &str| text.replace("secret", "******"))   // any closure works
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Customizing Reports
//!
//! A callback sees every report before it is sent. It can add keys to the
//! `env` section or veto the submission:
//!
//! ```rust,no_run
//! # use tracing_exceptional::{ExceptionalLayer, Environment, LogEvent};
//! let layer = ExceptionalLayer::builder("your-api-key")
//!     .with_callback(|env: &mut Environment, event: &LogEvent| {
//!         env.insert("release", env!("CARGO_PKG_VERSION"));
//!         event.target != "myapp::healthcheck"
//!     })
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Disabling Reporting
//!
//! Use [`NO_OP_KEY`] as the API key (for example in development). No network
//! traffic happens; an informational event notes every event offered to the
//! layer, whatever its level.
//!
//! ## Failed Submissions
//!
//! If the service answers with a non-2xx status, the response body is written
//! to `bug_error.html` in the working directory (configurable) and the status
//! and headers are logged at `WARN`. Connection failures are logged at `ERROR`.
//! Reports are never retried.
//!
//! ## Observability
//!
//! ```rust,no_run
//! # use tracing_exceptional::ExceptionalLayer;
//! # let layer = ExceptionalLayer::builder("key").build().unwrap();
//! let snapshot = layer.metrics().snapshot();
//! println!("delivered: {}", snapshot.reports_delivered);
//! println!("duplicate rate: {:.2}%", snapshot.duplicate_rate() * 100.0);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    event::{LogEvent, SourceLocation},
    fingerprint::Fingerprint,
    report::{Environment, ErrorReport, HostSnapshot},
    sanitizer::{Ipv4Sanitizer, RegexSanitizer, Sanitizer, SanitizerChain},
};

pub use application::{
    dedup::DedupCache,
    dispatcher::ShutdownError,
    metrics::{Metrics, MetricsSnapshot},
    ports::{AcceptAll, Clock, HostProbe, HttpTransport, ReportCallback, TransportError},
    submitter::SubmitOutcome,
};

pub use infrastructure::{
    clock::SystemClock,
    host::SystemHostProbe,
    layer::{BuildError, ExceptionalLayer, ExceptionalLayerBuilder, NO_OP_KEY},
    transport::ReqwestTransport,
};
