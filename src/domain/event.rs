//! Log events as seen by the reporter.
//!
//! A [`LogEvent`] is a framework-neutral copy of everything the report needs:
//! severity, message, where it was logged from, and any captured error trace.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::Level;

/// Where an event was logged from. Every component is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Class or module path
    pub class_name: Option<String>,
    /// Method or function name
    pub method_name: Option<String>,
    /// Line number as reported by the logging framework
    pub line_number: Option<String>,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(
        class_name: Option<String>,
        method_name: Option<String>,
        line_number: Option<String>,
    ) -> Self {
        Self {
            class_name,
            method_name,
            line_number,
        }
    }
}

/// A single log event handed to the appender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Severity
    pub level: Level,
    /// Display message
    pub message: String,
    /// When the event was logged
    pub timestamp: DateTime<Utc>,
    /// Name of the thread that logged the event
    pub thread_name: String,
    /// Logging target (module path by default in `tracing`)
    pub target: String,
    /// Source location used for the fingerprint
    pub location: SourceLocation,
    /// Rendered lines of a captured error or stack trace
    pub backtrace: Option<Vec<String>>,
    /// Remaining structured fields
    pub fields: BTreeMap<String, String>,
}

impl LogEvent {
    /// Create an event logged now on the current thread, with no location.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            thread_name: current_thread_name(),
            target: String::new(),
            location: SourceLocation::default(),
            backtrace: None,
            fields: BTreeMap::new(),
        }
    }

    /// Set the source location.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Attach the rendered lines of a captured error.
    pub fn with_backtrace(mut self, lines: Vec<String>) -> Self {
        self.backtrace = Some(lines);
        self
    }

    /// Attach a captured error, rendering it and its source chain as trace lines.
    pub fn with_error(self, error: &(dyn std::error::Error + 'static)) -> Self {
        self.with_backtrace(render_error_chain(error))
    }

    /// Override the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the thread name.
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Set the logging target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Add a structured field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Format a brief description of the event for diagnostics.
    ///
    /// Returns a string like: `[ERROR] app::db: Connection failed`
    pub fn format_brief(&self) -> String {
        format!("[{}] {}: {}", self.level, self.target, self.message)
    }
}

/// Render an error as trace lines: its own message first, then one line per source.
pub fn render_error_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut lines = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("Caused by: {}", cause));
        source = cause.source();
    }
    lines
}

/// Name of the current thread, or its id for unnamed threads.
pub fn current_thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}
