//! Field visitor for turning a `tracing` event into report data.
//!
//! The `message` field becomes the event message, errors recorded through
//! `record_error` become trace lines (the error followed by its source chain),
//! and a field named `backtrace` is split into trace lines. Everything else is
//! kept as a structured field.

use crate::domain::event::render_error_chain;
use std::collections::BTreeMap;
use std::fmt;
use tracing::field::{Field, Visit};

const MESSAGE_FIELD: &str = "message";
const BACKTRACE_FIELD: &str = "backtrace";

/// Collects the fields of one event.
#[derive(Debug, Default)]
pub(crate) struct EventVisitor {
    message: Option<String>,
    errors: Vec<String>,
    backtrace: Vec<String>,
    fields: BTreeMap<String, String>,
}

/// What an [`EventVisitor`] collected.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct VisitedEvent {
    pub message: Option<String>,
    pub trace: Option<Vec<String>>,
    pub fields: BTreeMap<String, String>,
}

impl EventVisitor {
    /// Create a new visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the visitor and return what it collected.
    pub fn finish(self) -> VisitedEvent {
        // Error chains lead the trace, backtrace lines follow.
        let mut trace = self.errors;
        trace.extend(self.backtrace);

        VisitedEvent {
            message: self.message,
            trace: (!trace.is_empty()).then_some(trace),
            fields: self.fields,
        }
    }

    fn record_value(&mut self, field: &Field, value: String) {
        match field.name() {
            MESSAGE_FIELD => self.message = Some(value),
            BACKTRACE_FIELD => self.backtrace.extend(value.lines().map(str::to_string)),
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for EventVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.errors.extend(render_error_chain(value));
        if field.name() != MESSAGE_FIELD && field.name() != BACKTRACE_FIELD {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{:?}", value));
    }
}
