//! One report from start to finish: build, callback, submit.

use crate::application::builder::ReportBuilder;
use crate::application::metrics::Metrics;
use crate::application::ports::ReportCallback;
use crate::application::submitter::{SubmitOutcome, Submitter};
use crate::domain::event::LogEvent;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the report pipeline for accepted events.
#[derive(Clone)]
pub struct ReportPipeline {
    builder: ReportBuilder,
    callback: Arc<dyn ReportCallback>,
    submitter: Submitter,
    metrics: Metrics,
}

impl ReportPipeline {
    /// Create a pipeline.
    pub fn new(
        builder: ReportBuilder,
        callback: Arc<dyn ReportCallback>,
        submitter: Submitter,
        metrics: Metrics,
    ) -> Self {
        Self {
            builder,
            callback,
            submitter,
            metrics,
        }
    }

    /// Build and submit the report for one event.
    ///
    /// Returns `None` when the callback vetoed the submission.
    pub fn process(&self, event: &LogEvent) -> Option<SubmitOutcome> {
        info!(event = %event.format_brief(), "reporting error");

        let mut report = self.builder.build(event);
        if !self
            .callback
            .before_submit(&mut report.application_environment.env, event)
        {
            debug!("report cancelled by callback");
            self.metrics.record_vetoed();
            return None;
        }

        Some(self.submitter.submit(&report))
    }
}

impl fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("builder", &self.builder)
            .field("callback", &"<callback>")
            .field("submitter", &self.submitter)
            .finish()
    }
}
