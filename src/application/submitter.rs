//! Report submission over HTTP.
//!
//! Serializes a report to JSON, gzips it and POSTs it to the error tracking
//! service. Nothing here ever returns an error to the caller: every failure
//! is logged and turned into a [`SubmitOutcome`].

use crate::application::metrics::Metrics;
use crate::application::ports::{HttpTransport, TransportError};
use crate::domain::report::{ErrorReport, PROTOCOL_VERSION};
use flate2::write::GzEncoder;
use flate2::Compression;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use http::Method;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

/// Default endpoint of the error tracking service.
pub const DEFAULT_ENDPOINT: &str = "https://www.exceptional.io/api/errors";

/// File the body of a rejected submission is written to.
pub const DEFAULT_FAILURE_BODY_PATH: &str = "bug_error.html";

/// Final state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service answered with a 2xx status
    Delivered,
    /// The service answered with another status
    Rejected {
        /// HTTP status code
        status: u16,
    },
    /// No response was obtained
    Failed,
}

/// Reasons a submission can fail before a response is received.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to compress report: {0}")]
    Compression(#[from] std::io::Error),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("failed to send report: {0}")]
    Transport(#[from] TransportError),
}

/// Sends error reports to the service.
#[derive(Debug, Clone)]
pub struct Submitter {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    api_key: String,
    failure_body_path: PathBuf,
    metrics: Metrics,
}

impl Submitter {
    /// Create a submitter using the default endpoint and failure file.
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            failure_body_path: PathBuf::from(DEFAULT_FAILURE_BODY_PATH),
            metrics: Metrics::new(),
        }
    }

    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override where rejected response bodies are written.
    pub fn with_failure_body_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_body_path = path.into();
        self
    }

    /// Attach metrics to record outcomes.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Full submission URL, with the API key and protocol version form-encoded
    /// into the query.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not an absolute URL.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.endpoint,
            [
                ("api_key", self.api_key.as_str()),
                ("protocol_version", PROTOCOL_VERSION),
            ],
        )
    }

    /// Submit a report. Failures are logged, never returned.
    pub fn submit(&self, report: &ErrorReport) -> SubmitOutcome {
        let outcome = match self.try_submit(report) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, chain = ?error_chain(&e), "error report submission failed");
                SubmitOutcome::Failed
            }
        };

        match outcome {
            SubmitOutcome::Delivered => self.metrics.record_delivered(),
            SubmitOutcome::Rejected { .. } => self.metrics.record_rejected(),
            SubmitOutcome::Failed => self.metrics.record_failed(),
        }
        outcome
    }

    fn try_submit(&self, report: &ErrorReport) -> Result<SubmitOutcome, SubmitError> {
        let payload = serde_json::to_string(report)?;
        debug!(payload = %payload, "serialized error report");

        let body = gzip(payload.as_bytes())?;
        let url = self.url()?;
        let request = http::Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(CONTENT_ENCODING, "gzip")
            .header(CONTENT_TYPE, "application/json")
            .body(body)?;

        debug!(endpoint = %self.endpoint, "sending error report");
        let response = self.transport.execute(request)?;
        let status = response.status();

        if status.is_success() {
            info!(status = status.as_u16(), "error report delivered");
            return Ok(SubmitOutcome::Delivered);
        }

        warn!(
            status = status.as_u16(),
            path = %self.failure_body_path.display(),
            "error report rejected, saving response body"
        );
        if let Err(e) = std::fs::write(&self.failure_body_path, response.body()) {
            warn!(
                error = %e,
                path = %self.failure_body_path.display(),
                "could not save rejected response body"
            );
        }
        for (name, value) in response.headers() {
            warn!(
                header = %name,
                value = %String::from_utf8_lossy(value.as_bytes()),
                "rejected response header"
            );
        }

        Ok(SubmitOutcome::Rejected {
            status: status.as_u16(),
        })
    }
}

/// Gzip `data` into a new buffer.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}
