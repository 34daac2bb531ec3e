//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::event::LogEvent;
use crate::domain::report::{Environment, HostSnapshot};
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use thiserror::Error;

/// Port for obtaining the current wall-clock time.
///
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Port for collecting host metadata.
///
/// Called once per report, never cached. Implementations must not fail:
/// anything that cannot be determined is left at a fallback value.
pub trait HostProbe: Send + Sync + Debug {
    /// Take a snapshot of the host.
    fn snapshot(&self) -> HostSnapshot;
}

/// Error returned by an [`HttpTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be converted for the underlying client
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, TLS or I/O failure while sending or reading the response
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Port for sending HTTP requests.
///
/// Implementations must read the response body to completion before
/// returning so the underlying connection can be released or reused.
pub trait HttpTransport: Send + Sync + Debug {
    /// Execute a request and return the full response.
    fn execute(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, TransportError>;
}

/// Hook invoked with every report right before it is submitted.
///
/// The callback may add or edit data in the `env` section. Returning `false`
/// cancels the submission.
///
/// Any `Fn(&mut Environment, &LogEvent) -> bool` closure is a callback:
///
/// ```
/// use tracing_exceptional::ExceptionalLayer;
///
/// let layer = ExceptionalLayer::builder("api-key")
///     .with_callback(|env: &mut tracing_exceptional::Environment, _event: &tracing_exceptional::LogEvent| {
///         env.insert("release", "1.4.2");
///         true
///     })
///     .with_threading(false)
///     .build()
///     .unwrap();
/// # drop(layer);
/// ```
pub trait ReportCallback: Send + Sync {
    /// Inspect and possibly modify the environment; `false` suppresses the send.
    fn before_submit(&self, env: &mut Environment, event: &LogEvent) -> bool;
}

impl<F> ReportCallback for F
where
    F: Fn(&mut Environment, &LogEvent) -> bool + Send + Sync,
{
    fn before_submit(&self, env: &mut Environment, event: &LogEvent) -> bool {
        self(env, event)
    }
}

/// Default callback that accepts every report unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ReportCallback for AcceptAll {
    fn before_submit(&self, _env: &mut Environment, _event: &LogEvent) -> bool {
        true
    }
}
