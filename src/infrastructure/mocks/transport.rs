//! Recording HTTP transport for testing.

use crate::application::ports::{HttpTransport, TransportError};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::sync::{Arc, Mutex};

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    /// Raw (gzip-compressed) body
    pub body: Vec<u8>,
}

/// Transport that records every request and answers with a canned response.
///
/// Clones share the recorded requests.
///
/// ```
/// use tracing_exceptional::infrastructure::mocks::MockTransport;
///
/// let transport = MockTransport::new()
///     .with_response(422, "invalid api key")
///     .with_header("x-request-id", "abc");
/// assert_eq!(transport.request_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: u16,
    body: Vec<u8>,
    headers: Vec<(String, String)>,
    fail: bool,
}

impl MockTransport {
    /// Create a transport answering `200 OK` with an empty body.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status: 200,
            body: Vec::new(),
            headers: Vec::new(),
            fail: false,
        }
    }

    /// Answer with the given status and body.
    pub fn with_response(mut self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.status = status;
        self.body = body.into();
        self
    }

    /// Add a response header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Fail every request with a transport error, after recording it.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for MockTransport {
    fn execute(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, TransportError> {
        let (parts, body) = request.into_parts();
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .push(RecordedRequest {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            });

        if self.fail {
            return Err(TransportError::Request("connection refused".into()));
        }

        let mut response = http::Response::new(self.body.clone());
        *response.status_mut() = StatusCode::from_u16(self.status)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            response.headers_mut().append(name, value);
        }
        Ok(response)
    }
}
