//! HTTPS transport backed by the `reqwest` blocking client.

use crate::application::ports::{HttpTransport, TransportError};
use reqwest::blocking::Client;
use std::sync::OnceLock;

/// [`HttpTransport`] that sends requests with a blocking `reqwest` client.
///
/// The client is created on first use, so in background mode it is built,
/// used and dropped on the worker thread only. In inline mode the first
/// report creates it on the logging thread, which must then not be an async
/// runtime worker.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    client: OnceLock<Client>,
}

impl ReqwestTransport {
    /// Create a transport with a lazily built default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: OnceLock::from(client),
        }
    }

    fn client(&self) -> Result<&Client, TransportError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Request(Box::new(e)))?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, TransportError> {
        let client = self.client()?;
        let (parts, body) = request.into_parts();

        let response = client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .map_err(|e| TransportError::Request(Box::new(e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        // Read the body to completion so the connection is released.
        let body = response
            .bytes()
            .map_err(|e| TransportError::Request(Box::new(e)))?
            .to_vec();

        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
