//! Shared helpers for integration tests.

#![allow(dead_code)]

use flate2::read::GzDecoder;
use std::io::Read;
use std::sync::Arc;
use tracing_exceptional::infrastructure::mocks::{FixedHostProbe, MockTransport, RecordedRequest};
use tracing_exceptional::{ExceptionalLayer, ExceptionalLayerBuilder, HostSnapshot};

/// Gunzip a recorded request body.
pub fn body_text(request: &RecordedRequest) -> String {
    let mut json = String::new();
    GzDecoder::new(request.body.as_slice())
        .read_to_string(&mut json)
        .expect("body is gzip-compressed UTF-8");
    json
}

/// Gunzip and parse a recorded request body.
pub fn report(request: &RecordedRequest) -> serde_json::Value {
    serde_json::from_str(&body_text(request)).expect("body is JSON")
}

/// Exception messages of every request sent so far, oldest first.
pub fn messages(transport: &MockTransport) -> Vec<String> {
    transport
        .requests()
        .iter()
        .map(|request| {
            report(request)["exception"]["message"]
                .as_str()
                .expect("message is a string")
                .to_string()
        })
        .collect()
}

/// Transport answering `200 OK`.
pub fn ok_transport() -> Arc<MockTransport> {
    Arc::new(MockTransport::new())
}

/// Host probe with fixed values.
pub fn host() -> Arc<FixedHostProbe> {
    Arc::new(FixedHostProbe::new(HostSnapshot {
        rust_version: "1.85.0".to_string(),
        os_name: "Linux".to_string(),
        os_arch: "x86_64".to_string(),
        os_version: "6.1".to_string(),
        language: "en".to_string(),
        country: "GB".to_string(),
        time_zone: "Europe/London".to_string(),
        free_disk_mb: Some(2048),
    }))
}

/// Builder reporting synchronously to `transport`.
pub fn inline_builder(transport: &Arc<MockTransport>) -> ExceptionalLayerBuilder {
    ExceptionalLayer::builder("integration-key")
        .with_threading(false)
        .with_transport(transport.clone())
        .with_host_probe(host())
}

/// Builder reporting from the background worker to `transport`.
pub fn background_builder(transport: &Arc<MockTransport>) -> ExceptionalLayerBuilder {
    ExceptionalLayer::builder("integration-key")
        .with_transport(transport.clone())
        .with_host_probe(host())
}
