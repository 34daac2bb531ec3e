//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - HTTPS transport (`reqwest` blocking client)
//! - Host metadata probe (OS, locale, time zone, disk space)
//! - Tracing integration (Layer trait)

pub mod clock;
pub mod host;
pub mod layer;
pub mod transport;
pub(crate) mod visitor;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for the
/// clock, the HTTP transport and the host probe.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// tracing-exceptional = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
