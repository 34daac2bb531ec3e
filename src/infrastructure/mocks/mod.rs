//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic without a network.

pub mod clock;
pub mod host;
pub mod transport;

pub use clock::MockClock;
pub use host::FixedHostProbe;
pub use transport::{MockTransport, RecordedRequest};
