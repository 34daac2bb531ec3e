//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Dedup cache (recently reported fingerprints)
//! - Report builder, submitter and the pipeline tying them together
//! - Dispatcher (inline or background worker)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod builder;
pub mod dedup;
pub mod dispatcher;
pub mod metrics;
pub mod pipeline;
pub mod ports;
pub mod submitter;
