//! Domain layer - value types with no I/O.
//!
//! This layer contains the core concepts of error reporting:
//! - Log events and their source locations
//! - Fingerprints used for deduplication
//! - The error report payload
//! - Text sanitizers
//!
//! All types in this layer are pure and easily testable.

pub mod event;
pub mod fingerprint;
pub mod report;
pub mod sanitizer;
