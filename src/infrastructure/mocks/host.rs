//! Fixed host probe for testing.

use crate::application::ports::HostProbe;
use crate::domain::report::HostSnapshot;

/// Host probe that always returns the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHostProbe {
    snapshot: HostSnapshot,
}

impl FixedHostProbe {
    /// Create a probe returning `snapshot`.
    pub fn new(snapshot: HostSnapshot) -> Self {
        Self { snapshot }
    }

    /// Simulate a failed disk space probe.
    pub fn without_disk_space(mut self) -> Self {
        self.snapshot.free_disk_mb = None;
        self
    }
}

impl Default for FixedHostProbe {
    fn default() -> Self {
        Self::new(HostSnapshot {
            rust_version: "1.80".to_string(),
            os_name: "TestOS".to_string(),
            os_arch: "x86_64".to_string(),
            os_version: "1.0".to_string(),
            language: "en".to_string(),
            country: "US".to_string(),
            time_zone: "+00:00".to_string(),
            free_disk_mb: Some(1024),
        })
    }
}

impl HostProbe for FixedHostProbe {
    fn snapshot(&self) -> HostSnapshot {
        self.snapshot.clone()
    }
}
