//! Host metadata probe backed by `sysinfo`, `sys-locale` and `chrono`.

use crate::application::ports::HostProbe;
use crate::domain::report::HostSnapshot;
use chrono::Local;
use std::path::Path;
use sysinfo::{Disks, System};

const UNKNOWN: &str = "unknown";

/// Version of the compiler that built this crate, captured by the build script.
const RUSTC_VERSION: &str = env!("EXCEPTIONAL_RUSTC_VERSION");

#[cfg(windows)]
const OS_ROOT: &str = "C:\\";
#[cfg(not(windows))]
const OS_ROOT: &str = "/";

/// Probes the running system. Every call takes a fresh snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostProbe;

impl SystemHostProbe {
    /// Create a new system probe.
    pub fn new() -> Self {
        Self
    }
}

impl HostProbe for SystemHostProbe {
    fn snapshot(&self) -> HostSnapshot {
        let (language, country) = sys_locale::get_locale()
            .map(|locale| split_locale(&locale))
            .unwrap_or_default();

        HostSnapshot {
            rust_version: RUSTC_VERSION.to_string(),
            os_name: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_arch: std::env::consts::ARCH.to_string(),
            os_version: System::os_version().unwrap_or_else(|| UNKNOWN.to_string()),
            language,
            country,
            time_zone: time_zone(),
            free_disk_mb: free_disk_mb(Path::new(OS_ROOT)),
        }
    }
}

/// Split a BCP 47 or POSIX locale (`en-US`, `de_DE.UTF-8`) into language and country.
fn split_locale(locale: &str) -> (String, String) {
    let base = locale.split(['.', '@']).next().unwrap_or_default();
    let mut parts = base.split(['-', '_']);

    let language = parts.next().unwrap_or_default().to_lowercase();
    let country = parts
        .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_uppercase)
        .unwrap_or_default();

    (language, country)
}

fn time_zone() -> String {
    match std::env::var("TZ") {
        Ok(tz) if !tz.is_empty() => tz,
        _ => Local::now().format("%:z").to_string(),
    }
}

/// Free space in megabytes on the disk mounted at `root`.
fn free_disk_mb(root: &Path) -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .iter()
        .find(|disk| disk.mount_point() == root)
        .map(|disk| disk.available_space() / (1024 * 1024))
}
