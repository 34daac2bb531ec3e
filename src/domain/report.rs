//! Error report payload (Exceptional protocol version 6).
//!
//! The report is built fresh for every accepted event and serialized with
//! `serde_json`. Its top-level keys are `request`, `application_environment`,
//! `exception` and `client`.

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Protocol version sent in the query string and the client section.
pub const PROTOCOL_VERSION: &str = "6";

/// Client name reported in the `client` section.
pub const CLIENT_NAME: &str = "tracing-exceptional";

/// Value sent as `disk_space` when free space cannot be determined.
pub const UNBOUNDED_DISK_SPACE: i64 = i64::MAX;

/// The full error report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Request section (always empty)
    pub request: RequestData,
    /// Application environment section
    pub application_environment: ApplicationEnvironment,
    /// Exception section
    pub exception: ExceptionData,
    /// Client section
    pub client: ClientInfo,
}

/// Placeholder request section, serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestData {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationEnvironment {
    pub application_root_directory: String,
    pub env: Environment,
}

/// The `env` object: event details plus a snapshot of the host.
///
/// Report callbacks may edit any field or add their own keys with
/// [`Environment::insert`].
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub message: String,
    pub log_level: String,
    pub method_name: Option<String>,
    /// Parsed line number, -1 when missing or not a number
    pub line_number: i64,
    pub thread_name: String,
    pub rust_version: String,
    pub os_name: String,
    pub os_arch: String,
    pub os_version: String,
    pub language: String,
    pub country: String,
    pub time_zone: String,
    /// Free space on the OS root in megabytes, as a string
    pub disk_space: String,
    pub fields: BTreeMap<String, String>,
    /// Keys added through [`Environment::insert`]
    pub extra: BTreeMap<String, Value>,
}

impl Environment {
    /// Add or replace a key in the `env` object.
    ///
    /// A key with the same name as a built-in entry (`message`, `threadName`,
    /// `disk_space`, ...) replaces that entry in the serialized report.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }
}

/// Wire layout of the built-in `env` keys.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentKeys<'a> {
    message: &'a str,
    log_level: &'a str,
    method_name: Option<&'a str>,
    line_number: i64,
    thread_name: &'a str,
    rust_version: &'a str,
    os_name: &'a str,
    os_arch: &'a str,
    os_version: &'a str,
    language: &'a str,
    country: &'a str,
    time_zone: &'a str,
    #[serde(rename = "disk_space")]
    disk_space: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: &'a BTreeMap<String, String>,
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = EnvironmentKeys {
            message: &self.message,
            log_level: &self.log_level,
            method_name: self.method_name.as_deref(),
            line_number: self.line_number,
            thread_name: &self.thread_name,
            rust_version: &self.rust_version,
            os_name: &self.os_name,
            os_arch: &self.os_arch,
            os_version: &self.os_version,
            language: &self.language,
            country: &self.country,
            time_zone: &self.time_zone,
            disk_space: &self.disk_space,
            fields: &self.fields,
        };

        let mut map = match serde_json::to_value(keys).map_err(S::Error::custom)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        // Inserted keys win over built-in ones.
        map.extend(self.extra.iter().map(|(key, value)| (key.clone(), value.clone())));
        map.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionData {
    pub message: String,
    pub backtrace: Vec<String>,
    pub exception_class: String,
    /// RFC 3339 timestamp with millisecond precision
    pub occurred_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientInfo {
    pub client: String,
    pub version: String,
    pub protocol_version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            client: CLIENT_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
        }
    }
}

/// Host metadata gathered at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSnapshot {
    pub rust_version: String,
    pub os_name: String,
    pub os_arch: String,
    pub os_version: String,
    pub language: String,
    pub country: String,
    pub time_zone: String,
    /// Free space on the OS root in megabytes, `None` if the probe failed
    pub free_disk_mb: Option<u64>,
}

impl HostSnapshot {
    /// Free disk space as reported in the payload.
    pub fn disk_space_field(&self) -> String {
        match self.free_disk_mb {
            Some(mb) => mb.to_string(),
            None => UNBOUNDED_DISK_SPACE.to_string(),
        }
    }
}
