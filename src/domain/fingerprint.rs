//! Fingerprint computation for error deduplication.
//!
//! A fingerprint identifies the place an error was logged from:
//! - Class (module path for `tracing` events)
//! - Method (innermost span name)
//! - Line number, exactly as reported
//!
//! Events with the same fingerprint are considered duplicates regardless of
//! their message text.

use crate::domain::event::SourceLocation;
use std::fmt;

/// Deduplication key derived from the source location of a log event.
///
/// Missing components are kept as `None` and take part in equality and
/// hashing, so an event without a line number never matches one that has one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    class_name: Option<String>,
    method_name: Option<String>,
    line_number: Option<String>,
}

impl Fingerprint {
    /// Create a fingerprint from its raw components.
    pub fn new(
        class_name: Option<String>,
        method_name: Option<String>,
        line_number: Option<String>,
    ) -> Self {
        Self {
            class_name,
            method_name,
            line_number,
        }
    }

    /// Derive the fingerprint of an event's source location.
    pub fn from_location(location: &SourceLocation) -> Self {
        Self::new(
            location.class_name.clone(),
            location.method_name.clone(),
            location.line_number.clone(),
        )
    }

    /// Class component, if known.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Method component, if known.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// Line component, if known.
    pub fn line_number(&self) -> Option<&str> {
        self.line_number.as_deref()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}:{}",
            self.class_name.as_deref().unwrap_or("?"),
            self.method_name.as_deref().unwrap_or("?"),
            self.line_number.as_deref().unwrap_or("?")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fp(class: Option<&str>, method: Option<&str>, line: Option<&str>) -> Fingerprint {
        Fingerprint::new(
            class.map(String::from),
            method.map(String::from),
            line.map(String::from),
        )
    }

    #[test]
    fn test_identical_locations_produce_same_fingerprint() {
        let a = fp(Some("app::db"), Some("connect"), Some("42"));
        let b = fp(Some("app::db"), Some("connect"), Some("42"));

        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_different_lines_produce_different_fingerprints() {
        let a = fp(Some("app::db"), Some("connect"), Some("42"));
        let b = fp(Some("app::db"), Some("connect"), Some("43"));

        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_components_take_part_in_equality() {
        let with_line = fp(Some("app::db"), None, Some("42"));
        let without_line = fp(Some("app::db"), None, None);
        let all_missing = fp(None, None, None);

        assert_ne!(with_line, without_line);
        assert_ne!(without_line, all_missing);
        assert_eq!(all_missing, fp(None, None, None));
    }

    #[test]
    fn test_empty_string_differs_from_missing() {
        assert_ne!(fp(Some(""), None, None), fp(None, None, None));
    }

    #[test]
    fn test_from_location() {
        let location = SourceLocation::new(
            Some("app::handler".to_string()),
            Some("serve".to_string()),
            Some("7".to_string()),
        );

        let fingerprint = Fingerprint::from_location(&location);
        assert_eq!(fingerprint.class_name(), Some("app::handler"));
        assert_eq!(fingerprint.method_name(), Some("serve"));
        assert_eq!(fingerprint.line_number(), Some("7"));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(
            fp(Some("app::db"), Some("connect"), Some("42")).to_string(),
            "app::db::connect:42"
        );
        assert_eq!(fp(None, None, None).to_string(), "?::?:?");
    }
}
