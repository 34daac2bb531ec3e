//! Error report assembly.
//!
//! Turns a [`LogEvent`] plus a fresh host snapshot into an [`ErrorReport`].
//! Every free-text value that ends up in the payload goes through the
//! sanitizer chain first.

use crate::application::ports::HostProbe;
use crate::domain::event::LogEvent;
use crate::domain::report::{
    ApplicationEnvironment, ClientInfo, Environment, ErrorReport, ExceptionData, RequestData,
};
use crate::domain::sanitizer::SanitizerChain;
use chrono::SecondsFormat;
use std::sync::Arc;

/// Exception class used when the event carries no class name.
pub const UNKNOWN_EXCEPTION_CLASS: &str = "unknown";

const APPLICATION_ROOT_DIRECTORY: &str = "/";

/// Builds error reports from log events.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    sanitizers: SanitizerChain,
    host: Arc<dyn HostProbe>,
}

impl ReportBuilder {
    /// Create a builder with the given sanitizers and host probe.
    pub fn new(sanitizers: SanitizerChain, host: Arc<dyn HostProbe>) -> Self {
        Self { sanitizers, host }
    }

    /// Build the report for one event. Never fails.
    pub fn build(&self, event: &LogEvent) -> ErrorReport {
        let message = self.sanitizers.apply(&event.message);

        ErrorReport {
            request: RequestData::default(),
            application_environment: ApplicationEnvironment {
                application_root_directory: APPLICATION_ROOT_DIRECTORY.to_string(),
                env: self.environment(event, &message),
            },
            exception: ExceptionData {
                message,
                backtrace: self.backtrace(event),
                exception_class: event
                    .location
                    .class_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_EXCEPTION_CLASS.to_string()),
                occurred_at: event
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Millis, false),
            },
            client: ClientInfo::default(),
        }
    }

    fn environment(&self, event: &LogEvent, message: &str) -> Environment {
        let host = self.host.snapshot();

        Environment {
            message: message.to_string(),
            log_level: event.level.to_string(),
            method_name: event.location.method_name.clone(),
            line_number: parse_line_number(event.location.line_number.as_deref()),
            thread_name: event.thread_name.clone(),
            disk_space: host.disk_space_field(),
            rust_version: host.rust_version,
            os_name: host.os_name,
            os_arch: host.os_arch,
            os_version: host.os_version,
            language: host.language,
            country: host.country,
            time_zone: host.time_zone,
            fields: event
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), self.sanitizers.apply(value)))
                .collect(),
            extra: Default::default(),
        }
    }

    fn backtrace(&self, event: &LogEvent) -> Vec<String> {
        event
            .backtrace
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|line| self.sanitizers.apply(line.trim()))
            .collect()
    }
}

fn parse_line_number(line: Option<&str>) -> i64 {
    line.and_then(|l| l.trim().parse().ok()).unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::SourceLocation;
    use crate::domain::sanitizer::{Ipv4Sanitizer, RegexSanitizer};
    use crate::infrastructure::mocks::FixedHostProbe;
    use chrono::{TimeZone, Utc};
    use tracing::Level;

    fn builder_with(sanitizers: SanitizerChain) -> ReportBuilder {
        ReportBuilder::new(sanitizers, Arc::new(FixedHostProbe::default()))
    }

    fn located_event(message: &str) -> LogEvent {
        LogEvent::new(Level::ERROR, message)
            .with_location(SourceLocation::new(
                Some("app::db".to_string()),
                Some("connect".to_string()),
                Some("42".to_string()),
            ))
            .with_thread_name("main")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
    }

    #[test]
    fn test_exception_section() {
        let report = builder_with(SanitizerChain::new()).build(&located_event("boom"));

        assert_eq!(report.exception.message, "boom");
        assert_eq!(report.exception.exception_class, "app::db");
        assert_eq!(
            report.exception.occurred_at,
            "2024-01-15T10:30:00.000+00:00"
        );
        assert!(report.exception.backtrace.is_empty());
    }

    #[test]
    fn test_unknown_exception_class() {
        let event = LogEvent::new(Level::ERROR, "no location");
        let report = builder_with(SanitizerChain::new()).build(&event);

        assert_eq!(report.exception.exception_class, UNKNOWN_EXCEPTION_CLASS);
        assert_eq!(report.application_environment.env.line_number, -1);
        assert_eq!(report.application_environment.env.method_name, None);
    }

    #[test]
    fn test_environment_section() {
        let report = builder_with(SanitizerChain::new()).build(&located_event("boom"));
        let env = &report.application_environment.env;

        assert_eq!(report.application_environment.application_root_directory, "/");
        assert_eq!(env.message, "boom");
        assert_eq!(env.log_level, "ERROR");
        assert_eq!(env.method_name.as_deref(), Some("connect"));
        assert_eq!(env.line_number, 42);
        assert_eq!(env.thread_name, "main");
        assert_eq!(env.os_name, "TestOS");
        assert_eq!(env.disk_space, "1024");
    }

    #[test]
    fn test_disk_probe_failure_degrades_to_sentinel() {
        let probe = FixedHostProbe::default().without_disk_space();
        let builder = ReportBuilder::new(SanitizerChain::new(), Arc::new(probe));

        let report = builder.build(&located_event("boom"));
        assert_eq!(
            report.application_environment.env.disk_space,
            i64::MAX.to_string()
        );
    }

    #[test]
    fn test_unparsable_line_number() {
        assert_eq!(parse_line_number(Some("?")), -1);
        assert_eq!(parse_line_number(Some("")), -1);
        assert_eq!(parse_line_number(None), -1);
        assert_eq!(parse_line_number(Some(" 17 ")), 17);
    }

    #[test]
    fn test_backtrace_lines_trimmed_in_order() {
        let event = located_event("boom").with_backtrace(vec![
            "java.io.IOException".to_string(),
            "\tat app.Db.connect(Db.java:42)  ".to_string(),
            "   at app.Main.main(Main.java:7)".to_string(),
        ]);

        let report = builder_with(SanitizerChain::new()).build(&event);
        assert_eq!(
            report.exception.backtrace,
            vec![
                "java.io.IOException",
                "at app.Db.connect(Db.java:42)",
                "at app.Main.main(Main.java:7)",
            ]
        );
    }

    #[test]
    fn test_sanitizers_apply_to_all_free_text() {
        let mut chain = SanitizerChain::new();
        chain.push(Arc::new(Ipv4Sanitizer::new()));
        chain.push(Arc::new(RegexSanitizer::new("bob", "bubba").unwrap()));

        let event = located_event(
            "Message containing an ip of 192.168.0.1 and an ip of 10.65.1.1 with bob",
        )
        .with_backtrace(vec!["peer 10.0.0.7 reset".to_string()])
        .with_field("peer", "172.16.0.1");

        let report = builder_with(chain).build(&event);
        let expected =
            "Message containing an ip of ???.???.???.??? and an ip of ???.???.???.??? with bubba";

        assert_eq!(report.exception.message, expected);
        assert_eq!(report.application_environment.env.message, expected);
        assert_eq!(report.exception.backtrace, vec!["peer ???.???.???.??? reset"]);
        assert_eq!(
            report.application_environment.env.fields["peer"],
            "???.???.???.???"
        );
    }
}
