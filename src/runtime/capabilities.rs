//! Optional external collaborators, injected as trait objects with no-op
//! defaults instead of probed for at runtime. A missing capability is never
//! an error anywhere in the shell.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;

use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};

/// Recognized properties of an analytics event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnalyticsProps {
    pub event_category: String,
    pub event_label: String,
}

impl AnalyticsProps {
    pub fn new(category: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            event_category: category.into(),
            event_label: label.into(),
        }
    }
}

/// Ambient analytics collector, `(action, props)` fire-and-forget.
pub trait AnalyticsCollector: Send + Sync {
    fn event(&self, action: &str, props: &AnalyticsProps);
}

/// Default collector: absence of analytics is a silent no-op.
#[derive(Debug, Default)]
pub struct NullCollector;

impl AnalyticsCollector for NullCollector {
    fn event(&self, _action: &str, _props: &AnalyticsProps) {}
}

/// Adapts the structured logger as a collector, useful for local runs.
pub struct LogCollector {
    logger: Logger,
}

impl LogCollector {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl AnalyticsCollector for LogCollector {
    fn event(&self, action: &str, props: &AnalyticsProps) {
        let event = event_with_fields(
            LogLevel::Info,
            "shell::analytics",
            action,
            [
                json_kv("event_category", json!(props.event_category)),
                json_kv("event_label", json!(props.event_label)),
            ],
        );
        let _ = self.logger.log_event(event);
    }
}

/// Records every event for assertions.
#[derive(Default)]
pub struct RecordingCollector {
    events: Mutex<Vec<(String, AnalyticsProps)>>,
}

impl RecordingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, AnalyticsProps)> {
        self.events.lock().expect("collector poisoned").clone()
    }
}

impl AnalyticsCollector for RecordingCollector {
    fn event(&self, action: &str, props: &AnalyticsProps) {
        self.events
            .lock()
            .expect("collector poisoned")
            .push((action.to_string(), props.clone()));
    }
}

/// Resolves a deferred asset source. The shell only cares that the fetch
/// happened once per asset; what "fetching" means belongs to the host.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, source: &str) -> Result<(), String>;
}

#[derive(Debug, Default)]
pub struct NullFetcher;

impl AssetFetcher for NullFetcher {
    fn fetch(&self, _source: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Records fetched sources for assertions.
#[derive(Default)]
pub struct RecordingFetcher {
    fetched: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("fetcher poisoned").clone()
    }
}

impl AssetFetcher for RecordingFetcher {
    fn fetch(&self, source: &str) -> Result<(), String> {
        self.fetched
            .lock()
            .expect("fetcher poisoned")
            .push(source.to_string());
        Ok(())
    }
}

/// One-shot background registration performed after initial load (the
/// service-worker analog). Failures are logged by the caller, never surfaced.
pub trait BackgroundRegistrar: Send + Sync {
    fn register(&self) -> Result<(), String>;
}

#[derive(Debug, Default)]
pub struct NullRegistrar;

impl BackgroundRegistrar for NullRegistrar {
    fn register(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Run the background registration once, logging a failure and moving on.
pub fn register_background(registrar: &Arc<dyn BackgroundRegistrar>, logger: Option<&Logger>) {
    if let Err(reason) = registrar.register() {
        if let Some(logger) = logger {
            let event = event_with_fields(
                LogLevel::Warn,
                "shell::background",
                "registration_failed",
                [json_kv("reason", json!(reason))],
            );
            let _ = logger.log_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;

    #[test]
    fn recording_collector_captures_props() {
        let collector = RecordingCollector::new();
        collector.event("click", &AnalyticsProps::new("external", "https://example.org"));
        let events = collector.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "click");
        assert_eq!(events[0].1.event_category, "external");
    }

    #[test]
    fn failed_registration_is_logged_not_raised() {
        struct Failing;
        impl BackgroundRegistrar for Failing {
            fn register(&self) -> Result<(), String> {
                Err("offline".to_string())
            }
        }

        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        let registrar: Arc<dyn BackgroundRegistrar> = Arc::new(Failing);
        register_background(&registrar, Some(&logger));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "registration_failed");
    }

    #[test]
    fn log_collector_writes_recognized_fields() {
        let sink = MemorySink::new();
        let collector = LogCollector::new(Logger::new(sink.clone()));
        collector.event("view", &AnalyticsProps::new("section", "projects"));
        let events = sink.events();
        assert_eq!(events[0].fields.get("event_label").unwrap(), "projects");
    }
}
