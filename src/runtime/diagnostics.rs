use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use crate::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::ShellMetrics;

use super::{EventFlow, RuntimeContext, ShellController, ShellEvent};

/// Logs high-level shell lifecycle events for observability/debugging.
pub struct LifecycleLoggerController {
    logger: Logger,
    level: LogLevel,
    log_keys: bool,
    log_mouse: bool,
    log_ticks: bool,
    log_raw: bool,
}

impl LifecycleLoggerController {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: LogLevel::Debug,
            log_keys: true,
            log_mouse: false,
            log_ticks: false,
            log_raw: false,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn log_keys(mut self, enabled: bool) -> Self {
        self.log_keys = enabled;
        self
    }

    pub fn log_mouse(mut self, enabled: bool) -> Self {
        self.log_mouse = enabled;
        self
    }

    pub fn log_ticks(mut self, enabled: bool) -> Self {
        self.log_ticks = enabled;
        self
    }

    pub fn log_raw(mut self, enabled: bool) -> Self {
        self.log_raw = enabled;
        self
    }

    fn emit(&self, message: &str, fields: impl IntoIterator<Item = (String, serde_json::Value)>) {
        let event = event_with_fields(self.level, "shell::runtime.lifecycle", message, fields);
        let _ = self.logger.log_event(event);
    }
}

impl ShellController for LifecycleLoggerController {
    fn name(&self) -> &str {
        "diagnostics.lifecycle_logger"
    }

    fn init(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.emit(
            "controller_initialized",
            [json_kv("logger_level", json!(format!("{:?}", self.level)))],
        );
        Ok(())
    }

    fn on_event(
        &mut self,
        _ctx: &mut RuntimeContext<'_>,
        event: &ShellEvent,
    ) -> Result<EventFlow> {
        match event {
            ShellEvent::Key(key) if self.log_keys => {
                self.emit(
                    "event.key",
                    [
                        json_kv("code", json!(format!("{:?}", key.code))),
                        json_kv("modifiers", json!(format!("{:?}", key.modifiers))),
                        json_kv("kind", json!(format!("{:?}", key.kind))),
                    ],
                );
            }
            ShellEvent::Mouse(mouse) if self.log_mouse => {
                self.emit(
                    "event.mouse",
                    [json_kv("event", json!(format!("{:?}", mouse)))],
                );
            }
            ShellEvent::Tick { elapsed } if self.log_ticks => {
                self.emit(
                    "event.tick",
                    [json_kv("elapsed_ms", json!(elapsed.as_millis()))],
                );
            }
            ShellEvent::Raw(raw) if self.log_raw => {
                self.emit("event.raw", [json_kv("event", json!(format!("{:?}", raw)))]);
            }
            ShellEvent::SystemTheme(mode) => {
                self.emit(
                    "event.system_theme",
                    [json_kv("mode", json!(mode.as_str()))],
                );
            }
            ShellEvent::Resize(size) => {
                self.emit(
                    "event.resize",
                    [
                        json_kv("width", json!(size.width)),
                        json_kv("height", json!(size.height)),
                    ],
                );
            }
            _ => {}
        }

        Ok(EventFlow::Continue)
    }
}

/// Periodically emits metrics snapshots through the provided logger.
pub struct MetricsSnapshotController {
    logger: Logger,
    metrics: Arc<Mutex<ShellMetrics>>,
    target: String,
    interval: Duration,
    last_emit: Option<Instant>,
    started_at: Instant,
}

impl MetricsSnapshotController {
    pub fn new(logger: Logger, metrics: Arc<Mutex<ShellMetrics>>) -> Self {
        Self {
            logger,
            metrics,
            target: "shell::runtime.metrics".to_string(),
            interval: Duration::from_secs(5),
            last_emit: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    fn emit_snapshot(&mut self) {
        if self.interval == Duration::ZERO {
            return;
        }

        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return;
            }
        }

        self.last_emit = Some(now);
        let uptime = now.duration_since(self.started_at);

        if let Ok(guard) = self.metrics.lock() {
            let event = guard.snapshot(uptime).to_log_event(&self.target);
            let _ = self.logger.log_event(event);
        }
    }
}

impl ShellController for MetricsSnapshotController {
    fn name(&self) -> &str {
        "diagnostics.metrics_snapshot"
    }

    fn init(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.started_at = Instant::now();
        self.last_emit = None;
        Ok(())
    }

    fn on_event(
        &mut self,
        _ctx: &mut RuntimeContext<'_>,
        event: &ShellEvent,
    ) -> Result<EventFlow> {
        if matches!(event, ShellEvent::Tick { .. }) {
            self.emit_snapshot();
        }
        Ok(EventFlow::Continue)
    }

    fn before_render(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.emit_snapshot();
        Ok(())
    }
}
