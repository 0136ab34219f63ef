//! Light/dark theme flag with persistence and system-preference fallback.

use std::sync::{Arc, RwLock};

use crossterm::event::{KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use serde_json::json;

use crate::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::runtime::shared_state::SharedStateError;
use crate::runtime::storage::{PreferenceStore, THEME_KEY};
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent, ThemeMode};

/// Applied theme flag shared with whoever wants to style against it.
pub type SharedTheme = Arc<RwLock<ThemeMode>>;

pub fn ensure_theme(ctx: &RuntimeContext<'_>) -> std::result::Result<SharedTheme, SharedStateError> {
    ctx.shared_init::<RwLock<ThemeMode>, _>(|| RwLock::new(ThemeMode::Light))
}

/// Owns the menu-bar theme toggle. Persists explicit choices; follows the
/// system preference only while no explicit choice exists. Storage failures
/// degrade to in-memory-only behavior.
pub struct ThemeController {
    zone: String,
    store: Box<dyn PreferenceStore>,
    system: ThemeMode,
    logger: Option<Logger>,
    theme: Option<SharedTheme>,
    /// In-memory mirror of "a persisted preference exists", used when the
    /// store itself is unreadable.
    explicit: bool,
    enabled: bool,
}

impl ThemeController {
    pub fn new(
        zone: impl Into<String>,
        store: Box<dyn PreferenceStore>,
        system: ThemeMode,
    ) -> Self {
        Self {
            zone: zone.into(),
            store,
            system,
            logger: None,
            theme: None,
            explicit: false,
            enabled: false,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    fn warn(&self, message: &str, detail: String) {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(
                LogLevel::Warn,
                "shell::theme",
                message,
                [json_kv("detail", json!(detail))],
            );
            let _ = logger.log_event(event);
        }
    }

    fn apply(&self, mode: ThemeMode) {
        if let Some(theme) = self.theme.as_ref() {
            if let Ok(mut guard) = theme.write() {
                *guard = mode;
            }
        }
    }

    fn applied(&self) -> ThemeMode {
        self.theme
            .as_ref()
            .and_then(|theme| theme.read().ok().map(|guard| *guard))
            .unwrap_or(self.system)
    }

    fn persisted(&mut self) -> Option<ThemeMode> {
        match self.store.load(THEME_KEY) {
            Ok(value) => {
                let mode = value.as_deref().and_then(ThemeMode::parse);
                self.explicit = mode.is_some();
                mode
            }
            Err(err) => {
                self.warn("storage_read_failed", err.to_string());
                // Fall back to the in-memory mirror.
                None
            }
        }
    }

    fn toggle(&mut self, ctx: &mut RuntimeContext<'_>) {
        let next = self.applied().flipped();
        self.apply(next);
        self.explicit = true;
        if let Err(err) = self.store.save(THEME_KEY, next.as_str()) {
            self.warn("storage_write_failed", err.to_string());
        }
        self.render(ctx);
    }

    fn render(&self, ctx: &mut RuntimeContext<'_>) {
        if !self.enabled {
            return;
        }
        let label = match self.applied() {
            ThemeMode::Dark => "☾ Dark",
            ThemeMode::Light => "☀ Light",
        };
        ctx.set_zone(&self.zone, label);
    }

    fn toggle_hit(&self, ctx: &RuntimeContext<'_>, column: u16, row: u16) -> bool {
        ctx.rect(&self.zone)
            .map(|rect| rect.contains(column, row))
            .unwrap_or(false)
    }
}

impl ShellController for ThemeController {
    fn name(&self) -> &str {
        "shell.theme"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.theme = ensure_theme(ctx).ok();
        self.enabled = ctx.rect(&self.zone).is_some();

        let initial = self.persisted().unwrap_or(self.system);
        self.apply(initial);
        self.render(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        match event {
            ShellEvent::Key(key)
                if self.enabled
                    && key.kind == KeyEventKind::Press
                    && key.code == KeyCode::Char('t') =>
            {
                self.toggle(ctx);
                Ok(EventFlow::Consumed)
            }
            ShellEvent::Mouse(mouse)
                if self.enabled
                    && matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                    && self.toggle_hit(ctx, mouse.column, mouse.row) =>
            {
                self.toggle(ctx);
                Ok(EventFlow::Consumed)
            }
            ShellEvent::SystemTheme(mode) => {
                // Explicit choices win; the system only drives the unset case.
                let explicit = match self.store.load(THEME_KEY) {
                    Ok(value) => value.as_deref().and_then(ThemeMode::parse).is_some(),
                    Err(_) => self.explicit,
                };
                self.system = *mode;
                if !explicit {
                    self.apply(*mode);
                    self.render(ctx);
                }
                Ok(EventFlow::Continue)
            }
            _ => Ok(EventFlow::Continue),
        }
    }
}
