use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use serde_json::json;

use crate::logging::{event_with_fields, json_kv};
use crate::{
    AnsiRenderer, LayoutTree, LogLevel, Logger, Rect, Result, ShellMetrics, Size, ZoneRegistry,
};

pub mod capabilities;
pub mod diagnostics;
pub mod driver;
pub mod selection;
pub mod shared_state;
pub mod storage;
pub mod timer;

use shared_state::{SharedState, SharedStateError};

/// Applied theme flag, the terminal analog of a `dark-mode` class on the
/// document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn flipped(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// Configuration knobs for the runtime loop.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Interval between synthetic tick events.
    pub tick_interval: Duration,
    /// Optional structured logger used by the runtime.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<ShellMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "shell::runtime.metrics".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(ShellMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<ShellMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// High-level events delivered to controllers.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    Tick { elapsed: Duration },
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(Size),
    /// System-level theme preference change, injected by the host.
    SystemTheme(ThemeMode),
    Raw(CrosstermEvent),
}

/// Control the propagation of an event across controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    Consumed,
}

/// Context passed to controllers so they can interact with the runtime safely.
pub struct RuntimeContext<'a> {
    rects: &'a HashMap<String, Rect>,
    shared: &'a SharedState,
    zone_updates: Vec<ZoneUpdate>,
    redraw_requested: bool,
    exit_requested: bool,
    cursor_hint: Option<(u16, u16)>,
}

struct ZoneUpdate {
    zone: String,
    content: String,
    pre_rendered: bool,
}

impl<'a> RuntimeContext<'a> {
    fn new(rects: &'a HashMap<String, Rect>, shared: &'a SharedState) -> Self {
        Self {
            rects,
            shared,
            zone_updates: Vec::new(),
            redraw_requested: false,
            exit_requested: false,
            cursor_hint: None,
        }
    }

    /// Queue new content for a zone. The update is applied after the
    /// controller completes; the renderer wraps it to the zone width.
    pub fn set_zone(&mut self, zone_id: impl Into<String>, content: impl Into<String>) {
        self.zone_updates.push(ZoneUpdate {
            zone: zone_id.into(),
            content: content.into(),
            pre_rendered: false,
        });
        self.redraw_requested = true;
    }

    /// Queue exact lines for a zone; the renderer pads but never rewraps them.
    pub fn set_zone_raw(&mut self, zone_id: impl Into<String>, content: impl Into<String>) {
        self.zone_updates.push(ZoneUpdate {
            zone: zone_id.into(),
            content: content.into(),
            pre_rendered: true,
        });
        self.redraw_requested = true;
    }

    /// Request that the renderer runs even if no zones changed.
    pub fn request_render(&mut self) {
        self.redraw_requested = true;
    }

    /// Signal to the runtime that execution should terminate after this frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Provide a hint for where the cursor should rest after rendering.
    pub fn set_cursor_hint(&mut self, row: u16, col: u16) {
        self.cursor_hint = Some((row, col));
    }

    /// Fetch the solved rectangle for a zone if available.
    pub fn rect(&self, zone_id: &str) -> Option<&Rect> {
        self.rects.get(zone_id)
    }

    /// Fetch a shared resource registered under its type.
    pub fn shared<T>(&self) -> std::result::Result<Arc<T>, SharedStateError>
    where
        T: Send + Sync + 'static,
    {
        self.shared.get::<T>()
    }

    /// Fetch a shared resource, creating it on first access.
    pub fn shared_init<T, F>(&self, make: F) -> std::result::Result<Arc<T>, SharedStateError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.shared.get_or_insert_with(make)
    }

    fn into_outcome(self) -> ContextOutcome {
        ContextOutcome {
            zone_updates: self.zone_updates,
            redraw_requested: self.redraw_requested,
            exit_requested: self.exit_requested,
            cursor_hint: self.cursor_hint,
        }
    }
}

struct ContextOutcome {
    zone_updates: Vec<ZoneUpdate>,
    redraw_requested: bool,
    exit_requested: bool,
    cursor_hint: Option<(u16, u16)>,
}

/// Behaviour injection point for the runtime. Each shell widget (clock,
/// theme, window, dock, ...) is one independent implementation.
pub trait ShellController: Send {
    fn name(&self) -> &str {
        "shell_controller"
    }

    fn init(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_event(
        &mut self,
        _ctx: &mut RuntimeContext<'_>,
        _event: &ShellEvent,
    ) -> Result<EventFlow> {
        Ok(EventFlow::Continue)
    }

    fn before_render(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        Ok(())
    }

    fn after_render(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Ordered collection of controllers. Lower priorities run earlier; ties keep
/// insertion order.
#[derive(Default)]
pub struct ControllerBundle {
    entries: Vec<(i32, Box<dyn ShellController>)>,
}

impl ControllerBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controller<C>(mut self, controller: C, priority: i32) -> Self
    where
        C: ShellController + 'static,
    {
        self.entries.push((priority, Box::new(controller)));
        self
    }

    pub fn register_into(mut self, runtime: &mut ShellRuntime) {
        self.entries.sort_by_key(|(priority, _)| *priority);
        for (_, controller) in self.entries {
            runtime.controllers.push(controller);
        }
    }
}

pub struct ShellRuntime {
    layout: LayoutTree,
    rects: HashMap<String, Rect>,
    registry: ZoneRegistry,
    renderer: AnsiRenderer,
    controllers: Vec<Box<dyn ShellController>>,
    shared: SharedState,
    config: RuntimeConfig,
    should_exit: bool,
    redraw_requested: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl ShellRuntime {
    pub fn new(layout: LayoutTree, renderer: AnsiRenderer, initial_size: Size) -> Result<Self> {
        Self::with_config(layout, renderer, initial_size, RuntimeConfig::default())
    }

    pub fn with_config(
        layout: LayoutTree,
        renderer: AnsiRenderer,
        initial_size: Size,
        config: RuntimeConfig,
    ) -> Result<Self> {
        let mut registry = ZoneRegistry::new();
        let rects = layout.solve(initial_size)?;
        registry.sync_layout(&rects);

        Ok(Self {
            layout,
            rects,
            registry,
            renderer,
            controllers: Vec::new(),
            shared: SharedState::new(),
            config,
            should_exit: false,
            redraw_requested: true,
            start_instant: None,
            last_metrics_emit: None,
        })
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    /// Shared resource map used for cross-controller handles (the content
    /// document, the window state, the selection registry). Seed it before
    /// `run` the way a page seeds its DOM before scripts attach.
    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    pub fn register_controller<C>(&mut self, controller: C)
    where
        C: ShellController + 'static,
    {
        self.controllers.push(Box::new(controller));
    }

    pub fn register_bundle(&mut self, bundle: ControllerBundle) {
        bundle.register_into(self);
    }

    /// Re-solve the layout for a new terminal size.
    pub fn resize(&mut self, size: Size) -> Result<()> {
        let rects = self.layout.solve(size)?;
        self.rects = rects;
        self.registry.sync_layout(&self.rects);
        self.redraw_requested = true;
        self.log_runtime_event(
            LogLevel::Info,
            "resized",
            [
                json_kv("width", json!(size.width)),
                json_kv("height", json!(size.height)),
            ],
        );
        Ok(())
    }

    pub fn run(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap(stdout)?;
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = self
                .config
                .tick_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                let crossterm_event = event::read()?;
                let shell_event = self.map_event(crossterm_event)?;
                self.dispatch_event(shell_event)?;
                self.render_if_needed(stdout)?;
                if self.should_exit {
                    break;
                }
            }

            if last_tick.elapsed() >= self.config.tick_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.dispatch_event(ShellEvent::Tick { elapsed })?;
                self.render_if_needed(stdout)?;
            }

            self.maybe_emit_metrics();
        }

        self.finalize();
        Ok(())
    }

    /// Deterministic loop used by tests and benches: dispatch a fixed event
    /// script instead of polling the terminal.
    pub fn run_scripted<I>(&mut self, stdout: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = ShellEvent>,
    {
        self.bootstrap(stdout)?;
        for event in events.into_iter() {
            let event = match event {
                ShellEvent::Resize(size) => {
                    self.resize(size)?;
                    ShellEvent::Resize(size)
                }
                other => other,
            };
            self.dispatch_event(event)?;
            self.render_if_needed(stdout)?;
            if self.should_exit {
                break;
            }
        }
        self.finalize();
        Ok(())
    }

    fn dispatch_event(&mut self, event: ShellEvent) -> Result<()> {
        let mut consumed = false;
        for idx in 0..self.controllers.len() {
            let (flow, outcome) = {
                let controller = &mut self.controllers[idx];
                let mut ctx = RuntimeContext::new(&self.rects, &self.shared);
                let flow = controller.on_event(&mut ctx, &event)?;
                (flow, ctx.into_outcome())
            };
            self.apply_outcome(outcome)?;
            if matches!(flow, EventFlow::Consumed) {
                consumed = true;
                break;
            }
        }
        self.record_event_metric();
        self.log_runtime_event(
            LogLevel::Debug,
            "event_dispatched",
            [
                json_kv("event", json!(Self::describe_event(&event))),
                json_kv("consumed", json!(consumed)),
            ],
        );
        self.maybe_emit_metrics();
        Ok(())
    }

    fn render_if_needed(&mut self, stdout: &mut impl Write) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }

        self.redraw_requested = false;

        for idx in 0..self.controllers.len() {
            let outcome = {
                let controller = &mut self.controllers[idx];
                let mut ctx = RuntimeContext::new(&self.rects, &self.shared);
                controller.before_render(&mut ctx)?;
                ctx.into_outcome()
            };
            self.apply_outcome(outcome)?;
        }

        let dirty = self.registry.take_dirty();
        if !dirty.is_empty() {
            self.renderer.render(stdout, &dirty)?;
            self.record_render_metric(dirty.len());
            self.log_runtime_event(
                LogLevel::Debug,
                "render_completed",
                [json_kv("dirty_zones", json!(dirty.len()))],
            );
        }

        for idx in 0..self.controllers.len() {
            let outcome = {
                let controller = &mut self.controllers[idx];
                let mut ctx = RuntimeContext::new(&self.rects, &self.shared);
                controller.after_render(&mut ctx)?;
                ctx.into_outcome()
            };
            self.apply_outcome(outcome)?;
        }

        if self.registry.has_dirty() {
            self.redraw_requested = true;
        }

        Ok(())
    }

    fn apply_outcome(&mut self, outcome: ContextOutcome) -> Result<()> {
        let ContextOutcome {
            zone_updates,
            redraw_requested,
            exit_requested,
            cursor_hint,
        } = outcome;

        let update_count = zone_updates.len();
        for update in zone_updates {
            let result = if update.pre_rendered {
                self.registry.apply_pre_rendered(&update.zone, update.content)
            } else {
                self.registry.apply_content(&update.zone, update.content)
            };
            // A controller writing to a zone the layout does not know is the
            // "missing element" case: degrade to a logged no-op.
            if let Err(err) = result {
                self.log_runtime_event(
                    LogLevel::Warn,
                    "zone_update_dropped",
                    [json_kv("error", json!(err.to_string()))],
                );
            }
        }
        if update_count > 0 {
            self.record_zone_updates_metric(update_count);
            self.redraw_requested = true;
        }

        if redraw_requested {
            self.redraw_requested = true;
        }

        if let Some(cursor) = cursor_hint {
            self.renderer.settings_mut().restore_cursor = Some(cursor);
        }

        if exit_requested {
            self.should_exit = true;
            self.log_runtime_event(LogLevel::Info, "exit_requested", std::iter::empty());
        }

        Ok(())
    }

    fn map_event(&mut self, event: CrosstermEvent) -> Result<ShellEvent> {
        match event {
            CrosstermEvent::Key(key) => Ok(ShellEvent::Key(key)),
            CrosstermEvent::Mouse(mouse) => Ok(ShellEvent::Mouse(mouse)),
            CrosstermEvent::Resize(width, height) => {
                let size = Size::new(width, height);
                self.resize(size)?;
                Ok(ShellEvent::Resize(size))
            }
            other => Ok(ShellEvent::Raw(other)),
        }
    }

    fn bootstrap(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.should_exit = false;
        self.redraw_requested = true;
        self.ensure_metrics_initialized();
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log_runtime_event(
            LogLevel::Info,
            "shell_started",
            [
                json_kv("controllers", json!(self.controllers.len())),
                json_kv("zones", json!(self.rects.len())),
            ],
        );

        for idx in 0..self.controllers.len() {
            let outcome = {
                let controller = &mut self.controllers[idx];
                let controller_name = controller.name().to_string();
                let mut ctx = RuntimeContext::new(&self.rects, &self.shared);
                controller.init(&mut ctx)?;
                self.log_runtime_event(
                    LogLevel::Debug,
                    "controller_initialized",
                    [json_kv("controller", json!(controller_name))],
                );
                ctx.into_outcome()
            };
            self.apply_outcome(outcome)?;
        }

        self.render_if_needed(stdout)
    }

    fn finalize(&mut self) {
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log_runtime_event(
            LogLevel::Info,
            "shell_stopped",
            [json_kv("uptime_ms", json!(uptime_ms))],
        );
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && self.config.metrics_interval > Duration::ZERO {
            self.config.metrics = Some(Arc::new(Mutex::new(ShellMetrics::new())));
        }
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, "shell::runtime", message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_event_metric(&mut self) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_event();
            }
        }
    }

    fn record_render_metric(&mut self, dirty_count: usize) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_render(dirty_count);
            }
        }
    }

    fn record_zone_updates_metric(&mut self, count: usize) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_zone_updates(count);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() || self.config.metrics_interval == Duration::ZERO {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => return,
            _ => self.last_metrics_emit = Some(now),
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = self.config.metrics_target.as_str();
                let snapshot_event = guard.snapshot(uptime).to_log_event(target);
                let _ = logger.log_event(snapshot_event);
            }
        }
    }

    fn describe_event(event: &ShellEvent) -> &'static str {
        match event {
            ShellEvent::Tick { .. } => "tick",
            ShellEvent::Key(_) => "key",
            ShellEvent::Mouse(_) => "mouse",
            ShellEvent::Resize(_) => "resize",
            ShellEvent::SystemTheme(_) => "system_theme",
            ShellEvent::Raw(_) => "raw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constraint, Direction, LayoutNode};

    fn single_zone_runtime() -> ShellRuntime {
        let layout = LayoutTree::new(LayoutNode {
            id: "root".into(),
            direction: Direction::Column,
            constraints: vec![Constraint::Flex(1)],
            children: vec![LayoutNode::leaf("zone")],
            gap: 0,
            padding: 0,
        });
        ShellRuntime::new(layout, AnsiRenderer::with_default(), Size::new(20, 4)).unwrap()
    }

    struct EchoController {
        seen: usize,
    }

    impl ShellController for EchoController {
        fn name(&self) -> &str {
            "test.echo"
        }

        fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
            ctx.set_zone("zone", "ready");
            Ok(())
        }

        fn on_event(
            &mut self,
            ctx: &mut RuntimeContext<'_>,
            event: &ShellEvent,
        ) -> Result<EventFlow> {
            if matches!(event, ShellEvent::Tick { .. }) {
                self.seen += 1;
                ctx.set_zone("zone", format!("tick {}", self.seen));
            }
            Ok(EventFlow::Continue)
        }
    }

    #[test]
    fn scripted_run_renders_and_dispatches() {
        let mut runtime = single_zone_runtime();
        runtime.register_controller(EchoController { seen: 0 });

        let mut output = Vec::new();
        runtime
            .run_scripted(
                &mut output,
                vec![
                    ShellEvent::Tick {
                        elapsed: Duration::from_millis(200),
                    },
                    ShellEvent::Tick {
                        elapsed: Duration::from_millis(200),
                    },
                ],
            )
            .unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("ready"));
        assert!(rendered.contains("tick 2"));
    }

    #[test]
    fn unknown_zone_updates_degrade_to_noop() {
        struct StrayController;
        impl ShellController for StrayController {
            fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
                ctx.set_zone("missing", "nobody home");
                Ok(())
            }
        }

        let mut runtime = single_zone_runtime();
        runtime.register_controller(StrayController);
        let mut output = Vec::new();
        runtime.run_scripted(&mut output, std::iter::empty()).unwrap();
    }

    #[test]
    fn bundle_orders_by_priority() {
        struct Tagger(&'static str);
        impl ShellController for Tagger {
            fn name(&self) -> &str {
                self.0
            }

            fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
                ctx.set_zone("zone", self.0);
                Ok(())
            }
        }

        let mut runtime = single_zone_runtime();
        ControllerBundle::new()
            .with_controller(Tagger("late"), 50)
            .with_controller(Tagger("early"), -50)
            .register_into(&mut runtime);

        let mut output = Vec::new();
        runtime.run_scripted(&mut output, std::iter::empty()).unwrap();
        // The later init wins the zone; priority ordering makes that "late".
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("late"));
    }
}
