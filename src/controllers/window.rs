//! The pseudo-window: drag, minimize, maximize/restore, close, and the
//! rendering of the desktop zone it lives in.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEventKind};

use crate::Result;
use crate::content::{SharedContent, ensure_content};
use crate::geometry::Rect;
use crate::runtime::shared_state::SharedStateError;
use crate::runtime::timer::Countdown;
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};
use crate::width::display_width;

const CLOSE_FADE: Duration = Duration::from_millis(300);
const MINIMIZE_BOUNCE: Duration = Duration::from_millis(500);
const RESTORE_SETTLE: Duration = Duration::from_millis(10);
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(450);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    Normal,
    Maximized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Minimized,
    Closed,
}

/// Desktop-local window geometry. Meaningful in Normal mode; maximize and
/// restore overwrite it wholesale with presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowGeometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Toolbar button hit range in global columns, half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarHit {
    pub start: u16,
    pub end: u16,
    pub section_id: String,
}

/// Window state shared with the dock and the content-driven controllers.
#[derive(Debug, Default)]
pub struct WindowState {
    pub id: String,
    pub mode: WindowMode,
    pub visibility: Visibility,
    pub geometry: WindowGeometry,
    /// Close fade in progress; the dock treats a fading window as hidden.
    pub fading: bool,
    /// Set by the dock when it brings a hidden window back.
    pub restore_pending: bool,
    /// Global rect of the scrolled content viewport, None while hidden.
    pub content_rect: Option<Rect>,
    pub toolbar_row: Option<u16>,
    pub toolbar_hits: Vec<ToolbarHit>,
}

impl WindowState {
    /// Hidden in the dock's sense: suppressed or mid-fade.
    pub fn is_hidden(&self) -> bool {
        self.fading || !matches!(self.visibility, Visibility::Visible)
    }
}

pub type SharedWindow = Arc<RwLock<WindowState>>;

pub fn ensure_window(ctx: &RuntimeContext<'_>) -> std::result::Result<SharedWindow, SharedStateError> {
    ctx.shared_init::<RwLock<WindowState>, _>(|| RwLock::new(WindowState::default()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging { grab_dx: u16, grab_dy: u16 },
}

pub struct WindowController {
    zone: String,
    window_id: String,
    title: String,
    toolbar: Vec<(String, String)>,
    drag: DragState,
    closing: Countdown,
    minimizing: Countdown,
    restoring: Countdown,
    last_header_click: Option<Instant>,
    window: Option<SharedWindow>,
    content: Option<SharedContent>,
    enabled: bool,
}

impl WindowController {
    /// `toolbar` pairs are `(label, target section id)`.
    pub fn new(
        zone: impl Into<String>,
        window_id: impl Into<String>,
        title: impl Into<String>,
        toolbar: Vec<(String, String)>,
    ) -> Self {
        Self {
            zone: zone.into(),
            window_id: window_id.into(),
            title: title.into(),
            toolbar,
            drag: DragState::Idle,
            closing: Countdown::idle(),
            minimizing: Countdown::idle(),
            restoring: Countdown::idle(),
            last_header_click: None,
            window: None,
            content: None,
            enabled: false,
        }
    }

    pub fn normal_preset(desktop: Rect) -> WindowGeometry {
        let width = (desktop.width as u32 * 3 / 4).max(24).min(desktop.width as u32) as u16;
        let height = desktop.height.saturating_sub(4).max(6).min(desktop.height);
        WindowGeometry {
            x: (desktop.width.saturating_sub(width)) / 2,
            y: 1u16.min(desktop.height.saturating_sub(height)),
            width,
            height,
        }
    }

    pub fn maximized_preset(desktop: Rect) -> WindowGeometry {
        WindowGeometry {
            x: 1u16.min(desktop.width.saturating_sub(1)),
            y: 0,
            width: desktop.width.saturating_sub(2),
            height: desktop.height,
        }
    }

    fn desktop(&self, ctx: &RuntimeContext<'_>) -> Option<Rect> {
        ctx.rect(&self.zone).copied()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut WindowState) -> R) -> Option<R> {
        let window = self.window.as_ref()?;
        window.write().ok().map(|mut guard| f(&mut guard))
    }

    fn read_state<R>(&self, f: impl FnOnce(&WindowState) -> R) -> Option<R> {
        let window = self.window.as_ref()?;
        window.read().ok().map(|guard| f(&guard))
    }

    fn close(&mut self) {
        self.closing.start(CLOSE_FADE);
        self.with_state(|state| state.fading = true);
    }

    fn minimize(&mut self) {
        self.minimizing.start(MINIMIZE_BOUNCE);
    }

    fn toggle_maximize(&mut self, desktop: Rect) {
        self.with_state(|state| {
            state.mode = match state.mode {
                WindowMode::Normal => {
                    state.geometry = Self::maximized_preset(desktop);
                    WindowMode::Maximized
                }
                WindowMode::Maximized => {
                    // Restore swaps back the fixed preset; a drag that happened
                    // before maximizing is forgotten.
                    state.geometry = Self::normal_preset(desktop);
                    WindowMode::Normal
                }
            };
        });
    }

    fn handle_mouse_down(
        &mut self,
        ctx: &mut RuntimeContext<'_>,
        column: u16,
        row: u16,
    ) -> EventFlow {
        let Some(desktop) = self.desktop(ctx) else {
            return EventFlow::Continue;
        };
        let Some((geometry, mode, visible)) = self.read_state(|state| {
            (
                state.geometry,
                state.mode,
                matches!(state.visibility, Visibility::Visible) && !state.fading,
            )
        }) else {
            return EventFlow::Continue;
        };
        if !visible {
            return EventFlow::Continue;
        }

        let gx = desktop.x + geometry.x;
        let header_row = desktop.y + geometry.y;
        let in_window_cols = column >= gx && column < gx + geometry.width;

        if row == header_row && in_window_cols {
            // Control buttons sit on fixed header cells; a press there never
            // starts a drag.
            match column.checked_sub(gx) {
                Some(1) => {
                    self.close();
                    ctx.request_render();
                    return EventFlow::Consumed;
                }
                Some(3) => {
                    self.minimize();
                    ctx.request_render();
                    return EventFlow::Consumed;
                }
                Some(5) => {
                    self.toggle_maximize(desktop);
                    ctx.request_render();
                    return EventFlow::Consumed;
                }
                _ => {}
            }

            let now = Instant::now();
            let double = self
                .last_header_click
                .map(|last| now.duration_since(last) < DOUBLE_CLICK_WINDOW)
                .unwrap_or(false);
            self.last_header_click = Some(now);

            if double {
                self.last_header_click = None;
                self.toggle_maximize(desktop);
                ctx.request_render();
                return EventFlow::Consumed;
            }

            if mode == WindowMode::Maximized {
                // Drag and maximize are mutually exclusive.
                return EventFlow::Continue;
            }

            self.drag = DragState::Dragging {
                grab_dx: column - gx,
                grab_dy: row - (desktop.y + geometry.y),
            };
            return EventFlow::Consumed;
        }

        EventFlow::Continue
    }

    fn handle_mouse_drag(
        &mut self,
        ctx: &mut RuntimeContext<'_>,
        column: u16,
        row: u16,
    ) -> EventFlow {
        let DragState::Dragging { grab_dx, grab_dy } = self.drag else {
            return EventFlow::Continue;
        };
        let Some(desktop) = self.desktop(ctx) else {
            return EventFlow::Continue;
        };

        self.with_state(|state| {
            let max_x = desktop.width.saturating_sub(state.geometry.width);
            let max_y = desktop.height.saturating_sub(state.geometry.height);
            let local_x = column.saturating_sub(desktop.x).saturating_sub(grab_dx);
            let local_y = row.saturating_sub(desktop.y).saturating_sub(grab_dy);
            state.geometry.x = local_x.min(max_x);
            state.geometry.y = local_y.min(max_y);
        });
        ctx.request_render();
        EventFlow::Consumed
    }

    fn handle_tick(&mut self, ctx: &mut RuntimeContext<'_>, elapsed: Duration) {
        if self.closing.advance(elapsed) {
            self.with_state(|state| {
                state.visibility = Visibility::Closed;
                state.fading = false;
            });
            ctx.request_render();
        }

        if self.minimizing.advance(elapsed) {
            // The bounce self-reverts; minimized never persists.
            ctx.request_render();
        }

        let pending = self.read_state(|state| state.restore_pending).unwrap_or(false);
        if pending && !self.restoring.is_armed() {
            self.closing.cancel();
            self.restoring.start(RESTORE_SETTLE);
        }
        if self.restoring.advance(elapsed) {
            self.with_state(|state| state.restore_pending = false);
            ctx.request_render();
        }
    }

    fn render(&mut self, ctx: &mut RuntimeContext<'_>) {
        if !self.enabled {
            return;
        }
        let Some(desktop) = self.desktop(ctx) else {
            return;
        };

        let snapshot = self.read_state(|state| {
            (
                state.geometry,
                state.visibility,
                state.fading,
                state.restore_pending,
            )
        });
        let Some((geometry, visibility, fading, restore_pending)) = snapshot else {
            return;
        };

        let mut lines: Vec<String> = Vec::with_capacity(desktop.height as usize);

        if !matches!(visibility, Visibility::Visible) {
            for _ in 0..desktop.height {
                lines.push(String::new());
            }
            self.with_state(|state| {
                state.content_rect = None;
                state.toolbar_row = None;
                state.toolbar_hits.clear();
            });
            ctx.set_zone_raw(&self.zone, lines.join("\n"));
            return;
        }

        let (draw, dim) = if self.minimizing.is_armed() {
            (Self::sink_geometry(desktop, geometry), true)
        } else {
            (geometry, fading || restore_pending)
        };

        let window_lines = self.compose_window(draw, dim);
        for row in 0..desktop.height {
            if row >= draw.y && row < draw.y + draw.height {
                let body = &window_lines[(row - draw.y) as usize];
                lines.push(format!("{}{}", " ".repeat(draw.x as usize), body));
            } else {
                lines.push(String::new());
            }
        }

        // Publish layout facts the sibling controllers hit-test against.
        let toolbar_hits = self.toolbar_hit_ranges(desktop, draw);
        self.with_state(|state| {
            if self.minimizing.is_armed() {
                state.content_rect = None;
                state.toolbar_row = None;
                state.toolbar_hits.clear();
            } else {
                state.content_rect = Some(Rect::new(
                    desktop.x + draw.x + 1,
                    desktop.y + draw.y + 3,
                    draw.width.saturating_sub(3),
                    draw.height.saturating_sub(4),
                ));
                state.toolbar_row = Some(desktop.y + draw.y + 1);
                state.toolbar_hits = toolbar_hits;
            }
        });

        ctx.set_zone_raw(&self.zone, lines.join("\n"));
    }

    /// Shrunken box near the dock edge used for the minimize bounce.
    fn sink_geometry(desktop: Rect, geometry: WindowGeometry) -> WindowGeometry {
        let width = (geometry.width / 4).max(8).min(desktop.width);
        let height = 3u16.min(desktop.height);
        WindowGeometry {
            x: (desktop.width.saturating_sub(width)) / 2,
            y: desktop.height.saturating_sub(height),
            width,
            height,
        }
    }

    fn toolbar_line(&self, interior: usize) -> (String, Vec<(usize, usize, String)>) {
        let mut line = String::from(" ");
        let mut hits = Vec::new();
        for (label, section) in &self.toolbar {
            let start = display_width(&line);
            let button = format!("[{label}]");
            line.push_str(&button);
            let end = start + display_width(&button);
            line.push(' ');
            hits.push((start, end, section.clone()));
        }
        let mut clipped = clip_display(&line, interior);
        pad_display(&mut clipped, interior);
        (clipped, hits)
    }

    fn toolbar_hit_ranges(&self, desktop: Rect, draw: WindowGeometry) -> Vec<ToolbarHit> {
        let interior = draw.width.saturating_sub(2) as usize;
        let (_, hits) = self.toolbar_line(interior);
        let base = desktop.x + draw.x + 1;
        hits.into_iter()
            .filter(|(start, _, _)| *start < interior)
            .map(|(start, end, section_id)| ToolbarHit {
                start: base + start as u16,
                end: base + (end.min(interior)) as u16,
                section_id,
            })
            .collect()
    }

    fn compose_window(&self, draw: WindowGeometry, dim: bool) -> Vec<String> {
        let interior = draw.width.saturating_sub(2) as usize;
        let mut rows = Vec::with_capacity(draw.height as usize);

        // Control glyphs sit at interior offsets 0/2/4, i.e. window-local
        // columns 1/3/5 once the left border is drawn.
        let mut header = format!("⊗ ⊖ ⊕ ─ {}", self.title);
        header = clip_display(&header, interior);
        pad_display(&mut header, interior);
        rows.push(format!("│{header}│"));

        let (toolbar, _) = self.toolbar_line(interior);
        rows.push(format!("│{toolbar}│"));
        rows.push(format!("├{}┤", "─".repeat(interior)));

        let content_height = draw.height.saturating_sub(4) as usize;
        let content_width = interior.saturating_sub(1);
        let (viewport, thumb) = self.content_viewport(content_height, content_width);
        for (idx, mut line) in viewport.into_iter().enumerate() {
            pad_display(&mut line, content_width);
            let rail = if Some(idx) == thumb { '█' } else { '░' };
            rows.push(format!("│{line}{rail}│"));
        }

        rows.push(format!("└{}┘", "─".repeat(interior)));

        if dim {
            rows = rows
                .into_iter()
                .map(|row| format!("\x1b[2m{row}\x1b[22m"))
                .collect();
        }
        rows
    }

    fn content_viewport(&self, height: usize, width: usize) -> (Vec<String>, Option<usize>) {
        let mut viewport = vec![String::new(); height];
        let mut thumb = None;

        if let Some(content) = self.content.as_ref() {
            if let Ok(state) = content.read() {
                let rows = state.doc.flatten();
                let scroll = state.scroll() as usize;
                for (idx, slot) in viewport.iter_mut().enumerate() {
                    if let Some(row) = rows.get(scroll + idx) {
                        *slot = clip_display(row, width);
                    }
                }
                let max_scroll = rows.len().saturating_sub(height);
                if max_scroll > 0 && height > 1 {
                    thumb = Some((scroll.min(max_scroll) * (height - 1)) / max_scroll);
                } else {
                    thumb = Some(0);
                }
            }
        }

        (viewport, thumb)
    }
}

fn clip_display(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    let mut clipped = String::new();
    for ch in text.chars() {
        let mut probe = clipped.clone();
        probe.push(ch);
        if display_width(&probe) > width {
            break;
        }
        clipped = probe;
    }
    clipped
}

fn pad_display(line: &mut String, width: usize) {
    let mut current = display_width(line);
    while current < width {
        line.push(' ');
        current += 1;
    }
}

impl ShellController for WindowController {
    fn name(&self) -> &str {
        "shell.window"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let Some(desktop) = self.desktop(ctx) else {
            // Bound element missing: the whole component self-disables.
            self.enabled = false;
            return Ok(());
        };
        self.enabled = true;
        self.window = ensure_window(ctx).ok();
        self.content = ensure_content(ctx).ok();

        let id = self.window_id.clone();
        self.with_state(|state| {
            state.id = id;
            state.geometry = Self::normal_preset(desktop);
        });
        self.render(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        if !self.enabled {
            return Ok(EventFlow::Continue);
        }
        match event {
            ShellEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    Ok(self.handle_mouse_down(ctx, mouse.column, mouse.row))
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    Ok(self.handle_mouse_drag(ctx, mouse.column, mouse.row))
                }
                MouseEventKind::Up(_) => {
                    // Drag ends on release anywhere in the document.
                    self.drag = DragState::Idle;
                    Ok(EventFlow::Continue)
                }
                _ => Ok(EventFlow::Continue),
            },
            ShellEvent::Tick { elapsed } => {
                self.handle_tick(ctx, *elapsed);
                Ok(EventFlow::Continue)
            }
            ShellEvent::Resize(_) => {
                if let Some(desktop) = self.desktop(ctx) {
                    self.with_state(|state| {
                        state.geometry = match state.mode {
                            WindowMode::Normal => Self::normal_preset(desktop),
                            WindowMode::Maximized => Self::maximized_preset(desktop),
                        };
                    });
                }
                ctx.request_render();
                Ok(EventFlow::Continue)
            }
            _ => Ok(EventFlow::Continue),
        }
    }

    fn before_render(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.render(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AnsiRenderer, Constraint, Direction, LayoutNode, LayoutTree, ShellRuntime, Size,
    };
    use crossterm::event::{KeyModifiers, MouseEvent};

    const DESKTOP: &str = "shell:desktop";

    fn shell_runtime() -> ShellRuntime {
        let layout = LayoutTree::new(LayoutNode {
            id: "shell:root".into(),
            direction: Direction::Column,
            constraints: vec![
                Constraint::Fixed(1),
                Constraint::Flex(1),
                Constraint::Fixed(1),
            ],
            children: vec![
                LayoutNode::leaf("shell:menubar"),
                LayoutNode::leaf(DESKTOP),
                LayoutNode::leaf("shell:dock"),
            ],
            gap: 0,
            padding: 0,
        });
        let mut runtime =
            ShellRuntime::new(layout, AnsiRenderer::with_default(), Size::new(80, 24)).unwrap();
        runtime.register_controller(WindowController::new(
            DESKTOP,
            "portfolio",
            "Portfolio",
            vec![("About".into(), "about".into())],
        ));
        runtime
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> ShellEvent {
        ShellEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn down(column: u16, row: u16) -> ShellEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    fn up(column: u16, row: u16) -> ShellEvent {
        mouse(MouseEventKind::Up(MouseButton::Left), column, row)
    }

    fn drag(column: u16, row: u16) -> ShellEvent {
        mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    fn tick(ms: u64) -> ShellEvent {
        ShellEvent::Tick {
            elapsed: Duration::from_millis(ms),
        }
    }

    fn state(runtime: &ShellRuntime) -> (WindowMode, Visibility, WindowGeometry) {
        let shared = runtime.shared().get::<RwLock<WindowState>>().unwrap();
        let guard = shared.read().unwrap();
        (guard.mode, guard.visibility, guard.geometry)
    }

    // Desktop is 80x22 at y=1; the normal preset is 60x18 at (10, 1), so the
    // header row sits at global row 2 and controls at columns 11/13/15.

    #[test]
    fn initial_state_is_normal_visible_at_preset() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime.run_scripted(&mut out, std::iter::empty()).unwrap();
        let (mode, visibility, geometry) = state(&runtime);
        assert_eq!(mode, WindowMode::Normal);
        assert_eq!(visibility, Visibility::Visible);
        assert_eq!(
            geometry,
            WindowGeometry {
                x: 10,
                y: 1,
                width: 60,
                height: 18
            }
        );
    }

    #[test]
    fn maximize_then_restore_round_trips_geometry() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        // Maximize via the control at (15, 2); once maximized the window sits
        // at (1, 0), so its maximize control moves to (6, 1).
        runtime
            .run_scripted(&mut out, vec![down(15, 2), down(6, 1)])
            .unwrap();
        let (mode, _, geometry) = state(&runtime);
        assert_eq!(mode, WindowMode::Normal);
        assert_eq!(
            geometry,
            WindowGeometry {
                x: 10,
                y: 1,
                width: 60,
                height: 18
            }
        );
    }

    #[test]
    fn header_double_click_toggles_maximize() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![down(30, 2), up(30, 2), down(30, 2)])
            .unwrap();
        let (mode, _, _) = state(&runtime);
        assert_eq!(mode, WindowMode::Maximized);
    }

    #[test]
    fn maximize_swaps_to_full_desktop_preset() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime.run_scripted(&mut out, vec![down(15, 2)]).unwrap();
        let (mode, _, geometry) = state(&runtime);
        assert_eq!(mode, WindowMode::Maximized);
        assert_eq!(
            geometry,
            WindowGeometry {
                x: 1,
                y: 0,
                width: 78,
                height: 22
            }
        );
    }

    #[test]
    fn drag_repositions_the_window() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![down(30, 2), drag(35, 5), up(35, 5)])
            .unwrap();
        let (_, _, geometry) = state(&runtime);
        assert_eq!((geometry.x, geometry.y), (15, 4));
    }

    #[test]
    fn restore_after_drag_uses_the_preset_not_the_drag_position() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                vec![
                    // Drag the window to (15, 4).
                    down(30, 2),
                    drag(35, 5),
                    up(35, 5),
                    // Maximize via its control (now at column 20, row 5),
                    // then restore via the maximized control at (6, 1).
                    down(20, 5),
                    down(6, 1),
                ],
            )
            .unwrap();
        let (mode, _, geometry) = state(&runtime);
        assert_eq!(mode, WindowMode::Normal);
        // The drag position is forgotten; restore lands on the preset.
        assert_eq!(
            geometry,
            WindowGeometry {
                x: 10,
                y: 1,
                width: 60,
                height: 18
            }
        );
    }

    #[test]
    fn drag_is_rejected_while_maximized() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                vec![
                    down(15, 2), // maximize via control
                    down(40, 1), // header of the maximized window
                    drag(45, 6),
                    up(45, 6),
                ],
            )
            .unwrap();
        let (mode, _, geometry) = state(&runtime);
        assert_eq!(mode, WindowMode::Maximized);
        assert_eq!((geometry.x, geometry.y), (1, 0));
    }

    #[test]
    fn close_fades_then_hides() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![down(11, 2), tick(100)])
            .unwrap();
        let (_, visibility, _) = state(&runtime);
        assert_eq!(visibility, Visibility::Visible, "still fading at 100ms");

        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![down(11, 2), tick(400)])
            .unwrap();
        let (_, visibility, _) = state(&runtime);
        assert_eq!(visibility, Visibility::Closed);
    }

    #[test]
    fn minimize_is_transient_and_self_reverts() {
        let mut runtime = shell_runtime();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![down(13, 2), tick(600), tick(200)])
            .unwrap();
        let (_, visibility, _) = state(&runtime);
        // Minimized never persists; the bounce lands back on Visible.
        assert_eq!(visibility, Visibility::Visible);
    }

    #[test]
    fn missing_desktop_zone_disables_the_controller() {
        let layout = LayoutTree::new(LayoutNode {
            id: "root".into(),
            direction: Direction::Column,
            constraints: vec![Constraint::Flex(1)],
            children: vec![LayoutNode::leaf("elsewhere")],
            gap: 0,
            padding: 0,
        });
        let mut runtime =
            ShellRuntime::new(layout, AnsiRenderer::with_default(), Size::new(20, 5)).unwrap();
        runtime.register_controller(WindowController::new(
            DESKTOP,
            "portfolio",
            "Portfolio",
            Vec::new(),
        ));
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![down(2, 2), tick(200)])
            .unwrap();
    }
}
