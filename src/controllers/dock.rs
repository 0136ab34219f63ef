//! Dock row: click an item to restore its window and take the active mark.

use crossterm::event::{MouseButton, MouseEventKind};

use crate::Result;
use crate::runtime::selection::{SharedSelection, ensure_selection_registry};
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};
use crate::controllers::window::{SharedWindow, Visibility, ensure_window};
use crate::width::display_width;

const SELECTION_OWNER: &str = "shell::dock";

/// One dock icon referencing a window id.
#[derive(Debug, Clone)]
pub struct DockItem {
    pub id: String,
    pub glyph: String,
    pub window_id: String,
}

pub struct DockController {
    zone: String,
    items: Vec<DockItem>,
    selection: Option<SharedSelection>,
    window: Option<SharedWindow>,
    /// Item hit ranges in global columns, refreshed on render.
    hits: Vec<(u16, u16, usize)>,
    enabled: bool,
}

impl DockController {
    pub fn new(zone: impl Into<String>, items: Vec<DockItem>) -> Self {
        Self {
            zone: zone.into(),
            items,
            selection: None,
            window: None,
            hits: Vec::new(),
            enabled: false,
        }
    }

    fn render(&mut self, ctx: &mut RuntimeContext<'_>) {
        if !self.enabled {
            return;
        }
        let Some(rect) = ctx.rect(&self.zone).copied() else {
            return;
        };

        let mut line = String::from(" ");
        self.hits.clear();
        for (idx, item) in self.items.iter().enumerate() {
            let active = self
                .selection
                .as_ref()
                .map(|selection| selection.is_active(&item.id))
                .unwrap_or(false);
            let cell = if active {
                format!("⟨{}⟩", item.glyph)
            } else {
                format!(" {} ", item.glyph)
            };
            let start = display_width(&line) as u16;
            line.push_str(&cell);
            let end = display_width(&line) as u16;
            line.push(' ');
            self.hits.push((rect.x + start, rect.x + end, idx));
        }

        ctx.set_zone_raw(&self.zone, line);
    }

    fn activate(&mut self, ctx: &mut RuntimeContext<'_>, idx: usize) {
        let Some(item) = self.items.get(idx) else {
            return;
        };

        // The referenced window must exist before anything happens, the
        // active mark included.
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let matches_window = window
            .read()
            .ok()
            .map(|state| state.id == item.window_id)
            .unwrap_or(false);
        if !matches_window {
            return;
        }

        if let Ok(mut state) = window.write() {
            if state.is_hidden() {
                // Bring it back; the settle delay lets the transition play.
                state.visibility = Visibility::Visible;
                state.fading = false;
                state.restore_pending = true;
            }
        }

        if let Some(selection) = self.selection.as_ref() {
            selection.activate(SELECTION_OWNER, item.id.clone());
        }
        self.render(ctx);
    }

    fn hit_item(&self, column: u16, row: u16, ctx: &RuntimeContext<'_>) -> Option<usize> {
        let rect = ctx.rect(&self.zone)?;
        if !rect.contains(column, row) {
            return None;
        }
        self.hits
            .iter()
            .find(|(start, end, _)| column >= *start && column < *end)
            .map(|(_, _, idx)| *idx)
    }
}

impl ShellController for DockController {
    fn name(&self) -> &str {
        "shell.dock"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.enabled = ctx.rect(&self.zone).is_some();
        if !self.enabled {
            return Ok(());
        }
        self.selection = ensure_selection_registry(ctx).ok();
        self.window = ensure_window(ctx).ok();
        self.render(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        if !self.enabled {
            return Ok(EventFlow::Continue);
        }
        if let ShellEvent::Mouse(mouse) = event {
            if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
                if let Some(idx) = self.hit_item(mouse.column, mouse.row, ctx) {
                    self.activate(ctx, idx);
                    return Ok(EventFlow::Consumed);
                }
            }
        }
        Ok(EventFlow::Continue)
    }
}
