//! Smooth-scroll navigation shared by toolbar buttons and in-page anchors,
//! plus the wheel scrolling of the content viewport.

use crossterm::event::{MouseButton, MouseEventKind};

use crate::Result;
use crate::content::{SharedContent, ensure_content};
use crate::controllers::window::{SharedWindow, ensure_window};
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};

/// Rows kept above a scrolled-to section heading.
const SCROLL_TOP_MARGIN: u16 = 1;
/// Wheel step in rows.
const WHEEL_STEP: i32 = 3;

/// In-content link whose href may be an in-page fragment (`#section`).
#[derive(Debug, Clone)]
pub struct AnchorLink {
    pub block_id: String,
    pub href: String,
}

pub struct NavigationController {
    anchors: Vec<AnchorLink>,
    content: Option<SharedContent>,
    window: Option<SharedWindow>,
}

impl NavigationController {
    pub fn new(anchors: Vec<AnchorLink>) -> Self {
        Self {
            anchors,
            content: None,
            window: None,
        }
    }

    fn viewport(&self) -> Option<crate::geometry::Rect> {
        self.window.as_ref()?.read().ok()?.content_rect
    }

    fn max_scroll(&self, viewport_height: u16) -> u16 {
        self.content
            .as_ref()
            .and_then(|content| content.read().ok())
            .map(|state| state.doc.total_height().saturating_sub(viewport_height))
            .unwrap_or(0)
    }

    /// Locate the target section and ease the viewport to it. Unresolved
    /// targets scroll nothing.
    fn scroll_to_section(&self, section_id: &str) {
        let Some(viewport) = self.viewport() else {
            return;
        };
        let Some(content) = self.content.as_ref() else {
            return;
        };
        let Ok(mut state) = content.write() else {
            return;
        };
        let Some(offset) = state.doc.section_offset(section_id) else {
            return;
        };
        let max = state.doc.total_height().saturating_sub(viewport.height);
        let target = offset.saturating_sub(SCROLL_TOP_MARGIN).min(max);
        state.begin_smooth_scroll(target);
    }

    fn toolbar_target(&self, column: u16, row: u16) -> Option<String> {
        let window = self.window.as_ref()?.read().ok()?;
        if window.toolbar_row != Some(row) {
            return None;
        }
        window
            .toolbar_hits
            .iter()
            .find(|hit| column >= hit.start && column < hit.end)
            .map(|hit| hit.section_id.clone())
    }

    /// Anchor under a content click, if any.
    fn anchor_at(&self, column: u16, row: u16) -> Option<&AnchorLink> {
        let viewport = self.viewport()?;
        if !viewport.contains(column, row) {
            return None;
        }
        let content = self.content.as_ref()?;
        let state = content.read().ok()?;
        let doc_row = state.scroll() + (row - viewport.y);
        self.anchors.iter().find(|anchor| {
            state
                .doc
                .block_span(&anchor.block_id)
                .map(|(offset, height)| doc_row >= offset && doc_row < offset + height)
                .unwrap_or(false)
        })
    }

    fn handle_click(&mut self, column: u16, row: u16) -> EventFlow {
        if let Some(section_id) = self.toolbar_target(column, row) {
            self.scroll_to_section(&section_id);
            return EventFlow::Consumed;
        }

        if let Some(anchor) = self.anchor_at(column, row) {
            let href = anchor.href.clone();
            // Only a non-empty in-page fragment suppresses default
            // navigation; the scroll itself still requires the target to
            // resolve.
            if let Some(target) = href.strip_prefix('#') {
                if !target.is_empty() {
                    self.scroll_to_section(target);
                    return EventFlow::Consumed;
                }
            }
        }

        EventFlow::Continue
    }

    fn handle_wheel(&mut self, column: u16, row: u16, delta: i32) -> EventFlow {
        let Some(viewport) = self.viewport() else {
            return EventFlow::Continue;
        };
        if !viewport.contains(column, row) {
            return EventFlow::Continue;
        }
        let max = self.max_scroll(viewport.height);
        if let Some(content) = self.content.as_ref() {
            if let Ok(mut state) = content.write() {
                state.scroll_by(delta, max);
            }
        }
        EventFlow::Consumed
    }
}

impl ShellController for NavigationController {
    fn name(&self) -> &str {
        "shell.navigation"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.content = ensure_content(ctx).ok();
        self.window = ensure_window(ctx).ok();
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        match event {
            ShellEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let flow = self.handle_click(mouse.column, mouse.row);
                    if flow == EventFlow::Consumed {
                        ctx.request_render();
                    }
                    Ok(flow)
                }
                MouseEventKind::ScrollDown => {
                    let flow = self.handle_wheel(mouse.column, mouse.row, WHEEL_STEP);
                    if flow == EventFlow::Consumed {
                        ctx.request_render();
                    }
                    Ok(flow)
                }
                MouseEventKind::ScrollUp => {
                    let flow = self.handle_wheel(mouse.column, mouse.row, -WHEEL_STEP);
                    if flow == EventFlow::Consumed {
                        ctx.request_render();
                    }
                    Ok(flow)
                }
                _ => Ok(EventFlow::Continue),
            },
            ShellEvent::Tick { .. } => {
                let stepped = self
                    .content
                    .as_ref()
                    .and_then(|content| content.write().ok().map(|mut s| s.step_smooth_scroll()))
                    .unwrap_or(false);
                if stepped {
                    ctx.request_render();
                }
                Ok(EventFlow::Continue)
            }
            _ => Ok(EventFlow::Continue),
        }
    }
}
