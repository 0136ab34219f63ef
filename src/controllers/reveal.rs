//! One-shot reveal of observed content blocks entering the viewport.

use std::collections::HashSet;

use crate::Result;
use crate::content::{SharedContent, ensure_content};
use crate::controllers::window::{SharedWindow, ensure_window};
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};

/// Rows above the viewport's lower edge an element must cross before it
/// triggers.
const BOTTOM_MARGIN: u16 = 2;

pub struct RevealController {
    observed: Vec<String>,
    revealed: HashSet<String>,
    content: Option<SharedContent>,
    window: Option<SharedWindow>,
}

impl RevealController {
    pub fn new(observed: Vec<String>) -> Self {
        Self {
            observed,
            revealed: HashSet::new(),
            content: None,
            window: None,
        }
    }

    pub fn revealed(&self, block_id: &str) -> bool {
        self.revealed.contains(block_id)
    }

    fn evaluate(&mut self, ctx: &mut RuntimeContext<'_>) {
        let Some(viewport) = self
            .window
            .as_ref()
            .and_then(|window| window.read().ok())
            .and_then(|state| state.content_rect)
        else {
            return;
        };
        let Some(content) = self.content.as_ref() else {
            return;
        };
        let Ok(mut state) = content.write() else {
            return;
        };

        let scroll = state.scroll();
        let lower = scroll + viewport.height.saturating_sub(BOTTOM_MARGIN);
        let mut changed = false;

        for id in &self.observed {
            if self.revealed.contains(id) {
                // Already revealed: later intersections are harmless no-ops.
                continue;
            }
            let Some((offset, height)) = state.doc.block_span(id) else {
                continue;
            };
            if offset < lower && offset + height > scroll {
                state.doc.set_revealed(id, true);
                self.revealed.insert(id.clone());
                changed = true;
            }
        }

        if changed {
            ctx.request_render();
        }
    }
}

impl ShellController for RevealController {
    fn name(&self) -> &str {
        "shell.reveal"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.content = ensure_content(ctx).ok();
        self.window = ensure_window(ctx).ok();

        // Initial state is hidden/offset for every observed block.
        if let Some(content) = self.content.as_ref() {
            if let Ok(mut state) = content.write() {
                for id in &self.observed {
                    state.doc.set_revealed(id, false);
                }
            }
        }
        self.evaluate(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        if matches!(event, ShellEvent::Tick { .. } | ShellEvent::Mouse(_)) {
            self.evaluate(ctx);
        }
        Ok(EventFlow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Block, ContentDoc, ContentState, Section};
    use crate::controllers::window::WindowState;
    use crate::geometry::Rect;
    use crate::{
        AnsiRenderer, Constraint, Direction, LayoutNode, LayoutTree, ShellRuntime, Size,
    };
    use crossterm::event::{KeyModifiers, MouseEvent, MouseEventKind};
    use std::sync::{Arc, RwLock};
    use std::time::Duration;

    fn doc() -> ContentDoc {
        let filler = (0..12)
            .map(|i| Block::text(vec![format!("row {i}")]))
            .collect::<Vec<_>>();
        ContentDoc::new(vec![
            Section::new("about", "About", filler),
            Section::new(
                "projects",
                "Projects",
                vec![Block::tagged("project.0", vec!["card".into(), "body".into()])],
            ),
        ])
    }

    fn runtime_with_reveal() -> ShellRuntime {
        let layout = LayoutTree::new(LayoutNode {
            id: "root".into(),
            direction: Direction::Column,
            constraints: vec![Constraint::Flex(1)],
            children: vec![LayoutNode::leaf("shell:desktop")],
            gap: 0,
            padding: 0,
        });
        let mut runtime =
            ShellRuntime::new(layout, AnsiRenderer::with_default(), Size::new(60, 24)).unwrap();
        runtime
            .shared()
            .insert_arc(Arc::new(RwLock::new(ContentState::new(doc()))))
            .unwrap();
        runtime
            .shared()
            .insert_arc(Arc::new(RwLock::new(WindowState {
                content_rect: Some(Rect::new(5, 4, 40, 8)),
                ..WindowState::default()
            })))
            .unwrap();
        runtime.register_controller(RevealController::new(vec!["project.0".into()]));
        runtime
    }

    fn tick() -> ShellEvent {
        ShellEvent::Tick {
            elapsed: Duration::from_millis(200),
        }
    }

    fn wheel(kind: MouseEventKind) -> ShellEvent {
        ShellEvent::Mouse(MouseEvent {
            kind,
            column: 10,
            row: 6,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn is_revealed(runtime: &ShellRuntime) -> bool {
        let content = runtime.shared().get::<RwLock<ContentState>>().unwrap();
        let revealed = content.read().unwrap().doc.is_revealed("project.0").unwrap();
        revealed
    }

    // project.0 sits at doc rows 15..17; the 8-row viewport with a 2-row
    // bottom margin reveals rows below offset scroll+6, and max scroll is 10.

    #[test]
    fn below_fold_block_stays_hidden() {
        let mut runtime = runtime_with_reveal();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![tick(), tick()])
            .unwrap();
        assert!(!is_revealed(&runtime));
    }

    #[test]
    fn reveals_once_scrolled_into_view_and_stays_revealed() {
        let mut runtime = runtime_with_reveal();
        // Wheel scrolling is the navigation controller's job; register it so
        // one script can move the viewport both ways.
        runtime.register_controller(crate::controllers::NavigationController::new(Vec::new()));
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                vec![
                    tick(),
                    wheel(MouseEventKind::ScrollDown),
                    wheel(MouseEventKind::ScrollDown),
                    wheel(MouseEventKind::ScrollDown),
                    wheel(MouseEventKind::ScrollDown),
                    tick(),
                    // Back above the fold: the record must not reset.
                    wheel(MouseEventKind::ScrollUp),
                    wheel(MouseEventKind::ScrollUp),
                    wheel(MouseEventKind::ScrollUp),
                    wheel(MouseEventKind::ScrollUp),
                    tick(),
                ],
            )
            .unwrap();
        assert!(is_revealed(&runtime));

        let content = runtime.shared().get::<RwLock<ContentState>>().unwrap();
        let scroll = content.read().unwrap().scroll();
        assert_eq!(scroll, 0, "wheel-up script should land back at the top");
    }
}
