//! Mutually-exclusive tab strip plus panel inside the content document.

use crossterm::event::{KeyCode, KeyEventKind, MouseButton, MouseEventKind};

use crate::Result;
use crate::content::{Block, SharedContent, ensure_content};
use crate::controllers::window::{SharedWindow, ensure_window};
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};
use crate::width::display_width;

/// One tab and the panel its key maps to. A key with no panel is legal: the
/// tab activates with nothing shown.
#[derive(Debug, Clone)]
pub struct TabDef {
    pub key: String,
    pub label: String,
    pub panel: Option<Vec<String>>,
}

pub struct TabController {
    section_id: String,
    strip_id: String,
    panel_id: String,
    tabs: Vec<TabDef>,
    active: usize,
    /// Hit ranges within the strip line, content-local columns.
    hits: Vec<(usize, usize, usize)>,
    content: Option<SharedContent>,
    window: Option<SharedWindow>,
}

impl TabController {
    pub fn new(section_id: impl Into<String>, tabs: Vec<TabDef>) -> Self {
        let section_id = section_id.into();
        Self {
            strip_id: format!("{section_id}.tabs"),
            panel_id: format!("{section_id}.panel"),
            section_id,
            tabs,
            active: 0,
            hits: Vec::new(),
            content: None,
            window: None,
        }
    }

    pub fn active_key(&self) -> Option<&str> {
        self.tabs.get(self.active).map(|tab| tab.key.as_str())
    }

    fn strip_line(&mut self) -> String {
        let mut line = String::new();
        self.hits.clear();
        for (idx, tab) in self.tabs.iter().enumerate() {
            let start = display_width(&line);
            if idx == self.active {
                line.push_str(&format!("[{}]", tab.label));
            } else {
                line.push_str(&format!(" {} ", tab.label));
            }
            let end = display_width(&line);
            self.hits.push((start, end, idx));
            line.push_str("  ");
        }
        line
    }

    fn render(&mut self, ctx: &mut RuntimeContext<'_>) {
        let strip = self.strip_line();
        let panel_lines = self
            .tabs
            .get(self.active)
            .and_then(|tab| tab.panel.clone())
            .unwrap_or_default();

        let Some(content) = self.content.as_ref() else {
            return;
        };
        if let Ok(mut state) = content.write() {
            let blocks = vec![
                Block::tagged(self.strip_id.clone(), vec![strip]),
                Block::tagged(self.panel_id.clone(), panel_lines),
            ];
            let _ = state.doc.replace_blocks(&self.section_id, blocks);
        }
        ctx.request_render();
    }

    fn activate(&mut self, ctx: &mut RuntimeContext<'_>, idx: usize) {
        if idx >= self.tabs.len() {
            return;
        }
        // Deactivate-all-then-activate collapses to replacing the single
        // active index; the render rebuilds both strip and panel.
        self.active = idx;
        self.render(ctx);
    }

    /// Map a global click to a tab index via the strip block's on-screen row.
    fn hit_tab(&self, column: u16, row: u16) -> Option<usize> {
        let window = self.window.as_ref()?;
        let content = self.content.as_ref()?;
        let viewport = window.read().ok()?.content_rect?;
        let state = content.read().ok()?;

        let (strip_row, _) = state.doc.block_span(&self.strip_id)?;
        let scroll = state.scroll();
        if strip_row < scroll || strip_row - scroll >= viewport.height {
            return None;
        }
        if row != viewport.y + (strip_row - scroll) {
            return None;
        }
        let local = column.checked_sub(viewport.x)? as usize;
        self.hits
            .iter()
            .find(|(start, end, _)| local >= *start && local < *end)
            .map(|(_, _, idx)| *idx)
    }
}

impl ShellController for TabController {
    fn name(&self) -> &str {
        "shell.tabs"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.content = ensure_content(ctx).ok();
        self.window = ensure_window(ctx).ok();
        self.render(ctx);
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        match event {
            ShellEvent::Key(key) if key.kind == KeyEventKind::Press => {
                if let KeyCode::Char(ch @ '1'..='9') = key.code {
                    let idx = (ch as u8 - b'1') as usize;
                    if idx < self.tabs.len() {
                        self.activate(ctx, idx);
                        return Ok(EventFlow::Consumed);
                    }
                }
                Ok(EventFlow::Continue)
            }
            ShellEvent::Mouse(mouse)
                if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) =>
            {
                if let Some(idx) = self.hit_tab(mouse.column, mouse.row) {
                    self.activate(ctx, idx);
                    return Ok(EventFlow::Consumed);
                }
                Ok(EventFlow::Continue)
            }
            _ => Ok(EventFlow::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentDoc, ContentState, Section};
    use crate::{
        AnsiRenderer, Constraint, Direction, LayoutNode, LayoutTree, ShellRuntime, Size,
    };
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::sync::{Arc, RwLock};

    fn tabs() -> Vec<TabDef> {
        vec![
            TabDef {
                key: "languages".into(),
                label: "Languages".into(),
                panel: Some(vec!["Rust".into(), "Go".into()]),
            },
            TabDef {
                key: "frameworks".into(),
                label: "Frameworks".into(),
                panel: Some(vec!["crossterm".into()]),
            },
            TabDef {
                key: "tools".into(),
                label: "Tools".into(),
                panel: None,
            },
        ]
    }

    fn runtime_with_tabs() -> ShellRuntime {
        let layout = LayoutTree::new(LayoutNode {
            id: "root".into(),
            direction: Direction::Column,
            constraints: vec![Constraint::Flex(1)],
            children: vec![LayoutNode::leaf("shell:desktop")],
            gap: 0,
            padding: 0,
        });
        let mut runtime =
            ShellRuntime::new(layout, AnsiRenderer::with_default(), Size::new(60, 20)).unwrap();
        let doc = ContentDoc::new(vec![Section::new("stack", "Stack", Vec::new())]);
        runtime
            .shared()
            .insert_arc(Arc::new(RwLock::new(ContentState::new(doc))))
            .unwrap();
        runtime.register_controller(TabController::new("stack", tabs()));
        runtime
    }

    fn key(ch: char) -> ShellEvent {
        ShellEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
    }

    fn panel_lines(runtime: &ShellRuntime) -> Vec<String> {
        let content = runtime.shared().get::<RwLock<ContentState>>().unwrap();
        let state = content.read().unwrap();
        let section = &state.doc.sections()[0];
        section.blocks[1].lines.clone()
    }

    fn strip_line(runtime: &ShellRuntime) -> String {
        let content = runtime.shared().get::<RwLock<ContentState>>().unwrap();
        let state = content.read().unwrap();
        state.doc.sections()[0].blocks[0].lines[0].clone()
    }

    #[test]
    fn first_tab_active_by_default() {
        let mut runtime = runtime_with_tabs();
        let mut out = Vec::new();
        runtime.run_scripted(&mut out, std::iter::empty()).unwrap();
        assert!(strip_line(&runtime).starts_with("[Languages]"));
        assert_eq!(panel_lines(&runtime), vec!["Rust", "Go"]);
    }

    #[test]
    fn sequential_activations_keep_exactly_one_active_pair() {
        let mut runtime = runtime_with_tabs();
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, vec![key('2'), key('1'), key('2')])
            .unwrap();
        let strip = strip_line(&runtime);
        assert!(strip.contains("[Frameworks]"));
        assert!(!strip.contains("[Languages]"));
        assert!(!strip.contains("[Tools]"));
        assert_eq!(panel_lines(&runtime), vec!["crossterm"]);
    }

    #[test]
    fn missing_panel_leaves_tab_active_with_empty_panel() {
        let mut runtime = runtime_with_tabs();
        let mut out = Vec::new();
        runtime.run_scripted(&mut out, vec![key('3')]).unwrap();
        assert!(strip_line(&runtime).contains("[Tools]"));
        assert!(panel_lines(&runtime).is_empty());
    }

    #[test]
    fn out_of_range_digit_changes_nothing() {
        let mut runtime = runtime_with_tabs();
        let mut out = Vec::new();
        runtime.run_scripted(&mut out, vec![key('7')]).unwrap();
        assert!(strip_line(&runtime).starts_with("[Languages]"));
    }
}
