//! The shared content document: the terminal stand-in for the page DOM.
//!
//! Sections hold blocks; blocks carry optional element ids (for reveals,
//! anchors, and outbound links) and a revealed flag. Layout is stable by
//! construction: a hidden block occupies the same rows as a revealed one, the
//! way `opacity: 0` keeps a card's box in the flow.

use std::sync::{Arc, RwLock};

use crate::runtime::RuntimeContext;
use crate::runtime::shared_state::SharedStateError;

/// One authored portfolio item. Static configuration, display order = list
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub badge: String,
    pub tags: Vec<String>,
    pub link: String,
}

/// Fixed, ordered sequence of catalog entries.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    entries: Vec<CatalogEntry>,
}

impl ContentCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One renderable fragment within a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: Option<String>,
    pub lines: Vec<String>,
    pub revealed: bool,
    /// Destination URL when this block is an outbound link target.
    pub outbound: Option<String>,
}

impl Block {
    pub fn text(lines: Vec<String>) -> Self {
        Self {
            id: None,
            lines,
            revealed: true,
            outbound: None,
        }
    }

    pub fn tagged(id: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::text(lines)
        }
    }

    pub fn with_outbound(mut self, url: impl Into<String>) -> Self {
        self.outbound = Some(url.into());
        self
    }

    fn height(&self) -> u16 {
        self.lines.len() as u16
    }
}

/// Identified region of the document, the `<section id=...>` analog.
#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            blocks,
        }
    }

    /// Rows this section occupies: heading, blocks, trailing separator row.
    fn height(&self) -> u16 {
        1 + self.blocks.iter().map(Block::height).sum::<u16>() + 1
    }
}

/// Ordered sections forming the scrollable document.
#[derive(Debug, Clone, Default)]
pub struct ContentDoc {
    sections: Vec<Section>,
}

impl ContentDoc {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_ids(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }

    pub fn total_height(&self) -> u16 {
        self.sections.iter().map(Section::height).sum()
    }

    /// Row of the section heading within the flattened document.
    pub fn section_offset(&self, section_id: &str) -> Option<u16> {
        let mut row = 0u16;
        for section in &self.sections {
            if section.id == section_id {
                return Some(row);
            }
            row = row.saturating_add(section.height());
        }
        None
    }

    /// Offset and height of a section.
    pub fn section_span(&self, section_id: &str) -> Option<(u16, u16)> {
        self.section_offset(section_id).map(|offset| {
            let height = self
                .sections
                .iter()
                .find(|s| s.id == section_id)
                .map(Section::height)
                .unwrap_or(0);
            (offset, height)
        })
    }

    /// Offset and height of an identified block.
    pub fn block_span(&self, block_id: &str) -> Option<(u16, u16)> {
        let mut row = 0u16;
        for section in &self.sections {
            row = row.saturating_add(1); // heading
            for block in &section.blocks {
                if block.id.as_deref() == Some(block_id) {
                    return Some((row, block.height()));
                }
                row = row.saturating_add(block.height());
            }
            row = row.saturating_add(1); // separator
        }
        None
    }

    /// Replace a section's blocks wholesale. Returns false when the section
    /// does not exist (silent no-op for the caller).
    pub fn replace_blocks(&mut self, section_id: &str, blocks: Vec<Block>) -> bool {
        match self.sections.iter_mut().find(|s| s.id == section_id) {
            Some(section) => {
                section.blocks = blocks;
                true
            }
            None => false,
        }
    }

    /// Flip a block's revealed flag. Returns false for unknown ids.
    pub fn set_revealed(&mut self, block_id: &str, revealed: bool) -> bool {
        for section in &mut self.sections {
            for block in &mut section.blocks {
                if block.id.as_deref() == Some(block_id) {
                    block.revealed = revealed;
                    return true;
                }
            }
        }
        false
    }

    pub fn is_revealed(&self, block_id: &str) -> Option<bool> {
        for section in &self.sections {
            for block in &section.blocks {
                if block.id.as_deref() == Some(block_id) {
                    return Some(block.revealed);
                }
            }
        }
        None
    }

    /// Outbound destination at a document row, if the row belongs to an
    /// outbound block.
    pub fn outbound_at(&self, row: u16) -> Option<(&str, &str)> {
        let mut cursor = 0u16;
        for section in &self.sections {
            cursor = cursor.saturating_add(1);
            for block in &section.blocks {
                let next = cursor.saturating_add(block.height());
                if row >= cursor && row < next {
                    return match (&block.id, &block.outbound) {
                        (Some(id), Some(url)) => Some((id.as_str(), url.as_str())),
                        _ => None,
                    };
                }
                cursor = next;
            }
            cursor = cursor.saturating_add(1);
        }
        None
    }

    /// Flatten the document into display rows. Hidden blocks keep their rows
    /// but render blank.
    pub fn flatten(&self) -> Vec<String> {
        let mut rows = Vec::with_capacity(self.total_height() as usize);
        for section in &self.sections {
            rows.push(format!("── {} ──", section.title));
            for block in &section.blocks {
                if block.revealed {
                    rows.extend(block.lines.iter().cloned());
                } else {
                    rows.extend(std::iter::repeat_n(String::new(), block.lines.len()));
                }
            }
            rows.push(String::new());
        }
        rows
    }
}

/// Document plus viewport scroll bookkeeping, shared across controllers.
#[derive(Debug, Default)]
pub struct ContentState {
    pub doc: ContentDoc,
    scroll: u16,
    scroll_target: Option<u16>,
}

impl ContentState {
    pub fn new(doc: ContentDoc) -> Self {
        Self {
            doc,
            scroll: 0,
            scroll_target: None,
        }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Start easing toward a target offset.
    pub fn begin_smooth_scroll(&mut self, target: u16) {
        self.scroll_target = Some(target);
    }

    /// Direct jump (wheel scroll); cancels any smooth scroll in flight.
    pub fn scroll_by(&mut self, delta: i32, max_scroll: u16) {
        self.scroll_target = None;
        let next = self.scroll as i32 + delta;
        self.scroll = next.clamp(0, max_scroll as i32) as u16;
    }

    pub fn smooth_scroll_active(&self) -> bool {
        self.scroll_target.is_some()
    }

    /// Advance one easing step toward the target. Returns true when the
    /// offset changed.
    pub fn step_smooth_scroll(&mut self) -> bool {
        let Some(target) = self.scroll_target else {
            return false;
        };
        if target == self.scroll {
            self.scroll_target = None;
            return false;
        }
        let distance = (target as i32 - self.scroll as i32).abs();
        let step = (distance / 3).max(1);
        if target > self.scroll {
            self.scroll = self.scroll.saturating_add(step as u16).min(target);
        } else {
            self.scroll = self.scroll.saturating_sub(step as u16).max(target);
        }
        if self.scroll == target {
            self.scroll_target = None;
        }
        true
    }
}

pub type SharedContent = Arc<RwLock<ContentState>>;

/// Fetch the shared content document, creating an empty one when the host
/// did not seed it.
pub fn ensure_content(ctx: &RuntimeContext<'_>) -> Result<SharedContent, SharedStateError> {
    ctx.shared_init::<RwLock<ContentState>, _>(|| RwLock::new(ContentState::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ContentDoc {
        ContentDoc::new(vec![
            Section::new(
                "home",
                "Home",
                vec![Block::tagged("home.cta", vec!["see projects".into()])],
            ),
            Section::new(
                "projects",
                "Projects",
                vec![
                    Block::tagged("project.0", vec!["card a".into(), "line".into()])
                        .with_outbound("https://example.org/a"),
                    Block::tagged("project.1", vec!["card b".into()]),
                ],
            ),
        ])
    }

    #[test]
    fn offsets_are_cumulative() {
        let doc = doc();
        assert_eq!(doc.section_offset("home"), Some(0));
        // home: heading + 1 block line + separator = 3 rows.
        assert_eq!(doc.section_offset("projects"), Some(3));
        assert_eq!(doc.block_span("project.0"), Some((4, 2)));
        assert_eq!(doc.block_span("project.1"), Some((6, 1)));
        assert_eq!(doc.section_offset("missing"), None);
    }

    #[test]
    fn flatten_keeps_rows_for_hidden_blocks() {
        let mut doc = doc();
        let total = doc.total_height();
        doc.set_revealed("project.0", false);
        let rows = doc.flatten();
        assert_eq!(rows.len() as u16, total);
        assert_eq!(rows[4], "");
        assert_eq!(rows[5], "");
        assert_eq!(rows[6], "card b");
    }

    #[test]
    fn outbound_lookup_by_row() {
        let doc = doc();
        assert_eq!(
            doc.outbound_at(4),
            Some(("project.0", "https://example.org/a"))
        );
        assert_eq!(
            doc.outbound_at(5),
            Some(("project.0", "https://example.org/a"))
        );
        assert_eq!(doc.outbound_at(6), None); // project.1 has no outbound
        assert_eq!(doc.outbound_at(0), None); // heading row
    }

    #[test]
    fn replace_blocks_is_wholesale() {
        let mut doc = doc();
        assert!(doc.replace_blocks("projects", vec![Block::text(vec!["only".into()])]));
        assert_eq!(doc.section_span("projects").unwrap().1, 3);
        assert!(!doc.replace_blocks("missing", Vec::new()));
    }

    #[test]
    fn smooth_scroll_eases_and_terminates() {
        let mut state = ContentState::new(doc());
        state.begin_smooth_scroll(9);
        let mut steps = 0;
        while state.smooth_scroll_active() {
            assert!(state.step_smooth_scroll() || !state.smooth_scroll_active());
            steps += 1;
            assert!(steps < 32, "smooth scroll failed to converge");
        }
        assert_eq!(state.scroll(), 9);
        assert!(steps > 1, "easing should take multiple steps");
    }

    #[test]
    fn wheel_scroll_clamps_and_cancels_easing() {
        let mut state = ContentState::new(doc());
        state.begin_smooth_scroll(9);
        state.scroll_by(-3, 10);
        assert_eq!(state.scroll(), 0);
        assert!(!state.smooth_scroll_active());
        state.scroll_by(25, 10);
        assert_eq!(state.scroll(), 10);
    }
}
