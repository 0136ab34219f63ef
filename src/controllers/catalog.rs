//! Renders the static portfolio catalog into its content section.

use crate::Result;
use crate::content::{Block, ContentCatalog, SharedContent, ensure_content};
use crate::runtime::{RuntimeContext, ShellController};

/// Maps the authored entry list to one block per entry, in list order.
/// Re-rendering replaces the section wholesale; no diffing.
pub struct CatalogController {
    section_id: String,
    catalog: ContentCatalog,
    content: Option<SharedContent>,
}

impl CatalogController {
    pub fn new(section_id: impl Into<String>, catalog: ContentCatalog) -> Self {
        Self {
            section_id: section_id.into(),
            catalog,
            content: None,
        }
    }

    fn render(&self) {
        let Some(content) = self.content.as_ref() else {
            return;
        };
        if let Ok(mut state) = content.write() {
            // Unknown section: one controller degrades, nothing else does.
            let _ = state
                .doc
                .replace_blocks(&self.section_id, entry_blocks(&self.catalog));
        }
    }
}

/// Display fragments for the catalog, exposed for idempotence checks.
pub fn entry_blocks(catalog: &ContentCatalog) -> Vec<Block> {
    catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let lines = vec![
                format!("{}  {} · {}", entry.icon, entry.title, entry.badge),
                entry.description.clone(),
                entry.tags.join(" · "),
                format!("↗ {}", entry.link),
            ];
            Block::tagged(format!("project.{idx}"), lines).with_outbound(entry.link.clone())
        })
        .collect()
}

impl ShellController for CatalogController {
    fn name(&self) -> &str {
        "shell.catalog"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.content = ensure_content(ctx).ok();
        self.render();
        ctx.request_render();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CatalogEntry, ContentDoc, ContentState, Section};

    fn catalog() -> ContentCatalog {
        ContentCatalog::new(vec![
            CatalogEntry {
                title: "Shell".into(),
                description: "Terminal desktop shell.".into(),
                icon: "⌘".into(),
                badge: "Latest".into(),
                tags: vec!["Rust".into(), "TUI".into()],
                link: "https://example.org/shell".into(),
            },
            CatalogEntry {
                title: "Tools".into(),
                description: "Developer tooling.".into(),
                icon: "⚙".into(),
                badge: "Active".into(),
                tags: vec!["CLI".into()],
                link: "https://example.org/tools".into(),
            },
        ])
    }

    #[test]
    fn blocks_follow_entry_order_and_carry_links() {
        let blocks = entry_blocks(&catalog());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id.as_deref(), Some("project.0"));
        assert_eq!(blocks[0].outbound.as_deref(), Some("https://example.org/shell"));
        assert!(blocks[0].lines[0].contains("Shell · Latest"));
        assert_eq!(blocks[0].lines[2], "Rust · TUI");
        assert_eq!(blocks[1].id.as_deref(), Some("project.1"));
    }

    #[test]
    fn render_is_idempotent() {
        let catalog = catalog();
        let mut state = ContentState::new(ContentDoc::new(vec![Section::new(
            "projects",
            "Projects",
            Vec::new(),
        )]));

        state.doc.replace_blocks("projects", entry_blocks(&catalog));
        let first = state.doc.sections()[0].blocks.clone();
        state.doc.replace_blocks("projects", entry_blocks(&catalog));
        let second = state.doc.sections()[0].blocks.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_section_is_a_noop() {
        let mut state = ContentState::new(ContentDoc::new(Vec::new()));
        assert!(!state.doc.replace_blocks("projects", entry_blocks(&catalog())));
    }
}
