//! Instrumentation hooks: outbound-click and section-view analytics, plus
//! deferred asset loading. Pure observation; never consumes an event.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crossterm::event::{MouseButton, MouseEventKind};
use serde_json::json;

use crate::Result;
use crate::content::{SharedContent, ensure_content};
use crate::controllers::window::{SharedWindow, ensure_window};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::runtime::capabilities::{AnalyticsCollector, AnalyticsProps, AssetFetcher};
use crate::runtime::{EventFlow, RuntimeContext, ShellController, ShellEvent};

/// A block whose real asset source is assigned only near the viewport.
#[derive(Debug, Clone)]
pub struct DeferredAsset {
    pub block_id: String,
    pub source: String,
}

pub struct InstrumentationController {
    collector: Arc<dyn AnalyticsCollector>,
    fetcher: Arc<dyn AssetFetcher>,
    logger: Option<Logger>,
    assets: Vec<DeferredAsset>,
    loaded: HashSet<String>,
    lazy_hinted: Vec<String>,
    section_in_view: HashMap<String, bool>,
    content: Option<SharedContent>,
    window: Option<SharedWindow>,
}

impl InstrumentationController {
    pub fn new(
        collector: Arc<dyn AnalyticsCollector>,
        fetcher: Arc<dyn AssetFetcher>,
        assets: Vec<DeferredAsset>,
    ) -> Self {
        Self {
            collector,
            fetcher,
            logger: None,
            assets,
            loaded: HashSet::new(),
            lazy_hinted: Vec::new(),
            section_in_view: HashMap::new(),
            content: None,
            window: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Blocks given the unconditional lazy-loading hint at init.
    pub fn lazy_hinted(&self) -> &[String] {
        &self.lazy_hinted
    }

    fn viewport_span(&self) -> Option<(u16, u16)> {
        let viewport = self
            .window
            .as_ref()?
            .read()
            .ok()?
            .content_rect?;
        let content = self.content.as_ref()?;
        let scroll = content.read().ok()?.scroll();
        Some((scroll, scroll + viewport.height))
    }

    fn track_outbound_click(&self, column: u16, row: u16) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(viewport) = window.read().ok().and_then(|state| state.content_rect) else {
            return;
        };
        if !viewport.contains(column, row) {
            return;
        }
        let Some(content) = self.content.as_ref() else {
            return;
        };
        let Ok(state) = content.read() else {
            return;
        };
        let doc_row = state.scroll() + (row - viewport.y);
        if let Some((_, url)) = state.doc.outbound_at(doc_row) {
            self.collector
                .event("click", &AnalyticsProps::new("external", url));
        }
    }

    fn evaluate_sections(&mut self) {
        let Some((top, bottom)) = self.viewport_span() else {
            return;
        };
        let Some(content) = self.content.as_ref() else {
            return;
        };
        let Ok(state) = content.read() else {
            return;
        };

        for id in state.doc.section_ids() {
            let Some((offset, height)) = state.doc.section_span(&id) else {
                continue;
            };
            let intersecting = offset < bottom && offset + height > top;
            let was = self.section_in_view.get(&id).copied().unwrap_or(false);
            // Views fire on every false -> true transition, first and later.
            if intersecting && !was {
                self.collector
                    .event("view", &AnalyticsProps::new("section", id.clone()));
            }
            self.section_in_view.insert(id, intersecting);
        }
    }

    fn evaluate_assets(&mut self) {
        let Some((top, bottom)) = self.viewport_span() else {
            return;
        };
        let spans: Vec<(String, String, Option<(u16, u16)>)> = {
            let Some(content) = self.content.as_ref() else {
                return;
            };
            let Ok(state) = content.read() else {
                return;
            };
            self.assets
                .iter()
                .filter(|asset| !self.loaded.contains(&asset.block_id))
                .map(|asset| {
                    (
                        asset.block_id.clone(),
                        asset.source.clone(),
                        state.doc.block_span(&asset.block_id),
                    )
                })
                .collect()
        };

        for (block_id, source, span) in spans {
            let Some((offset, height)) = span else {
                continue;
            };
            if offset < bottom && offset + height > top {
                // Assign the real source exactly once; failures are logged
                // and the asset is not retried (the observer unhooked it).
                if let Err(reason) = self.fetcher.fetch(&source) {
                    if let Some(logger) = self.logger.as_ref() {
                        let event = event_with_fields(
                            LogLevel::Warn,
                            "shell::instrumentation",
                            "asset_fetch_failed",
                            [
                                json_kv("source", json!(source)),
                                json_kv("reason", json!(reason)),
                            ],
                        );
                        let _ = logger.log_event(event);
                    }
                }
                self.loaded.insert(block_id);
            }
        }
    }
}

impl ShellController for InstrumentationController {
    fn name(&self) -> &str {
        "shell.instrumentation"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.content = ensure_content(ctx).ok();
        self.window = ensure_window(ctx).ok();

        // Every deferred image gets the lazy hint regardless of position.
        self.lazy_hinted = self
            .assets
            .iter()
            .map(|asset| asset.block_id.clone())
            .collect();

        self.evaluate_sections();
        self.evaluate_assets();
        Ok(())
    }

    fn on_event(&mut self, _ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        match event {
            ShellEvent::Mouse(mouse) => {
                if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
                    self.track_outbound_click(mouse.column, mouse.row);
                }
                self.evaluate_sections();
                self.evaluate_assets();
            }
            ShellEvent::Tick { .. } => {
                self.evaluate_sections();
                self.evaluate_assets();
            }
            _ => {}
        }
        Ok(EventFlow::Continue)
    }
}
