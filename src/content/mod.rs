//! Content document orchestrator; the model lives in `core`.

mod core;

pub use core::{
    Block, CatalogEntry, ContentCatalog, ContentDoc, ContentState, Section, SharedContent,
    ensure_content,
};
