//! Zone registry orchestrator; the implementation lives in `core`.

mod core;

pub use core::{ZoneContent, ZoneId, ZoneRegistry, ZoneState};
