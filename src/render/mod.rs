//! Renderer orchestrator; the ANSI implementation lives in `core`.

mod core;

pub use core::{AnsiRenderer, RendererSettings};
