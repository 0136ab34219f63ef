//! Error module orchestrator; the concrete types live in `types`.

mod types;

pub use types::{Result, ShellError};
