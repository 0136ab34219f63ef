use thiserror::Error;

/// Unified result type for the deskshell crate.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors surfaced by the shell runtime and its plumbing.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("layout tree is empty")]
    EmptyLayout,
    #[error("zone `{0}` not found")]
    ZoneNotFound(String),
    #[error("terminal backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
