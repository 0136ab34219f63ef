//! Terminal desktop shell for a portfolio "pseudo-OS".
//!
//! One event loop, many independent controllers: a menu-bar clock, a
//! persisted light/dark theme, a draggable pseudo-window, a static content
//! catalog, tabs, a dock, smooth-scroll navigation, one-shot reveals, and
//! instrumentation hooks. Controllers share nothing but the typed handles in
//! [`runtime::shared_state::SharedState`], the way page widgets share a DOM.

pub mod content;
pub mod controllers;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod width;

pub use content::{
    Block, CatalogEntry, ContentCatalog, ContentDoc, ContentState, Section, SharedContent,
    ensure_content,
};
pub use controllers::{
    AnchorLink, CatalogController, ClockController, DeferredAsset, DockController, DockItem,
    InstrumentationController, NavigationController, RevealController, TabController, TabDef,
    ThemeController, WallClock, WindowController, WindowState,
};
pub use error::{Result, ShellError};
pub use geometry::{Rect, Size};
pub use layout::{Constraint, Direction, LayoutNode, LayoutTree, NodeId};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{MetricSnapshot, ShellMetrics};
pub use registry::{ZoneContent, ZoneId, ZoneRegistry};
pub use render::{AnsiRenderer, RendererSettings};
pub use runtime::capabilities::{
    AnalyticsCollector, AnalyticsProps, AssetFetcher, BackgroundRegistrar, LogCollector,
    NullCollector, NullFetcher, NullRegistrar, register_background,
};
pub use runtime::diagnostics::{LifecycleLoggerController, MetricsSnapshotController};
pub use runtime::driver::{DriverResult, TerminalDriver, TerminalDriverError};
pub use runtime::selection::{
    SelectionEntry, SelectionRegistry, SharedSelection, ensure_selection_registry,
};
pub use runtime::shared_state::{SharedState, SharedStateError};
pub use runtime::storage::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, THEME_KEY,
};
pub use runtime::timer::{Countdown, RepeatingTimer};
pub use runtime::{
    ControllerBundle, EventFlow, RuntimeConfig, RuntimeContext, ShellController, ShellEvent,
    ShellRuntime, ThemeMode,
};
pub use width::display_width;
