//! Shell controllers: each file is one independent widget of the desktop.

pub mod catalog;
pub mod clock;
pub mod dock;
pub mod instrument;
pub mod navigation;
pub mod reveal;
pub mod tabs;
pub mod theme;
pub mod window;

pub use catalog::{CatalogController, entry_blocks};
pub use clock::{ClockController, LocalTime, TimeSource, WallClock, format_date, format_time};
pub use dock::{DockController, DockItem};
pub use instrument::{DeferredAsset, InstrumentationController};
pub use navigation::{AnchorLink, NavigationController};
pub use reveal::RevealController;
pub use tabs::{TabController, TabDef};
pub use theme::{SharedTheme, ThemeController, ensure_theme};
pub use window::{
    SharedWindow, ToolbarHit, Visibility, WindowController, WindowGeometry, WindowMode,
    WindowState, ensure_window,
};
