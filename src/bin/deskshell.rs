//! Assembles the portfolio desktop: layout, content, controllers, driver.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEventKind};

use deskshell::{
    AnchorLink, AnalyticsCollector, AssetFetcher, BackgroundRegistrar, Block, CatalogController,
    CatalogEntry, ClockController, Constraint, ContentCatalog, ContentDoc, ContentState,
    ControllerBundle, DeferredAsset, Direction, DockController, DockItem, EventFlow, FileSink,
    FilePreferenceStore, InstrumentationController, LayoutNode, LayoutTree,
    LifecycleLoggerController, LogCollector, LogLevel, Logger, MetricsSnapshotController,
    NavigationController, NullFetcher, NullRegistrar, NullSink, RevealController, Result,
    RuntimeConfig, RuntimeContext, Section, ShellController, ShellEvent, ShellRuntime, Size,
    TabController, TabDef, TerminalDriver, ThemeController, ThemeMode, WallClock,
    WindowController, AnsiRenderer, register_background,
};

const TIME_ZONE: &str = "shell:menubar.time";
const DATE_ZONE: &str = "shell:menubar.date";
const THEME_ZONE: &str = "shell:menubar.theme";
const SPACER_ZONE: &str = "shell:menubar.spacer";
const DESKTOP_ZONE: &str = "shell:desktop";
const DOCK_ZONE: &str = "shell:dock";

const WINDOW_ID: &str = "portfolio";
const LOG_FILE: &str = "deskshell.log";
const PREFS_FILE: &str = "deskshell-prefs.json";

fn build_layout() -> LayoutTree {
    LayoutTree::new(LayoutNode {
        id: "shell:root".into(),
        direction: Direction::Column,
        constraints: vec![
            Constraint::Fixed(1),
            Constraint::Flex(1),
            Constraint::Fixed(1),
        ],
        children: vec![
            LayoutNode {
                id: "shell:menubar".into(),
                direction: Direction::Row,
                constraints: vec![
                    Constraint::Fixed(10),
                    Constraint::Flex(1),
                    Constraint::Fixed(12),
                    Constraint::Fixed(9),
                ],
                children: vec![
                    LayoutNode::leaf(THEME_ZONE),
                    LayoutNode::leaf(SPACER_ZONE),
                    LayoutNode::leaf(DATE_ZONE),
                    LayoutNode::leaf(TIME_ZONE),
                ],
                gap: 1,
                padding: 0,
            },
            LayoutNode::leaf(DESKTOP_ZONE),
            LayoutNode::leaf(DOCK_ZONE),
        ],
        gap: 0,
        padding: 0,
    })
}

fn build_catalog() -> ContentCatalog {
    ContentCatalog::new(vec![
        CatalogEntry {
            title: "Desk Shell".into(),
            description: "A desktop-style portfolio shell rendered in the terminal.".into(),
            icon: "⌘".into(),
            badge: "Latest".into(),
            tags: vec!["Rust".into(), "Terminal".into(), "UI".into()],
            link: "https://github.com/m4rcel-dev/deskshell".into(),
        },
        CatalogEntry {
            title: "Open Source".into(),
            description: "Contributions across tooling, docs, and test infrastructure.".into(),
            icon: "⚑".into(),
            badge: "Active".into(),
            tags: vec!["Git".into(), "Review".into()],
            link: "https://github.com/m4rcel-dev".into(),
        },
        CatalogEntry {
            title: "Services".into(),
            description: "Small network services with a bias for observability.".into(),
            icon: "⚙".into(),
            badge: "Featured".into(),
            tags: vec!["Rust".into(), "Networking".into()],
            link: "https://github.com/m4rcel-dev?tab=repositories".into(),
        },
        CatalogEntry {
            title: "Developer Tools".into(),
            description: "Utilities that shave minutes off everyday workflows.".into(),
            icon: "⚒".into(),
            badge: "Useful".into(),
            tags: vec!["CLI".into(), "Automation".into()],
            link: "https://github.com/m4rcel-dev".into(),
        },
        CatalogEntry {
            title: "Experiments".into(),
            description: "Learning projects chasing whatever looks interesting this month.".into(),
            icon: "⚗".into(),
            badge: "Growth".into(),
            tags: vec!["Prototypes".into()],
            link: "https://github.com/m4rcel-dev".into(),
        },
    ])
}

fn build_content() -> ContentState {
    ContentState::new(ContentDoc::new(vec![
        Section::new(
            "home",
            "Home",
            vec![
                Block::text(vec![
                    "Hi, I'm Marcel. I build terminal software.".into(),
                    "This desktop is itself one of the projects below.".into(),
                ]),
                Block::tagged("home.cta", vec!["▸ View my work".into()]),
            ],
        ),
        Section::new(
            "about",
            "About",
            vec![
                Block::text(vec![
                    "Systems engineer with a soft spot for text interfaces.".into(),
                ]),
                Block::tagged(
                    "about.stats",
                    vec![
                        "9 years shipping software".into(),
                        "40+ open source contributions".into(),
                        "3 conference talks".into(),
                    ],
                ),
            ],
        ),
        Section::new("projects", "Projects", Vec::new()),
        Section::new("stack", "Stack", Vec::new()),
        Section::new(
            "contact",
            "Contact",
            vec![
                Block::tagged("contact.links", vec!["✉ hello@m4rcel.dev".into()])
                    .with_outbound("https://m4rcel.dev/contact"),
            ],
        ),
    ]))
}

fn build_tabs() -> Vec<TabDef> {
    vec![
        TabDef {
            key: "languages".into(),
            label: "Languages".into(),
            panel: Some(vec!["Rust · Go · Lua".into(), "Shell when nobody watches".into()]),
        },
        TabDef {
            key: "frameworks".into(),
            label: "Frameworks".into(),
            panel: Some(vec!["crossterm · serde · criterion".into()]),
        },
        TabDef {
            key: "tools".into(),
            label: "Tools".into(),
            panel: Some(vec!["git · just · tmux".into()]),
        },
    ]
}

fn build_dock() -> Vec<DockItem> {
    vec![
        DockItem {
            id: "portfolio".into(),
            glyph: "⌘".into(),
            window_id: WINDOW_ID.into(),
        },
        DockItem {
            id: "terminal".into(),
            glyph: "▣".into(),
            window_id: "terminal".into(),
        },
        DockItem {
            id: "mail".into(),
            glyph: "✉".into(),
            window_id: "mail".into(),
        },
    ]
}

fn system_theme() -> ThemeMode {
    std::env::var("DESKSHELL_THEME")
        .ok()
        .as_deref()
        .and_then(ThemeMode::parse)
        .unwrap_or(ThemeMode::Dark)
}

fn utc_offset_minutes() -> i32 {
    std::env::var("DESKSHELL_UTC_OFFSET_MINUTES")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0)
}

/// Esc or `q` leaves the desktop.
struct QuitController;

impl ShellController for QuitController {
    fn name(&self) -> &str {
        "shell.quit"
    }

    fn on_event(&mut self, ctx: &mut RuntimeContext<'_>, event: &ShellEvent) -> Result<EventFlow> {
        if let ShellEvent::Key(key) = event {
            if key.kind == KeyEventKind::Press
                && matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
            {
                ctx.request_exit();
                return Ok(EventFlow::Consumed);
            }
        }
        Ok(EventFlow::Continue)
    }
}

fn main() {
    let logger = match FileSink::new(LOG_FILE, 512 * 1024) {
        Ok(sink) => Logger::new(sink),
        Err(_) => Logger::new(NullSink),
    };

    let mut config = RuntimeConfig {
        tick_interval: Duration::from_millis(200),
        logger: Some(logger.clone()),
        ..RuntimeConfig::default()
    };
    config.enable_metrics();
    let metrics = config.metrics_handle().expect("metrics enabled");

    let mut runtime = match ShellRuntime::with_config(
        build_layout(),
        AnsiRenderer::with_default(),
        Size::new(80, 24),
        config,
    ) {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("deskshell: {err}");
            std::process::exit(1);
        }
    };

    if runtime
        .shared()
        .insert_arc(Arc::new(std::sync::RwLock::new(build_content())))
        .is_err()
    {
        let _ = logger.log(LogLevel::Warn, "shell::bootstrap", "content already seeded");
    }

    let catalog = build_catalog();
    let collector: Arc<dyn AnalyticsCollector> = Arc::new(LogCollector::new(logger.clone()));
    let fetcher: Arc<dyn AssetFetcher> = Arc::new(NullFetcher);
    let assets: Vec<DeferredAsset> = (0..catalog.len())
        .map(|idx| DeferredAsset {
            block_id: format!("project.{idx}"),
            source: format!("assets/project-{idx}.png"),
        })
        .collect();
    let observed: Vec<String> = (0..catalog.len())
        .map(|idx| format!("project.{idx}"))
        .chain(std::iter::once("about.stats".to_string()))
        .collect();

    ControllerBundle::new()
        .with_controller(QuitController, -120)
        .with_controller(
            LifecycleLoggerController::new(logger.clone()).log_keys(false),
            -100,
        )
        .with_controller(
            InstrumentationController::new(collector, fetcher, assets)
                .with_logger(logger.clone()),
            -50,
        )
        .with_controller(
            ClockController::new(
                TIME_ZONE,
                DATE_ZONE,
                Box::new(WallClock::with_offset_minutes(utc_offset_minutes())),
            ),
            -20,
        )
        .with_controller(
            ThemeController::new(
                THEME_ZONE,
                Box::new(FilePreferenceStore::new(PREFS_FILE)),
                system_theme(),
            )
            .with_logger(logger.clone()),
            -20,
        )
        .with_controller(
            WindowController::new(
                DESKTOP_ZONE,
                WINDOW_ID,
                "Marcel · Portfolio",
                vec![
                    ("Home".into(), "home".into()),
                    ("About".into(), "about".into()),
                    ("Projects".into(), "projects".into()),
                    ("Stack".into(), "stack".into()),
                    ("Contact".into(), "contact".into()),
                ],
            ),
            -10,
        )
        .with_controller(CatalogController::new("projects", catalog), 0)
        .with_controller(TabController::new("stack", build_tabs()), 10)
        .with_controller(DockController::new(DOCK_ZONE, build_dock()), 10)
        .with_controller(
            NavigationController::new(vec![AnchorLink {
                block_id: "home.cta".into(),
                href: "#projects".into(),
            }]),
            20,
        )
        .with_controller(RevealController::new(observed), 30)
        .with_controller(
            MetricsSnapshotController::new(logger.clone(), metrics)
                .with_interval(Duration::from_secs(5)),
            100,
        )
        .register_into(&mut runtime);

    // The service-worker analog: one registration after load, failures
    // logged and forgotten.
    let registrar: Arc<dyn BackgroundRegistrar> = Arc::new(NullRegistrar);
    register_background(&registrar, Some(&logger));

    if let Err(err) = TerminalDriver::new(runtime).run() {
        eprintln!("deskshell: {err}");
        std::process::exit(1);
    }
}
