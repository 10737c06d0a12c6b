// LogVista - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Configuration loading (source mode, theme)
// 4. The initial synchronous data load
// 5. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use logvista::app;
pub use logvista::core;
pub use logvista::platform;
pub use logvista::ui;
pub use logvista::util;

use app::source::{DiscoveryConfig, SourceMode};
use clap::Parser;
use std::path::PathBuf;

/// LogVista - regional log dashboard.
///
/// Point LogVista at a directory of CSV/XLSX log exports (or configure
/// a remote listing in config.toml) to load, filter, chart, and export
/// region-tagged error logs.
#[derive(Parser, Debug)]
#[command(name = "LogVista", version, about)]
struct Cli {
    /// Local directory of source files (overrides the configured source).
    root: Option<PathBuf>,

    /// Directory containing config.toml (defaults to the platform
    /// config directory).
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialise logging subsystem
    util::logging::init(cli.debug, None);

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogVista starting"
    );

    // Resolve configuration: CLI dir override > platform default.
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_dir);
    let (config, config_warnings) = platform::config::load_config(&config_dir);

    // A root on the command line beats whatever the config says.
    let source_mode = match cli.root {
        Some(root) => SourceMode::Local { root },
        None => config.source_mode.clone(),
    };

    let discovery = DiscoveryConfig {
        max_files: config.max_files,
        ..Default::default()
    };

    tracing::info!(source = %source_mode.describe(), "Source resolved");

    // Initial load: synchronous, before the window opens. The result is
    // cached for the process lifetime; a fatal error is carried into the
    // GUI and surfaced there rather than aborting.
    let mut state = app::state::AppState::new(source_mode, cli.debug);
    state.warnings.extend(config_warnings);

    let mut vista = gui::LogVistaApp::new(state, discovery);
    vista.run_load();

    let dark_mode = config.dark_mode;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            Ok(Box::new(vista))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch LogVista GUI: {e}");
        std::process::exit(1);
    }
}
