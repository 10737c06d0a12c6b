// LogVista - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the filter sidebar, chart grid, data table, detail
// pane, and load summary window.
//
// Loads run synchronously on the UI thread: the pipeline is a single
// pass over a bounded set of spreadsheet files, and the whole
// application is request/response -- load once, filter in place,
// re-render.

use crate::app::loader::TABLE_CACHE;
use crate::app::source::DiscoveryConfig;
use crate::app::state::AppState;
use crate::core::export;
use crate::ui;

/// The LogVista application.
pub struct LogVistaApp {
    pub state: AppState,
    discovery: DiscoveryConfig,
}

impl LogVistaApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState, discovery: DiscoveryConfig) -> Self {
        Self { state, discovery }
    }

    /// Fetch the (possibly cached) table and install it in the state.
    pub fn run_load(&mut self) {
        match TABLE_CACHE.get_or_load(&self.state.source_mode, &self.discovery) {
            Ok(outcome) => self.state.install_outcome(&outcome),
            Err(e) => {
                tracing::error!(error = %e, "Load failed");
                self.state.install_load_failure(format!("Load failed: {e}"));
            }
        }
    }

    fn export_dialog(&mut self, spreadsheet: bool) {
        let Some(session) = self.state.session.as_ref() else {
            return;
        };

        let (filter_name, ext, default_name) = if spreadsheet {
            ("Excel workbook", "xlsx", "filtered_logs.xlsx")
        } else {
            ("CSV", "csv", "filtered_logs.csv")
        };
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(filter_name, &[ext])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        let result = std::fs::File::create(&dest)
            .map_err(|e| format!("Cannot create file: {e}"))
            .and_then(|file| {
                let table = session.table();
                let view = session.view();
                if spreadsheet {
                    export::export_xlsx(table, view, file, &dest)
                } else {
                    export::export_csv(table, view, file, &dest)
                }
                .map_err(|e| e.to_string())
            });

        self.state.status_message = match result {
            Ok(n) => format!("Exported {n} rows to {}.", dest.display()),
            Err(e) => format!("Export failed: {e}"),
        };
    }
}

impl eframe::App for LogVistaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // A panel requested a reload: drop the cache and re-run the
        // pipeline before this frame renders.
        if self.state.request_reload {
            self.state.request_reload = false;
            self.state.status_message = "Reloading...".to_string();
            TABLE_CACHE.invalidate();
            self.run_load();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let has_rows = self
                        .state
                        .session
                        .as_ref()
                        .is_some_and(|s| !s.view().is_empty());
                    ui.add_enabled_ui(has_rows, |ui| {
                        if ui.button("Export Spreadsheet\u{2026}").clicked() {
                            self.export_dialog(true);
                            ui.close_menu();
                        }
                        if ui.button("Export CSV\u{2026}").clicked() {
                            self.export_dialog(false);
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Reload Data").clicked() {
                        self.state.request_reload = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Load Summary").clicked() {
                        self.state.show_summary = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.state.load_error.is_some() {
                    ui.colored_label(ui::theme::ERROR_TEXT, &self.state.status_message);
                } else {
                    ui.label(&self.state.status_message);
                }
                if !self.state.warnings.is_empty() {
                    let label = format!("\u{26a0} {} warning(s)", self.state.warnings.len());
                    if ui
                        .link(egui::RichText::new(label).color(ui::theme::WARNING_TEXT))
                        .clicked()
                    {
                        self.state.show_summary = true;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(session) = self.state.session.as_ref() {
                        ui.label(format!(
                            "{}/{} rows",
                            session.view().len(),
                            session.table().rows.len()
                        ));
                        ui.separator();
                        ui.weak(self.state.source_mode.describe());
                    }
                });
            });
        });

        // Detail pane (bottom)
        egui::TopBottomPanel::bottom("detail_pane")
            .resizable(true)
            .default_height(ui::theme::DETAIL_PANE_HEIGHT)
            .show(ctx, |ui| {
                ui::panels::detail::render(ui, &self.state);
            });

        // Left sidebar: filter controls.
        egui::SidePanel::left("sidebar")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("sidebar_filters")
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui::panels::filters::render(ui, &mut self.state);
                    });
            });

        // Central panel: charts on top, data table below.
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::CollapsingHeader::new("Charts")
                .default_open(true)
                .show(ui, |ui| {
                    ui::panels::charts::render(ui, &self.state);
                });
            ui.separator();
            ui::panels::table::render(ui, &mut self.state);
        });

        // Summary dialog (modal-ish)
        ui::panels::summary::render(ctx, &mut self.state);
    }
}
