// LogVista - ui/panels/summary.rs
//
// Load summary modal window.
// Shows overall load statistics and a per-source breakdown table.
// Warnings from the load are also listed.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the load summary dialog (if state.show_summary is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_summary {
        return;
    }

    let mut open = true;
    egui::Window::new("Load Summary")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .min_width(440.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if let Some(ref err) = state.load_error {
                ui.colored_label(theme::ERROR_TEXT, err);
                ui.add_space(8.0);
            }

            if let Some(ref summary) = state.summary {
                // -----------------------------------------------------------------
                // Overall statistics
                // -----------------------------------------------------------------
                ui.strong("Overview");
                egui::Grid::new("summary_overview")
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Sources discovered:");
                        ui.label(summary.files_discovered.to_string());
                        ui.end_row();

                        ui.label("Sources loaded:");
                        let skipped = summary.files_discovered - summary.files_loaded;
                        let colour = if skipped > 0 {
                            theme::WARNING_TEXT
                        } else {
                            ui.style().visuals.text_color()
                        };
                        ui.colored_label(colour, summary.files_loaded.to_string());
                        ui.end_row();

                        ui.label("Total rows:");
                        ui.label(summary.total_rows.to_string());
                        ui.end_row();

                        ui.label("Duration:");
                        ui.label(format!("{:.2}s", summary.duration.as_secs_f64()));
                        ui.end_row();
                    });

                // -----------------------------------------------------------------
                // Per-source breakdown table
                // -----------------------------------------------------------------
                if !summary.source_summaries.is_empty() {
                    ui.add_space(8.0);
                    ui.separator();
                    ui.strong("Per-source breakdown");

                    egui::ScrollArea::vertical()
                        .id_salt("summary_sources")
                        .max_height(220.0)
                        .show(ui, |ui| {
                            egui::Grid::new("summary_source_table")
                                .num_columns(3)
                                .striped(true)
                                .spacing([12.0, 3.0])
                                .show(ui, |ui| {
                                    ui.strong("File");
                                    ui.strong("Region");
                                    ui.strong("Rows");
                                    ui.end_row();

                                    for source in &summary.source_summaries {
                                        ui.label(
                                            egui::RichText::new(&source.name)
                                                .monospace()
                                                .size(11.5),
                                        );
                                        ui.colored_label(
                                            theme::region_colour(&source.region),
                                            source.region.label(),
                                        );
                                        ui.label(source.rows.to_string());
                                        ui.end_row();
                                    }
                                });
                        });
                }
            } else if state.load_error.is_none() {
                ui.label("No load has completed yet.");
            }

            // -----------------------------------------------------------------
            // Warnings
            // -----------------------------------------------------------------
            if !state.warnings.is_empty() {
                ui.add_space(8.0);
                ui.separator();
                ui.strong(format!("Warnings ({})", state.warnings.len()));

                egui::ScrollArea::vertical()
                    .id_salt("summary_warnings")
                    .max_height(120.0)
                    .show(ui, |ui| {
                        for warn in &state.warnings {
                            ui.label(
                                egui::RichText::new(warn)
                                    .color(theme::WARNING_TEXT)
                                    .size(11.5),
                            );
                        }
                    });
            }

            ui.add_space(8.0);
            ui.separator();
            if ui.button("Close").clicked() {
                state.show_summary = false;
            }
        });

    if !open {
        state.show_summary = false;
    }
}
