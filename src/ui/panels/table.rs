// LogVista - ui/panels/table.rs
//
// Virtual-scrolling data table over the filtered view.
//
// Uses egui's `ScrollArea::show_rows` which renders only the rows
// currently visible in the viewport, giving O(1) rendering cost
// regardless of row count. Row clicks update the selection, which the
// detail pane reads.

use crate::app::state::AppState;
use crate::ui::theme;
use crate::util::constants;
use egui::text::{LayoutJob, TextFormat};

/// Render the filtered data table (lower part of the central panel).
/// Datetime, Region, Exception, and Object Name are shown inline; the
/// detail pane shows the full column union for the selected row.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(session) = state.session.as_ref() else {
        if let Some(ref err) = state.load_error {
            ui.centered_and_justified(|ui| {
                ui.colored_label(theme::ERROR_TEXT, err);
            });
        } else {
            ui.centered_and_justified(|ui| {
                ui.label("Loading...");
            });
        }
        return;
    };

    let table = session.table();
    let view = session.view();

    ui.horizontal(|ui| {
        ui.strong("Filtered data");
        ui.weak(format!("({} rows)", view.len()));
    });

    if view.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label("No rows match the current filters.");
        });
        return;
    }

    // Header line mirrors the row layout below.
    ui.label(
        egui::RichText::new(format!(
            "{:<19} | {:<11} | {:<30} | {}",
            "Datetime", "Region", "Exception", "Object Name"
        ))
        .monospace()
        .size(11.5)
        .strong(),
    );
    ui.separator();

    // Selection updates are collected and applied after show_rows so we
    // do not mutate `state` while rows still borrow the session.
    let mut clicked: Option<usize> = None;

    egui::ScrollArea::vertical()
        .id_salt("data_table")
        .auto_shrink([false; 2])
        .show_rows(ui, theme::ROW_HEIGHT, view.len(), |ui, row_range| {
            for display_idx in row_range {
                let Some(&row_idx) = view.get(display_idx) else {
                    continue;
                };
                let Some(row) = table.rows.get(row_idx) else {
                    continue;
                };

                let is_selected = state.selected_row == Some(display_idx);
                let font = egui::FontId::monospace(12.0);
                let region_colour = theme::region_colour(&row.region);

                let mut job = LayoutJob::default();
                job.append(
                    &format!("{:<19} | ", pad(&row.cell(constants::COL_DATETIME), 19)),
                    0.0,
                    TextFormat {
                        font_id: font.clone(),
                        color: ui.style().visuals.text_color(),
                        ..Default::default()
                    },
                );
                job.append(
                    &format!("{:<11}", pad(row.region.label(), 11)),
                    0.0,
                    TextFormat {
                        font_id: font.clone(),
                        color: region_colour,
                        ..Default::default()
                    },
                );
                job.append(
                    &format!(
                        " | {:<30} | {}",
                        pad(&row.cell(constants::COL_EXCEPTION), 30),
                        row.cell(constants::COL_OBJECT_NAME)
                    ),
                    0.0,
                    TextFormat {
                        font_id: font,
                        color: ui.style().visuals.text_color(),
                        ..Default::default()
                    },
                );

                let response = ui.selectable_label(is_selected, job);
                if response.clicked() {
                    clicked = Some(display_idx);
                }
            }
        });

    if let Some(display_idx) = clicked {
        // Clicking the selected row again clears the selection.
        state.selected_row = if state.selected_row == Some(display_idx) {
            None
        } else {
            Some(display_idx)
        };
    }
}

/// Pad/truncate a cell to a fixed display width.
fn pad(cell: &str, width: usize) -> String {
    let mut out: String = cell.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}
