// LogVista - ui/panels/detail.rs
//
// Row detail pane showing every column of the selected row, including
// pass-through columns the inline table omits.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the detail pane (bottom panel).
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let Some(row) = state.selected_entry() else {
        ui.centered_and_justified(|ui| {
            ui.label("Select a row to view details.");
        });
        return;
    };

    ui.horizontal(|ui| {
        ui.strong("Row details");
        ui.colored_label(theme::region_colour(&row.region), row.region.label());
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("detail_scroll")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            egui::Grid::new("detail_grid")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for column in &session.table().columns {
                        let value = row.cell(column);
                        if value.is_empty() {
                            continue;
                        }
                        ui.label(egui::RichText::new(column).strong());
                        ui.label(egui::RichText::new(value).monospace());
                        ui.end_row();
                    }
                });
        });
}
