// LogVista - ui/panels/filters.rs
//
// Filter controls sidebar: date range, include/exclude error types,
// object names, regions, free-text search.
//
// Nothing here touches the view directly -- widgets edit
// `state.filter_inputs`, and the Apply button converts those inputs
// into an immutable FilterConfig snapshot for the session.

use crate::app::state::AppState;
use crate::core::region::Region;
use crate::ui::theme;
use crate::util::constants;
use std::collections::HashSet;

/// Render the filter controls.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(session) = state.session.as_ref() else {
        ui.label("No data loaded.");
        return;
    };

    // Option lists are snapshotted up front so the widgets below can
    // borrow the inputs mutably.
    let table = session.table();
    let mut exceptions = table.unique_exceptions();
    exceptions.truncate(constants::MAX_FILTER_OPTIONS);
    let mut objects = table.unique_object_names();
    objects.truncate(constants::MAX_FILTER_OPTIONS);
    let regions = table.regions_present();

    let mut apply = false;
    let mut reset = false;

    // -- Date range --
    ui.label("Date range (YYYY-MM-DD):");
    ui.horizontal(|ui| {
        ui.label("From");
        ui.add(
            egui::TextEdit::singleline(&mut state.filter_inputs.date_start)
                .desired_width(90.0)
                .hint_text("2024-06-01"),
        );
    });
    ui.horizontal(|ui| {
        ui.label("To");
        ui.add(
            egui::TextEdit::singleline(&mut state.filter_inputs.date_end)
                .desired_width(90.0)
                .hint_text("2024-06-02"),
        );
    });

    ui.separator();

    // -- Error types --
    value_set(
        ui,
        "Error types (include)",
        &exceptions,
        &mut state.filter_inputs.include_exceptions,
    );
    value_set(
        ui,
        "Error types (exclude)",
        &exceptions,
        &mut state.filter_inputs.exclude_exceptions,
    );

    // -- Object names --
    value_set(
        ui,
        "Object names",
        &objects,
        &mut state.filter_inputs.object_names,
    );

    // -- Regions --
    region_set(ui, &regions, &mut state.filter_inputs.regions);

    ui.separator();

    // -- Free-text search --
    ui.label("Search:");
    ui.add(
        egui::TextEdit::singleline(&mut state.filter_inputs.text_search)
            .hint_text("any column, case-insensitive"),
    );

    ui.add_space(6.0);

    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            apply = true;
        }
        if ui.button("Reset").clicked() {
            reset = true;
        }
    });

    if let Some(ref err) = state.filter_error {
        ui.colored_label(theme::WARNING_TEXT, err);
    }

    if apply {
        state.apply_filter_inputs();
    }
    if reset {
        state.reset_filters();
    }
}

/// A collapsible checkbox group over string values.
fn value_set(ui: &mut egui::Ui, title: &str, options: &[String], set: &mut HashSet<String>) {
    let header = if set.is_empty() {
        title.to_string()
    } else {
        format!("{title} ({})", set.len())
    };
    egui::CollapsingHeader::new(header)
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui| {
            if options.is_empty() {
                ui.weak("No values present.");
                return;
            }
            egui::ScrollArea::vertical()
                .id_salt(format!("{title}_scroll"))
                .max_height(140.0)
                .show(ui, |ui| {
                    for option in options {
                        let mut checked = set.contains(option);
                        if ui.checkbox(&mut checked, option).changed() {
                            if checked {
                                set.insert(option.clone());
                            } else {
                                set.remove(option);
                            }
                        }
                    }
                });
            if !set.is_empty() && ui.small_button("Clear").clicked() {
                set.clear();
            }
        });
}

/// Region checkbox group with colour swatches.
fn region_set(ui: &mut egui::Ui, present: &[Region], set: &mut HashSet<Region>) {
    let header = if set.is_empty() {
        "Regions".to_string()
    } else {
        format!("Regions ({})", set.len())
    };
    egui::CollapsingHeader::new(header)
        .id_salt("regions")
        .default_open(false)
        .show(ui, |ui| {
            for region in present {
                ui.horizontal(|ui| {
                    let mut checked = set.contains(region);
                    if ui.checkbox(&mut checked, "").changed() {
                        if checked {
                            set.insert(*region);
                        } else {
                            set.remove(region);
                        }
                    }
                    ui.colored_label(theme::region_colour(region), region.label());
                });
            }
            if !set.is_empty() && ui.small_button("Clear").clicked() {
                set.clear();
            }
        });
}
