// LogVista - ui/panels/charts.rs
//
// Chart grid over the filtered view: hourly histogram, top error
// types, top objects, and region distribution.
//
// Bars are painted directly (rect_filled) rather than pulled from a
// plotting crate -- the charts are small, static summaries and the
// painter keeps them dependency-free. A chart whose aggregation is
// unavailable (missing column) is skipped entirely.

use crate::app::state::AppState;
use crate::core::aggregate::{self, HourlyBucket, ValueCount};
use crate::core::region::Region;
use crate::ui::theme;

/// Render the chart grid (top of the central panel).
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let table = session.table();
    let view = session.view();

    if view.is_empty() {
        ui.weak("No rows match the current filters; charts are hidden.");
        return;
    }

    let hourly = aggregate::hourly_counts(table, view);
    let exceptions = aggregate::top_exceptions(table, view);
    let objects = aggregate::top_objects(table, view);
    let regions = aggregate::region_distribution(table, view);

    ui.columns(2, |cols| {
        if let Some(ref buckets) = hourly {
            hourly_histogram(&mut cols[0], buckets);
        }
        top_bars(
            &mut cols[1],
            "Top error types",
            exceptions.as_deref(),
            theme::EXCEPTION_BAR,
        );
    });
    ui.add_space(8.0);
    ui.columns(2, |cols| {
        top_bars(
            &mut cols[0],
            "Top affected objects",
            objects.as_deref(),
            theme::OBJECT_BAR,
        );
        region_bars(&mut cols[1], &regions);
    });
}

/// Vertical bars, one per hour bucket present, ascending left to right.
fn hourly_histogram(ui: &mut egui::Ui, buckets: &[HourlyBucket]) {
    ui.strong("Errors by hour of day");
    if buckets.is_empty() {
        ui.weak("No timestamped rows in view.");
        return;
    }

    let max_count = buckets.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let desired = egui::vec2(ui.available_width(), theme::CHART_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::hover());
    let painter = ui.painter_at(rect);

    let label_band = 14.0;
    let plot_height = rect.height() - label_band;
    let bar_width =
        (rect.width() - theme::CHART_BAR_GAP * buckets.len() as f32) / buckets.len() as f32;

    let mut hover: Option<String> = None;
    for (i, bucket) in buckets.iter().enumerate() {
        let x = rect.left() + i as f32 * (bar_width + theme::CHART_BAR_GAP);
        let h = (bucket.count as f32 / max_count as f32) * (plot_height - 4.0);
        let bar = egui::Rect::from_min_max(
            egui::pos2(x, rect.top() + plot_height - h),
            egui::pos2(x + bar_width, rect.top() + plot_height),
        );
        painter.rect_filled(bar, 1.0, theme::HOURLY_BAR);

        // Hour tick under each bar.
        painter.text(
            egui::pos2(x + bar_width / 2.0, rect.bottom() - 2.0),
            egui::Align2::CENTER_BOTTOM,
            bucket.hour.to_string(),
            egui::FontId::proportional(9.0),
            ui.style().visuals.weak_text_color(),
        );

        if response
            .hover_pos()
            .is_some_and(|p| p.x >= bar.left() && p.x <= bar.right())
        {
            hover = Some(format!("{}: {} rows", bucket.label, bucket.count));
        }
    }

    if let Some(text) = hover {
        response.on_hover_text(text);
    }
}

/// Horizontal bars for a top-N value/count summary.
/// `values` of None means the backing column is absent -- skip quietly.
fn top_bars(ui: &mut egui::Ui, title: &str, values: Option<&[ValueCount]>, colour: egui::Color32) {
    let Some(values) = values else {
        return;
    };
    ui.strong(title);
    if values.is_empty() {
        ui.weak("No values in view.");
        return;
    }
    let max_count = values.iter().map(|v| v.count).max().unwrap_or(1).max(1);
    for vc in values {
        bar_row(ui, &vc.value, vc.count, max_count, colour);
    }
}

/// Region distribution with the region palette.
fn region_bars(ui: &mut egui::Ui, regions: &[(Region, usize)]) {
    ui.strong("Rows by region");
    if regions.is_empty() {
        ui.weak("No rows in view.");
        return;
    }
    let max_count = regions.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
    for (region, count) in regions {
        bar_row(
            ui,
            region.label(),
            *count,
            max_count,
            theme::region_colour(region),
        );
    }
}

/// One labelled horizontal bar: label | bar scaled to max | count.
fn bar_row(ui: &mut egui::Ui, label: &str, count: usize, max_count: usize, colour: egui::Color32) {
    ui.horizontal(|ui| {
        let shown = truncate_label(label, 28);
        ui.add_sized(
            [170.0, theme::ROW_HEIGHT - 4.0],
            egui::Label::new(egui::RichText::new(shown).monospace().size(11.0)).truncate(),
        )
        .on_hover_text(label);

        let track_width = (ui.available_width() - 48.0).max(20.0);
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(track_width, theme::ROW_HEIGHT - 8.0),
            egui::Sense::hover(),
        );
        let w = (count as f32 / max_count as f32) * rect.width();
        let bar = egui::Rect::from_min_size(rect.min, egui::vec2(w.max(1.0), rect.height()));
        ui.painter().rect_filled(bar, 2.0, colour);

        ui.label(egui::RichText::new(count.to_string()).monospace().size(11.0));
    });
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}\u{2026}")
    }
}
