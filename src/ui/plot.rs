use arff_splitter::color::bar_color;
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Frequency plot (bottom panel)
// ---------------------------------------------------------------------------

/// Render the category-frequency bar chart for the selected subset.
pub fn frequency_plot(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dataset  (File → Open…)");
        });
        return;
    };

    let Some(series) = report
        .series
        .iter()
        .find(|s| s.subset == state.selected_subset)
    else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No stratification column, nothing to chart.");
        });
        return;
    };

    let n = series.bins.len();
    let bars: Vec<Bar> = series
        .bins
        .iter()
        .enumerate()
        .map(|(i, bin)| {
            let [r, g, b] = bar_color(i, n);
            Bar::new(i as f64, bin.count as f64)
                .name(&bin.label)
                .width(0.8)
                .fill(Color32::from_rgb(r, g, b))
        })
        .collect();

    let labels: Vec<String> = series.bins.iter().map(|b| b.label.clone()).collect();
    let column = report.stratify_column.clone().unwrap_or_default();

    ui.label(&series.title);
    Plot::new("frequency_plot")
        .x_axis_label(column)
        .y_axis_label("Frequency")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&series.title));
        });
}
