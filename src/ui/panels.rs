use arff_splitter::report::{Subset, Upload};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – dataset summary
// ---------------------------------------------------------------------------

/// Render the left summary panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dataset");
    ui.separator();

    let Some(report) = &state.report else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong(&report.file_name);
            ui.label(format!("{} rows × {} columns", report.num_rows, report.num_cols));
            if report.truncated {
                ui.label(
                    RichText::new(format!("Preview limited to {} rows", report.preview_rows))
                        .italics(),
                );
            }
            ui.separator();

            ui.strong("Split");
            match &report.stratify_column {
                Some(col) => ui.label(format!("Stratified by {col}")),
                None => ui.label("Random (no stratification column)"),
            };
            let sizes = report.split_sizes;
            egui::Grid::new("split_sizes")
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    for (name, n) in [
                        ("Train", sizes.train),
                        ("Validation", sizes.validation),
                        ("Test", sizes.test),
                    ] {
                        ui.label(name);
                        ui.label(n.to_string());
                        ui.end_row();
                    }
                });

            if report.series.is_empty() {
                return;
            }
            ui.separator();

            // ---- Chart subset selector ----
            ui.strong("Chart");
            for subset in Subset::ALL {
                ui.radio_value(&mut state.selected_subset, subset, subset.label());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.report.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export HTML…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!(
                "{}: {} rows, seed {}",
                report.file_name, report.num_rows, state.config.seed
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open ARFF dataset")
        .add_filter("ARFF", &["arff"])
        .add_filter("All files", &["*"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match Upload::from_path(&path) {
        Ok(upload) => state.process(&upload),
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            state.report = None;
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let default_name = state
        .report
        .as_ref()
        .map(|r| format!("{}.html", r.file_name.trim_end_matches(".arff")))
        .unwrap_or_else(|| "report.html".to_string());
    let file = rfd::FileDialog::new()
        .set_title("Export report")
        .set_file_name(default_name)
        .add_filter("HTML", &["html"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_html(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
