use arff_splitter::data::model::CellValue;
use arff_splitter::report::html::MISSING_DISPLAY;
use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Preview table (central panel)
// ---------------------------------------------------------------------------

/// Render the (already truncated) preview rows with a leading index column.
pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No dataset loaded");
        });
        return;
    };
    let table = &report.preview;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto())
        .columns(Column::auto().at_least(60.0), table.n_cols())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for name in table.column_names() {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.n_rows(), |mut row| {
                let i = row.index();
                row.col(|ui| {
                    ui.label(RichText::new(i.to_string()).weak());
                });
                for cell in table.row(i) {
                    row.col(|ui| {
                        match cell {
                            CellValue::Missing => ui.label(MISSING_DISPLAY),
                            other => ui.label(other.to_string()),
                        };
                    });
                }
            });
        });
}
