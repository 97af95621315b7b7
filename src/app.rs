use arff_splitter::config::Config;
use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ArffSplitterApp {
    pub state: AppState,
}

impl ArffSplitterApp {
    pub fn new(config: Config) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for ArffSplitterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: dataset summary + split sizes ----
        egui::SidePanel::left("summary_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: frequency chart ----
        egui::TopBottomPanel::bottom("chart_panel")
            .default_height(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::frequency_plot(ui, &self.state);
            });

        // ---- Central panel: preview table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::preview_table(ui, &self.state);
        });
    }
}
