mod app;
mod state;
mod ui;

use app::ArffSplitterApp;
use arff_splitter::config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match Config::load(None) {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration, using defaults: {e}");
            Config::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ARFF Splitter",
        options,
        Box::new(|_cc| Ok(Box::new(ArffSplitterApp::new(config)))),
    )
}
