//! GUI entry point for the AutoToll operations dashboard

mod app;
mod analytics_panel;
mod history_panel;
mod registry_panel;
mod review_panel;
mod scanner_panel;
mod settings_panel;

use app::AutotollApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([860.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AutoToll Console",
        options,
        Box::new(|cc| Ok(Box::new(AutotollApp::new(cc)))),
    )
}
