mod app;
mod state;
mod ui;

use app::SalesDashboardApp;
use eframe::egui;
use sales_dashboard::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_args(std::env::args());
    log::info!("Starting dashboard on {}", config.source_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Data – Business Intelligence Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(config)))),
    )
}
