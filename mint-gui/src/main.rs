use eframe::egui;
use std::sync::Arc;

use mint_gui::config::Config;
use mint_gui::{config, events, service, state};

mod app;
mod view;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to start tokio runtime");
    let _guard = rt.enter();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        let mut config = Config::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    });
    if let Err(e) = config.validate() {
        log::warn!("⚠️ Invalid configuration: {}", e);
    }
    let config = Arc::new(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "My NFT Collection",
        options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, config)))),
    );

    drop(_guard);
    rt.shutdown_timeout(std::time::Duration::from_secs(2));

    result
}
