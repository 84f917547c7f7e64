// Entry point: loads config, then launches the egui/eframe app or a headless session.
use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use batscan::app::App;
use batscan::cli::Args;
use batscan::config::AppConfig;
use batscan::headless;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let cfg = AppConfig::load_or_default(&args.config);

    if args.nogui {
        headless::run(&args, &cfg)?;
        return Ok(());
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Battery Diagnosis",
        native_options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, &cfg)))),
    )?;
    Ok(())
}
