//! Entry point for the Svarog viewer.

mod config;
mod scene;

use anyhow::Result;

use crate::config::ViewerConfig;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn main() -> Result<()> {
    init_logging();

    let config = ViewerConfig::from_args(std::env::args().skip(1));
    log::info!(
        "Starting Svarog Viewer. Backend: {:?}, show_fps={}, assets={}",
        config.backends,
        config.show_fps,
        config.asset_root.display()
    );

    let scene = scene::load_scene(&config)?;

    let window = platform::WindowConfig {
        backends: config.backends,
        show_fps: config.show_fps,
        ..Default::default()
    };
    platform::run(window, scene)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
