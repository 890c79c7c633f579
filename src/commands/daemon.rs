//! Daemon command handler.

use std::path::PathBuf;

use anyhow::Context;
use motorpass_led::{config::DaemonConfig, daemon, hal, DriverKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::CommandResult;

/// Flag values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub socket: Option<PathBuf>,
    pub pixels: Option<usize>,
    pub driver: Option<DriverKind>,
    pub brightness: Option<u8>,
    pub no_startup_flash: bool,
}

impl Overrides {
    fn apply(self, config: &mut DaemonConfig) {
        if let Some(socket) = self.socket {
            config.socket_path = socket;
        }
        if let Some(pixels) = self.pixels {
            config.strip.pixel_count = pixels;
        }
        if let Some(driver) = self.driver {
            config.strip.driver = driver;
        }
        if let Some(brightness) = self.brightness {
            config.strip.brightness = brightness;
        }
        if self.no_startup_flash {
            config.startup_flash = false;
        }
    }
}

/// Load config, attach the strip and serve until Ctrl+C or SIGTERM.
pub async fn run(config_path: Option<PathBuf>, overrides: Overrides) -> CommandResult {
    let config_path = config_path.unwrap_or_else(DaemonConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = DaemonConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    overrides.apply(&mut config);
    config.validate().context("invalid daemon config")?;

    let driver = hal::open_driver(&config.strip).context("LED hardware unavailable")?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || on_signal.cancel()) {
        warn!("failed to install signal handler: {e}");
    }

    daemon::run(config, driver, shutdown).await
}
