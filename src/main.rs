//! MotorPass LED ring CLI
//!
//! Runs the LED daemon, or talks to a running one.

use std::time::Duration;

use clap::Parser;
use motorpass_led_client::{LedClient, LedClientConfig};
use motorpass_led_protocol::DEFAULT_SOCKET_PATH;

mod cli;
use cli::{Cli, Commands};

mod commands;
use commands::daemon::Overrides;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let client = || {
        LedClient::new(LedClientConfig {
            socket_path: cli
                .socket
                .clone()
                .unwrap_or_else(|| DEFAULT_SOCKET_PATH.into()),
            timeout: Duration::from_millis(cli.timeout_ms),
        })
    };

    match cli.command {
        Commands::Daemon {
            config,
            pixels,
            driver,
            brightness,
            no_startup_flash,
        } => {
            let overrides = Overrides {
                socket: cli.socket.clone(),
                pixels,
                driver,
                brightness,
                no_startup_flash,
            };
            commands::daemon::run(config, overrides).await
        }
        Commands::Ping => commands::client::ping(&client()),
        Commands::State { state, duration } => {
            commands::client::state(&client(), state, duration)
        }
        Commands::Progress { percentage, color } => {
            commands::client::progress(&client(), percentage, color)
        }
        Commands::Flash {
            color,
            times,
            speed,
        } => commands::client::flash(&client(), color, times, speed),
        Commands::Off => commands::client::off(&client()),
        Commands::Status => commands::client::status(&client()),
        Commands::Demo => commands::client::demo(client()),
    }
}
