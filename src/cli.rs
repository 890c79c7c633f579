// CLI definitions using clap

use clap::{Parser, Subcommand};
use motorpass_led::DriverKind;
use motorpass_led_protocol::{LedState, Rgb};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "motorpass-led")]
#[command(author, version, about = "MotorPass kiosk LED ring daemon and client")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Daemon socket (default: /tmp/motorpass_led.sock, or the config value for `daemon`)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Client request timeout in milliseconds
    #[arg(long, global = true, default_value_t = 2000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the LED daemon in the foreground
    #[command(visible_alias = "serve")]
    Daemon {
        /// Config file path (default: ~/.config/motorpass/led.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of pixels on the ring
        #[arg(long)]
        pixels: Option<usize>,

        /// Override the backend (virtual, ws2812-spi)
        #[arg(long)]
        driver: Option<DriverKind>,

        /// Override global brightness (0-255)
        #[arg(long)]
        brightness: Option<u8>,

        /// Skip the blue blink at start-up
        #[arg(long)]
        no_startup_flash: bool,
    },

    /// Check whether the daemon is answering
    Ping,

    /// Switch the ring to a named state
    #[command(visible_alias = "s")]
    State {
        /// idle, processing, success, failed, camera or off
        state: LedState,

        /// Seconds before success/failed revert to idle
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Light a fraction of the ring
    #[command(visible_alias = "p")]
    Progress {
        /// Percentage, clamped to 0-100 by the daemon
        #[arg(allow_negative_numbers = true)]
        percentage: f64,

        /// Color: name, "#RRGGBB" or "r,g,b"
        #[arg(short, long, default_value = "green", value_parser = parse_color)]
        color: Rgb,
    },

    /// Blink the whole ring
    #[command(visible_alias = "f")]
    Flash {
        /// Color: name, "#RRGGBB" or "r,g,b"
        #[arg(short, long, default_value = "red", value_parser = parse_color)]
        color: Rgb,

        /// Number of on/off cycles
        #[arg(short, long, default_value_t = 3)]
        times: u32,

        /// Seconds per on or off step
        #[arg(short, long, default_value_t = 0.2)]
        speed: f64,
    },

    /// Turn the ring off
    Off,

    /// Show client status (socket, daemon availability)
    Status,

    /// Walk through every state and effect
    Demo,
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    Rgb::parse(s).ok_or_else(|| format!("invalid color: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_state_with_duration() {
        let cli = Cli::parse_from(["motorpass-led", "state", "success", "-d", "3"]);
        match cli.command {
            Commands::State { state, duration } => {
                assert_eq!(state, LedState::Success);
                assert_eq!(duration, Some(3.0));
            }
            _ => panic!("expected state command"),
        }
    }

    #[test]
    fn test_parse_progress_color_and_negative() {
        let cli = Cli::parse_from(["motorpass-led", "progress", "-5", "--color", "0,0,255"]);
        match cli.command {
            Commands::Progress { percentage, color } => {
                assert_eq!(percentage, -5.0);
                assert_eq!(color, Rgb::BLUE);
            }
            _ => panic!("expected progress command"),
        }
    }

    #[test]
    fn test_daemon_overrides() {
        let cli = Cli::parse_from([
            "motorpass-led",
            "--socket",
            "/run/led.sock",
            "daemon",
            "--driver",
            "spi",
            "--pixels",
            "24",
        ]);
        assert_eq!(cli.socket, Some(PathBuf::from("/run/led.sock")));
        match cli.command {
            Commands::Daemon { driver, pixels, .. } => {
                assert_eq!(driver, Some(DriverKind::Ws2812Spi));
                assert_eq!(pixels, Some(24));
            }
            _ => panic!("expected daemon command"),
        }
    }
}
