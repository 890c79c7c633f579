//! Daemon configuration
//!
//! Loaded from TOML (default `~/.config/motorpass/led.toml`); a missing file
//! means defaults. CLI flags override individual fields after loading.

use crate::effect::MAX_BREATH_STEPS;
use crate::hal::ws2812::{SPI_CLOCK_HZ, SPI_CLOCK_RANGE_HZ};
use motorpass_led_protocol::{Rgb, DEFAULT_SOCKET_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which hardware backend drives the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverKind {
    /// In-memory strip, frames go to the trace log
    #[default]
    Virtual,
    /// WS2812 ring on SPI0 (MOSI / GPIO 10)
    Ws2812Spi,
}

impl std::str::FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "virtual" => Ok(Self::Virtual),
            "ws2812-spi" | "spi" => Ok(Self::Ws2812Spi),
            _ => Err(format!("unknown driver: {s} (expected virtual or ws2812-spi)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Number of pixels on the ring
    pub pixel_count: usize,
    /// Global output brightness (0-255)
    pub brightness: u8,
    pub driver: DriverKind,
    /// SPI clock for the WS2812 backend; three SPI bits per LED bit
    pub spi_speed_hz: u32,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            pixel_count: 12,
            brightness: 76,
            driver: DriverKind::Virtual,
            spi_speed_hz: SPI_CLOCK_HZ,
        }
    }
}

/// Per-state animation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames per breathing ramp (up and down each take this many)
    pub breath_steps: usize,
    pub idle_cycle_secs: f64,
    pub camera_cycle_secs: f64,
    /// Seconds per step of the processing chase
    pub chase_speed_secs: f64,
    /// Lit pixels in the chase tail, lead pixel included
    pub chase_tail: usize,
    pub idle_color: Rgb,
    pub processing_color: Rgb,
    pub success_color: Rgb,
    pub failed_color: Rgb,
    pub camera_color: Rgb,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            breath_steps: 30,
            idle_cycle_secs: 3.0,
            camera_cycle_secs: 1.0,
            chase_speed_secs: 0.08,
            chase_tail: 3,
            idle_color: Rgb::BLUE,
            processing_color: Rgb::YELLOW,
            success_color: Rgb::GREEN,
            failed_color: Rgb::RED,
            camera_color: Rgb::WHITE,
        }
    }
}

impl AnimationConfig {
    pub fn idle_cycle(&self) -> Duration {
        Duration::from_secs_f64(self.idle_cycle_secs)
    }

    pub fn camera_cycle(&self) -> Duration {
        Duration::from_secs_f64(self.camera_cycle_secs)
    }

    pub fn chase_speed(&self) -> Duration {
        Duration::from_secs_f64(self.chase_speed_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    /// Octal permission bits for the socket file, e.g. "0666"
    pub socket_mode: String,
    /// How long a client may take to send its request
    pub request_timeout_ms: u64,
    /// How long to wait for a cancelled animation to exit
    pub cancel_timeout_ms: u64,
    /// Blink the ring blue once at start-up
    pub startup_flash: bool,
    pub strip: StripConfig,
    pub animations: AnimationConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            socket_mode: "0666".to_string(),
            request_timeout_ms: 2_000,
            cancel_timeout_ms: 1_000,
            startup_flash: true,
            strip: StripConfig::default(),
            animations: AnimationConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("motorpass")
            .join("led.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cancel_timeout(&self) -> Duration {
        Duration::from_millis(self.cancel_timeout_ms)
    }

    pub fn socket_mode_bits(&self) -> Result<u32, ConfigError> {
        let digits = self.socket_mode.trim().trim_start_matches("0o");
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|bits| *bits <= 0o777)
            .ok_or_else(|| {
                ConfigError::Invalid(format!("socket_mode {:?} is not octal", self.socket_mode))
            })
    }

    /// Check everything the daemon relies on before it touches hardware.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_mode_bits()?;

        if self.strip.pixel_count == 0 {
            return Err(ConfigError::Invalid("strip.pixel_count must be at least 1".into()));
        }
        if !SPI_CLOCK_RANGE_HZ.contains(&self.strip.spi_speed_hz) {
            return Err(ConfigError::Invalid(format!(
                "strip.spi_speed_hz must be between {} and {}",
                SPI_CLOCK_RANGE_HZ.start(),
                SPI_CLOCK_RANGE_HZ.end()
            )));
        }

        let anim = &self.animations;
        if !(2..=MAX_BREATH_STEPS).contains(&anim.breath_steps) {
            return Err(ConfigError::Invalid(format!(
                "animations.breath_steps must be between 2 and {MAX_BREATH_STEPS}"
            )));
        }
        if anim.chase_tail == 0 {
            return Err(ConfigError::Invalid("animations.chase_tail must be at least 1".into()));
        }
        for (name, secs) in [
            ("animations.idle_cycle_secs", anim.idle_cycle_secs),
            ("animations.camera_cycle_secs", anim.camera_cycle_secs),
            ("animations.chase_speed_secs", anim.chase_speed_secs),
        ] {
            if !(secs.is_finite() && secs > 0.0 && secs <= motorpass_led_protocol::MAX_SECONDS) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number of seconds"
                )));
            }
        }
        Ok(())
    }
}
