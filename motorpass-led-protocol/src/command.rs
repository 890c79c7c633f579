//! Request and response messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::types::Rgb;

/// Upper bound for any duration or step speed carried by a command (one day).
pub const MAX_SECONDS: f64 = 86_400.0;

/// Named ring states a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedState {
    /// Blue breathing, ready for the next user
    Idle,
    /// Yellow rotating chase while scanning
    Processing,
    /// Solid green
    Success,
    /// Solid red
    Failed,
    /// White breathing while the camera is active
    Camera,
    /// All pixels dark
    Off,
}

impl LedState {
    pub const ALL: &'static [LedState] = &[
        LedState::Idle,
        LedState::Processing,
        LedState::Success,
        LedState::Failed,
        LedState::Camera,
        LedState::Off,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedState::Idle => "idle",
            LedState::Processing => "processing",
            LedState::Success => "success",
            LedState::Failed => "failed",
            LedState::Camera => "camera",
            LedState::Off => "off",
        }
    }

    /// States that accept an auto-revert duration
    pub fn reverts(&self) -> bool {
        matches!(self, LedState::Success | LedState::Failed)
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LedState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown state: {s}"))
    }
}

/// A client request, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Liveness check; never touches the ring
    Ping,
    /// Switch to a named state, optionally reverting to idle after `duration` seconds
    SetState {
        state: LedState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<f64>,
    },
    /// Light a fraction of the ring
    Progress {
        percentage: f64,
        #[serde(default = "default_progress_color")]
        color: Rgb,
    },
    /// Blink the whole ring `times` times, `speed` seconds per step
    Flash {
        #[serde(default = "default_flash_color")]
        color: Rgb,
        #[serde(default = "default_flash_times")]
        times: u32,
        #[serde(default = "default_flash_speed")]
        speed: f64,
    },
    /// Clear the ring
    Off,
}

fn default_progress_color() -> Rgb {
    Rgb::GREEN
}

fn default_flash_color() -> Rgb {
    Rgb::RED
}

fn default_flash_times() -> u32 {
    3
}

fn default_flash_speed() -> f64 {
    0.2
}

impl Command {
    /// Short action name, as it appears in the `action` field
    pub fn action(&self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::SetState { .. } => "set_state",
            Command::Progress { .. } => "progress",
            Command::Flash { .. } => "flash",
            Command::Off => "off",
        }
    }

    /// Reject values that decode fine but cannot be acted on.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Command::Ping | Command::Off => Ok(()),
            Command::SetState { duration, .. } => match duration {
                Some(d) => check_seconds("duration", *d),
                None => Ok(()),
            },
            Command::Progress { percentage, .. } => {
                if percentage.is_nan() {
                    Err(ProtocolError::OutOfRange {
                        field: "percentage",
                        reason: "not a number".into(),
                    })
                } else {
                    Ok(())
                }
            }
            Command::Flash { speed, .. } => check_seconds("speed", *speed),
        }
    }
}

fn check_seconds(field: &'static str, value: f64) -> Result<(), ProtocolError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProtocolError::OutOfRange {
            field,
            reason: format!("{value} is not a non-negative number of seconds"),
        });
    }
    if value > MAX_SECONDS {
        return Err(ProtocolError::OutOfRange {
            field,
            reason: format!("{value} exceeds {MAX_SECONDS} seconds"),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error,
}

/// Daemon reply, one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
