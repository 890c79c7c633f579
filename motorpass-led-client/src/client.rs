//! Blocking socket client with sticky availability.

use std::io::{ErrorKind, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use socket2::{Domain, SockAddr, Socket, Type};

use motorpass_led_protocol::{
    encode, try_decode, Command, LedState, Response, Rgb, DEFAULT_SOCKET_PATH,
};
use tracing::{debug, info, warn};

use crate::error::ClientError;

/// Per-request bound on each of connect, write and read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// How long `success` / `failed` hold before reverting when callers pass `None`.
const DEFAULT_RESULT_HOLD_SECS: f64 = 3.0;

/// Step duration used by `flash` and its helpers.
const DEFAULT_FLASH_SPEED: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedClientConfig {
    pub socket_path: PathBuf,
    pub timeout: Duration,
}

impl Default for LedClientConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LedClientConfig {
    pub fn with_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: path.into(),
            ..Self::default()
        }
    }
}

/// Snapshot reported by [`LedClient::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStatus {
    pub available: bool,
    pub socket_path: PathBuf,
}

/// Handle to the LED daemon.
///
/// Construct one and pass it (or an `Arc` of it) to each collaborator. A
/// failed connection marks the client unavailable; from then on every
/// operation except [`LedClient::is_available`] and [`LedClient::ping`]
/// returns `false` without touching the socket, until a ping succeeds.
#[derive(Debug)]
pub struct LedClient {
    config: LedClientConfig,
    available: AtomicBool,
}

impl LedClient {
    /// Create a client without contacting the daemon.
    ///
    /// The client starts out optimistic: the first operation connects.
    pub fn new(config: LedClientConfig) -> Self {
        Self {
            config,
            available: AtomicBool::new(true),
        }
    }

    /// Create a client and check the daemon right away.
    pub fn init(config: LedClientConfig) -> Self {
        let client = Self::new(config);
        if client.ping() {
            info!(
                "LED daemon connected at {}",
                client.config.socket_path.display()
            );
        } else {
            warn!(
                "LED daemon not available at {}; LED feedback disabled",
                client.config.socket_path.display()
            );
        }
        client
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// True if the daemon answered last time; otherwise re-check with a ping.
    pub fn is_available(&self) -> bool {
        if self.available.load(Ordering::Acquire) {
            return true;
        }
        self.ping()
    }

    /// Ping the daemon unconditionally and record the outcome.
    pub fn ping(&self) -> bool {
        let ok = match self.send(&Command::Ping) {
            Ok(response) => response.is_ok(),
            Err(e) => {
                debug!("ping failed: {e}");
                false
            }
        };
        self.available.store(ok, Ordering::Release);
        ok
    }

    pub fn status(&self) -> ClientStatus {
        ClientStatus {
            available: self.is_available(),
            socket_path: self.config.socket_path.clone(),
        }
    }

    /// Request a named state; `duration` only matters for success/failed.
    pub fn set_state(&self, state: LedState, duration: Option<f64>) -> bool {
        let duration = duration.filter(|d| *d > 0.0);
        self.request(&Command::SetState { state, duration })
    }

    /// Fill `percentage` (clamped to 0-100) of the ring with `color`.
    pub fn show_progress(&self, percentage: f64, color: Rgb) -> bool {
        if percentage.is_nan() {
            return false;
        }
        self.request(&Command::Progress {
            percentage: percentage.clamp(0.0, 100.0),
            color,
        })
    }

    pub fn flash(&self, color: Rgb, times: u32) -> bool {
        self.flash_with_speed(color, times, DEFAULT_FLASH_SPEED)
    }

    pub fn flash_with_speed(&self, color: Rgb, times: u32, speed: f64) -> bool {
        self.request(&Command::Flash {
            color,
            times,
            speed,
        })
    }

    pub fn turn_off(&self) -> bool {
        self.request(&Command::Off)
    }

    /// Blue breathing
    pub fn idle(&self) -> bool {
        self.set_state(LedState::Idle, None)
    }

    /// Yellow rotating chase
    pub fn processing(&self) -> bool {
        self.set_state(LedState::Processing, None)
    }

    /// Solid green, back to idle after `hold` seconds (default 3)
    pub fn success(&self, hold: Option<f64>) -> bool {
        self.set_state(
            LedState::Success,
            Some(hold.unwrap_or(DEFAULT_RESULT_HOLD_SECS)),
        )
    }

    /// Solid red, back to idle after `hold` seconds (default 3)
    pub fn failed(&self, hold: Option<f64>) -> bool {
        self.set_state(
            LedState::Failed,
            Some(hold.unwrap_or(DEFAULT_RESULT_HOLD_SECS)),
        )
    }

    /// White breathing
    pub fn camera(&self) -> bool {
        self.set_state(LedState::Camera, None)
    }

    pub fn flash_success(&self, times: u32) -> bool {
        self.flash(Rgb::GREEN, times)
    }

    pub fn flash_failed(&self, times: u32) -> bool {
        self.flash(Rgb::RED, times)
    }

    pub fn flash_warning(&self, times: u32) -> bool {
        self.flash(Rgb::ORANGE, times)
    }

    /// Wrap the client in a guard that turns the ring off when dropped.
    pub fn session(self) -> LedSession {
        LedSession { client: self }
    }

    fn request(&self, command: &Command) -> bool {
        if !self.available.load(Ordering::Acquire) {
            debug!("LED daemon marked unavailable, skipping {}", command.action());
            return false;
        }

        match self.send(command) {
            Ok(response) if response.is_ok() => true,
            Ok(response) => {
                debug!(
                    "daemon rejected {}: {}",
                    command.action(),
                    response.message.as_deref().unwrap_or("no message")
                );
                false
            }
            Err(e) if e.is_connection() => {
                warn!("LED daemon lost: {e}");
                self.available.store(false, Ordering::Release);
                false
            }
            Err(e) => {
                debug!("{} failed: {e}", command.action());
                false
            }
        }
    }

    /// One connection, one request, one response.
    fn send(&self, command: &Command) -> Result<Response, ClientError> {
        let path = &self.config.socket_path;
        let timeout = self.config.timeout.max(Duration::from_millis(1));

        let mut stream = connect(path, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        stream.write_all(&encode(command)?).map_err(map_timeout)?;
        stream.flush().map_err(map_timeout)?;
        stream.shutdown(Shutdown::Write).ok();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).map_err(map_timeout)?;
            if n == 0 {
                return try_decode::<Response>(&buf)?
                    .ok_or(ClientError::Protocol(
                        motorpass_led_protocol::ProtocolError::Incomplete,
                    ));
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(response) = try_decode::<Response>(&buf)? {
                return Ok(response);
            }
        }
    }
}

/// Connect without ever blocking past `timeout`, even when the daemon's
/// accept backlog is full.
fn connect(path: &Path, timeout: Duration) -> Result<UnixStream, ClientError> {
    let connect_err = |source| ClientError::Connect {
        path: path.to_path_buf(),
        source,
    };
    let addr = SockAddr::unix(path).map_err(connect_err)?;
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None).map_err(connect_err)?;
    socket.connect_timeout(&addr, timeout).map_err(connect_err)?;
    Ok(socket.into())
}

fn map_timeout(e: std::io::Error) -> ClientError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => ClientError::Timeout,
        _ => ClientError::Io(e),
    }
}

/// Scoped use of the ring: turns the LEDs off on drop.
#[derive(Debug)]
pub struct LedSession {
    client: LedClient,
}

impl std::ops::Deref for LedSession {
    type Target = LedClient;

    fn deref(&self) -> &LedClient {
        &self.client
    }
}

impl Drop for LedSession {
    fn drop(&mut self) {
        self.client.turn_off();
    }
}
