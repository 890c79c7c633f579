//! Command server - one request and one reply per Unix socket connection.

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use motorpass_led_protocol::{decode_command, encode, Command, ProtocolError, Response};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::scheduler::SchedulerHandle;

const READ_CHUNK: usize = 4096;

/// Errors that keep the server from starting
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("another LED daemon is already listening on {0}")]
    AlreadyRunning(PathBuf),

    #[error("failed to remove stale socket {path}: {source}")]
    Stale {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to set permissions on {path}: {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
enum RequestError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct CommandServer {
    listener: UnixListener,
    path: PathBuf,
    scheduler: SchedulerHandle,
    request_timeout: Duration,
}

impl CommandServer {
    /// Bind the socket, replacing a stale file but never a live daemon.
    pub async fn bind(
        path: &Path,
        mode: u32,
        scheduler: SchedulerHandle,
        request_timeout: Duration,
    ) -> Result<Self, ServerError> {
        if UnixStream::connect(path).await.is_ok() {
            return Err(ServerError::AlreadyRunning(path.to_path_buf()));
        }
        match std::fs::remove_file(path) {
            Ok(()) => debug!("removed stale socket {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ServerError::Stale {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }

        let listener = UnixListener::bind(path).map_err(|source| ServerError::Bind {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|source| {
            ServerError::Permissions {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("listening on {} (mode {mode:o})", path.display());

        Ok(Self {
            listener,
            path: path.to_path_buf(),
            scheduler,
            request_timeout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept connections until `shutdown` is cancelled.
    pub async fn serve(&self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let scheduler = self.scheduler.clone();
                        let request_timeout = self.request_timeout;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, scheduler, request_timeout).await {
                                debug!("connection error: {e}");
                            }
                        });
                    }
                    Err(e) => error!("accept failed: {e}"),
                },
            }
        }
    }

    /// Stop listening and remove the socket file.
    pub fn close(self) {
        drop(self.listener);
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("removed {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove {}: {e}", self.path.display()),
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    scheduler: SchedulerHandle,
    request_timeout: Duration,
) -> io::Result<()> {
    let response = match tokio::time::timeout(request_timeout, read_command(&mut stream)).await {
        Err(_) => Response::error(format!("no complete request within {request_timeout:?}")),
        // Closed without sending anything: nobody to answer.
        Ok(Ok(None)) => return Ok(()),
        Ok(Ok(Some(command))) => {
            debug!(action = command.action(), "request");
            scheduler.dispatch(command).await
        }
        Ok(Err(RequestError::Protocol(e))) => {
            warn!("rejected request: {e}");
            Response::error(e.to_string())
        }
        Ok(Err(RequestError::Io(e))) => return Err(e),
    };

    let bytes = encode(&response).map_err(io::Error::other)?;
    stream.write_all(&bytes).await?;
    stream.shutdown().await
}

/// Read until the buffer holds one complete command or the peer stops
/// sending.
async fn read_command(stream: &mut UnixStream) -> Result<Option<Command>, RequestError> {
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if buf.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            return Err(ProtocolError::Incomplete.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(command) = decode_command(&buf)? {
            return Ok(Some(command));
        }
    }
}
