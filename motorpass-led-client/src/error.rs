//! Client error types
//!
//! These never reach collaborators: the public client API reports plain
//! booleans. They exist so the client can tell "daemon gone" apart from
//! "daemon said no".

use motorpass_led_protocol::ProtocolError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("daemon unreachable at {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error talking to daemon: {0}")]
    Io(#[from] io::Error),

    #[error("timed out waiting for the daemon")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Whether the failure means the daemon should be treated as absent
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            ClientError::Connect { .. } | ClientError::Io(_) | ClientError::Timeout
        )
    }
}
