//! Protocol error types

use thiserror::Error;

/// Errors raised while decoding or encoding protocol messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Payload is not valid JSON
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Valid JSON that does not match any message shape
    #[error("invalid message: {0}")]
    Invalid(#[source] serde_json::Error),

    /// Field decoded but its value is unusable
    #[error("invalid {field}: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("message exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("connection closed before a complete message was received")]
    Incomplete,

    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}
