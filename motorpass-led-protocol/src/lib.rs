//! Wire protocol shared by the MotorPass LED daemon and its clients.
//!
//! One request and one response per connection, each a single JSON object with
//! no framing. The request is tagged by its `action` field:
//!
//! ```json
//! {"action": "set_state", "state": "success", "duration": 3.0}
//! ```
//!
//! and the daemon answers with `{"status": "ok"}` or
//! `{"status": "error", "message": "..."}`.

pub mod codec;
pub mod command;
pub mod error;
pub mod types;

pub use codec::{decode_command, encode, try_decode, MAX_MESSAGE_SIZE};
pub use command::{Command, LedState, Response, Status, MAX_SECONDS};
pub use error::ProtocolError;
pub use types::Rgb;

/// Socket the daemon listens on unless configured otherwise.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/motorpass_led.sock";
