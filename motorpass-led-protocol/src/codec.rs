//! Unframed JSON codec.
//!
//! Messages carry no length prefix or terminator: a message is complete as
//! soon as the bytes received so far parse as one JSON value. Readers feed
//! their buffer to [`try_decode`] after every read until it yields a value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::command::Command;
use crate::error::ProtocolError;

/// Largest request or response either side will buffer.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Decode one message from a possibly incomplete buffer.
///
/// Returns `Ok(None)` while the buffer holds only a prefix of a JSON value.
/// Bytes after the first complete value are ignored.
pub fn try_decode<T: DeserializeOwned>(buf: &[u8]) -> Result<Option<T>, ProtocolError> {
    if buf.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge {
            limit: MAX_MESSAGE_SIZE,
        });
    }

    let mut values = serde_json::Deserializer::from_slice(buf).into_iter::<serde_json::Value>();
    match values.next() {
        None => Ok(None),
        Some(Err(e)) if e.is_eof() => Ok(None),
        Some(Err(e)) => Err(ProtocolError::Malformed(e)),
        Some(Ok(value)) => serde_json::from_value(value)
            .map(Some)
            .map_err(ProtocolError::Invalid),
    }
}

/// Decode and validate a request.
pub fn decode_command(buf: &[u8]) -> Result<Option<Command>, ProtocolError> {
    match try_decode::<Command>(buf)? {
        Some(command) => {
            command.validate()?;
            Ok(Some(command))
        }
        None => Ok(None),
    }
}

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(message).map_err(ProtocolError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{LedState, Response};

    #[test]
    fn test_prefix_is_incomplete() {
        let full = br#"{"action":"set_state","state":"idle"}"#;
        for cut in 0..full.len() {
            let got = decode_command(&full[..cut]).unwrap();
            assert!(got.is_none(), "prefix of {cut} bytes decoded early");
        }
        assert_eq!(
            decode_command(full).unwrap(),
            Some(Command::SetState {
                state: LedState::Idle,
                duration: None
            })
        );
    }

    #[test]
    fn test_whitespace_only_is_incomplete() {
        assert!(decode_command(b"  \n").unwrap().is_none());
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            decode_command(b"hello"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            decode_command(b"{\"action\" 1}"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_wrong_shape_is_invalid() {
        assert!(matches!(
            decode_command(br#"{"action":"dance"}"#),
            Err(ProtocolError::Invalid(_))
        ));
        assert!(matches!(
            decode_command(b"[1,2,3]"),
            Err(ProtocolError::Invalid(_))
        ));
    }

    #[test]
    fn test_range_checked_after_decode() {
        assert!(matches!(
            decode_command(br#"{"action":"flash","speed":-0.5}"#),
            Err(ProtocolError::OutOfRange { field: "speed", .. })
        ));
    }

    #[test]
    fn test_oversized_buffer_rejected() {
        let buf = vec![b' '; MAX_MESSAGE_SIZE + 1];
        assert!(matches!(
            decode_command(&buf),
            Err(ProtocolError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let got: Option<Response> = try_decode(b"{\"status\":\"ok\"}\n").unwrap();
        assert_eq!(got, Some(Response::ok()));
    }
}
