//! Client library for the MotorPass LED ring daemon.
//!
//! The GUI, fingerprint and OCR flows use [`LedClient`] to drive the ring.
//! LED feedback is an optional enhancement: every operation returns `bool`
//! and a missing daemon only ever turns operations into no-ops.
//!
//! ```no_run
//! use motorpass_led_client::{LedClient, LedClientConfig};
//!
//! let leds = LedClient::init(LedClientConfig::default());
//! leds.processing();
//! // ... scan ...
//! leds.success(Some(3.0));
//! ```

pub mod client;
pub mod error;

pub use client::{ClientStatus, LedClient, LedClientConfig, LedSession, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use motorpass_led_protocol::{LedState, Rgb};
