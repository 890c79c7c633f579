// Driver contract for a fixed-length pixel buffer

use motorpass_led_protocol::Rgb;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("pixel {index} out of range (strip has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The strip could not be attached at start-up
    #[error("failed to attach LED strip: {0}")]
    Init(String),

    #[error("write to LED strip failed: {0}")]
    Write(String),
}

/// A pixel buffer plus the means to push it to the LEDs.
///
/// Implementations do no locking of their own. Callers must serialize
/// access; the daemon does so through [`super::SharedStrip`].
pub trait LedDriver: Send {
    /// Backend name, for logs
    fn name(&self) -> &'static str;

    /// Number of pixels, fixed for the driver's lifetime
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set one pixel in the buffer. Out-of-range indices leave the buffer
    /// untouched and return [`DriverError::IndexOutOfRange`].
    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), DriverError>;

    /// Push the buffer to the LEDs
    fn show(&mut self) -> Result<(), DriverError>;

    /// Set every pixel to black and push
    fn clear(&mut self) -> Result<(), DriverError> {
        for index in 0..self.len() {
            self.set_pixel(index, Rgb::BLACK)?;
        }
        self.show()
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<(), DriverError> {
    if index < len {
        Ok(())
    } else {
        Err(DriverError::IndexOutOfRange { index, len })
    }
}
