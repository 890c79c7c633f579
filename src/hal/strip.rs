// Shared strip handle
//
// Write permission is tied to a cancellation token: every frame is written
// under the driver lock and only if the writer's token is still live. Once
// the scheduler cancels a writer, that writer can never touch the LEDs
// again, even if its task outlives the join timeout.

use std::sync::Arc;

use motorpass_led_protocol::Rgb;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::driver::{DriverError, LedDriver};

#[derive(Clone)]
pub struct SharedStrip {
    driver: Arc<Mutex<Box<dyn LedDriver>>>,
    len: usize,
    name: &'static str,
}

impl SharedStrip {
    pub fn new(driver: Box<dyn LedDriver>) -> Self {
        let len = driver.len();
        let name = driver.name();
        Self {
            driver: Arc::new(Mutex::new(driver)),
            len,
            name,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Write and show a full frame on behalf of `writer`.
    ///
    /// Returns `Ok(false)` without touching the driver if `writer` has been
    /// cancelled.
    pub fn write_frame(&self, frame: &[Rgb], writer: &CancellationToken) -> Result<bool, DriverError> {
        let mut driver = self.driver.lock();
        if writer.is_cancelled() {
            return Ok(false);
        }
        for (index, color) in frame.iter().enumerate() {
            driver.set_pixel(index, *color)?;
        }
        driver.show()?;
        Ok(true)
    }

    /// Clear the strip on behalf of `writer`; same permission rule as
    /// [`SharedStrip::write_frame`].
    pub fn clear_as(&self, writer: &CancellationToken) -> Result<bool, DriverError> {
        let mut driver = self.driver.lock();
        if writer.is_cancelled() {
            return Ok(false);
        }
        driver.clear()?;
        Ok(true)
    }

    /// Unconditional clear, for start-up and shutdown when no writer is active.
    pub fn clear(&self) -> Result<(), DriverError> {
        self.driver.lock().clear()
    }
}
