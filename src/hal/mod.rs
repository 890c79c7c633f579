// Hardware Abstraction Layer (HAL) for the LED ring
//
// This module provides:
// - The driver contract every pixel backend implements
// - An in-memory virtual strip (development, tests)
// - A WS2812 backend over SPI (feature `ws2812-spi`)
// - The shared strip handle that binds writes to a writer token

pub mod driver;
pub mod strip;
pub mod virtual_strip;
pub mod ws2812;

pub use driver::{DriverError, LedDriver};
pub use strip::SharedStrip;
pub use virtual_strip::{StripProbe, VirtualStrip};

use crate::config::{DriverKind, StripConfig};

/// Open the backend named in the config.
///
/// Failure here is fatal for the daemon: it refuses to run without hardware.
pub fn open_driver(config: &StripConfig) -> Result<Box<dyn LedDriver>, DriverError> {
    match config.driver {
        DriverKind::Virtual => Ok(Box::new(VirtualStrip::new(config.pixel_count))),
        #[cfg(feature = "ws2812-spi")]
        DriverKind::Ws2812Spi => Ok(Box::new(ws2812::Ws2812Spi::open(
            config.pixel_count,
            config.brightness,
            config.spi_speed_hz,
        )?)),
        #[cfg(not(feature = "ws2812-spi"))]
        DriverKind::Ws2812Spi => Err(DriverError::Init(
            "built without the ws2812-spi feature".into(),
        )),
    }
}
