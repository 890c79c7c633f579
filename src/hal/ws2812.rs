// WS2812 backend - bit-banged through the SPI MOSI line
//
// SPI runs at 2.4 MHz so each WS2812 data bit becomes three SPI bits
// (`110` for one, `100` for zero, ~416 ns per SPI bit). Pixels go out in GRB
// order, followed by a low period long enough to latch.

use motorpass_led_protocol::Rgb;

/// SPI clock that makes three SPI bits match one WS2812 bit period
pub const SPI_CLOCK_HZ: u32 = 2_400_000;

/// Clocks that keep the SPI bit within the WS2812 timing tolerance
pub const SPI_CLOCK_RANGE_HZ: std::ops::RangeInclusive<u32> = 2_250_000..=2_700_000;

/// Zero bytes appended after the pixel data (> 80 us low at 2.4 MHz)
const RESET_BYTES: usize = 32;

/// Bytes of SPI data per pixel: 3 channels x 3 encoded bytes
pub const BYTES_PER_PIXEL: usize = 9;

fn encode_byte(byte: u8, out: &mut Vec<u8>) {
    let mut bits: u32 = 0;
    for i in (0..8).rev() {
        bits <<= 3;
        bits |= if byte & (1 << i) != 0 { 0b110 } else { 0b100 };
    }
    out.extend_from_slice(&[(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]);
}

/// Encode a frame into the SPI byte stream, applying global `brightness`.
pub fn encode_frame(pixels: &[Rgb], brightness: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * BYTES_PER_PIXEL + RESET_BYTES);
    let factor = brightness as f32 / 255.0;
    for pixel in pixels {
        let scaled = pixel.scale(factor);
        encode_byte(scaled.g, &mut out);
        encode_byte(scaled.r, &mut out);
        encode_byte(scaled.b, &mut out);
    }
    out.resize(out.len() + RESET_BYTES, 0);
    out
}

#[cfg(feature = "ws2812-spi")]
pub use spi::Ws2812Spi;

#[cfg(feature = "ws2812-spi")]
mod spi {
    use motorpass_led_protocol::Rgb;
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
    use tracing::info;

    use super::encode_frame;
    use crate::hal::driver::{check_index, DriverError, LedDriver};

    pub struct Ws2812Spi {
        spi: Spi,
        pixels: Vec<Rgb>,
        brightness: u8,
    }

    impl Ws2812Spi {
        pub fn open(len: usize, brightness: u8, speed_hz: u32) -> Result<Self, DriverError> {
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, speed_hz, Mode::Mode0)
                .map_err(|e| DriverError::Init(format!("SPI0: {e}")))?;
            info!("WS2812 ring on SPI0 at {speed_hz} Hz: {len} pixels, brightness {brightness}");
            Ok(Self {
                spi,
                pixels: vec![Rgb::BLACK; len],
                brightness,
            })
        }
    }

    impl LedDriver for Ws2812Spi {
        fn name(&self) -> &'static str {
            "ws2812-spi"
        }

        fn len(&self) -> usize {
            self.pixels.len()
        }

        fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), DriverError> {
            check_index(index, self.pixels.len())?;
            self.pixels[index] = color;
            Ok(())
        }

        fn show(&mut self) -> Result<(), DriverError> {
            let data = encode_frame(&self.pixels, self.brightness);
            self.spi
                .write(&data)
                .map_err(|e| DriverError::Write(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bit_patterns() {
        let mut out = Vec::new();
        encode_byte(0x00, &mut out);
        // 100 100 100 100 100 100 100 100
        assert_eq!(out, vec![0x92, 0x49, 0x24]);

        out.clear();
        encode_byte(0xFF, &mut out);
        // 110 110 110 110 110 110 110 110
        assert_eq!(out, vec![0xDB, 0x6D, 0xB6]);
    }

    #[test]
    fn test_frame_is_grb_with_reset_tail() {
        let data = encode_frame(&[Rgb::RED], 255);
        assert_eq!(data.len(), BYTES_PER_PIXEL + RESET_BYTES);
        // G = 0, R = 255, B = 0
        assert_eq!(&data[0..3], &[0x92, 0x49, 0x24]);
        assert_eq!(&data[3..6], &[0xDB, 0x6D, 0xB6]);
        assert_eq!(&data[6..9], &[0x92, 0x49, 0x24]);
        assert!(data[9..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_brightness_zero_sends_black() {
        let dark = encode_frame(&[Rgb::WHITE; 2], 0);
        let black = encode_frame(&[Rgb::BLACK; 2], 255);
        assert_eq!(dark, black);
    }

    #[cfg(feature = "ws2812-spi")]
    #[test]
    #[ignore = "needs a WS2812 ring on SPI0"]
    fn test_hardware_ring_lights_and_clears() {
        use crate::hal::LedDriver;

        let mut ring = Ws2812Spi::open(12, 76, super::SPI_CLOCK_HZ).unwrap();
        for i in 0..ring.len() {
            ring.set_pixel(i, Rgb::GREEN).unwrap();
        }
        ring.show().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(500));
        ring.clear().unwrap();
    }
}
