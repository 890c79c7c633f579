// Virtual strip - in-memory pixel buffer with an optional frame recorder

use std::collections::VecDeque;
use std::sync::Arc;

use motorpass_led_protocol::Rgb;
use parking_lot::Mutex;
use tracing::trace;

use super::driver::{check_index, DriverError, LedDriver};

/// Frames kept by a recording probe before the oldest are dropped
const HISTORY_LIMIT: usize = 10_000;

#[derive(Debug, Default)]
struct ProbeLog {
    frames: VecDeque<Vec<Rgb>>,
    shows: u64,
}

/// Read side of a recording [`VirtualStrip`], usable after the strip has
/// been handed to the daemon.
#[derive(Debug, Clone, Default)]
pub struct StripProbe {
    log: Arc<Mutex<ProbeLog>>,
}

impl StripProbe {
    /// Every frame pushed so far, oldest first
    pub fn frames(&self) -> Vec<Vec<Rgb>> {
        self.log.lock().frames.iter().cloned().collect()
    }

    pub fn last_frame(&self) -> Option<Vec<Rgb>> {
        self.log.lock().frames.back().cloned()
    }

    /// Total number of `show()` calls, including frames dropped from history
    pub fn show_count(&self) -> u64 {
        self.log.lock().shows
    }

    fn record(&self, frame: &[Rgb]) {
        let mut log = self.log.lock();
        log.shows += 1;
        if log.frames.len() == HISTORY_LIMIT {
            log.frames.pop_front();
        }
        log.frames.push_back(frame.to_vec());
    }
}

/// In-memory ring. Colors are stored as given; brightness is a property of
/// physical backends only.
#[derive(Debug)]
pub struct VirtualStrip {
    pixels: Vec<Rgb>,
    probe: Option<StripProbe>,
}

impl VirtualStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::BLACK; len],
            probe: None,
        }
    }

    /// A strip that records every shown frame into the returned probe.
    pub fn recording(len: usize) -> (Self, StripProbe) {
        let probe = StripProbe::default();
        let strip = Self {
            pixels: vec![Rgb::BLACK; len],
            probe: Some(probe.clone()),
        };
        (strip, probe)
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}

impl LedDriver for VirtualStrip {
    fn name(&self) -> &'static str {
        "virtual"
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
        trace!(frame = ?self.pixels, "virtual strip show");
        if let Some(probe) = &self.probe {
            probe.record(&self.pixels);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_show_records_frame() {
        let (mut strip, probe) = VirtualStrip::recording(4);
        strip.set_pixel(1, Rgb::RED).unwrap();
        assert_eq!(probe.show_count(), 0);
        strip.show().unwrap();
        assert_eq!(
            probe.last_frame().unwrap(),
            vec![Rgb::BLACK, Rgb::RED, Rgb::BLACK, Rgb::BLACK]
        );
    }

    #[test]
    fn test_out_of_range_is_error_and_ignored() {
        let mut strip = VirtualStrip::new(3);
        let err = strip.set_pixel(3, Rgb::WHITE).unwrap_err();
        assert!(matches!(
            err,
            DriverError::IndexOutOfRange { index: 3, len: 3 }
        ));
        assert!(strip.pixels().iter().all(|p| p.is_black()));
    }

    #[test]
    fn test_clear_blanks_and_pushes() {
        let (mut strip, probe) = VirtualStrip::recording(2);
        strip.set_pixel(0, Rgb::GREEN).unwrap();
        strip.set_pixel(1, Rgb::GREEN).unwrap();
        strip.clear().unwrap();
        assert_eq!(probe.show_count(), 1);
        assert_eq!(probe.last_frame().unwrap(), vec![Rgb::BLACK; 2]);
    }
}
