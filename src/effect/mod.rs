//! Frame-generator animations for the LED ring.
//!
//! Every routine is a small state machine that fills one frame per call and
//! says how long that frame should stay up. The daemon owns the timing and
//! the cancellation; routines never sleep and never touch the hardware.
//!
//! ```
//! use motorpass_led::effect::{Animation, Solid};
//! use motorpass_led_protocol::Rgb;
//!
//! let mut solid = Solid::new(Rgb::GREEN);
//! let mut frame = [Rgb::BLACK; 4];
//! assert!(solid.next_frame(&mut frame).is_none());
//! assert_eq!(frame, [Rgb::GREEN; 4]);
//! ```

mod routines;

use std::time::Duration;

pub use motorpass_led_protocol::Rgb;
pub use routines::{lit_count, Breathe, Chase, Flash, Progress, Solid, MAX_BREATH_STEPS};

/// A routine that produces frames for the whole ring.
pub trait Animation: Send + 'static {
    /// Routine name, for logs
    fn name(&self) -> &'static str;

    /// Fill `pixels` with the next frame.
    ///
    /// `Some(hold)` means the frame stays up for `hold` and the routine wants
    /// to be called again afterwards. `None` means this is the final frame.
    fn next_frame(&mut self, pixels: &mut [Rgb]) -> Option<Duration>;
}

// ── helpers ──────────────────────────────────────────────────────────

fn fill(pixels: &mut [Rgb], color: Rgb) {
    pixels.iter_mut().for_each(|p| *p = color);
}
