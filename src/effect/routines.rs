use std::time::Duration;

use super::{fill, Animation, Rgb};

/// Upper bound on frames per breathing ramp.
pub const MAX_BREATH_STEPS: usize = 10_000;

/// Linear breathing: ramps `0 → 1` over `steps` frames, back down over
/// `steps` more, and loops.
pub struct Breathe {
    color: Rgb,
    steps: usize,
    delay: Duration,
    frame: usize,
}

impl Breathe {
    /// `cycle` is the time for one full up-and-down ramp.
    pub fn new(color: Rgb, cycle: Duration, steps: usize) -> Self {
        let steps = steps.clamp(2, MAX_BREATH_STEPS);
        let delay = u32::try_from(2 * steps)
            .ok()
            .and_then(|frames| cycle.checked_div(frames))
            .unwrap_or(Duration::ZERO);
        Self {
            color,
            steps,
            delay,
            frame: 0,
        }
    }

    fn level(&self) -> f32 {
        let top = (self.steps - 1) as f32;
        if self.frame < self.steps {
            self.frame as f32 / top
        } else {
            (2 * self.steps - 1 - self.frame) as f32 / top
        }
    }
}

impl Animation for Breathe {
    fn name(&self) -> &'static str {
        "breathe"
    }

    fn next_frame(&mut self, pixels: &mut [Rgb]) -> Option<Duration> {
        fill(pixels, self.color.scale(self.level()));
        self.frame = (self.frame + 1) % (2 * self.steps);
        Some(self.delay)
    }
}

/// A lead pixel with a fading tail, advancing one position per step.
pub struct Chase {
    color: Rgb,
    tail: usize,
    speed: Duration,
    position: usize,
}

impl Chase {
    pub fn new(color: Rgb, tail: usize, speed: Duration) -> Self {
        Self {
            color,
            tail: tail.max(1),
            speed,
            position: 0,
        }
    }
}

impl Animation for Chase {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn next_frame(&mut self, pixels: &mut [Rgb]) -> Option<Duration> {
        let n = pixels.len();
        fill(pixels, Rgb::BLACK);
        if n == 0 {
            return Some(self.speed);
        }
        // Dimmest first so a tail longer than the ring never hides the lead.
        for i in (0..self.tail.min(n)).rev() {
            let index = (self.position + n - i) % n;
            let level = (self.tail - i) as f32 / self.tail as f32;
            pixels[index] = self.color.scale(level);
        }
        self.position = (self.position + 1) % n;
        Some(self.speed)
    }
}

/// Whole ring in one color; a single frame.
pub struct Solid {
    color: Rgb,
}

impl Solid {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }
}

impl Animation for Solid {
    fn name(&self) -> &'static str {
        "solid"
    }

    fn next_frame(&mut self, pixels: &mut [Rgb]) -> Option<Duration> {
        fill(pixels, self.color);
        None
    }
}

/// Number of pixels lit for `percentage` on a ring of `len`.
///
/// The percentage is clamped to `[0, 100]` first; NaN lights nothing.
pub fn lit_count(len: usize, percentage: f64) -> usize {
    if percentage.is_nan() {
        return 0;
    }
    let pct = percentage.clamp(0.0, 100.0);
    ((len as f64 * pct / 100.0).floor() as usize).min(len)
}

/// Lights the first [`lit_count`] pixels, the rest dark.
pub struct Progress {
    percentage: f64,
    color: Rgb,
}

impl Progress {
    pub fn new(percentage: f64, color: Rgb) -> Self {
        Self { percentage, color }
    }
}

impl Animation for Progress {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn next_frame(&mut self, pixels: &mut [Rgb]) -> Option<Duration> {
        let lit = lit_count(pixels.len(), self.percentage);
        let (on, off) = pixels.split_at_mut(lit);
        fill(on, self.color);
        fill(off, Rgb::BLACK);
        None
    }
}

/// `times` on/off cycles, `speed` per step, ending dark.
pub struct Flash {
    color: Rgb,
    speed: Duration,
    remaining: u32,
    lit: bool,
}

impl Flash {
    pub fn new(color: Rgb, times: u32, speed: Duration) -> Self {
        Self {
            color,
            speed,
            remaining: times,
            lit: false,
        }
    }
}

impl Animation for Flash {
    fn name(&self) -> &'static str {
        "flash"
    }

    fn next_frame(&mut self, pixels: &mut [Rgb]) -> Option<Duration> {
        if self.remaining == 0 {
            fill(pixels, Rgb::BLACK);
            return None;
        }
        if !self.lit {
            fill(pixels, self.color);
            self.lit = true;
            return Some(self.speed);
        }
        fill(pixels, Rgb::BLACK);
        self.lit = false;
        self.remaining -= 1;
        if self.remaining == 0 {
            None
        } else {
            Some(self.speed)
        }
    }
}
