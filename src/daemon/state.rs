//! What the ring is showing, as the scheduler sees it.

use std::fmt;

use motorpass_led_protocol::LedState;

/// Current ring state. `Custom` covers the one-shot progress and flash
/// effects, which are not named states a client can return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    Idle,
    Processing,
    Success,
    Failed,
    Camera,
    Off,
    Custom,
}

impl From<LedState> for RingState {
    fn from(state: LedState) -> Self {
        match state {
            LedState::Idle => RingState::Idle,
            LedState::Processing => RingState::Processing,
            LedState::Success => RingState::Success,
            LedState::Failed => RingState::Failed,
            LedState::Camera => RingState::Camera,
            LedState::Off => RingState::Off,
        }
    }
}

impl fmt::Display for RingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RingState::Idle => "idle",
            RingState::Processing => "processing",
            RingState::Success => "success",
            RingState::Failed => "failed",
            RingState::Camera => "camera",
            RingState::Off => "off",
            RingState::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// State plus a generation counter bumped on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonState {
    pub current: RingState,
    pub generation: u64,
}

impl Default for DaemonState {
    fn default() -> Self {
        Self {
            current: RingState::Off,
            generation: 0,
        }
    }
}

impl DaemonState {
    /// Move to `next` and return the new generation.
    pub fn advance(&mut self, next: RingState) -> u64 {
        self.generation += 1;
        self.current = next;
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_transition_bumps_generation() {
        let mut state = DaemonState::default();
        assert_eq!(state.current, RingState::Off);
        assert_eq!(state.advance(RingState::Idle), 1);
        // same state again is still a transition
        assert_eq!(state.advance(RingState::Idle), 2);
        assert_eq!(state.advance(LedState::Success.into()), 3);
        assert_eq!(state.current, RingState::Success);
    }
}
