//! Countdown beeps.

use serde::{Deserialize, Serialize};

/// Tone frequencies in Hz.
pub mod frequencies {
    /// Countdown tick (A4)
    pub const LOW: f32 = 440.0;
    /// "Go" cue on the last second (A5)
    pub const HIGH: f32 = 880.0;
}

/// Tone durations in milliseconds.
pub mod durations {
    pub const SHORT: u64 = 100;
    pub const LONG: u64 = 400;
}

/// A single tone: frequency, length and volume (0.0 - 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub volume: f32,
}

impl Tone {
    pub fn new(frequency_hz: f32, duration_ms: u64, volume: f32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Short low beep for the 4-3-2 countdown.
    pub fn countdown_tick() -> Self {
        Self::new(frequencies::LOW, durations::SHORT, 0.5)
    }

    /// Longer high beep on the final second.
    pub fn go() -> Self {
        Self::new(frequencies::HIGH, durations::LONG, 0.7)
    }

    /// Beep due at `time_left_secs`, if any.
    pub fn for_countdown(time_left_secs: u32) -> Option<Self> {
        match time_left_secs {
            2..=4 => Some(Self::countdown_tick()),
            1 => Some(Self::go()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_offsets() {
        assert_eq!(Tone::for_countdown(5), None);
        assert_eq!(Tone::for_countdown(4), Some(Tone::countdown_tick()));
        assert_eq!(Tone::for_countdown(2), Some(Tone::countdown_tick()));
        assert_eq!(Tone::for_countdown(1), Some(Tone::go()));
        assert_eq!(Tone::for_countdown(0), None);
    }

    #[test]
    fn go_is_higher_and_longer() {
        let tick = Tone::countdown_tick();
        let go = Tone::go();
        assert!(go.frequency_hz > tick.frequency_hz);
        assert!(go.duration_ms > tick.duration_ms);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(Tone::new(440.0, 10, 3.0).volume, 1.0);
    }
}
