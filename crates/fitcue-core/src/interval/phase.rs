use serde::{Deserialize, Serialize};

/// Phase of an interval session.
///
/// `Idle` and `Finished` are the only phases without a running countdown;
/// both are entered only through `start()`/`reset()` or by running out
/// the cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Warmup,
    Work,
    Rest,
    Cooldown,
    Finished,
}

impl SessionPhase {
    /// Metabolic equivalent (MET) used for calorie estimation only.
    pub fn intensity_factor(self) -> f64 {
        match self {
            SessionPhase::Idle | SessionPhase::Finished => 0.0,
            SessionPhase::Warmup => 4.0,
            SessionPhase::Work => 8.0,
            SessionPhase::Rest => 3.0,
            SessionPhase::Cooldown => 3.0,
        }
    }

    pub fn has_countdown(self) -> bool {
        !matches!(self, SessionPhase::Idle | SessionPhase::Finished)
    }

    /// Transition taken when this phase's countdown runs out.
    ///
    /// Returns the next phase and the cycle number that applies to it.
    /// `None` for `Idle` and `Finished`, which are never left by a tick.
    pub fn next(self, current_cycle: u32, total_cycles: u32) -> Option<(SessionPhase, u32)> {
        match self {
            SessionPhase::Warmup => Some((SessionPhase::Work, current_cycle)),
            SessionPhase::Work if current_cycle < total_cycles => {
                Some((SessionPhase::Rest, current_cycle))
            }
            SessionPhase::Work => Some((SessionPhase::Cooldown, current_cycle)),
            SessionPhase::Rest => Some((SessionPhase::Work, current_cycle + 1)),
            SessionPhase::Cooldown => Some((SessionPhase::Finished, current_cycle)),
            SessionPhase::Idle | SessionPhase::Finished => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Warmup => "warmup",
            SessionPhase::Work => "work",
            SessionPhase::Rest => "rest",
            SessionPhase::Cooldown => "cooldown",
            SessionPhase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
