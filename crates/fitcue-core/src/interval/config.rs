use serde::{Deserialize, Serialize};

use super::phase::SessionPhase;
use crate::error::ValidationError;

/// Durations and cycle count for an interval session.
///
/// Every field must be at least 1. Use [`IntervalConfig::new`] or
/// [`IntervalConfig::validate`] before handing a config to an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub warmup_secs: u32,
    pub work_secs: u32,
    pub rest_secs: u32,
    pub cooldown_secs: u32,
    pub total_cycles: u32,
}

/// One contiguous block of a session's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub phase: SessionPhase,
    pub cycle: u32,
    pub duration_secs: u32,
}

impl IntervalConfig {
    pub fn new(
        warmup_secs: u32,
        work_secs: u32,
        rest_secs: u32,
        cooldown_secs: u32,
        total_cycles: u32,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            warmup_secs,
            work_secs,
            rest_secs,
            cooldown_secs,
            total_cycles,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("warmup_secs", self.warmup_secs),
            ("work_secs", self.work_secs),
            ("rest_secs", self.rest_secs),
            ("cooldown_secs", self.cooldown_secs),
            ("total_cycles", self.total_cycles),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::NonPositive { field });
            }
        }
        Ok(())
    }

    /// Countdown length of `phase`.
    ///
    /// `Idle` shows the warmup length (what `start()` will count down
    /// from); `Finished` has none.
    pub fn duration_of(&self, phase: SessionPhase) -> u32 {
        match phase {
            SessionPhase::Idle | SessionPhase::Warmup => self.warmup_secs,
            SessionPhase::Work => self.work_secs,
            SessionPhase::Rest => self.rest_secs,
            SessionPhase::Cooldown => self.cooldown_secs,
            SessionPhase::Finished => 0,
        }
    }

    /// Number of one-second ticks from `start()` to `Finished`.
    ///
    /// Uses saturating arithmetic so absurd configs cannot overflow.
    pub fn total_duration_secs(&self) -> u64 {
        let cycles = u64::from(self.total_cycles);
        u64::from(self.warmup_secs)
            .saturating_add(cycles.saturating_mul(u64::from(self.work_secs)))
            .saturating_add(cycles.saturating_sub(1).saturating_mul(u64::from(self.rest_secs)))
            .saturating_add(u64::from(self.cooldown_secs))
    }

    /// The ordered phases a full session walks through.
    pub fn timeline(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(self.total_cycles as usize * 2 + 1);
        segments.push(Segment {
            phase: SessionPhase::Warmup,
            cycle: 1,
            duration_secs: self.warmup_secs,
        });
        for cycle in 1..=self.total_cycles {
            segments.push(Segment {
                phase: SessionPhase::Work,
                cycle,
                duration_secs: self.work_secs,
            });
            if cycle < self.total_cycles {
                segments.push(Segment {
                    phase: SessionPhase::Rest,
                    cycle,
                    duration_secs: self.rest_secs,
                });
            }
        }
        segments.push(Segment {
            phase: SessionPhase::Cooldown,
            cycle: self.total_cycles,
            duration_secs: self.cooldown_secs,
        });
        segments
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            warmup_secs: 60,
            work_secs: 40,
            rest_secs: 20,
            cooldown_secs: 60,
            total_cycles: 8,
        }
    }
}
