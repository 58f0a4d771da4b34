use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::SessionPhase;

/// Every state change in an engine produces an Event.
/// The driver broadcasts them; front-ends print or log them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        total_cycles: u32,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        phase: SessionPhase,
        time_left_secs: u32,
        cycle: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        phase: SessionPhase,
        time_left_secs: u32,
        cycle: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
        cycle: u32,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    SessionFinished {
        cycles: u32,
        calories: f64,
        at: DateTime<Utc>,
    },
    WorkoutStarted {
        day_index: usize,
        exercise: String,
        exercise_count: usize,
        at: DateTime<Utc>,
    },
    WorkoutPaused {
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    WorkoutResumed {
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    ExerciseAdvanced {
        exercise_index: usize,
        exercise: String,
        at: DateTime<Utc>,
    },
    RestStarted {
        exercise_index: usize,
        rest_secs: u32,
        at: DateTime<Utc>,
    },
    WorkoutEnded {
        /// The last exercise was reached rather than the workout being cut short.
        completed: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event ends the session it belongs to.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::SessionFinished { .. } | Event::WorkoutEnded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::PhaseChanged {
            from: SessionPhase::Warmup,
            to: SessionPhase::Work,
            cycle: 1,
            duration_secs: 30,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["to"], "work");
    }

    #[test]
    fn terminal_events() {
        assert!(Event::WorkoutEnded {
            completed: true,
            at: Utc::now()
        }
        .is_terminal());
        assert!(!Event::SessionReset { at: Utc::now() }.is_terminal());
    }
}
