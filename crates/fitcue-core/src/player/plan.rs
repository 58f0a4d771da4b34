//! Workout plan data as handed over by the plan collaborator.
//!
//! Plans are read-only for the player; it holds them behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, ValidationError};

/// Rest used when a rest label has no leading number.
pub const DEFAULT_REST_SECS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: String,
    pub reps: String,
    /// Free-form, e.g. "90s", "60 seconds", "2 min".
    #[serde(default)]
    pub rest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub day: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    #[serde(default)]
    pub title: String,
    pub days: Vec<WorkoutDay>,
}

/// An exercise with its rest label already resolved to seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseStep {
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub rest_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&Exercise> for ExerciseStep {
    fn from(exercise: &Exercise) -> Self {
        Self {
            name: exercise.name.clone(),
            sets: exercise.sets.clone(),
            reps: exercise.reps.clone(),
            rest_secs: parse_rest_seconds(&exercise.rest),
            notes: exercise.notes.clone(),
        }
    }
}

impl WorkoutPlan {
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn day(&self, day_index: usize) -> Option<&WorkoutDay> {
        self.days.get(day_index)
    }

    /// Like [`WorkoutPlan::day`] but explains what was wrong.
    pub fn require_day(&self, day_index: usize) -> Result<&WorkoutDay, ValidationError> {
        self.days
            .get(day_index)
            .ok_or_else(|| ValidationError::OutOfBounds {
                collection: "workout days".into(),
                index: day_index,
                len: self.days.len(),
            })
    }

    pub fn exercise(&self, day_index: usize, exercise_index: usize) -> Option<&Exercise> {
        self.day(day_index)?.exercises.get(exercise_index)
    }
}

impl WorkoutDay {
    pub fn steps(&self) -> Vec<ExerciseStep> {
        self.exercises.iter().map(ExerciseStep::from).collect()
    }
}

/// Seconds from a free-form rest label: its leading unsigned integer,
/// else 60. A sign is not a digit, so `"-30s"` and `"+30s"` get 60.
pub fn parse_rest_seconds(label: &str) -> u32 {
    let digits: String = label
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(DEFAULT_REST_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_label_parsing() {
        assert_eq!(parse_rest_seconds("90s"), 90);
        assert_eq!(parse_rest_seconds(" 45 seconds"), 45);
        assert_eq!(parse_rest_seconds("2 min"), 2);
        assert_eq!(parse_rest_seconds("0"), 0);
        assert_eq!(parse_rest_seconds("N/A"), 60);
        assert_eq!(parse_rest_seconds(""), 60);
        assert_eq!(parse_rest_seconds("99999999999999"), 60);
    }

    #[test]
    fn signed_rest_label_uses_default() {
        assert_eq!(parse_rest_seconds("-30s"), 60);
        assert_eq!(parse_rest_seconds(" -5"), 60);
        assert_eq!(parse_rest_seconds("+30s"), 60);
    }

    #[test]
    fn plan_from_json() {
        let plan = WorkoutPlan::from_json_str(
            r#"{
                "title": "Push Pull",
                "days": [{
                    "day": "Monday",
                    "exercises": [
                        {"name": "Bench", "sets": "3", "reps": "8", "rest": "90s"},
                        {"name": "Row", "sets": "3", "reps": "10", "rest": "N/A", "notes": "slow"}
                    ]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(plan.days[0].exercises.len(), 2);
        let steps = plan.days[0].steps();
        assert_eq!(steps[0].rest_secs, 90);
        assert_eq!(steps[1].rest_secs, 60);
        assert_eq!(steps[1].notes.as_deref(), Some("slow"));
    }

    #[test]
    fn missing_day_is_out_of_bounds() {
        let plan = WorkoutPlan {
            title: String::new(),
            days: Vec::new(),
        };
        assert!(plan.day(0).is_none());
        assert!(plan.exercise(0, 0).is_none());
        assert_eq!(
            plan.require_day(2),
            Err(ValidationError::OutOfBounds {
                collection: "workout days".into(),
                index: 2,
                len: 0,
            })
        );
    }
}
