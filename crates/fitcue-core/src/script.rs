//! Spoken text and move catalogs.
//!
//! Everything the engines say comes from here, so a locale or a different
//! set of moves is a config change rather than a code change. Templates use
//! `{name}`-style placeholders filled by [`fill`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One move in the work-phase rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkVariant {
    /// Animation key for the body avatar.
    pub action: String,
    pub label: String,
    /// Spoken when a work phase with this move begins.
    pub announcement: String,
    pub target_area: String,
}

impl WorkVariant {
    fn new(action: &str, label: &str, announcement: &str, target_area: &str) -> Self {
        Self {
            action: action.into(),
            label: label.into(),
            announcement: announcement.into(),
            target_area: target_area.into(),
        }
    }
}

/// Ordered, non-empty list of work moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariantCatalog {
    variants: Vec<WorkVariant>,
}

impl VariantCatalog {
    pub fn new(variants: Vec<WorkVariant>) -> Result<Self, ValidationError> {
        if variants.is_empty() {
            return Err(ValidationError::EmptyCollection("work variants".into()));
        }
        Ok(Self { variants })
    }

    /// Round-robin pick: `(cycle - 1) mod len`.
    ///
    /// Cycle 0 is treated as cycle 1.
    pub fn for_cycle(&self, cycle: u32) -> &WorkVariant {
        let index = (cycle.saturating_sub(1) as usize) % self.variants.len();
        &self.variants[index]
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkVariant> {
        self.variants.iter()
    }
}

impl<'de> Deserialize<'de> for VariantCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let variants = Vec::<WorkVariant>::deserialize(deserializer)?;
        VariantCatalog::new(variants).map_err(serde::de::Error::custom)
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self {
            variants: vec![
                WorkVariant::new("jumping_jacks", "Jumping Jacks", "Jumping jacks. Go!", "full body"),
                WorkVariant::new("high_knees", "High Knees", "High knees. Drive them up!", "legs"),
                WorkVariant::new("squats", "Squats", "Squats. Sit back and drive!", "legs"),
                WorkVariant::new(
                    "mountain_climbers",
                    "Mountain Climbers",
                    "Mountain climbers. Keep your hips low!",
                    "core",
                ),
                WorkVariant::new("burpees", "Burpees", "Burpees. All the way down!", "full body"),
                WorkVariant::new("push_ups", "Push-ups", "Push-ups. Chest to the floor!", "upper body"),
            ],
        }
    }
}

/// Label and entry line for a non-work phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLine {
    pub label: String,
    pub announcement: String,
}

impl PhaseLine {
    fn new(label: &str, announcement: &str) -> Self {
        Self {
            label: label.into(),
            announcement: announcement.into(),
        }
    }
}

/// Lines spoken by the interval engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueScript {
    pub warmup: PhaseLine,
    pub rest: PhaseLine,
    pub cooldown: PhaseLine,
    pub finished: PhaseLine,
    pub paused: String,
    /// Followed by the label of the phase being resumed.
    pub resumed: String,
    /// `{next}` is replaced with the upcoming phase or move label.
    pub look_ahead: String,
}

impl CueScript {
    pub fn look_ahead_line(&self, next_label: &str) -> String {
        fill(&self.look_ahead, &[("next", next_label)])
    }
}

impl Default for CueScript {
    fn default() -> Self {
        Self {
            warmup: PhaseLine::new("Warm Up", "Warm up. Get loose and get ready."),
            rest: PhaseLine::new("Rest", "Rest. Breathe."),
            cooldown: PhaseLine::new("Cool Down", "Cool down. Slow it down and stretch."),
            finished: PhaseLine::new("Done", "Workout complete. Great job!"),
            paused: "Paused.".into(),
            resumed: "Resuming.".into(),
            look_ahead: "Next up: {next}.".into(),
        }
    }
}

/// Lines spoken by the workout player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerScript {
    /// `{name}`, `{sets}`, `{reps}`
    pub first_exercise: String,
    /// `{name}`, `{sets}`, `{reps}`
    pub next_exercise: String,
    /// `{duration}`
    pub rest: String,
    pub complete: String,
}

impl Default for PlayerScript {
    fn default() -> Self {
        Self {
            first_exercise: "Starting workout. First exercise: {name}, {sets} sets of {reps}."
                .into(),
            next_exercise: "Next exercise: {name}, {sets} sets of {reps}.".into(),
            rest: "Rest for {duration}.".into(),
            complete: "Workout complete. Well done!".into(),
        }
    }
}

/// Replace every `{key}` in `template` with its value.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}
