//! Workout player: walks one day of a plan exercise by exercise.
//!
//! ```text
//! Idle -> Playing <-> Paused
//!            |  ^
//!   start_rest  | next_exercise (manual, or rest countdown hitting 0)
//!            v  |
//!          Resting
//! ```
//!
//! Moving past the last exercise ends the workout and returns to `Idle`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::plan::{Exercise, ExerciseStep, WorkoutPlan};
use crate::audio::phrases::format_duration;
use crate::audio::{Cue, CueQueue};
use crate::events::Event;
use crate::script::{fill, PlayerScript};
use crate::session::SessionEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Idle,
    Playing,
    Paused,
    Resting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSessionState {
    pub day_index: usize,
    pub exercise_index: usize,
    pub status: PlayerStatus,
    pub rest_time_left_secs: u32,
    pub is_expanded: bool,
}

impl Default for PlayerSessionState {
    fn default() -> Self {
        Self {
            day_index: 0,
            exercise_index: 0,
            status: PlayerStatus::Idle,
            rest_time_left_secs: 0,
            is_expanded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(flatten)]
    pub state: PlayerSessionState,
    pub current: Option<ExerciseStep>,
    pub exercise_count: usize,
}

#[derive(Debug, Default)]
pub struct WorkoutPlayer {
    plan: Option<Arc<WorkoutPlan>>,
    script: PlayerScript,
    state: PlayerSessionState,
    cues: CueQueue,
}

impl WorkoutPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, script: PlayerScript) -> Self {
        self.script = script;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &PlayerSessionState {
        &self.state
    }

    pub fn status(&self) -> PlayerStatus {
        self.state.status
    }

    pub fn exercise_index(&self) -> usize {
        self.state.exercise_index
    }

    pub fn rest_time_left_secs(&self) -> u32 {
        self.state.rest_time_left_secs
    }

    pub fn is_active(&self) -> bool {
        self.state.status != PlayerStatus::Idle
    }

    pub fn is_ticking(&self) -> bool {
        self.state.status == PlayerStatus::Resting
    }

    /// Number of exercises in the active day (0 when idle).
    pub fn exercise_count(&self) -> usize {
        self.exercises().map_or(0, <[Exercise]>::len)
    }

    pub fn current_step(&self) -> Option<ExerciseStep> {
        self.current_exercise().map(ExerciseStep::from)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            current: self.current_step(),
            exercise_count: self.exercise_count(),
        }
    }

    pub fn take_cues(&mut self) -> Vec<Cue> {
        self.cues.drain()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_workout(&mut self, plan: Arc<WorkoutPlan>, day_index: usize) -> Option<Event> {
        let exercises = &plan.day(day_index)?.exercises;
        let first = exercises.first()?;

        let line = self.exercise_line(&self.script.first_exercise, first);
        let event = Event::WorkoutStarted {
            day_index,
            exercise: first.name.clone(),
            exercise_count: exercises.len(),
            at: Utc::now(),
        };
        tracing::info!(day_index, exercises = exercises.len(), "workout started");

        self.state = PlayerSessionState {
            day_index,
            exercise_index: 0,
            status: PlayerStatus::Playing,
            rest_time_left_secs: 0,
            is_expanded: true,
        };
        self.plan = Some(plan);
        self.cues.speak(line);
        Some(event)
    }

    pub fn pause_workout(&mut self) -> Option<Event> {
        if self.state.status != PlayerStatus::Playing {
            return None;
        }
        self.state.status = PlayerStatus::Paused;
        Some(Event::WorkoutPaused {
            exercise_index: self.state.exercise_index,
            at: Utc::now(),
        })
    }

    pub fn resume_workout(&mut self) -> Option<Event> {
        if self.state.status != PlayerStatus::Paused {
            return None;
        }
        self.state.status = PlayerStatus::Playing;
        Some(Event::WorkoutResumed {
            exercise_index: self.state.exercise_index,
            at: Utc::now(),
        })
    }

    /// Skip ahead; ends the workout when called on the last exercise.
    pub fn next_exercise(&mut self) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let count = self.exercise_count();
        if self.state.exercise_index + 1 >= count {
            return self.finish(true);
        }

        self.state.exercise_index += 1;
        self.state.status = PlayerStatus::Playing;
        self.state.rest_time_left_secs = 0;

        let exercise = self.current_exercise()?.clone();
        let line = self.exercise_line(&self.script.next_exercise, &exercise);
        self.cues.speak(line);
        tracing::info!(index = self.state.exercise_index, name = %exercise.name, "exercise advanced");
        Some(Event::ExerciseAdvanced {
            exercise_index: self.state.exercise_index,
            exercise: exercise.name,
            at: Utc::now(),
        })
    }

    /// Begin the current exercise's rest countdown.
    pub fn start_rest(&mut self) -> Option<Event> {
        if !matches!(self.state.status, PlayerStatus::Playing | PlayerStatus::Paused) {
            return None;
        }
        let rest_secs = self.current_step()?.rest_secs;
        if rest_secs == 0 {
            return self.next_exercise();
        }

        self.state.status = PlayerStatus::Resting;
        self.state.rest_time_left_secs = rest_secs;
        let line = fill(&self.script.rest, &[("duration", format_duration(rest_secs).as_str())]);
        self.cues.speak(line);
        tracing::debug!(rest_secs, "rest started");
        Some(Event::RestStarted {
            exercise_index: self.state.exercise_index,
            rest_secs,
            at: Utc::now(),
        })
    }

    /// Stop early (or finish) and return to idle.
    pub fn end_workout(&mut self) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let completed = self.state.exercise_index + 1 >= self.exercise_count();
        self.finish(completed)
    }

    pub fn toggle_expand(&mut self) -> bool {
        self.state.is_expanded = !self.state.is_expanded;
        self.state.is_expanded
    }

    /// One second of rest countdown. Ignored unless resting.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.status != PlayerStatus::Resting {
            return None;
        }
        self.state.rest_time_left_secs = self.state.rest_time_left_secs.saturating_sub(1);
        match self.state.rest_time_left_secs {
            0 => self.next_exercise(),
            left @ 1..=3 => {
                self.cues.speak(left.to_string());
                None
            }
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, completed: bool) -> Option<Event> {
        self.cues.speak(self.script.complete.clone());
        self.state = PlayerSessionState::default();
        self.plan = None;
        tracing::info!(completed, "workout ended");
        Some(Event::WorkoutEnded {
            completed,
            at: Utc::now(),
        })
    }

    fn exercises(&self) -> Option<&[Exercise]> {
        if !self.is_active() {
            return None;
        }
        let plan = self.plan.as_ref()?;
        Some(&plan.day(self.state.day_index)?.exercises)
    }

    fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises()?.get(self.state.exercise_index)
    }

    fn exercise_line(&self, template: &str, exercise: &Exercise) -> String {
        fill(
            template,
            &[
                ("name", exercise.name.as_str()),
                ("sets", exercise.sets.as_str()),
                ("reps", exercise.reps.as_str()),
            ],
        )
    }
}

impl SessionEngine for WorkoutPlayer {
    type Snapshot = PlayerSnapshot;

    fn tick(&mut self) -> Option<Event> {
        WorkoutPlayer::tick(self)
    }

    fn is_ticking(&self) -> bool {
        WorkoutPlayer::is_ticking(self)
    }

    fn take_cues(&mut self) -> Vec<Cue> {
        WorkoutPlayer::take_cues(self)
    }

    fn snapshot(&self) -> PlayerSnapshot {
        WorkoutPlayer::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::plan::WorkoutDay;

    fn exercise(name: &str, rest: &str) -> Exercise {
        Exercise {
            name: name.into(),
            sets: "3".into(),
            reps: "10".into(),
            rest: rest.into(),
            notes: None,
        }
    }

    fn plan(rests: &[&str]) -> Arc<WorkoutPlan> {
        Arc::new(WorkoutPlan {
            title: "Test".into(),
            days: vec![WorkoutDay {
                day: "Day 1".into(),
                focus: "Full body".into(),
                exercises: rests
                    .iter()
                    .enumerate()
                    .map(|(i, rest)| exercise(&format!("Move {i}"), rest))
                    .collect(),
            }],
        })
    }

    #[test]
    fn start_announces_first_exercise() {
        let mut player = WorkoutPlayer::new();
        let event = player.start_workout(plan(&["60s", "60s"]), 0);
        assert!(matches!(event, Some(Event::WorkoutStarted { exercise_count: 2, .. })));
        assert_eq!(player.status(), PlayerStatus::Playing);
        assert!(player.state().is_expanded);
        let cues = player.take_cues();
        assert_eq!(
            cues[0].spoken_text(),
            Some("Starting workout. First exercise: Move 0, 3 sets of 10.")
        );
    }

    #[test]
    fn missing_day_is_noop() {
        let mut player = WorkoutPlayer::new();
        assert!(player.start_workout(plan(&["60s"]), 3).is_none());
        assert!(player.start_workout(plan(&[]), 0).is_none());
        assert_eq!(player.status(), PlayerStatus::Idle);
        assert!(player.next_exercise().is_none());
        assert!(player.start_rest().is_none());
        assert!(player.end_workout().is_none());
        assert!(player.take_cues().is_empty());
    }

    #[test]
    fn pause_and_resume_only_from_valid_states() {
        let mut player = WorkoutPlayer::new();
        assert!(player.pause_workout().is_none());
        player.start_workout(plan(&["60s"]), 0);
        assert!(player.resume_workout().is_none());
        assert!(player.pause_workout().is_some());
        assert!(player.pause_workout().is_none());
        assert_eq!(player.status(), PlayerStatus::Paused);
        assert!(player.resume_workout().is_some());
        assert_eq!(player.status(), PlayerStatus::Playing);
    }

    #[test]
    fn rest_counts_down_then_advances_once() {
        let mut player = WorkoutPlayer::new();
        player.start_workout(plan(&["5s", "5s", "5s"]), 0);
        player.take_cues();

        assert!(matches!(player.start_rest(), Some(Event::RestStarted { rest_secs: 5, .. })));
        assert_eq!(player.status(), PlayerStatus::Resting);
        assert!(player.start_rest().is_none());
        assert_eq!(player.take_cues()[0].spoken_text(), Some("Rest for 5 seconds."));

        player.tick(); // 4
        assert!(player.take_cues().is_empty());
        player.tick(); // 3
        player.tick(); // 2
        player.tick(); // 1
        let counts: Vec<_> = player
            .take_cues()
            .iter()
            .filter_map(|c| c.spoken_text().map(str::to_string))
            .collect();
        assert_eq!(counts, vec!["3", "2", "1"]);

        let event = player.tick();
        assert!(matches!(event, Some(Event::ExerciseAdvanced { exercise_index: 1, .. })));
        assert_eq!(player.status(), PlayerStatus::Playing);
        assert_eq!(player.exercise_index(), 1);
        assert!(player.tick().is_none());
        assert_eq!(player.exercise_index(), 1);
    }

    #[test]
    fn zero_rest_advances_immediately() {
        let mut player = WorkoutPlayer::new();
        player.start_workout(plan(&["0", "30s"]), 0);
        assert!(matches!(player.start_rest(), Some(Event::ExerciseAdvanced { .. })));
        assert_eq!(player.exercise_index(), 1);
    }

    #[test]
    fn rest_on_last_exercise_ends_workout() {
        let mut player = WorkoutPlayer::new();
        player.start_workout(plan(&["1s"]), 0);
        player.start_rest();
        let event = player.tick();
        assert!(matches!(event, Some(Event::WorkoutEnded { completed: true, .. })));
        assert_eq!(player.status(), PlayerStatus::Idle);
    }

    #[test]
    fn early_end_is_not_completed() {
        let mut player = WorkoutPlayer::new();
        player.start_workout(plan(&["60s", "60s"]), 0);
        player.take_cues();
        assert!(matches!(
            player.end_workout(),
            Some(Event::WorkoutEnded { completed: false, .. })
        ));
        assert_eq!(*player.state(), PlayerSessionState::default());
        assert_eq!(
            player.take_cues()[0].spoken_text(),
            Some("Workout complete. Well done!")
        );
        assert!(player.current_step().is_none());
    }

    #[test]
    fn toggle_expand_has_no_timing_effect() {
        let mut player = WorkoutPlayer::new();
        player.start_workout(plan(&["10s"]), 0);
        player.start_rest();
        assert!(!player.toggle_expand());
        assert_eq!(player.rest_time_left_secs(), 10);
        assert_eq!(player.status(), PlayerStatus::Resting);
        assert!(player.toggle_expand());
    }
}
