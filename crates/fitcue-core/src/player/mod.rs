mod engine;
mod plan;

pub use engine::{PlayerSessionState, PlayerSnapshot, PlayerStatus, WorkoutPlayer};
pub use plan::{
    parse_rest_seconds, Exercise, ExerciseStep, WorkoutDay, WorkoutPlan, DEFAULT_REST_SECS,
};
