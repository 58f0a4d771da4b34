mod calories;
mod config;
mod engine;
mod phase;

pub use calories::{estimate_session_kcal, kcal_per_second};
pub use config::{IntervalConfig, Segment};
pub use engine::{IntervalEngine, IntervalSnapshot, SessionTimerState, LOOK_AHEAD_SECS};
pub use phase::SessionPhase;
