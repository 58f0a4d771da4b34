//! # Fitcue Core Library
//!
//! This library provides the core logic for the fitcue workout timers. All
//! operations are available through the standalone `fitcue` CLI, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Interval engine**: a second-granularity HIIT state machine (warmup,
//!   work/rest cycles, cooldown) that the caller ticks once per second
//! - **Workout player**: walks a day of a structured plan exercise by
//!   exercise, with optional rest countdowns
//! - **Session driver**: one task per session that owns an engine, ticks it
//!   on a drift-free schedule and publishes snapshots and events
//! - **Audio**: engines queue [`Cue`]s; the [`CueRouter`] turns them into
//!   tones, speech (remote with local fallback) and music ducking
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`IntervalEngine`]: HIIT session state machine
//! - [`WorkoutPlayer`]: plan player state machine
//! - [`spawn_session`]: drives either engine in real time
//! - [`Config`]: application configuration management

pub mod audio;
pub mod error;
pub mod events;
pub mod interval;
pub mod player;
pub mod profile;
pub mod script;
pub mod session;
pub mod storage;

pub use audio::{AudioOutput, Cue, CueRouter, RouterOptions, Speaker, Tone};
pub use error::{AudioError, ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use interval::{IntervalConfig, IntervalEngine, IntervalSnapshot, SessionPhase, SessionTimerState};
pub use player::{PlayerSessionState, PlayerSnapshot, PlayerStatus, WorkoutPlan, WorkoutPlayer};
pub use profile::Profile;
pub use script::{CueScript, PlayerScript, VariantCatalog, WorkVariant};
pub use session::{spawn_session, SessionEngine, SessionHandle};
pub use storage::Config;
