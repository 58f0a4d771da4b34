//! Interval session engine.
//!
//! A tick-driven state machine. It does not own a clock - the caller
//! (normally [`crate::session`]) calls `tick()` once per elapsed second
//! while [`IntervalEngine::is_ticking`] is true.
//!
//! ## Phase sequence
//!
//! ```text
//! Idle -> Warmup -> Work -> (Rest -> Work)* -> Cooldown -> Finished
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = IntervalEngine::new(config)?;
//! engine.start();
//! // once per second:
//! engine.tick(); // Some(Event) on phase changes
//! let cues = engine.take_cues();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::calories::kcal_per_second;
use super::config::IntervalConfig;
use super::phase::SessionPhase;
use crate::audio::{AmbientCommand, Cue, CueQueue, Tone};
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::profile::Profile;
use crate::script::{CueScript, VariantCatalog, WorkVariant};
use crate::session::SessionEngine;

/// Seconds-left value at which the next phase is announced.
pub const LOOK_AHEAD_SECS: u32 = 6;

/// The authoritative timer state. Front-ends only ever read copies of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionTimerState {
    pub phase: SessionPhase,
    pub time_left_secs: u32,
    pub current_cycle: u32,
    pub total_cycles: u32,
    pub calories: f64,
    pub is_running: bool,
    pub is_paused: bool,
}

impl SessionTimerState {
    fn idle(config: &IntervalConfig) -> Self {
        Self {
            phase: SessionPhase::Idle,
            time_left_secs: config.warmup_secs,
            current_cycle: 1,
            total_cycles: config.total_cycles,
            calories: 0.0,
            is_running: false,
            is_paused: false,
        }
    }
}

/// What a rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSnapshot {
    #[serde(flatten)]
    pub state: SessionTimerState,
    pub phase_label: String,
    pub phase_duration_secs: u32,
    pub avatar_action: String,
    pub target_area: Option<String>,
    pub progress_pct: f64,
}

#[derive(Debug)]
pub struct IntervalEngine {
    config: IntervalConfig,
    catalog: VariantCatalog,
    script: CueScript,
    profile: Profile,
    state: SessionTimerState,
    /// Seconds ticked since `start()`, pauses excluded.
    elapsed_secs: u64,
    cues: CueQueue,
}

impl IntervalEngine {
    /// Create an idle engine with the default move catalog and script.
    pub fn new(config: IntervalConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            state: SessionTimerState::idle(&config),
            config,
            catalog: VariantCatalog::default(),
            script: CueScript::default(),
            profile: Profile::default(),
            elapsed_secs: 0,
            cues: CueQueue::default(),
        })
    }

    pub fn with_catalog(mut self, catalog: VariantCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_script(mut self, script: CueScript) -> Self {
        self.script = script;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionTimerState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn time_left_secs(&self) -> u32 {
        self.state.time_left_secs
    }

    pub fn current_cycle(&self) -> u32 {
        self.state.current_cycle
    }

    pub fn calories(&self) -> f64 {
        self.state.calories
    }

    pub fn config(&self) -> &IntervalConfig {
        &self.config
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// True while the countdown should advance.
    pub fn is_ticking(&self) -> bool {
        self.state.is_running && !self.state.is_paused && self.state.phase.has_countdown()
    }

    /// Move for the current work phase; `None` outside of work.
    pub fn current_variant(&self) -> Option<&WorkVariant> {
        (self.state.phase == SessionPhase::Work)
            .then(|| self.catalog.for_cycle(self.state.current_cycle))
    }

    /// Animation key for the body avatar.
    pub fn avatar_action(&self) -> &str {
        match self.state.phase {
            SessionPhase::Work => &self.catalog.for_cycle(self.state.current_cycle).action,
            SessionPhase::Warmup => "warmup",
            SessionPhase::Rest => "rest",
            SessionPhase::Cooldown => "stretch",
            SessionPhase::Idle | SessionPhase::Finished => "idle",
        }
    }

    pub fn phase_label(&self) -> &str {
        self.label_for(self.state.phase, self.state.current_cycle)
    }

    pub fn phase_duration_secs(&self) -> u32 {
        self.config.duration_of(self.state.phase)
    }

    /// 0.0 .. 100.0 progress across the whole session.
    pub fn progress_pct(&self) -> f64 {
        match self.state.phase {
            SessionPhase::Idle => 0.0,
            SessionPhase::Finished => 100.0,
            _ => {
                let total = self.config.total_duration_secs() as f64;
                (self.elapsed_secs as f64 / total * 100.0).min(100.0)
            }
        }
    }

    pub fn snapshot(&self) -> IntervalSnapshot {
        IntervalSnapshot {
            state: self.state,
            phase_label: self.phase_label().to_string(),
            phase_duration_secs: self.phase_duration_secs(),
            avatar_action: self.avatar_action().to_string(),
            target_area: self.current_variant().map(|v| v.target_area.clone()),
            progress_pct: self.progress_pct(),
        }
    }

    /// Cues queued since the last call, in emission order.
    pub fn take_cues(&mut self) -> Vec<Cue> {
        self.cues.drain()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running && !self.state.is_paused {
            return None;
        }

        self.cues.ambient(AmbientCommand::Play);
        self.cues.push(Cue::UnlockSpeech);

        match self.state.phase {
            SessionPhase::Idle | SessionPhase::Finished => {
                self.state = SessionTimerState {
                    phase: SessionPhase::Warmup,
                    time_left_secs: self.config.warmup_secs,
                    is_running: true,
                    ..SessionTimerState::idle(&self.config)
                };
                self.elapsed_secs = 0;
                self.announce_entry(SessionPhase::Warmup);
                tracing::info!(
                    cycles = self.config.total_cycles,
                    total_secs = self.config.total_duration_secs(),
                    "interval session started"
                );
                Some(Event::SessionStarted {
                    total_cycles: self.config.total_cycles,
                    total_secs: self.config.total_duration_secs(),
                    at: Utc::now(),
                })
            }
            _ => {
                self.state.is_running = true;
                self.state.is_paused = false;
                let line = format!("{} {}", self.script.resumed, self.phase_label());
                self.cues.speak(line);
                tracing::info!(phase = %self.state.phase, time_left = self.state.time_left_secs, "interval session resumed");
                Some(Event::SessionResumed {
                    phase: self.state.phase,
                    time_left_secs: self.state.time_left_secs,
                    cycle: self.state.current_cycle,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        self.state.is_paused = true;
        self.cues.speak(self.script.paused.clone());
        self.cues.ambient(AmbientCommand::Pause);
        tracing::info!(phase = %self.state.phase, time_left = self.state.time_left_secs, "interval session paused");
        Some(Event::SessionPaused {
            phase: self.state.phase,
            time_left_secs: self.state.time_left_secs,
            cycle: self.state.current_cycle,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = SessionTimerState::idle(&self.config);
        self.elapsed_secs = 0;
        self.cues.push(Cue::CancelSpeech);
        self.cues.ambient(AmbientCommand::Stop);
        tracing::info!("interval session reset");
        Some(Event::SessionReset { at: Utc::now() })
    }

    /// Replace the configuration. Only allowed while idle or finished.
    pub fn reconfigure(&mut self, config: IntervalConfig) -> Result<(), CoreError> {
        if self.state.phase.has_countdown() {
            return Err(CoreError::SessionActive {
                what: "the interval configuration",
            });
        }
        config.validate()?;
        self.config = config;
        self.state.total_cycles = config.total_cycles;
        if self.state.phase == SessionPhase::Idle {
            self.state.time_left_secs = config.warmup_secs;
        }
        Ok(())
    }

    /// Advance by one second.
    ///
    /// Order within a second is fixed: calories, look-ahead line,
    /// countdown beep, then decrement or transition.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_ticking() {
            return None;
        }

        self.elapsed_secs += 1;
        self.state.calories += kcal_per_second(self.state.phase, self.profile.weight_kg());

        let time_left = self.state.time_left_secs;
        if time_left == LOOK_AHEAD_SECS {
            if let Some(label) = self.upcoming_label() {
                let line = self.script.look_ahead_line(&label);
                self.cues.speak(line);
            }
        }

        if let Some(tone) = Tone::for_countdown(time_left) {
            self.cues.tone(tone);
        }

        if time_left > 1 {
            self.state.time_left_secs -= 1;
            return None;
        }

        self.advance_phase()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance_phase(&mut self) -> Option<Event> {
        let from = self.state.phase;
        let (to, cycle) = from.next(self.state.current_cycle, self.state.total_cycles)?;

        self.state.phase = to;
        self.state.current_cycle = cycle;
        self.state.time_left_secs = self.config.duration_of(to);
        self.announce_entry(to);

        if to == SessionPhase::Finished {
            self.state.is_running = false;
            self.state.is_paused = false;
            self.cues.ambient(AmbientCommand::Stop);
            tracing::info!(
                cycles = cycle,
                calories = self.state.calories,
                "interval session finished"
            );
            return Some(Event::SessionFinished {
                cycles: cycle,
                calories: self.state.calories,
                at: Utc::now(),
            });
        }

        tracing::info!(%from, %to, cycle, "phase changed");
        Some(Event::PhaseChanged {
            from,
            to,
            cycle,
            duration_secs: self.state.time_left_secs,
            at: Utc::now(),
        })
    }

    fn announce_entry(&mut self, phase: SessionPhase) {
        let line = match phase {
            SessionPhase::Warmup => self.script.warmup.announcement.clone(),
            SessionPhase::Work => self
                .catalog
                .for_cycle(self.state.current_cycle)
                .announcement
                .clone(),
            SessionPhase::Rest => self.script.rest.announcement.clone(),
            SessionPhase::Cooldown => self.script.cooldown.announcement.clone(),
            SessionPhase::Finished => self.script.finished.announcement.clone(),
            SessionPhase::Idle => return,
        };
        self.cues.speak(line);
    }

    fn upcoming_label(&self) -> Option<String> {
        let (next, cycle) = self
            .state
            .phase
            .next(self.state.current_cycle, self.state.total_cycles)?;
        Some(self.label_for(next, cycle).to_string())
    }

    fn label_for(&self, phase: SessionPhase, cycle: u32) -> &str {
        match phase {
            SessionPhase::Work => &self.catalog.for_cycle(cycle).label,
            SessionPhase::Warmup | SessionPhase::Idle => &self.script.warmup.label,
            SessionPhase::Rest => &self.script.rest.label,
            SessionPhase::Cooldown => &self.script.cooldown.label,
            SessionPhase::Finished => &self.script.finished.label,
        }
    }
}

impl SessionEngine for IntervalEngine {
    type Snapshot = IntervalSnapshot;

    fn tick(&mut self) -> Option<Event> {
        IntervalEngine::tick(self)
    }

    fn is_ticking(&self) -> bool {
        IntervalEngine::is_ticking(self)
    }

    fn take_cues(&mut self) -> Vec<Cue> {
        IntervalEngine::take_cues(self)
    }

    fn snapshot(&self) -> IntervalSnapshot {
        IntervalEngine::snapshot(self)
    }
}
