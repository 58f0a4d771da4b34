//! Audio cues and speech.
//!
//! Engines queue [`Cue`]s; a [`CueRouter`] sends them to the collaborators
//! defined here. All of these are best-effort: a failing device or speech
//! service never reaches the timer.
//!
//! - [`ToneSink`]: countdown beeps, fire-and-forget
//! - [`AudioSink`]: synthesized clips and ambient music
//! - [`LocalSpeech`]: on-device speech, the fallback tier
//! - [`SpeechSynthesizer`]: remote speech, the first tier

pub mod cue;
pub mod memory;
pub mod output;
pub mod phrases;
pub mod remote;
pub mod router;
pub mod speech;
pub mod tones;

use futures::future::BoxFuture;

use crate::error::AudioError;

pub use cue::{AmbientCommand, Cue, CueQueue};
pub use memory::{AudioRecord, MemoryAudio};
pub use output::{AudioOutput, DuckGuard, OutputLease};
pub use remote::HttpSpeechSynthesizer;
pub use router::{CueRouter, RouterOptions};
pub use speech::{SpokenBy, Speaker};
pub use tones::Tone;

/// Hard limit on a remote synthesis call before falling back to local speech.
pub const DEFAULT_SPEECH_TIMEOUT_MS: u64 = 2_000;

/// Plays beeps. Must return immediately.
pub trait ToneSink: Send + Sync {
    fn play_tone(&self, tone: Tone);
}

/// The shared output device: synthesized speech clips and ambient music.
pub trait AudioSink: Send + Sync {
    /// Play an encoded clip; resolves when playback ends.
    fn play_clip<'a>(&'a self, clip: &'a [u8]) -> BoxFuture<'a, Result<(), AudioError>>;

    /// Ambient music volume (0.0 - 1.0).
    fn set_music_volume(&self, volume: f32);

    fn ambient(&self, command: AmbientCommand) -> Result<(), AudioError>;
}

/// On-device speech.
pub trait LocalSpeech: Send + Sync {
    /// Speak `text`; resolves when the utterance ends.
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), AudioError>>;

    /// Stop the current utterance.
    fn cancel(&self);

    /// Some platforms only allow speech after a user gesture has primed it.
    fn unlock(&self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Remote text-to-speech.
///
/// `Ok(None)` means the service answered but had no audio for us.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, AudioError>>;
}
