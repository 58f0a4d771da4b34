//! Two-tier speech.
//!
//! Each utterance first goes to the remote synthesizer under a hard
//! timeout. If that fails, times out or returns no audio, the local
//! speaker says it instead. The remote future is dropped on timeout, so a
//! late answer can never be played after the local fallback.
//!
//! [`Speaker::cancel_all`] bumps a generation published on a `watch`
//! channel. An utterance in flight races its synthesis and clip playback
//! against that channel and drops them as soon as its generation is stale,
//! which stops the clip and lifts the music duck.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::output::OutputLease;
use super::{LocalSpeech, SpeechSynthesizer, DEFAULT_SPEECH_TIMEOUT_MS};
use crate::error::AudioError;

/// Which tier ended up speaking an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpokenBy {
    Remote,
    Local,
    /// Cancelled before or while it was spoken.
    Cancelled,
    /// Both tiers failed; the utterance was dropped.
    Dropped,
}

pub struct Speaker {
    remote: Option<Arc<dyn SpeechSynthesizer>>,
    local: Arc<dyn LocalSpeech>,
    timeout: Duration,
    generation: watch::Sender<u64>,
    remote_warned: AtomicBool,
}

impl Speaker {
    pub fn new(local: Arc<dyn LocalSpeech>) -> Self {
        Self {
            remote: None,
            local,
            timeout: Duration::from_millis(DEFAULT_SPEECH_TIMEOUT_MS),
            generation: watch::Sender::new(0),
            remote_warned: AtomicBool::new(false),
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn SpeechSynthesizer>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Current generation; stamp utterances with it when they are queued.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Invalidate everything queued so far and stop whatever is speaking.
    pub fn cancel_all(&self) {
        self.generation.send_modify(|generation| *generation += 1);
        self.local.cancel();
    }

    pub fn unlock(&self) {
        if let Err(e) = self.local.unlock() {
            tracing::debug!(error = %e, "speech unlock refused");
        }
    }

    /// Speak `text` if `generation` is still current.
    pub async fn say(&self, output: &OutputLease, text: &str, generation: u64) -> SpokenBy {
        let cancelled = self.cancelled(generation);
        tokio::pin!(cancelled);
        if self.is_stale(generation) {
            return SpokenBy::Cancelled;
        }
        let _duck = output.duck();

        if let Some(remote) = &self.remote {
            let synthesized = tokio::select! {
                biased;
                _ = &mut cancelled => return SpokenBy::Cancelled,
                result = tokio::time::timeout(self.timeout, remote.synthesize(text)) => result,
            };
            match synthesized {
                Ok(Ok(Some(clip))) => {
                    let played = tokio::select! {
                        biased;
                        _ = &mut cancelled => {
                            tracing::debug!(text, "clip stopped by cancel");
                            return SpokenBy::Cancelled;
                        }
                        played = output.sink().play_clip(&clip) => played,
                    };
                    match played {
                        Ok(()) => return SpokenBy::Remote,
                        Err(e) => tracing::debug!(error = %e, "clip playback failed"),
                    }
                }
                Ok(Ok(None)) => tracing::debug!("remote synthesis returned no audio"),
                Ok(Err(e)) => self.warn_once(&e),
                Err(_) => self.warn_once(&AudioError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }),
            }
            if self.is_stale(generation) {
                return SpokenBy::Cancelled;
            }
        }

        match self.local.speak(text).await {
            Ok(()) => SpokenBy::Local,
            Err(e) => {
                tracing::debug!(error = %e, text, "local speech failed");
                SpokenBy::Dropped
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation()
    }

    /// Resolves once `generation` has been cancelled.
    async fn cancelled(&self, generation: u64) {
        let mut rx = self.generation.subscribe();
        // The sender lives as long as `self`, so this cannot close early.
        if rx.wait_for(|current| *current != generation).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    fn warn_once(&self, error: &AudioError) {
        if !self.remote_warned.swap(true, Ordering::SeqCst) {
            tracing::warn!(error = %error, "remote speech unavailable, using local speech");
        } else {
            tracing::debug!(error = %error, "remote speech failed");
        }
    }
}

impl std::fmt::Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker")
            .field("has_remote", &self.has_remote())
            .field("timeout", &self.timeout)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
