//! Routes engine cues to the audio collaborators.
//!
//! `dispatch` never waits: tones go straight to the [`ToneSink`], speech is
//! handed to a worker task that speaks utterances one at a time in the
//! order they were queued. Closing the router lets that queue drain for
//! a bounded time; cancelling is the way to discard it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::output::OutputLease;
use super::speech::Speaker;
use super::{Cue, ToneSink};

/// How long [`CueRouter::close`] waits for queued speech to finish.
pub const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Master switch for everything audible.
    pub enabled: bool,
    pub beeps: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            beeps: true,
        }
    }
}

#[derive(Debug)]
struct Utterance {
    text: String,
    generation: u64,
}

pub struct CueRouter {
    lease: Arc<OutputLease>,
    tones: Arc<dyn ToneSink>,
    speaker: Arc<Speaker>,
    /// `None` once closing.
    speech_tx: Option<mpsc::UnboundedSender<Utterance>>,
    worker: JoinHandle<()>,
    options: RouterOptions,
    muted: AtomicBool,
}

impl CueRouter {
    /// Start the speech worker. Must be called inside a tokio runtime.
    pub fn spawn(
        lease: OutputLease,
        tones: Arc<dyn ToneSink>,
        speaker: Speaker,
        options: RouterOptions,
    ) -> Self {
        let lease = Arc::new(lease);
        let speaker = Arc::new(speaker);
        let (speech_tx, speech_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(speech_worker(
            Arc::clone(&speaker),
            Arc::clone(&lease),
            speech_rx,
        ));
        Self {
            lease,
            tones,
            speaker,
            speech_tx: Some(speech_tx),
            worker,
            options,
            muted: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> uuid::Uuid {
        self.lease.session()
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn dispatch_all(&self, cues: impl IntoIterator<Item = Cue>) {
        for cue in cues {
            self.dispatch(cue);
        }
    }

    pub fn dispatch(&self, cue: Cue) {
        // Cancelling is honoured even when muted so nothing stale plays on unmute.
        if let Cue::CancelSpeech = cue {
            self.speaker.cancel_all();
            return;
        }
        if !self.options.enabled || self.is_muted() {
            return;
        }
        match cue {
            Cue::Speak { text } => {
                let utterance = Utterance {
                    text,
                    generation: self.speaker.generation(),
                };
                let sent = self
                    .speech_tx
                    .as_ref()
                    .is_some_and(|tx| tx.send(utterance).is_ok());
                if !sent {
                    tracing::debug!("speech worker gone, utterance dropped");
                }
            }
            Cue::Tone { tone } => {
                if self.options.beeps {
                    self.tones.play_tone(tone);
                }
            }
            Cue::Ambient { command } => {
                if let Err(e) = self.lease.ambient(command) {
                    tracing::debug!(error = %e, ?command, "ambient music command failed");
                }
            }
            Cue::UnlockSpeech => self.speaker.unlock(),
            Cue::CancelSpeech => {}
        }
    }
}

impl CueRouter {
    /// Let queued speech finish, then stop the worker and release the
    /// output lease. Speech still running after `CLOSE_DRAIN_TIMEOUT` is cut.
    pub async fn close(self) {
        self.close_within(CLOSE_DRAIN_TIMEOUT).await;
    }

    pub async fn close_within(mut self, drain: Duration) {
        self.speech_tx = None;
        if tokio::time::timeout(drain, &mut self.worker).await.is_err() {
            tracing::debug!(session = %self.session(), "speech still queued at close, cutting it");
            self.worker.abort();
            // Cancelled is the expected outcome.
            let _ = (&mut self.worker).await;
        }
    }
}

impl Drop for CueRouter {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

impl std::fmt::Debug for CueRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueRouter")
            .field("session", &self.session())
            .field("options", &self.options)
            .field("muted", &self.is_muted())
            .finish_non_exhaustive()
    }
}

async fn speech_worker(
    speaker: Arc<Speaker>,
    lease: Arc<OutputLease>,
    mut rx: mpsc::UnboundedReceiver<Utterance>,
) {
    while let Some(utterance) = rx.recv().await {
        let spoken_by = speaker
            .say(&lease, &utterance.text, utterance.generation)
            .await;
        tracing::debug!(text = %utterance.text, ?spoken_by, "utterance done");
    }
}
