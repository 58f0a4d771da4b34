//! In-memory audio backend.
//!
//! Implements every sink trait by recording what it was asked to do.
//! Used for tests and for running headless.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{AmbientCommand, AudioSink, LocalSpeech, ToneSink, Tone};
use crate::error::AudioError;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioRecord {
    Tone(Tone),
    /// Length in bytes of a clip that started playing.
    Clip(usize),
    /// A clip played through to its end.
    ClipEnded,
    MusicVolume(f32),
    Ambient(AmbientCommand),
    Spoke(String),
    SpeechCancelled,
    SpeechUnlocked,
}

#[derive(Debug, Default)]
pub struct MemoryAudio {
    records: Mutex<Vec<AudioRecord>>,
    fail_local_speech: bool,
    clip_length: Duration,
}

impl MemoryAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local speech reports failure (nothing is recorded for it).
    pub fn with_failing_speech() -> Self {
        Self {
            fail_local_speech: true,
            ..Self::default()
        }
    }

    /// Every clip takes `length` to play.
    pub fn with_clip_length(length: Duration) -> Self {
        Self {
            clip_length: length,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<AudioRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text spoken through the local tier, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                AudioRecord::Spoke(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, record: AudioRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl ToneSink for MemoryAudio {
    fn play_tone(&self, tone: Tone) {
        self.record(AudioRecord::Tone(tone));
    }
}

impl AudioSink for MemoryAudio {
    fn play_clip<'a>(&'a self, clip: &'a [u8]) -> BoxFuture<'a, Result<(), AudioError>> {
        self.record(AudioRecord::Clip(clip.len()));
        async move {
            if !self.clip_length.is_zero() {
                tokio::time::sleep(self.clip_length).await;
            }
            self.record(AudioRecord::ClipEnded);
            Ok(())
        }
        .boxed()
    }

    fn set_music_volume(&self, volume: f32) {
        self.record(AudioRecord::MusicVolume(volume));
    }

    fn ambient(&self, command: AmbientCommand) -> Result<(), AudioError> {
        self.record(AudioRecord::Ambient(command));
        Ok(())
    }
}

impl LocalSpeech for MemoryAudio {
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), AudioError>> {
        let result = if self.fail_local_speech {
            Err(AudioError::Local("speech disabled".into()))
        } else {
            self.record(AudioRecord::Spoke(text.to_string()));
            Ok(())
        };
        futures::future::ready(result).boxed()
    }

    fn cancel(&self) {
        self.record(AudioRecord::SpeechCancelled);
    }

    fn unlock(&self) -> Result<(), AudioError> {
        self.record(AudioRecord::SpeechUnlocked);
        Ok(())
    }
}
