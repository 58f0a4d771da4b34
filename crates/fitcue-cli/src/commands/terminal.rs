//! Terminal audio backend and session plumbing shared by the run commands.
//!
//! Speech is printed to stderr, tones ring the terminal bell. There is no
//! music to duck, so volume and ambient commands are only logged.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use fitcue_core::audio::{AmbientCommand, AudioSink, HttpSpeechSynthesizer, LocalSpeech, ToneSink};
use fitcue_core::error::AudioError;
use fitcue_core::{AudioOutput, Config, CueRouter, RouterOptions, Speaker, Tone};

pub struct TerminalAudio {
    bell: bool,
}

impl TerminalAudio {
    pub fn new() -> Self {
        Self {
            bell: std::io::stderr().is_terminal(),
        }
    }
}

impl ToneSink for TerminalAudio {
    fn play_tone(&self, tone: Tone) {
        if self.bell {
            let mut err = std::io::stderr();
            let _ = err.write_all(b"\x07");
            let _ = err.flush();
        }
        tracing::trace!(hz = tone.frequency_hz, ms = tone.duration_ms, "tone");
    }
}

impl AudioSink for TerminalAudio {
    fn play_clip<'a>(&'a self, _clip: &'a [u8]) -> BoxFuture<'a, Result<(), AudioError>> {
        futures::future::ready(Err(AudioError::PlaybackFailed(
            "terminal cannot play audio clips".into(),
        )))
        .boxed()
    }

    fn set_music_volume(&self, volume: f32) {
        tracing::trace!(volume, "music volume");
    }

    fn ambient(&self, command: AmbientCommand) -> Result<(), AudioError> {
        tracing::debug!(?command, "ambient music");
        Ok(())
    }
}

impl LocalSpeech for TerminalAudio {
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), AudioError>> {
        eprintln!("» {text}");
        futures::future::ready(Ok(())).boxed()
    }

    fn cancel(&self) {}
}

/// Take the output for a new session and wire speech per the config.
pub fn build_router(config: &Config, quiet: bool) -> Result<CueRouter, AudioError> {
    let audio = Arc::new(TerminalAudio::new());
    let output = AudioOutput::new(
        audio.clone(),
        config.audio.music_volume,
        config.audio.duck_ratio,
    );
    let lease = output.acquire(Uuid::new_v4())?;

    let mut speaker = Speaker::new(audio.clone()).with_timeout(config.speech_timeout());
    if let Some(remote) = HttpSpeechSynthesizer::from_env(
        config.audio.tts_endpoint.as_ref(),
        &config.audio.tts_api_key_env,
        &config.audio.tts_voice,
    ) {
        speaker = speaker.with_remote(Arc::new(remote));
    }

    let options = if quiet {
        RouterOptions {
            enabled: false,
            ..config.router_options()
        }
    } else {
        config.router_options()
    };
    Ok(CueRouter::spawn(lease, audio, speaker, options))
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Trimmed, non-empty stdin lines. The channel closes at EOF.
///
/// Read on a plain thread: a blocking read must not hold up runtime
/// shutdown when the session ends on its own.
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
