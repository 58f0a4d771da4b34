use serde::{Deserialize, Serialize};

use super::tones::Tone;

/// Ambient music control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientCommand {
    Play,
    Pause,
    Stop,
}

/// Something an engine wants the user to hear.
///
/// Engines only queue cues; the router decides how (and whether) they
/// reach the output device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cue {
    Speak { text: String },
    Tone { tone: Tone },
    Ambient { command: AmbientCommand },
    /// Prime platform speech while we are inside a user gesture.
    UnlockSpeech,
    /// Drop queued and in-flight speech.
    CancelSpeech,
}

impl Cue {
    pub fn speak(text: impl Into<String>) -> Self {
        Cue::Speak { text: text.into() }
    }

    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            Cue::Speak { text } => Some(text),
            _ => None,
        }
    }
}

/// Ordered outbox an engine fills during one action.
#[derive(Debug, Default)]
pub struct CueQueue {
    cues: Vec<Cue>,
}

impl CueQueue {
    pub fn push(&mut self, cue: Cue) {
        tracing::debug!(?cue, "cue queued");
        self.cues.push(cue);
    }

    pub fn speak(&mut self, text: impl Into<String>) {
        self.push(Cue::speak(text));
    }

    pub fn tone(&mut self, tone: Tone) {
        self.push(Cue::Tone { tone });
    }

    pub fn ambient(&mut self, command: AmbientCommand) {
        self.push(Cue::Ambient { command });
    }

    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
