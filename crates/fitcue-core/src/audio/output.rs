//! The shared output device.
//!
//! There is one [`AudioOutput`] per process. A session takes an
//! [`OutputLease`] when it starts and the lease is released when dropped,
//! so two sessions can never drive the speakers at once. Speech lowers the
//! ambient music through a [`DuckGuard`] and the volume comes back when the
//! last guard is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{AmbientCommand, AudioSink};
use crate::error::AudioError;

#[derive(Debug)]
struct Mix {
    music_volume: f32,
    duck_ratio: f32,
    active_ducks: u32,
}

pub struct AudioOutput {
    sink: Arc<dyn AudioSink>,
    owner: Mutex<Option<Uuid>>,
    mix: Mutex<Mix>,
}

impl AudioOutput {
    /// `music_volume` and `duck_ratio` are clamped to 0.0 - 1.0.
    pub fn new(sink: Arc<dyn AudioSink>, music_volume: f32, duck_ratio: f32) -> Arc<Self> {
        Arc::new(Self {
            sink,
            owner: Mutex::new(None),
            mix: Mutex::new(Mix {
                music_volume: music_volume.clamp(0.0, 1.0),
                duck_ratio: duck_ratio.clamp(0.0, 1.0),
                active_ducks: 0,
            }),
        })
    }

    /// Claim the device for `session`.
    ///
    /// Re-acquiring for the session that already holds it is refused too;
    /// a session keeps exactly one lease.
    pub fn acquire(self: &Arc<Self>, session: Uuid) -> Result<OutputLease, AudioError> {
        let mut owner = lock(&self.owner);
        if let Some(current) = *owner {
            return Err(AudioError::OutputBusy { owner: current });
        }
        *owner = Some(session);
        tracing::debug!(%session, "audio output acquired");
        Ok(OutputLease {
            output: Arc::clone(self),
            session,
        })
    }

    pub fn owner(&self) -> Option<Uuid> {
        *lock(&self.owner)
    }

    pub fn music_volume(&self) -> f32 {
        lock(&self.mix).music_volume
    }

    pub fn is_ducked(&self) -> bool {
        lock(&self.mix).active_ducks > 0
    }

    fn release(&self, session: Uuid) {
        let mut owner = lock(&self.owner);
        if *owner == Some(session) {
            *owner = None;
            tracing::debug!(%session, "audio output released");
        }
    }

    fn duck(self: &Arc<Self>) -> DuckGuard {
        let mut mix = lock(&self.mix);
        mix.active_ducks += 1;
        if mix.active_ducks == 1 {
            self.sink.set_music_volume(mix.music_volume * mix.duck_ratio);
        }
        DuckGuard {
            output: Arc::clone(self),
        }
    }

    fn unduck(&self) {
        let mut mix = lock(&self.mix);
        mix.active_ducks = mix.active_ducks.saturating_sub(1);
        if mix.active_ducks == 0 {
            self.sink.set_music_volume(mix.music_volume);
        }
    }
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("owner", &self.owner())
            .finish_non_exhaustive()
    }
}

/// Exclusive use of the [`AudioOutput`] for one session.
#[derive(Debug)]
pub struct OutputLease {
    output: Arc<AudioOutput>,
    session: Uuid,
}

impl OutputLease {
    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn sink(&self) -> &dyn AudioSink {
        self.output.sink.as_ref()
    }

    /// Lower the music until the guard is dropped.
    pub fn duck(&self) -> DuckGuard {
        self.output.duck()
    }

    pub fn ambient(&self, command: AmbientCommand) -> Result<(), AudioError> {
        self.output.sink.ambient(command)
    }
}

impl Drop for OutputLease {
    fn drop(&mut self) {
        if let Err(e) = self.output.sink.ambient(AmbientCommand::Stop) {
            tracing::debug!(error = %e, "stopping ambient music on release failed");
        }
        self.output.release(self.session);
    }
}

/// Restores the music volume when the last one is dropped.
#[must_use = "the music is restored as soon as the guard is dropped"]
pub struct DuckGuard {
    output: Arc<AudioOutput>,
}

impl Drop for DuckGuard {
    fn drop(&mut self) {
        self.output.unduck();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioRecord, MemoryAudio};

    #[test]
    fn second_session_is_refused_until_release() {
        let output = AudioOutput::new(Arc::new(MemoryAudio::new()), 0.6, 0.3);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let lease = output.acquire(first).unwrap();
        assert_eq!(output.owner(), Some(first));
        assert!(matches!(
            output.acquire(second),
            Err(AudioError::OutputBusy { owner }) if owner == first
        ));

        drop(lease);
        assert_eq!(output.owner(), None);
        assert!(output.acquire(second).is_ok());
    }

    #[test]
    fn nested_ducks_restore_once() {
        let audio = Arc::new(MemoryAudio::new());
        let output = AudioOutput::new(audio.clone(), 0.5, 0.2);
        let lease = output.acquire(Uuid::new_v4()).unwrap();

        let a = lease.duck();
        let b = lease.duck();
        assert!(output.is_ducked());
        drop(a);
        assert!(output.is_ducked());
        drop(b);
        assert!(!output.is_ducked());

        let volumes: Vec<f32> = audio
            .records()
            .into_iter()
            .filter_map(|r| match r {
                AudioRecord::MusicVolume(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(volumes.len(), 2);
        assert!((volumes[0] - 0.1).abs() < 1e-6);
        assert!((volumes[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn release_stops_ambient_music() {
        let audio = Arc::new(MemoryAudio::new());
        let output = AudioOutput::new(audio.clone(), 0.5, 0.2);
        drop(output.acquire(Uuid::new_v4()).unwrap());
        assert_eq!(
            audio.records(),
            vec![AudioRecord::Ambient(AmbientCommand::Stop)]
        );
    }
}
