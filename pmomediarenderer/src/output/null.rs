use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use crate::output::{
    MetadataCallback, Output, OutputError, PlaybackCallback, PlaybackEvent, PlaybackPosition,
    TrackMetadata,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NullState {
    Stopped,
    Playing,
    Paused,
}

struct NullInner {
    uri: Option<String>,
    next_uri: Option<String>,
    state: NullState,
    // Position accumulée avant le dernier `play`/`resume`.
    offset_ns: u64,
    started_at: Option<Instant>,
    volume: f32,
    mute: bool,
    playback_cb: Option<PlaybackCallback>,
    metadata_cb: Option<MetadataCallback>,
}

impl NullInner {
    fn elapsed_ns(&self) -> u64 {
        let running = self
            .started_at
            .map(|t| t.elapsed().as_nanos() as u64)
            .unwrap_or(0);
        self.offset_ns + running
    }
}

/// Backend sans audio.
///
/// Il suit l'état de lecture et fait avancer une position à l'horloge
/// murale, sans rien décoder. C'est le backend du mode « dry run » du
/// lanceur. Faute de décodage, la durée reste nulle.
pub struct NullOutput {
    inner: Mutex<NullInner>,
}

impl Default for NullOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl NullOutput {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(NullInner {
                uri: None,
                next_uri: None,
                state: NullState::Stopped,
                offset_ns: 0,
                started_at: None,
                volume: 1.0,
                mute: false,
                playback_cb: None,
                metadata_cb: None,
            }),
        }
    }

    /// Simule la fin du flux courant : enchaîne sur l'URI suivante si elle
    /// existe, sinon s'arrête.
    pub fn end_of_stream(&self) {
        let (event, callback) = {
            let mut inner = self.inner.lock();
            if inner.state == NullState::Stopped {
                return;
            }
            inner.offset_ns = 0;
            let event = match inner.next_uri.take() {
                Some(next) => {
                    inner.uri = Some(next);
                    inner.started_at = Some(Instant::now());
                    PlaybackEvent::StartedNextStream
                }
                None => {
                    inner.state = NullState::Stopped;
                    inner.started_at = None;
                    PlaybackEvent::Stopped
                }
            };
            (event, inner.playback_cb.clone())
        };

        debug!("🔚 NullOutput end of stream: {:?}", event);
        if let Some(cb) = callback {
            cb(event);
        }
    }

    /// Simule la réception de tags dans le flux.
    pub fn push_metadata(&self, metadata: TrackMetadata) {
        let callback = self.inner.lock().metadata_cb.clone();
        if let Some(cb) = callback {
            cb(metadata);
        }
    }

    pub fn current_uri(&self) -> Option<String> {
        self.inner.lock().uri.clone()
    }
}

impl Output for NullOutput {
    fn name(&self) -> &str {
        "null"
    }

    fn set_callbacks(&self, playback: PlaybackCallback, metadata: MetadataCallback) {
        let mut inner = self.inner.lock();
        inner.playback_cb = Some(playback);
        inner.metadata_cb = Some(metadata);
    }

    fn set_uri(&self, uri: &str, _metadata: &str) -> Result<(), OutputError> {
        let mut inner = self.inner.lock();
        inner.uri = if uri.is_empty() {
            None
        } else {
            Some(uri.to_string())
        };
        inner.offset_ns = 0;
        if inner.started_at.is_some() {
            inner.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn set_next_uri(&self, uri: &str, _metadata: &str) -> Result<(), OutputError> {
        let mut inner = self.inner.lock();
        inner.next_uri = if uri.is_empty() {
            None
        } else {
            Some(uri.to_string())
        };
        Ok(())
    }

    fn play(&self) -> Result<(), OutputError> {
        let mut inner = self.inner.lock();
        if inner.uri.is_none() {
            return Err(OutputError::NoUri);
        }
        if inner.state != NullState::Playing {
            if inner.state == NullState::Stopped {
                inner.offset_ns = 0;
            }
            inner.state = NullState::Playing;
            inner.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&self) -> Result<(), OutputError> {
        let mut inner = self.inner.lock();
        if inner.state == NullState::Playing {
            inner.offset_ns = inner.elapsed_ns();
            inner.started_at = None;
            inner.state = NullState::Paused;
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), OutputError> {
        let mut inner = self.inner.lock();
        inner.state = NullState::Stopped;
        inner.started_at = None;
        inner.offset_ns = 0;
        Ok(())
    }

    fn seek(&self, position_ns: u64) -> Result<(), OutputError> {
        let mut inner = self.inner.lock();
        inner.offset_ns = position_ns;
        if inner.started_at.is_some() {
            inner.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn position(&self) -> Result<PlaybackPosition, OutputError> {
        let inner = self.inner.lock();
        Ok(PlaybackPosition {
            duration_ns: 0,
            position_ns: inner.elapsed_ns(),
        })
    }

    fn volume(&self) -> Result<f32, OutputError> {
        Ok(self.inner.lock().volume)
    }

    fn set_volume(&self, volume: f32) -> Result<(), OutputError> {
        self.inner.lock().volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn mute(&self) -> Result<bool, OutputError> {
        Ok(self.inner.lock().mute)
    }

    fn set_mute(&self, mute: bool) -> Result<(), OutputError> {
        self.inner.lock().mute = mute;
        Ok(())
    }
}
