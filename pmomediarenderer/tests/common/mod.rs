//! Doubles partagés par les tests d'intégration.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use pmomediarenderer::output::{
    MetadataCallback, Output, OutputError, PlaybackCallback, PlaybackEvent, PlaybackPosition,
    TrackMetadata,
};
use pmoupnp::events::EventSink;

/// Active les traces des services pendant les tests (`RUST_LOG`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Output qui enregistre les appels reçus.
#[derive(Default)]
pub struct MockOutput {
    calls: Mutex<Vec<String>>,
    callbacks: Mutex<Option<(PlaybackCallback, MetadataCallback)>>,
    position: Mutex<PlaybackPosition>,
    volume: Mutex<Option<f32>>,
    mute: AtomicBool,
    pub fail_play: AtomicBool,
    pub fail_seek: AtomicBool,
}

impl MockOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Output qui annonce déjà un volume.
    pub fn with_volume(volume: f32) -> Arc<Self> {
        let output = Self::default();
        *output.volume.lock() = Some(volume);
        Arc::new(output)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn set_position(&self, duration_ns: u64, position_ns: u64) {
        *self.position.lock() = PlaybackPosition {
            duration_ns,
            position_ns,
        };
    }

    /// Simule une transition signalée par le moteur.
    pub fn emit(&self, event: PlaybackEvent) {
        let callbacks = self.callbacks.lock().clone();
        if let Some((playback, _)) = callbacks {
            playback(event);
        }
    }

    pub fn emit_metadata(&self, metadata: TrackMetadata) {
        let callbacks = self.callbacks.lock().clone();
        if let Some((_, on_metadata)) = callbacks {
            on_metadata(metadata);
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl Output for MockOutput {
    fn name(&self) -> &str {
        "mock"
    }

    fn set_callbacks(&self, playback: PlaybackCallback, metadata: MetadataCallback) {
        *self.callbacks.lock() = Some((playback, metadata));
    }

    fn set_uri(&self, uri: &str, _metadata: &str) -> Result<(), OutputError> {
        self.record(format!("set_uri {}", uri));
        Ok(())
    }

    fn set_next_uri(&self, uri: &str, _metadata: &str) -> Result<(), OutputError> {
        self.record(format!("set_next_uri {}", uri));
        Ok(())
    }

    fn play(&self) -> Result<(), OutputError> {
        self.record("play".to_string());
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(OutputError::Backend("cannot open stream".to_string()));
        }
        Ok(())
    }

    fn resume(&self) -> Result<(), OutputError> {
        self.record("resume".to_string());
        Ok(())
    }

    fn pause(&self) -> Result<(), OutputError> {
        self.record("pause".to_string());
        Ok(())
    }

    fn stop(&self) -> Result<(), OutputError> {
        self.record("stop".to_string());
        Ok(())
    }

    fn seek(&self, position_ns: u64) -> Result<(), OutputError> {
        self.record(format!("seek {}", position_ns));
        if self.fail_seek.load(Ordering::SeqCst) {
            return Err(OutputError::Backend("not seekable".to_string()));
        }
        Ok(())
    }

    fn position(&self) -> Result<PlaybackPosition, OutputError> {
        Ok(*self.position.lock())
    }

    fn volume(&self) -> Result<f32, OutputError> {
        (*self.volume.lock()).ok_or_else(|| OutputError::Unsupported("volume".to_string()))
    }

    fn set_volume(&self, volume: f32) -> Result<(), OutputError> {
        self.record(format!("set_volume {:.2}", volume));
        *self.volume.lock() = Some(volume);
        Ok(())
    }

    fn mute(&self) -> Result<bool, OutputError> {
        Ok(self.mute.load(Ordering::SeqCst))
    }

    fn set_mute(&self, mute: bool) -> Result<(), OutputError> {
        self.record(format!("set_mute {}", mute));
        self.mute.store(mute, Ordering::SeqCst);
        Ok(())
    }
}

/// Un appel reçu par le sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub service_id: String,
    pub names: Vec<String>,
    pub values: Vec<String>,
}

/// Sink qui conserve toutes les notifications.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Notifications d'un service.
    pub fn for_service(&self, service_id: &str) -> Vec<Notification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.service_id == service_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().len()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, service_id: &str, names: &[&str], values: &[String]) {
        self.notifications.lock().push(Notification {
            service_id: service_id.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            values: values.to_vec(),
        });
    }
}
