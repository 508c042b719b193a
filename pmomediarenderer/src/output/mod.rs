//! Interface du moteur de lecture.
//!
//! Le renderer ne décode rien lui-même : il pilote un [`Output`] (pipeline
//! audio, lecteur externe...) et reçoit en retour les transitions de lecture
//! et les métadonnées du flux via deux callbacks.
//!
//! Les callbacks peuvent être appelés depuis n'importe quel thread, y compris
//! pendant un appel à une méthode de l'`Output`. Ils ne doivent donc pas
//! reprendre le verrou d'un service : le renderer les transforme en messages
//! traités par sa tâche d'évènements.

mod null;

pub use null::NullOutput;

use std::sync::Arc;

use thiserror::Error;

/// Erreurs du moteur de lecture.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("No URI loaded")]
    NoUri,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Transition de lecture signalée par l'`Output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Fin du flux courant sans flux suivant. N'est pas émis après un
    /// `stop()` explicite.
    Stopped,
    /// Le flux préparé par `set_next_uri` a démarré sans interruption.
    StartedNextStream,
}

/// Métadonnées extraites du flux en cours (tags ICY, Vorbis comments...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub composer: Option<String>,
}

impl TrackMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.genre.is_none()
            && self.composer.is_none()
    }
}

/// Durée et position du flux courant, en nanosecondes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackPosition {
    pub duration_ns: u64,
    pub position_ns: u64,
}

pub type PlaybackCallback = Arc<dyn Fn(PlaybackEvent) + Send + Sync>;
pub type MetadataCallback = Arc<dyn Fn(TrackMetadata) + Send + Sync>;

/// Moteur de lecture piloté par les services.
///
/// Toutes les méthodes sont synchrones et appelées sous le verrou du service
/// concerné : elles doivent rendre la main rapidement.
pub trait Output: Send + Sync {
    /// Nom du backend, pour les logs.
    fn name(&self) -> &str;

    fn set_callbacks(&self, playback: PlaybackCallback, metadata: MetadataCallback);

    /// Charge l'URI à lire au prochain `play`.
    fn set_uri(&self, uri: &str, metadata: &str) -> Result<(), OutputError>;

    /// Prépare l'URI à enchaîner à la fin du flux courant.
    fn set_next_uri(&self, uri: &str, metadata: &str) -> Result<(), OutputError>;

    fn play(&self) -> Result<(), OutputError>;

    /// Reprend après une pause. Par défaut identique à `play`.
    fn resume(&self) -> Result<(), OutputError> {
        self.play()
    }

    fn pause(&self) -> Result<(), OutputError>;

    fn stop(&self) -> Result<(), OutputError>;

    fn seek(&self, position_ns: u64) -> Result<(), OutputError>;

    fn position(&self) -> Result<PlaybackPosition, OutputError>;

    /// Volume linéaire dans `[0, 1]`.
    fn volume(&self) -> Result<f32, OutputError>;

    fn set_volume(&self, volume: f32) -> Result<(), OutputError>;

    fn mute(&self) -> Result<bool, OutputError>;

    fn set_mute(&self, mute: bool) -> Result<(), OutputError>;

    /// Types MIME acceptés, pour `SinkProtocolInfo`.
    fn supported_mime_types(&self) -> Vec<String> {
        ["audio/mpeg", "audio/flac", "audio/x-flac", "audio/wav", "audio/ogg", "audio/mp4"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
