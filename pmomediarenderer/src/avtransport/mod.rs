//! # AVTransport Service - Contrôle du transport
//!
//! Service AVTransport:1 d'un MediaRenderer audio. Il possède :
//!
//! - la table de variables d'état ([`TransportVar`]) et son collecteur
//!   `LastChange`
//! - la machine à états du transport ([`TransportState`])
//! - le pilotage de l'[`Output`]
//!
//! Seule la méthode interne `change_transport_state` écrit `TransportState` et
//! `CurrentTransportActions`.
//!
//! ## Transitions
//!
//! ```text
//! STOPPED --Play--> PLAYING --Pause--> PAUSED_PLAYBACK
//!    ^                 |                     |
//!    +------Stop-------+---------Stop--------+
//! ```

mod actions;
mod didl;
mod poller;
mod state;
mod variables;

pub use poller::spawn_position_poller;
pub use state::TransportState;
pub use variables::{PLAY_MODES, SEEK_MODE_REL_TIME, TransportVar};

use std::sync::Arc;

use pmoupnp::{
    actions::ActionError,
    events::{AVT_EVENT_NAMESPACE, ChangeCollector, EventSink},
    services::{Evented, ServiceMutex, ServiceState},
    state_variables::{StateVariableError, VarId, VariableStore},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::{
    output::{Output, PlaybackEvent, TrackMetadata},
    renderer::RendererEvent,
    time_utils::{format_upnp_time, nanos_to_secs, parse_upnp_time},
};

/// Identifiant du service AVTransport.
pub const AVTRANSPORT_SERVICE_ID: &str = "urn:upnp-org:serviceId:AVTransport";

/// État protégé par le verrou du service.
pub(crate) struct TransportInner {
    vars: ServiceState,
    transport_state: TransportState,
    // (durée, position) du dernier relevé, à la seconde.
    last_position: Option<(u64, u64)>,
}

impl Evented for TransportInner {
    fn start_transaction(&mut self) {
        self.vars.start();
    }

    fn finish_transaction(&mut self) {
        self.vars.finish();
    }
}

impl TransportInner {
    fn has_uri(&self) -> bool {
        !self.vars.get(TransportVar::AVTransportURI).is_empty()
    }

    /// Change l'état du transport.
    ///
    /// `CurrentTransportActions` n'est recalculé que si l'état a réellement
    /// changé.
    fn change_transport_state(&mut self, new_state: TransportState) {
        self.transport_state = new_state;
        if self
            .vars
            .set(TransportVar::TransportState, new_state.as_str())
        {
            info!("🎛️ Transport state -> {}", new_state);
            self.refresh_transport_actions();
        }
    }

    fn refresh_transport_actions(&mut self) {
        let actions = self.transport_state.available_actions(self.has_uri());
        self.vars.set(TransportVar::CurrentTransportActions, actions);
    }

    fn transition_error(&self) -> ActionError {
        ActionError::TransitionNotAvailable {
            state: self.transport_state.to_string(),
            allowed: self
                .vars
                .get(TransportVar::CurrentTransportActions)
                .to_string(),
        }
    }

    fn set_current_uri(&mut self, uri: &str, metadata: &str) {
        self.vars.set(TransportVar::AVTransportURI, uri);
        self.vars.set(TransportVar::AVTransportURIMetaData, metadata);
        self.vars.set(TransportVar::CurrentTrackURI, uri);
        self.vars.set(TransportVar::CurrentTrackMetaData, metadata);
        let tracks = if uri.is_empty() { "0" } else { "1" };
        self.vars.set(TransportVar::NumberOfTracks, tracks);
        self.vars.set(TransportVar::CurrentTrack, tracks);
        self.refresh_transport_actions();
    }

    fn set_next_uri(&mut self, uri: &str, metadata: &str) {
        self.vars.set(TransportVar::NextAVTransportURI, uri);
        self.vars.set(TransportVar::NextAVTransportURIMetaData, metadata);
    }

    fn reset_position(&mut self) {
        self.vars.set(TransportVar::RelativeTimePosition, "0:00:00");
        self.vars.set(TransportVar::AbsoluteTimePosition, "0:00:00");
        self.last_position = None;
    }
}

/// Service AVTransport.
pub struct AVTransport {
    state: ServiceMutex<TransportInner>,
    output: Arc<dyn Output>,
}

impl AVTransport {
    /// Crée le service et publie son état initial.
    ///
    /// # Arguments
    ///
    /// * `output` - Moteur de lecture piloté
    /// * `sink` - Destinataire des évènements `LastChange`
    /// * `events` - File du renderer ; reçoit chaque changement de
    ///   `TransportState`
    pub fn new(
        output: Arc<dyn Output>,
        sink: Arc<dyn EventSink>,
        events: Option<UnboundedSender<RendererEvent>>,
    ) -> Result<Self, StateVariableError> {
        let mut store = VariableStore::new(variables::transport_variables())?;

        if let Some(tx) = events {
            let transport_state_id = TransportVar::TransportState.index();
            store.register_listener(move |change| {
                if change.id != transport_state_id {
                    return;
                }
                if let Ok(state) = change.new_value.parse::<TransportState>() {
                    // Le récepteur peut déjà être fermé à l'arrêt.
                    let _ = tx.send(RendererEvent::TransportStateChanged(state));
                }
            });
        }

        let collector = ChangeCollector::attach_ignoring(
            &mut store,
            TransportVar::LastChange,
            variables::IGNORED,
            AVT_EVENT_NAMESPACE,
            AVTRANSPORT_SERVICE_ID,
            sink,
        )?;

        info!("✅ AVTransport service ready on output '{}'", output.name());

        Ok(Self {
            state: ServiceMutex::new(TransportInner {
                vars: ServiceState::from_parts(store, collector),
                transport_state: TransportState::Stopped,
                last_position: None,
            }),
            output,
        })
    }

    pub fn transport_state(&self) -> TransportState {
        self.state.read(|inner| inner.transport_state)
    }

    /// Valeur courante d'une variable.
    pub fn value(&self, var: TransportVar) -> String {
        self.state.read(|inner| inner.vars.get(var).to_string())
    }

    /// Passe en lecture.
    ///
    /// # Errors
    ///
    /// - 702 si aucune URI n'est chargée
    /// - 701 depuis un état qui n'autorise pas `Play`
    /// - 704 si le backend refuse ; le transport revient à `STOPPED`
    pub fn play(&self) -> Result<(), ActionError> {
        let mut inner = self.state.lock();
        match inner.transport_state {
            TransportState::Playing => Ok(()),
            TransportState::Stopped => {
                if !inner.has_uri() {
                    return Err(ActionError::NoContents);
                }
                inner.reset_position();
                self.start_output(&mut inner, false)
            }
            TransportState::PausedPlayback => self.start_output(&mut inner, true),
            _ => Err(inner.transition_error()),
        }
    }

    fn start_output(&self, inner: &mut TransportInner, resume: bool) -> Result<(), ActionError> {
        let result = if resume {
            self.output.resume()
        } else {
            self.output.play()
        };

        match result {
            Ok(()) => {
                inner.change_transport_state(TransportState::Playing);
                Ok(())
            }
            Err(e) => {
                warn!("❌ Output '{}' failed to play: {}", self.output.name(), e);
                inner.change_transport_state(TransportState::Stopped);
                Err(ActionError::PlaybackFailed(e.to_string()))
            }
        }
    }

    pub fn pause(&self) -> Result<(), ActionError> {
        let mut inner = self.state.lock();
        if inner.transport_state != TransportState::Playing {
            return Err(inner.transition_error());
        }
        self.output
            .pause()
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        inner.change_transport_state(TransportState::PausedPlayback);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), ActionError> {
        let mut inner = self.state.lock();
        match inner.transport_state {
            TransportState::Stopped => Ok(()),
            TransportState::Playing
            | TransportState::PausedPlayback
            | TransportState::PausedRecording => {
                self.output
                    .stop()
                    .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
                inner.change_transport_state(TransportState::Stopped);
                inner.reset_position();
                Ok(())
            }
            _ => Err(inner.transition_error()),
        }
    }

    /// Se positionne dans la piste courante.
    ///
    /// Seul `REL_TIME` est supporté. En cas de succès du backend, la cible
    /// est écrite immédiatement dans `RelativeTimePosition` ; le prochain
    /// relevé de position corrige un éventuel écart.
    pub fn seek(&self, unit: &str, target: &str) -> Result<(), ActionError> {
        if unit != SEEK_MODE_REL_TIME {
            return Err(ActionError::SeekModeNotSupported(unit.to_string()));
        }
        let position_ns = parse_upnp_time(target)
            .map_err(|e| ActionError::IllegalSeekTarget(e.to_string()))?;

        let mut inner = self.state.lock();
        let seekable = inner
            .vars
            .get(TransportVar::CurrentTransportActions)
            .split(',')
            .any(|a| a == "Seek");
        if !seekable {
            return Err(inner.transition_error());
        }

        self.output
            .seek(position_ns)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        debug!("⏩ Seek to {}", target);
        inner
            .vars
            .set(TransportVar::RelativeTimePosition, format_upnp_time(position_ns));
        // Le prochain relevé réécrit la position même si le backend n'a pas bougé.
        inner.last_position = None;
        Ok(())
    }

    /// Charge une nouvelle URI.
    ///
    /// En cours de lecture, la lecture repart sur la nouvelle URI. Une URI
    /// vide décharge le média et arrête le transport.
    pub fn set_transport_uri(&self, uri: &str, metadata: &str) -> Result<(), ActionError> {
        let mut inner = self.state.lock();

        if uri.is_empty() {
            if inner.transport_state != TransportState::Stopped {
                self.output
                    .stop()
                    .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
                inner.change_transport_state(TransportState::Stopped);
            }
            self.output
                .set_uri("", "")
                .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
            inner.set_current_uri("", "");
            inner.reset_position();
            return Ok(());
        }

        info!("🎵 New transport URI: {}", uri);
        self.output
            .set_uri(uri, metadata)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        inner.set_current_uri(uri, metadata);
        inner.reset_position();

        match inner.transport_state {
            TransportState::Playing => self.start_output(&mut inner, false),
            TransportState::PausedPlayback => {
                // Le nouveau média démarre à l'arrêt.
                self.output
                    .stop()
                    .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
                inner.change_transport_state(TransportState::Stopped);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Prépare l'URI à enchaîner sans interruption.
    pub fn set_next_transport_uri(&self, uri: &str, metadata: &str) -> Result<(), ActionError> {
        let mut inner = self.state.lock();
        self.output
            .set_next_uri(uri, metadata)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        inner.set_next_uri(uri, metadata);
        Ok(())
    }

    /// Change le mode de lecture.
    ///
    /// # Errors
    ///
    /// 712 si `mode` n'est pas dans les valeurs autorisées de
    /// `CurrentPlayMode`.
    pub fn set_play_mode(&self, mode: &str) -> Result<(), ActionError> {
        let mut inner = self.state.lock();
        inner
            .vars
            .validate(TransportVar::CurrentPlayMode, mode)
            .map_err(|e| ActionError::PlayModeNotSupported(e.to_string()))?;
        inner.vars.set(TransportVar::CurrentPlayMode, mode);
        Ok(())
    }

    /// Applique une transition signalée par l'`Output`.
    pub fn on_playback_event(&self, event: PlaybackEvent) {
        let mut inner = self.state.lock();
        match event {
            PlaybackEvent::Stopped => {
                debug!("🔚 End of stream");
                inner.set_current_uri("", "");
                inner.change_transport_state(TransportState::Stopped);
                inner.reset_position();
            }
            PlaybackEvent::StartedNextStream => {
                let uri = inner.vars.get(TransportVar::NextAVTransportURI).to_string();
                let metadata = inner
                    .vars
                    .get(TransportVar::NextAVTransportURIMetaData)
                    .to_string();
                debug!("⏭️ Started next stream {}", uri);
                inner.set_current_uri(&uri, &metadata);
                inner.set_next_uri("", "");
                inner.reset_position();
            }
        }
    }

    /// Met à jour `CurrentTrackMetaData` avec les tags reçus du flux.
    pub fn on_metadata(&self, metadata: &TrackMetadata) {
        if metadata.is_empty() {
            return;
        }
        let didl = didl::track_metadata_to_didl(metadata);
        self.state
            .lock()
            .vars
            .set(TransportVar::CurrentTrackMetaData, didl);
    }

    /// Relève la position auprès de l'`Output`.
    ///
    /// Les variables ne sont réécrites que si la durée ou la position ont
    /// changé à la seconde près. Elles sont ignorées par le collecteur :
    /// aucun évènement n'en résulte.
    pub fn update_position(&self) {
        let position = match self.output.position() {
            Ok(p) => p,
            Err(e) => {
                debug!("Position unavailable from '{}': {}", self.output.name(), e);
                return;
            }
        };

        let key = (
            nanos_to_secs(position.duration_ns),
            nanos_to_secs(position.position_ns),
        );

        let mut inner = self.state.lock();
        if inner.last_position == Some(key) {
            return;
        }
        inner.last_position = Some(key);

        let duration = format_upnp_time(position.duration_ns);
        let elapsed = format_upnp_time(position.position_ns);
        inner.vars.set(TransportVar::CurrentTrackDuration, duration);
        inner
            .vars
            .set(TransportVar::RelativeTimePosition, elapsed.clone());
        inner.vars.set(TransportVar::AbsoluteTimePosition, elapsed);
    }
}
