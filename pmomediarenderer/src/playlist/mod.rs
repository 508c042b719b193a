//! # Playlist Service - File de lecture OpenHome
//!
//! Ce module fournit :
//!
//! - [`Playlist`] : la liste ordonnée des pistes, son curseur et ses
//!   listeners
//! - [`PlaylistService`] : le service `Playlist:1` (saveur OpenHome) qui
//!   publie la liste en `LastChange` et pilote l'[`AVTransport`]
//!
//! ## Ordre des verrous
//!
//! L'AVTransport peut être verrouillé lorsque le verrou de la playlist est
//! pris, jamais l'inverse. Les listeners de [`Playlist`] déposent leurs
//! évènements dans une boîte, relue sous le verrou ; les commandes qui en
//! découlent pour le transport ne sont exécutées qu'après sa libération.
//!
//! Un second verrou, `driving`, est pris avant celui de la playlist par
//! chaque opération qui commande le transport et tenu jusqu'à la fin de ses
//! commandes : deux actions concurrentes ne peuvent pas entrelacer leurs
//! chargements d'URI.

mod actions;
mod list;
mod variables;

pub use list::{Playlist, PlaylistEntry, PlaylistError, PlaylistEvent, PlaylistListener};
pub use variables::{
    PLAYLIST_STATE_BUFFERING, PLAYLIST_STATE_PAUSED, PLAYLIST_STATE_PLAYING,
    PLAYLIST_STATE_STOPPED, PlaylistVar, playlist_transport_state,
};

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use parking_lot::Mutex;
use pmoupnp::{
    actions::ActionError,
    events::{EventSink, PLAYLIST_EVENT_NAMESPACE},
    services::{Evented, ServiceMutex, ServiceState},
    state_variables::StateVariableError,
};
use tracing::{debug, error, info};
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::avtransport::{AVTransport, TransportState, TransportVar};

pub const PLAYLIST_SERVICE_ID: &str = "urn:av-openhome-org:serviceId:Playlist";

/// Encode les identifiants en `IdArray` : base64 des `u32` big-endian.
pub fn encode_id_array(ids: &[u32]) -> String {
    let bytes: Vec<u8> = ids.iter().flat_map(|id| id.to_be_bytes()).collect();
    STANDARD.encode(bytes)
}

/// Construit le document `TrackList` renvoyé par `ReadList`.
///
/// ```xml
/// <TrackList>
///   <Entry><Id>1</Id><Uri>http://...</Uri><Metadata>...</Metadata></Entry>
/// </TrackList>
/// ```
pub fn track_list_xml<'a>(entries: impl IntoIterator<Item = &'a PlaylistEntry>) -> String {
    fn text_child(name: &str, text: &str) -> XMLNode {
        let mut elem = Element::new(name);
        elem.children.push(XMLNode::Text(text.to_string()));
        XMLNode::Element(elem)
    }

    let mut root = Element::new("TrackList");
    for entry in entries {
        let mut elem = Element::new("Entry");
        elem.children.push(text_child("Id", &entry.id.to_string()));
        elem.children.push(text_child("Uri", &entry.uri));
        elem.children.push(text_child("Metadata", &entry.metadata));
        root.children.push(XMLNode::Element(elem));
    }

    let config = EmitterConfig::new()
        .perform_indent(false)
        .write_document_declaration(false);
    let mut buf = Vec::new();
    if let Err(e) = root.write_with_config(&mut buf, config) {
        error!("❌ Failed to serialize TrackList: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Track {
    id: u32,
    uri: String,
    metadata: String,
}

impl From<&PlaylistEntry> for Track {
    fn from(entry: &PlaylistEntry) -> Self {
        Self {
            id: entry.id,
            uri: entry.uri.clone(),
            metadata: entry.metadata.clone(),
        }
    }
}

/// Commandes pour le transport, calculées sous le verrou de la playlist.
#[derive(Debug, Default)]
struct FollowUp {
    /// Piste à charger ; `Some(None)` décharge le transport.
    load: Option<Option<Track>>,
    /// Piste suivante à annoncer ; `None` laisse le transport intact.
    next: Option<Option<Track>>,
    play: bool,
}

pub(crate) struct PlaylistInner {
    vars: ServiceState,
    list: Playlist,
    // Piste que la playlist a chargée dans le transport.
    loaded: Option<u32>,
}

impl Evented for PlaylistInner {
    fn start_transaction(&mut self) {
        self.vars.start();
    }

    fn finish_transaction(&mut self) {
        self.vars.finish();
    }
}

impl PlaylistInner {
    fn refresh_id_array(&mut self) {
        let encoded = encode_id_array(&self.list.ids());
        self.vars.set(PlaylistVar::IdArray, encoded);
    }

    /// Publie l'état de la liste et déduit les commandes transport.
    ///
    /// `force_load` charge la piste courante même si la playlist ne
    /// pilotait pas encore le transport.
    fn settle(&mut self, inbox: &Mutex<Vec<PlaylistEvent>>, force_load: bool) -> FollowUp {
        let events = std::mem::take(&mut *inbox.lock());

        let mut list_changed = false;
        let mut manual_change = false;
        for event in &events {
            match event {
                PlaylistEvent::ListChanged => list_changed = true,
                PlaylistEvent::CurrentChanged {
                    automatic: false, ..
                } => manual_change = true,
                _ => {}
            }
        }

        if list_changed {
            self.refresh_id_array();
        }
        let current_id = self.list.current_id().unwrap_or(0);
        self.vars.set(PlaylistVar::Id, current_id.to_string());

        let owned = self.loaded.is_some();
        let mut follow = FollowUp::default();

        if force_load || (manual_change && owned) {
            let current = self.list.current().map(Track::from);
            self.loaded = current.as_ref().map(|t| t.id);
            follow.load = Some(current);
        }

        if owned || self.loaded.is_some() {
            follow.next = Some(match self.loaded {
                Some(_) => self.list.next_entry().map(Track::from),
                None => None,
            });
        }

        follow
    }
}

/// Service Playlist.
pub struct PlaylistService {
    state: ServiceMutex<PlaylistInner>,
    transport: Arc<AVTransport>,
    inbox: Arc<Mutex<Vec<PlaylistEvent>>>,
    // Sérialise calcul et exécution des commandes transport.
    driving: Mutex<()>,
}

impl PlaylistService {
    /// Crée le service.
    ///
    /// # Arguments
    ///
    /// * `transport` - Service AVTransport piloté par la playlist
    /// * `sink` - Destinataire des évènements `LastChange`
    /// * `tracks_max` - Capacité de la playlist
    /// * `protocol_info` - Valeur publiée dans `ProtocolInfo`
    /// * `repeat` - Mode repeat initial
    pub fn new(
        transport: Arc<AVTransport>,
        sink: Arc<dyn EventSink>,
        tracks_max: usize,
        protocol_info: &str,
        repeat: bool,
    ) -> Result<Self, StateVariableError> {
        let mut list = Playlist::new(tracks_max);
        list.set_repeat(repeat);

        let inbox = Arc::new(Mutex::new(Vec::new()));
        let boxed = inbox.clone();
        list.register_listener(move |event| boxed.lock().push(*event));

        let mut vars = ServiceState::new(
            variables::playlist_variables(tracks_max, protocol_info),
            PlaylistVar::LastChange,
            std::iter::empty::<PlaylistVar>(),
            PLAYLIST_EVENT_NAMESPACE,
            PLAYLIST_SERVICE_ID,
            sink,
        )?;
        vars.transaction(|vars| {
            vars.set(PlaylistVar::Repeat, if repeat { "1" } else { "0" });
            vars.set(
                PlaylistVar::TransportState,
                playlist_transport_state(transport.transport_state()),
            );
        });

        info!("✅ Playlist service ready ({} tracks max)", tracks_max);

        Ok(Self {
            state: ServiceMutex::new(PlaylistInner {
                vars,
                list,
                loaded: None,
            }),
            transport,
            inbox,
            driving: Mutex::new(()),
        })
    }

    pub fn value(&self, var: PlaylistVar) -> String {
        self.state.read(|inner| inner.vars.get(var).to_string())
    }

    pub fn ids(&self) -> Vec<u32> {
        self.state.read(|inner| inner.list.ids())
    }

    pub fn token(&self) -> u32 {
        self.state.read(|inner| inner.list.token())
    }

    pub fn current_id(&self) -> Option<u32> {
        self.state.read(|inner| inner.list.current_id())
    }

    pub fn get(&self, id: u32) -> Option<PlaylistEntry> {
        self.state.read(|inner| inner.list.get(id).cloned())
    }

    /// Exécute les commandes transport, verrou de la playlist relâché.
    fn apply(&self, follow: FollowUp) -> Result<(), ActionError> {
        if let Some(load) = follow.load {
            match load {
                Some(track) => {
                    debug!("📋 Loading playlist entry {} into transport", track.id);
                    self.transport
                        .set_transport_uri(&track.uri, &track.metadata)?;
                }
                None => self.transport.set_transport_uri("", "")?,
            }
        }
        if let Some(next) = follow.next {
            let (uri, metadata) = next
                .map(|t| (t.uri, t.metadata))
                .unwrap_or_default();
            self.transport.set_next_transport_uri(&uri, &metadata)?;
        }
        if follow.play {
            self.transport.play()?;
        }
        Ok(())
    }

    /// Insère une piste après `after_id` (`0` pour la tête).
    ///
    /// # Errors
    ///
    /// - 800 si `after_id` est inconnu
    /// - 801 si la playlist est pleine
    pub fn insert(&self, after_id: u32, uri: &str, metadata: &str) -> Result<u32, ActionError> {
        let _driving = self.driving.lock();
        let (id, follow) = {
            let mut inner = self.state.lock();
            let id = inner
                .list
                .insert(after_id, uri, metadata)
                .map_err(to_action_error)?;
            (id, inner.settle(&self.inbox, false))
        };
        debug!("📋 Inserted {} as entry {}", uri, id);
        self.apply(follow)?;
        Ok(id)
    }

    pub fn delete_id(&self, id: u32) -> Result<(), ActionError> {
        let _driving = self.driving.lock();
        let follow = {
            let mut inner = self.state.lock();
            inner.list.remove(id).map_err(to_action_error)?;
            inner.settle(&self.inbox, false)
        };
        self.apply(follow)
    }

    pub fn delete_all(&self) -> Result<(), ActionError> {
        let _driving = self.driving.lock();
        let follow = {
            let mut inner = self.state.lock();
            inner.list.clear();
            let mut follow = inner.settle(&self.inbox, false);
            // Une liste vide sans sélection publie tout de même son IdArray.
            inner.refresh_id_array();
            if inner.loaded.take().is_some() {
                follow.load = Some(None);
                follow.next = Some(None);
            }
            follow
        };
        self.apply(follow)
    }

    /// Lance la lecture de la piste courante (la première à défaut).
    ///
    /// Sans piste, l'action est sans effet.
    pub fn play(&self) -> Result<(), ActionError> {
        let _driving = self.driving.lock();
        let transport_uri = self.transport.value(TransportVar::AVTransportURI);
        let follow = {
            let mut inner = self.state.lock();
            if inner.list.is_empty() {
                return Ok(());
            }
            if inner.list.current().is_none() {
                inner.list.seek_index(0).map_err(to_action_error)?;
            }
            let reload = inner.loaded != inner.list.current_id()
                || inner.list.current().map(|e| e.uri.as_str()) != Some(transport_uri.as_str());
            let mut follow = inner.settle(&self.inbox, reload);
            follow.play = true;
            follow
        };
        self.apply(follow)
    }

    pub fn pause(&self) -> Result<(), ActionError> {
        self.transport.pause()
    }

    pub fn stop(&self) -> Result<(), ActionError> {
        self.transport.stop()
    }

    /// Passe à la piste suivante et la lit. Sans suivante, rien ne change.
    pub fn next(&self) -> Result<(), ActionError> {
        self.move_and_play(|list| Ok(list.next(false)))
    }

    pub fn previous(&self) -> Result<(), ActionError> {
        self.move_and_play(|list| Ok(list.previous()))
    }

    pub fn seek_id(&self, id: u32) -> Result<(), ActionError> {
        self.move_and_play(|list| list.seek_id(id).map(|_| true))
    }

    pub fn seek_index(&self, index: usize) -> Result<(), ActionError> {
        self.move_and_play(|list| list.seek_index(index).map(|_| true))
    }

    fn move_and_play(
        &self,
        f: impl FnOnce(&mut Playlist) -> Result<bool, PlaylistError>,
    ) -> Result<(), ActionError> {
        let _driving = self.driving.lock();
        let follow = {
            let mut inner = self.state.lock();
            let moved = f(&mut inner.list).map_err(to_action_error)?;
            let mut follow = inner.settle(&self.inbox, moved);
            follow.play = moved;
            follow
        };
        self.apply(follow)
    }

    pub fn set_repeat(&self, repeat: bool) -> Result<(), ActionError> {
        let _driving = self.driving.lock();
        let follow = {
            let mut inner = self.state.lock();
            inner.list.set_repeat(repeat);
            inner
                .vars
                .set(PlaylistVar::Repeat, if repeat { "1" } else { "0" });
            inner.settle(&self.inbox, false)
        };
        self.apply(follow)
    }

    /// Le mode aléatoire est publié mais l'ordre de lecture reste
    /// séquentiel.
    pub fn set_shuffle(&self, shuffle: bool) {
        self.state
            .lock()
            .vars
            .set(PlaylistVar::Shuffle, if shuffle { "1" } else { "0" });
    }

    /// Reflète l'état de l'AVTransport dans `TransportState`.
    pub fn on_transport_state(&self, state: TransportState) {
        self.state
            .lock()
            .vars
            .set(PlaylistVar::TransportState, playlist_transport_state(state));
    }

    /// Le transport a enchaîné sur l'URI `uri`.
    ///
    /// La playlist n'avance que si `uri` est celle de son entrée suivante.
    pub fn on_stream_started(&self, uri: &str) {
        let _driving = self.driving.lock();
        let follow = {
            let mut inner = self.state.lock();
            if inner.loaded.is_none() {
                return;
            }
            let matches = inner
                .list
                .next_entry()
                .is_some_and(|entry| entry.uri == uri);
            if !matches || !inner.list.next(true) {
                return;
            }
            inner.loaded = inner.list.current_id();
            inner.settle(&self.inbox, false)
        };
        if let Err(e) = self.apply(follow) {
            error!("❌ Cannot queue next playlist entry: {}", e);
        }
    }
}

fn to_action_error(e: PlaylistError) -> ActionError {
    match e {
        PlaylistError::Full(_) => ActionError::PlaylistFull,
        PlaylistError::InvalidIndex(_) => ActionError::ArgumentOutOfRange(e.to_string()),
        PlaylistError::InvalidAfterId(_) | PlaylistError::InvalidId(_) => {
            ActionError::InvalidPlaylistId(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_id_array() {
        assert_eq!(encode_id_array(&[]), "");
        // 00 00 00 01 00 00 00 02
        assert_eq!(encode_id_array(&[1, 2]), "AAAAAQAAAAI=");
    }

    #[test]
    fn test_track_list_xml() {
        let entries = [PlaylistEntry {
            id: 3,
            uri: "http://host/a.flac".to_string(),
            metadata: "<DIDL-Lite/>".to_string(),
        }];
        let xml = track_list_xml(&entries);
        assert!(xml.starts_with("<TrackList><Entry><Id>3</Id>"));
        assert!(xml.contains("<Uri>http://host/a.flac</Uri>"));
        assert!(xml.contains("&lt;DIDL-Lite/"));
        assert!(!track_list_xml(&Vec::<PlaylistEntry>::new()).contains("Entry"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(to_action_error(PlaylistError::Full(4)).code(), 801);
        assert_eq!(to_action_error(PlaylistError::InvalidId(4)).code(), 800);
        assert_eq!(to_action_error(PlaylistError::InvalidAfterId(4)).code(), 800);
        assert_eq!(to_action_error(PlaylistError::InvalidIndex(4)).code(), 601);
    }
}
