//! Variables d'état du service Playlist (OpenHome).

use pmoupnp::{define_variable_ids, state_variables::VariableMeta, variable_types::StateVarType};

use crate::avtransport::TransportState;

define_variable_ids! {
    pub enum PlaylistVar {
        TransportState,
        Repeat,
        Shuffle,
        Id,
        IdArray,
        TracksMax,
        ProtocolInfo,
        LastChange,
    }
}

pub const PLAYLIST_STATE_PLAYING: &str = "Playing";
pub const PLAYLIST_STATE_PAUSED: &str = "Paused";
pub const PLAYLIST_STATE_STOPPED: &str = "Stopped";
pub const PLAYLIST_STATE_BUFFERING: &str = "Buffering";

/// Traduit l'état AVTransport dans le vocabulaire OpenHome.
pub fn playlist_transport_state(state: TransportState) -> &'static str {
    match state {
        TransportState::Playing => PLAYLIST_STATE_PLAYING,
        TransportState::PausedPlayback | TransportState::PausedRecording => PLAYLIST_STATE_PAUSED,
        TransportState::Transitioning => PLAYLIST_STATE_BUFFERING,
        _ => PLAYLIST_STATE_STOPPED,
    }
}

pub(crate) fn playlist_variables(tracks_max: usize, protocol_info: &str) -> Vec<VariableMeta> {
    use PlaylistVar::*;

    vec![
        VariableMeta::new(TransportState, StateVarType::String, "TransportState")
            .with_default(PLAYLIST_STATE_STOPPED)
            .with_allowed_values(&[
                PLAYLIST_STATE_PLAYING,
                PLAYLIST_STATE_PAUSED,
                PLAYLIST_STATE_STOPPED,
                PLAYLIST_STATE_BUFFERING,
            ]),
        VariableMeta::new(Repeat, StateVarType::Boolean, "Repeat").with_default("0"),
        VariableMeta::new(Shuffle, StateVarType::Boolean, "Shuffle").with_default("0"),
        VariableMeta::new(Id, StateVarType::UI4, "Id").with_default("0"),
        // bin.base64 : transporté comme chaîne.
        VariableMeta::new(IdArray, StateVarType::String, "IdArray").with_default(""),
        VariableMeta::new(TracksMax, StateVarType::UI4, "TracksMax")
            .with_default(&tracks_max.to_string()),
        VariableMeta::new(ProtocolInfo, StateVarType::String, "ProtocolInfo")
            .with_default(protocol_info),
        VariableMeta::new(LastChange, StateVarType::String, "LastChange")
            .with_default("")
            .evented(),
    ]
}
