//! Variables d'état du service AVTransport:1.

use pmoupnp::{
    define_variable_ids,
    state_variables::VariableMeta,
    variable_types::StateVarType,
};

define_variable_ids! {
    /// Identifiants des variables AVTransport, dans l'ordre de la table.
    pub enum TransportVar {
        TransportState,
        TransportStatus,
        PlaybackStorageMedium,
        RecordStorageMedium,
        PossiblePlaybackStorageMedia,
        PossibleRecordStorageMedia,
        CurrentPlayMode,
        TransportPlaySpeed,
        RecordMediumWriteStatus,
        CurrentRecordQualityMode,
        PossibleRecordQualityModes,
        NumberOfTracks,
        CurrentTrack,
        CurrentTrackDuration,
        CurrentMediaDuration,
        CurrentTrackMetaData,
        CurrentTrackURI,
        AVTransportURI,
        AVTransportURIMetaData,
        NextAVTransportURI,
        NextAVTransportURIMetaData,
        RelativeTimePosition,
        AbsoluteTimePosition,
        RelativeCounterPosition,
        AbsoluteCounterPosition,
        CurrentTransportActions,
        LastChange,
        ArgSeekMode,
        ArgSeekTarget,
        ArgInstanceId,
    }
}

/// Modes de lecture acceptés par `SetPlayMode`.
pub const PLAY_MODES: [&str; 7] = [
    "NORMAL",
    "SHUFFLE",
    "REPEAT_ONE",
    "REPEAT_ALL",
    "RANDOM",
    "DIRECT_1",
    "INTRO",
];

/// Seul mode de `Seek` supporté.
pub const SEEK_MODE_REL_TIME: &str = "REL_TIME";

/// Variables qui ne partent jamais dans `LastChange` : positions (publiées
/// seulement sur requête `GetPositionInfo`) et types d'arguments.
pub(crate) const IGNORED: [TransportVar; 8] = [
    TransportVar::CurrentTrackDuration,
    TransportVar::RelativeTimePosition,
    TransportVar::AbsoluteTimePosition,
    TransportVar::RelativeCounterPosition,
    TransportVar::AbsoluteCounterPosition,
    TransportVar::ArgSeekMode,
    TransportVar::ArgSeekTarget,
    TransportVar::ArgInstanceId,
];

pub(crate) fn transport_variables() -> Vec<VariableMeta> {
    use StateVarType::{String as Str, I4, UI4};
    use TransportVar::*;

    vec![
        VariableMeta::new(TransportState, Str, "TransportState")
            .with_default("STOPPED")
            .with_allowed_values(&[
                "STOPPED",
                "PLAYING",
                "TRANSITIONING",
                "PAUSED_PLAYBACK",
                "PAUSED_RECORDING",
                "RECORDING",
                "NO_MEDIA_PRESENT",
            ]),
        VariableMeta::new(TransportStatus, Str, "TransportStatus")
            .with_default("OK")
            .with_allowed_values(&["OK", "ERROR_OCCURRED"]),
        VariableMeta::new(PlaybackStorageMedium, Str, "PlaybackStorageMedium")
            .with_default("UNKNOWN"),
        VariableMeta::new(RecordStorageMedium, Str, "RecordStorageMedium")
            .with_default("NOT_IMPLEMENTED"),
        VariableMeta::new(PossiblePlaybackStorageMedia, Str, "PossiblePlaybackStorageMedia")
            .with_default("NETWORK,UNKNOWN"),
        VariableMeta::new(PossibleRecordStorageMedia, Str, "PossibleRecordStorageMedia")
            .with_default("NOT_IMPLEMENTED"),
        VariableMeta::new(CurrentPlayMode, Str, "CurrentPlayMode")
            .with_default("NORMAL")
            .with_allowed_values(&PLAY_MODES),
        VariableMeta::new(TransportPlaySpeed, Str, "TransportPlaySpeed").with_default("1"),
        VariableMeta::new(RecordMediumWriteStatus, Str, "RecordMediumWriteStatus")
            .with_default("NOT_IMPLEMENTED"),
        VariableMeta::new(CurrentRecordQualityMode, Str, "CurrentRecordQualityMode")
            .with_default("NOT_IMPLEMENTED"),
        VariableMeta::new(PossibleRecordQualityModes, Str, "PossibleRecordQualityModes")
            .with_default("NOT_IMPLEMENTED"),
        VariableMeta::new(NumberOfTracks, UI4, "NumberOfTracks").with_default("0"),
        VariableMeta::new(CurrentTrack, UI4, "CurrentTrack").with_default("0"),
        VariableMeta::new(CurrentTrackDuration, Str, "CurrentTrackDuration")
            .with_default("0:00:00"),
        VariableMeta::new(CurrentMediaDuration, Str, "CurrentMediaDuration").with_default(""),
        VariableMeta::new(CurrentTrackMetaData, Str, "CurrentTrackMetaData").with_default(""),
        VariableMeta::new(CurrentTrackURI, Str, "CurrentTrackURI").with_default(""),
        VariableMeta::new(AVTransportURI, Str, "AVTransportURI").with_default(""),
        VariableMeta::new(AVTransportURIMetaData, Str, "AVTransportURIMetaData").with_default(""),
        VariableMeta::new(NextAVTransportURI, Str, "NextAVTransportURI").with_default(""),
        VariableMeta::new(NextAVTransportURIMetaData, Str, "NextAVTransportURIMetaData")
            .with_default(""),
        VariableMeta::new(RelativeTimePosition, Str, "RelativeTimePosition")
            .with_default("0:00:00"),
        VariableMeta::new(AbsoluteTimePosition, Str, "AbsoluteTimePosition")
            .with_default("0:00:00"),
        VariableMeta::new(RelativeCounterPosition, I4, "RelativeCounterPosition")
            .with_default("2147483647"),
        VariableMeta::new(AbsoluteCounterPosition, I4, "AbsoluteCounterPosition")
            .with_default("2147483647"),
        VariableMeta::new(CurrentTransportActions, Str, "CurrentTransportActions")
            .with_default("Play"),
        VariableMeta::new(LastChange, Str, "LastChange")
            .with_default("")
            .evented(),
        VariableMeta::new(ArgSeekMode, Str, "A_ARG_TYPE_SeekMode")
            .with_default("TRACK_NR")
            .with_allowed_values(&["ABS_TIME", "REL_TIME", "ABS_COUNT", "REL_COUNT", "TRACK_NR"]),
        VariableMeta::new(ArgSeekTarget, Str, "A_ARG_TYPE_SeekTarget").with_default(""),
        VariableMeta::new(ArgInstanceId, UI4, "A_ARG_TYPE_InstanceID").with_default("0"),
    ]
}
