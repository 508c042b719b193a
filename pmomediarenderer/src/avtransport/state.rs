use std::{fmt, str::FromStr};

/// États du transport AVTransport:1.
///
/// Le renderer n'entre que dans `Stopped`, `Playing` et `PausedPlayback` ;
/// les autres existent pour être reconnus et refusés proprement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Transitioning,
    PausedPlayback,
    PausedRecording,
    Recording,
    NoMediaPresent,
}

impl TransportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportState::Stopped => "STOPPED",
            TransportState::Playing => "PLAYING",
            TransportState::Transitioning => "TRANSITIONING",
            TransportState::PausedPlayback => "PAUSED_PLAYBACK",
            TransportState::PausedRecording => "PAUSED_RECORDING",
            TransportState::Recording => "RECORDING",
            TransportState::NoMediaPresent => "NO_MEDIA_PRESENT",
        }
    }

    /// Valeur de `CurrentTransportActions` pour cet état.
    pub fn available_actions(&self, has_uri: bool) -> &'static str {
        match self {
            TransportState::Stopped if has_uri => "Play,Seek",
            TransportState::Stopped => "Play",
            TransportState::Playing => "Pause,Stop,Seek",
            TransportState::PausedPlayback => "Play,Stop,Seek",
            _ => "",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STOPPED" => Ok(TransportState::Stopped),
            "PLAYING" => Ok(TransportState::Playing),
            "TRANSITIONING" => Ok(TransportState::Transitioning),
            "PAUSED_PLAYBACK" => Ok(TransportState::PausedPlayback),
            "PAUSED_RECORDING" => Ok(TransportState::PausedRecording),
            "RECORDING" => Ok(TransportState::Recording),
            "NO_MEDIA_PRESENT" => Ok(TransportState::NoMediaPresent),
            other => Err(format!("Unknown transport state: {}", other)),
        }
    }
}
