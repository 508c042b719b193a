use thiserror::Error;

/// Erreur d'une action UPnP.
///
/// Chaque variante correspond à un code d'erreur UPnP (voir
/// [`code`](Self::code)). Le message est celui renvoyé dans
/// `errorDescription`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Invalid Action: {0}")]
    InvalidAction(String),

    #[error("Invalid Args: {0}")]
    InvalidArgs(String),

    #[error("Action Failed: {0}")]
    ActionFailed(String),

    #[error("Argument Value Out of Range: {0}")]
    ArgumentOutOfRange(String),

    #[error("Transition not available in state {state} (allowed: {allowed})")]
    TransitionNotAvailable { state: String, allowed: String },

    #[error("No contents")]
    NoContents,

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Invalid connection reference: {0}")]
    InvalidConnectionReference(String),

    #[error("Seek mode not supported: {0}")]
    SeekModeNotSupported(String),

    #[error("Illegal seek target: {0}")]
    IllegalSeekTarget(String),

    #[error("Play mode not supported: {0}")]
    PlayModeNotSupported(String),

    #[error("Invalid InstanceID: {0}")]
    InvalidInstanceId(String),

    #[error("Invalid playlist id: {0}")]
    InvalidPlaylistId(String),

    #[error("Playlist full")]
    PlaylistFull,
}

impl ActionError {
    /// Code d'erreur UPnP.
    pub fn code(&self) -> u16 {
        match self {
            ActionError::InvalidAction(_) => 401,
            ActionError::InvalidArgs(_) => 402,
            ActionError::ActionFailed(_) => 501,
            ActionError::ArgumentOutOfRange(_) => 601,
            ActionError::TransitionNotAvailable { .. } => 701,
            ActionError::NoContents => 702,
            ActionError::PlaybackFailed(_) => 704,
            ActionError::InvalidConnectionReference(_) => 706,
            ActionError::SeekModeNotSupported(_) => 710,
            ActionError::IllegalSeekTarget(_) => 711,
            ActionError::PlayModeNotSupported(_) => 712,
            ActionError::InvalidInstanceId(_) => 718,
            ActionError::InvalidPlaylistId(_) => 800,
            ActionError::PlaylistFull => 801,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ActionError::InvalidAction("Foo".into()).code(), 401);
        assert_eq!(ActionError::NoContents.code(), 702);
        let e = ActionError::TransitionNotAvailable {
            state: "STOPPED".into(),
            allowed: "Play".into(),
        };
        assert_eq!(e.code(), 701);
        assert!(e.to_string().contains("allowed: Play"));
    }
}
