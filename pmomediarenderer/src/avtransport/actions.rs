//! Handlers des actions AVTransport:1.

use pmoupnp::{
    actions::{ActionEntry, ActionError, ActionInvocation},
    services::UpnpService,
};

use crate::avtransport::{AVTRANSPORT_SERVICE_ID, AVTransport, TransportVar};

const AVTRANSPORT_ACTIONS: &[ActionEntry<AVTransport>] = &[
    ActionEntry::new("SetAVTransportURI", AVTransport::handle_set_uri),
    ActionEntry::new("SetNextAVTransportURI", AVTransport::handle_set_next_uri),
    ActionEntry::new("GetMediaInfo", AVTransport::handle_get_media_info),
    ActionEntry::new("GetTransportInfo", AVTransport::handle_get_transport_info),
    ActionEntry::new("GetPositionInfo", AVTransport::handle_get_position_info),
    ActionEntry::new("GetDeviceCapabilities", AVTransport::handle_get_device_capabilities),
    ActionEntry::new("GetTransportSettings", AVTransport::handle_get_transport_settings),
    ActionEntry::new(
        "GetCurrentTransportActions",
        AVTransport::handle_get_current_transport_actions,
    ),
    ActionEntry::new("Play", AVTransport::handle_play),
    ActionEntry::new("Pause", AVTransport::handle_pause),
    ActionEntry::new("Stop", AVTransport::handle_stop),
    ActionEntry::new("Seek", AVTransport::handle_seek),
    ActionEntry::new("SetPlayMode", AVTransport::handle_set_play_mode),
];

impl UpnpService for AVTransport {
    const SERVICE_ID: &'static str = AVTRANSPORT_SERVICE_ID;
    const SERVICE_TYPE: &'static str = "urn:schemas-upnp-org:service:AVTransport:1";

    fn actions() -> &'static [ActionEntry<Self>] {
        AVTRANSPORT_ACTIONS
    }
}

impl AVTransport {
    /// Copie des variables dans la réponse, sous un même verrou.
    fn respond(&self, inv: &mut ActionInvocation, vars: &[(TransportVar, &str)]) {
        self.state.read(|inner| {
            for (var, param) in vars {
                inv.append_variable(inner.vars.store(), *var, param);
            }
        });
    }

    fn handle_set_uri(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        let uri = inv.input("CurrentURI")?.to_string();
        let metadata = inv.input("CurrentURIMetaData").unwrap_or_default().to_string();
        self.set_transport_uri(&uri, &metadata)
    }

    fn handle_set_next_uri(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        let uri = inv.input("NextURI")?.to_string();
        let metadata = inv.input("NextURIMetaData").unwrap_or_default().to_string();
        self.set_next_transport_uri(&uri, &metadata)
    }

    fn handle_get_media_info(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.respond(
            inv,
            &[
                (TransportVar::NumberOfTracks, "NrTracks"),
                (TransportVar::CurrentMediaDuration, "MediaDuration"),
                (TransportVar::AVTransportURI, "CurrentURI"),
                (TransportVar::AVTransportURIMetaData, "CurrentURIMetaData"),
                (TransportVar::NextAVTransportURI, "NextURI"),
                (TransportVar::NextAVTransportURIMetaData, "NextURIMetaData"),
                (TransportVar::PlaybackStorageMedium, "PlayMedium"),
                (TransportVar::RecordStorageMedium, "RecordMedium"),
                (TransportVar::RecordMediumWriteStatus, "WriteStatus"),
            ],
        );
        Ok(())
    }

    fn handle_get_transport_info(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.respond(
            inv,
            &[
                (TransportVar::TransportState, "CurrentTransportState"),
                (TransportVar::TransportStatus, "CurrentTransportStatus"),
                (TransportVar::TransportPlaySpeed, "CurrentSpeed"),
            ],
        );
        Ok(())
    }

    fn handle_get_position_info(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.update_position();
        self.respond(
            inv,
            &[
                (TransportVar::CurrentTrack, "Track"),
                (TransportVar::CurrentTrackDuration, "TrackDuration"),
                (TransportVar::CurrentTrackMetaData, "TrackMetaData"),
                (TransportVar::CurrentTrackURI, "TrackURI"),
                (TransportVar::RelativeTimePosition, "RelTime"),
                (TransportVar::AbsoluteTimePosition, "AbsTime"),
                (TransportVar::RelativeCounterPosition, "RelCount"),
                (TransportVar::AbsoluteCounterPosition, "AbsCount"),
            ],
        );
        Ok(())
    }

    fn handle_get_device_capabilities(
        &self,
        inv: &mut ActionInvocation,
    ) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.respond(
            inv,
            &[
                (TransportVar::PossiblePlaybackStorageMedia, "PlayMedia"),
                (TransportVar::PossibleRecordStorageMedia, "RecMedia"),
                (TransportVar::PossibleRecordQualityModes, "RecQualityModes"),
            ],
        );
        Ok(())
    }

    fn handle_get_transport_settings(
        &self,
        inv: &mut ActionInvocation,
    ) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.respond(
            inv,
            &[
                (TransportVar::CurrentPlayMode, "PlayMode"),
                (TransportVar::CurrentRecordQualityMode, "RecQualityMode"),
            ],
        );
        Ok(())
    }

    fn handle_get_current_transport_actions(
        &self,
        inv: &mut ActionInvocation,
    ) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.respond(inv, &[(TransportVar::CurrentTransportActions, "Actions")]);
        Ok(())
    }

    fn handle_play(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.play()
    }

    fn handle_pause(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.pause()
    }

    fn handle_stop(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.stop()
    }

    fn handle_seek(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        let unit = inv.input("Unit")?.to_string();
        let target = inv.input("Target")?.to_string();
        self.seek(&unit, &target)
    }

    fn handle_set_play_mode(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        let mode = inv.input("NewPlayMode")?.to_string();
        self.set_play_mode(&mode)
    }
}
