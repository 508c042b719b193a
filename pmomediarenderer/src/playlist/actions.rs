//! Handlers des actions du service Playlist.
//!
//! Les actions OpenHome n'ont pas d'argument `InstanceID`.

use pmoupnp::{
    actions::{ActionEntry, ActionError, ActionInvocation},
    services::UpnpService,
    variable_types::parse_upnp_bool,
};

use crate::playlist::{PLAYLIST_SERVICE_ID, PlaylistService, PlaylistVar, track_list_xml};

const PLAYLIST_ACTIONS: &[ActionEntry<PlaylistService>] = &[
    ActionEntry::new("Play", PlaylistService::handle_play),
    ActionEntry::new("Pause", PlaylistService::handle_pause),
    ActionEntry::new("Stop", PlaylistService::handle_stop),
    ActionEntry::new("Next", PlaylistService::handle_next),
    ActionEntry::new("Previous", PlaylistService::handle_previous),
    ActionEntry::new("SetRepeat", PlaylistService::handle_set_repeat),
    ActionEntry::new("Repeat", PlaylistService::handle_repeat),
    ActionEntry::new("SetShuffle", PlaylistService::handle_set_shuffle),
    ActionEntry::new("Shuffle", PlaylistService::handle_shuffle),
    ActionEntry::new("SeekId", PlaylistService::handle_seek_id),
    ActionEntry::new("SeekIndex", PlaylistService::handle_seek_index),
    ActionEntry::new("TransportState", PlaylistService::handle_transport_state),
    ActionEntry::new("Id", PlaylistService::handle_id),
    ActionEntry::new("Read", PlaylistService::handle_read),
    ActionEntry::new("ReadList", PlaylistService::handle_read_list),
    ActionEntry::new("Insert", PlaylistService::handle_insert),
    ActionEntry::new("DeleteId", PlaylistService::handle_delete_id),
    ActionEntry::new("DeleteAll", PlaylistService::handle_delete_all),
    ActionEntry::new("TracksMax", PlaylistService::handle_tracks_max),
    ActionEntry::new("IdArray", PlaylistService::handle_id_array),
    ActionEntry::new("IdArrayChanged", PlaylistService::handle_id_array_changed),
    ActionEntry::new("ProtocolInfo", PlaylistService::handle_protocol_info),
];

impl UpnpService for PlaylistService {
    const SERVICE_ID: &'static str = PLAYLIST_SERVICE_ID;
    const SERVICE_TYPE: &'static str = "urn:av-openhome-org:service:Playlist:1";

    fn actions() -> &'static [ActionEntry<Self>] {
        PLAYLIST_ACTIONS
    }
}

fn bool_input(inv: &ActionInvocation) -> Result<bool, ActionError> {
    parse_upnp_bool(inv.input("Value")?).map_err(|e| ActionError::InvalidArgs(e.to_string()))
}

/// Découpe un `IdList` : identifiants séparés par des espaces ou des
/// virgules.
fn parse_id_list(raw: &str) -> Result<Vec<u32>, ActionError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| ActionError::InvalidArgs(format!("invalid id '{}' in IdList", s)))
        })
        .collect()
}

impl PlaylistService {
    fn append(&self, inv: &mut ActionInvocation, var: PlaylistVar, param: &str) {
        self.state
            .read(|inner| inv.append_variable(inner.vars.store(), var, param));
    }

    fn handle_play(&self, _inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.play()
    }

    fn handle_pause(&self, _inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.pause()
    }

    fn handle_stop(&self, _inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.stop()
    }

    fn handle_next(&self, _inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.next()
    }

    fn handle_previous(&self, _inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.previous()
    }

    fn handle_set_repeat(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let repeat = bool_input(inv)?;
        self.set_repeat(repeat)
    }

    fn handle_repeat(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.append(inv, PlaylistVar::Repeat, "Value");
        Ok(())
    }

    fn handle_set_shuffle(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let shuffle = bool_input(inv)?;
        self.set_shuffle(shuffle);
        Ok(())
    }

    fn handle_shuffle(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.append(inv, PlaylistVar::Shuffle, "Value");
        Ok(())
    }

    fn handle_seek_id(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let id: u32 = inv.input_as("Value")?;
        self.seek_id(id)
    }

    fn handle_seek_index(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let index: usize = inv.input_as("Value")?;
        self.seek_index(index)
    }

    fn handle_transport_state(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.append(inv, PlaylistVar::TransportState, "Value");
        Ok(())
    }

    fn handle_id(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.append(inv, PlaylistVar::Id, "Value");
        Ok(())
    }

    fn handle_read(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let id: u32 = inv.input_as("Id")?;
        let entry = self
            .get(id)
            .ok_or_else(|| ActionError::InvalidPlaylistId(id.to_string()))?;
        inv.add_response("Uri", &entry.uri);
        inv.add_response("Metadata", &entry.metadata);
        Ok(())
    }

    /// Les identifiants inconnus sont omis du `TrackList`.
    fn handle_read_list(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let ids = parse_id_list(inv.input("IdList")?)?;
        let xml = self.state.read(|inner| {
            track_list_xml(ids.iter().filter_map(|id| inner.list.get(*id)))
        });
        inv.add_response("TrackList", &xml);
        Ok(())
    }

    fn handle_insert(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let after_id: u32 = inv.input_as("AfterId")?;
        let uri = inv.input("Uri")?.to_string();
        let metadata = inv.input("Metadata").unwrap_or_default().to_string();
        let id = self.insert(after_id, &uri, &metadata)?;
        inv.add_response("NewId", &id.to_string());
        Ok(())
    }

    fn handle_delete_id(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let id: u32 = inv.input_as("Value")?;
        self.delete_id(id)
    }

    fn handle_delete_all(&self, _inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.delete_all()
    }

    fn handle_tracks_max(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.append(inv, PlaylistVar::TracksMax, "Value");
        Ok(())
    }

    fn handle_id_array(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let (token, array) = self.state.read(|inner| {
            (
                inner.list.token(),
                inner.vars.get(PlaylistVar::IdArray).to_string(),
            )
        });
        inv.add_response("Token", &token.to_string());
        inv.add_response("Array", &array);
        Ok(())
    }

    fn handle_id_array_changed(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        let token: u32 = inv.input_as("Token")?;
        let changed = token != self.token();
        inv.add_response("Value", if changed { "1" } else { "0" });
        Ok(())
    }

    fn handle_protocol_info(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.append(inv, PlaylistVar::ProtocolInfo, "Value");
        Ok(())
    }
}
