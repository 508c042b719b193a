//! Handlers des actions ConnectionManager:1.

use pmoupnp::{
    actions::{ActionEntry, ActionError, ActionInvocation},
    services::UpnpService,
};

use crate::connectionmanager::{CONNECTIONMANAGER_SERVICE_ID, ConnectionManager, ConnectionVar};

const CONNECTIONMANAGER_ACTIONS: &[ActionEntry<ConnectionManager>] = &[
    ActionEntry::new("GetProtocolInfo", ConnectionManager::handle_get_protocol_info),
    ActionEntry::new(
        "GetCurrentConnectionIDs",
        ConnectionManager::handle_get_current_connection_ids,
    ),
    ActionEntry::new(
        "GetCurrentConnectionInfo",
        ConnectionManager::handle_get_current_connection_info,
    ),
];

impl UpnpService for ConnectionManager {
    const SERVICE_ID: &'static str = CONNECTIONMANAGER_SERVICE_ID;
    const SERVICE_TYPE: &'static str = "urn:schemas-upnp-org:service:ConnectionManager:1";

    fn actions() -> &'static [ActionEntry<Self>] {
        CONNECTIONMANAGER_ACTIONS
    }
}

impl ConnectionManager {
    fn handle_get_protocol_info(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.state.read(|s| {
            inv.append_variable(&s.store, ConnectionVar::SourceProtocolInfo, "Source");
            inv.append_variable(&s.store, ConnectionVar::SinkProtocolInfo, "Sink");
        });
        Ok(())
    }

    fn handle_get_current_connection_ids(
        &self,
        inv: &mut ActionInvocation,
    ) -> Result<(), ActionError> {
        self.state.read(|s| {
            inv.append_variable(&s.store, ConnectionVar::CurrentConnectionIDs, "ConnectionIDs")
        });
        Ok(())
    }

    fn handle_get_current_connection_info(
        &self,
        inv: &mut ActionInvocation,
    ) -> Result<(), ActionError> {
        let id: i32 = inv.input_as("ConnectionID")?;
        if !self.is_known_connection(id) {
            return Err(ActionError::InvalidConnectionReference(id.to_string()));
        }

        inv.add_response("RcsID", "0");
        inv.add_response("AVTransportID", "0");
        inv.add_response("ProtocolInfo", "");
        inv.add_response("PeerConnectionManager", "");
        inv.add_response("PeerConnectionID", "-1");
        inv.add_response("Direction", "Input");
        inv.add_response("Status", "OK");
        Ok(())
    }
}
