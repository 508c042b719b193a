//! # ConnectionManager Service
//!
//! Service ConnectionManager:1 minimal : une seule connexion (`0`), des
//! informations de protocole statiques. Ses variables sont publiées une par
//! une (pas de `LastChange`) : un listener du store les transmet directement
//! au sink.

mod actions;

use std::{collections::HashSet, sync::Arc};

use pmoupnp::{
    define_variable_ids,
    events::EventSink,
    services::{Evented, ServiceMutex},
    state_variables::{StateVariableError, VariableMeta, VariableStore},
    variable_types::StateVarType,
};
use tracing::info;

pub const CONNECTIONMANAGER_SERVICE_ID: &str = "urn:upnp-org:serviceId:ConnectionManager";

define_variable_ids! {
    pub enum ConnectionVar {
        SourceProtocolInfo,
        SinkProtocolInfo,
        CurrentConnectionIDs,
        ArgConnectionStatus,
        ArgConnectionManager,
        ArgDirection,
        ArgProtocolInfo,
        ArgConnectionId,
        ArgAVTransportId,
        ArgRcsId,
    }
}

fn connection_variables() -> Vec<VariableMeta> {
    use ConnectionVar::*;
    use StateVarType::{I4, String as Str};

    vec![
        VariableMeta::new(SourceProtocolInfo, Str, "SourceProtocolInfo")
            .with_default("")
            .evented(),
        VariableMeta::new(SinkProtocolInfo, Str, "SinkProtocolInfo")
            .with_default("")
            .evented(),
        VariableMeta::new(CurrentConnectionIDs, Str, "CurrentConnectionIDs")
            .with_default("0")
            .evented(),
        VariableMeta::new(ArgConnectionStatus, Str, "A_ARG_TYPE_ConnectionStatus")
            .with_default("OK")
            .with_allowed_values(&[
                "OK",
                "ContentFormatMismatch",
                "InsufficientBandwidth",
                "UnreliableChannel",
                "Unknown",
            ]),
        VariableMeta::new(ArgConnectionManager, Str, "A_ARG_TYPE_ConnectionManager")
            .with_default(""),
        VariableMeta::new(ArgDirection, Str, "A_ARG_TYPE_Direction")
            .with_default("Input")
            .with_allowed_values(&["Input", "Output"]),
        VariableMeta::new(ArgProtocolInfo, Str, "A_ARG_TYPE_ProtocolInfo").with_default(""),
        VariableMeta::new(ArgConnectionId, I4, "A_ARG_TYPE_ConnectionID").with_default("0"),
        VariableMeta::new(ArgAVTransportId, I4, "A_ARG_TYPE_AVTransportID").with_default("0"),
        VariableMeta::new(ArgRcsId, I4, "A_ARG_TYPE_RcsID").with_default("0"),
    ]
}

/// `SinkProtocolInfo` pour une liste de types MIME.
pub fn sink_protocol_info(mime_types: &[String]) -> String {
    mime_types
        .iter()
        .map(|mime| format!("http-get:*:{}:*", mime))
        .collect::<Vec<_>>()
        .join(",")
}

/// Variables du service, sans transaction : chaque changement part seul.
pub(crate) struct ConnectionState {
    store: VariableStore,
}

impl Evented for ConnectionState {
    fn start_transaction(&mut self) {}
    fn finish_transaction(&mut self) {}
}

/// Service ConnectionManager.
pub struct ConnectionManager {
    state: ServiceMutex<ConnectionState>,
}

impl ConnectionManager {
    /// Crée le service et publie ses variables évènementielles.
    pub fn new(
        mime_types: &[String],
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, StateVariableError> {
        let mut store = VariableStore::new(connection_variables())?;
        store.set(ConnectionVar::SinkProtocolInfo, sink_protocol_info(mime_types));

        let evented: HashSet<usize> = store
            .iter()
            .map(|(id, _, _)| id)
            .filter(|id| store.meta(*id).is_evented())
            .collect();

        // Évènement initial : toutes les variables évènementielles ensemble.
        let (names, values): (Vec<&str>, Vec<String>) = store
            .iter()
            .filter(|(id, _, _)| evented.contains(id))
            .map(|(_, name, value)| (name, value.to_string()))
            .unzip();
        sink.notify(CONNECTIONMANAGER_SERVICE_ID, &names, &values);

        store.register_listener(move |change| {
            if evented.contains(&change.id) {
                sink.notify(
                    CONNECTIONMANAGER_SERVICE_ID,
                    &[change.name],
                    &[change.new_value.to_string()],
                );
            }
        });

        info!("✅ ConnectionManager ready ({} sink formats)", mime_types.len());

        Ok(Self {
            state: ServiceMutex::new(ConnectionState { store }),
        })
    }

    pub fn value(&self, var: ConnectionVar) -> String {
        self.state.read(|s| s.store.value(var).to_string())
    }

    /// Remplace la liste des formats acceptés.
    pub fn set_sink_protocol_info(&self, mime_types: &[String]) {
        self.state
            .lock()
            .store
            .set(ConnectionVar::SinkProtocolInfo, sink_protocol_info(mime_types));
    }

    fn is_known_connection(&self, id: i32) -> bool {
        self.state.read(|s| {
            s.store
                .value(ConnectionVar::CurrentConnectionIDs)
                .split(',')
                .filter_map(|c| c.trim().parse::<i32>().ok())
                .any(|c| c == id)
        })
    }
}
