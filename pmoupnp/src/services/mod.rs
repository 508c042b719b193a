//! Services UPnP : état, verrou transactionnel et dispatch.
//!
//! Un service possède un [`ServiceState`] (store + collecteur `LastChange`)
//! protégé par un [`ServiceMutex`]. Prendre le verrou ouvre une transaction,
//! relâcher le guard la ferme : tout ce qui est modifié pendant une section
//! critique part dans un seul évènement.

mod lock;
mod state;

pub use lock::{Evented, ServiceGuard, ServiceMutex};
pub use state::ServiceState;

use tracing::{debug, warn};

use crate::actions::{ActionEntry, ActionError, ActionInvocation};

/// Service UPnP exposant une table d'actions.
pub trait UpnpService: Sized + 'static {
    /// Identifiant du service (`urn:upnp-org:serviceId:AVTransport`...).
    const SERVICE_ID: &'static str;
    /// Type du service (`urn:schemas-upnp-org:service:AVTransport:1`...).
    const SERVICE_TYPE: &'static str;

    /// Table des actions du service.
    fn actions() -> &'static [ActionEntry<Self>];

    fn action_names() -> Vec<&'static str> {
        Self::actions().iter().map(|a| a.name).collect()
    }

    /// Exécute l'action nommée par `invocation`.
    ///
    /// Une action inconnue produit l'erreur 401. Une erreur du handler est
    /// enregistrée dans l'invocation avec son code UPnP.
    ///
    /// # Returns
    ///
    /// `true` si l'action a réussi.
    fn dispatch(&self, invocation: &mut ActionInvocation) -> bool {
        let name = invocation.action_name().to_string();
        let Some(entry) = Self::actions().iter().find(|a| a.name == name) else {
            warn!("⚠️ Unknown action {} on {}", name, Self::SERVICE_ID);
            let err = ActionError::InvalidAction(name);
            invocation.set_error(err.code(), &err.to_string());
            return false;
        };

        debug!("🎬 {} -> {}", Self::SERVICE_ID, name);
        match (entry.handler)(self, invocation) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    "❌ {} on {} failed with {}: {}",
                    name,
                    Self::SERVICE_ID,
                    err.code(),
                    err
                );
                invocation.set_error(err.code(), &err.to_string());
                false
            }
        }
    }
}
