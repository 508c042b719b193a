//! Contrat de dispatch des actions UPnP.
//!
//! - [`ActionInvocation`] : lecture des arguments, réponse, erreur
//! - [`ActionEntry`] : table `nom -> handler` d'un service
//! - [`ActionError`] : erreurs typées, chacune associée à un code UPnP
//!
//! Le dispatch lui-même est fourni par
//! [`UpnpService::dispatch`](crate::services::UpnpService::dispatch).

mod action_handler;
mod action_instance;
mod errors;

pub use action_handler::{ActionEntry, ActionHandler};
pub use action_instance::{ActionFault, ActionInvocation};
pub use errors::ActionError;
