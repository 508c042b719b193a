//! Évènements `LastChange`.
//!
//! Les services AVTransport, RenderingControl et Playlist ne publient pas
//! leurs variables une par une : toutes les modifications faites pendant une
//! transaction sont regroupées dans un unique document XML, écrit dans la
//! variable `LastChange` puis transmis au [`EventSink`].
//!
//! - [`LastChangeBuilder`] : accumule les paires `(nom, valeur)` et produit le document
//! - [`ChangeCollector`] : transactions imbriquées, variables ignorées, synchronisation initiale

mod builder;
mod collector;

pub use builder::{LastChangeBuilder, MASTER_CHANNEL_VARIABLES};
pub use collector::ChangeCollector;

use tracing::debug;

/// Espace de noms des évènements AVTransport.
pub const AVT_EVENT_NAMESPACE: &str = "urn:schemas-upnp-org:metadata-1-0/AVT/";
/// Espace de noms des évènements RenderingControl.
pub const RCS_EVENT_NAMESPACE: &str = "urn:schemas-upnp-org:metadata-1-0/RCS/";
/// Espace de noms des évènements du service Playlist OpenHome.
pub const PLAYLIST_EVENT_NAMESPACE: &str = "urn:av-openhome-org:metadata-1-0/Playlist/";

/// Destinataire des évènements d'un service.
///
/// La couche GENA (hors de ce crate) implémente ce trait pour envoyer les
/// `NOTIFY` aux abonnés. `names` et `values` ont toujours la même longueur.
pub trait EventSink: Send + Sync {
    fn notify(&self, service_id: &str, names: &[&str], values: &[String]);
}

impl<F> EventSink for F
where
    F: Fn(&str, &[&str], &[String]) + Send + Sync,
{
    fn notify(&self, service_id: &str, names: &[&str], values: &[String]) {
        self(service_id, names, values)
    }
}

/// Sink qui se contente de tracer les évènements.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn notify(&self, service_id: &str, names: &[&str], values: &[String]) {
        for (name, value) in names.iter().zip(values) {
            debug!(target: "pmoupnp::events", "📡 {} {} = {}", service_id, name, value);
        }
    }
}
