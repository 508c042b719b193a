//! Module MediaRenderer UPnP.
//!
//! Ce crate implémente le cœur d'un MediaRenderer UPnP audio : l'état des
//! services, leurs actions et la publication des changements en
//! `LastChange`. La couche réseau (SSDP, SOAP, GENA) reste hors du crate :
//! elle appelle [`MediaRenderer::dispatch`] et fournit un
//! [`EventSink`](pmoupnp::events::EventSink).
//!
//! # Architecture
//!
//! Le MediaRenderer est composé de quatre services :
//!
//! - **AVTransport** : Contrôle de la lecture (play, pause, stop, seek, etc.)
//! - **RenderingControl** : Contrôle du volume et du mute
//! - **ConnectionManager** : Protocoles supportés
//! - **Playlist** : File de lecture OpenHome qui pilote l'AVTransport
//!
//! La lecture elle-même est déléguée à un [`Output`](output::Output).
//!
//! # Utilisation
//!
//! ```no_run
//! use std::sync::Arc;
//! use pmomediarenderer::{MediaRenderer, RendererOptions, output::NullOutput};
//! use pmoupnp::{actions::ActionInvocation, events::TracingEventSink};
//!
//! # async fn run() -> Result<(), pmomediarenderer::RendererError> {
//! let renderer = MediaRenderer::start(
//!     Arc::new(NullOutput::new()),
//!     Arc::new(TracingEventSink),
//!     RendererOptions::default(),
//! )?;
//!
//! let mut inv = ActionInvocation::new("GetVolume")
//!     .with_input("InstanceID", "0")
//!     .with_input("Channel", "Master");
//! renderer.dispatch(pmomediarenderer::renderingcontrol::RENDERINGCONTROL_SERVICE_ID, &mut inv);
//! # Ok(())
//! # }
//! ```

pub mod avtransport;
mod config_ext;
pub mod connectionmanager;
mod errors;
pub mod output;
pub mod playlist;
mod renderer;
pub mod renderingcontrol;
pub mod time_utils;

pub use config_ext::RendererConfigExt;
pub use errors::RendererError;
pub use renderer::{MediaRenderer, RendererEvent, RendererOptions};
