//! Contexte du MediaRenderer.
//!
//! [`MediaRenderer`] assemble les quatre services autour d'un même
//! [`Output`], démarre la tâche d'évènements et le relevé de position, et
//! route les actions vers le bon service.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use pmoupnp::{actions::ActionInvocation, events::EventSink, services::UpnpService};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    avtransport::{AVTRANSPORT_SERVICE_ID, AVTransport, TransportState, TransportVar, spawn_position_poller},
    connectionmanager::{CONNECTIONMANAGER_SERVICE_ID, ConnectionManager, sink_protocol_info},
    errors::RendererError,
    output::{Output, PlaybackEvent, TrackMetadata},
    playlist::{PLAYLIST_SERVICE_ID, PlaylistService},
    renderingcontrol::{RENDERINGCONTROL_SERVICE_ID, RenderingControl},
};

/// Évènement traité par la tâche du renderer, hors de tout verrou de
/// service.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    Playback(PlaybackEvent),
    Metadata(TrackMetadata),
    TransportStateChanged(TransportState),
}

/// Réglages du renderer.
#[derive(Debug, Clone)]
pub struct RendererOptions {
    pub friendly_name: String,
    pub poll_interval: Duration,
    pub tracks_max: usize,
    pub initial_volume: u16,
    pub repeat: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            friendly_name: "PMORenderer".to_string(),
            poll_interval: Duration::from_millis(500),
            tracks_max: 1000,
            initial_volume: 50,
            repeat: false,
        }
    }
}

/// MediaRenderer : services, tâches de fond et `Output`.
pub struct MediaRenderer {
    name: String,
    output: Arc<dyn Output>,
    avtransport: Arc<AVTransport>,
    rendering_control: Arc<RenderingControl>,
    connection_manager: Arc<ConnectionManager>,
    playlist: Arc<PlaylistService>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for MediaRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaRenderer")
            .field("name", &self.name)
            .field("output", &self.output.name())
            .finish()
    }
}

impl MediaRenderer {
    /// Construit les services et démarre les tâches de fond.
    ///
    /// Doit être appelé dans un runtime tokio.
    ///
    /// # Arguments
    ///
    /// * `output` - Moteur de lecture
    /// * `sink` - Destinataire des évènements de tous les services
    /// * `options` - Réglages (voir [`RendererOptions`])
    ///
    /// # Errors
    ///
    /// Retourne une erreur si une table de variables est invalide.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use pmomediarenderer::{MediaRenderer, RendererOptions, output::NullOutput};
    /// use pmoupnp::events::TracingEventSink;
    ///
    /// # async fn run() -> Result<(), pmomediarenderer::RendererError> {
    /// let renderer = MediaRenderer::start(
    ///     Arc::new(NullOutput::new()),
    ///     Arc::new(TracingEventSink),
    ///     RendererOptions::default(),
    /// )?;
    /// renderer.shutdown().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn start(
        output: Arc<dyn Output>,
        sink: Arc<dyn EventSink>,
        options: RendererOptions,
    ) -> Result<Self, RendererError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let playback_tx = tx.clone();
        let metadata_tx = tx.clone();
        output.set_callbacks(
            Arc::new(move |event| {
                let _ = playback_tx.send(RendererEvent::Playback(event));
            }),
            Arc::new(move |metadata| {
                let _ = metadata_tx.send(RendererEvent::Metadata(metadata));
            }),
        );

        let mime_types = output.supported_mime_types();
        let avtransport = Arc::new(AVTransport::new(output.clone(), sink.clone(), Some(tx))?);
        let rendering_control = Arc::new(RenderingControl::new(
            output.clone(),
            sink.clone(),
            options.initial_volume,
        )?);
        let connection_manager = Arc::new(ConnectionManager::new(&mime_types, sink.clone())?);
        let playlist = Arc::new(PlaylistService::new(
            avtransport.clone(),
            sink,
            options.tracks_max,
            &sink_protocol_info(&mime_types),
            options.repeat,
        )?);

        let cancel = CancellationToken::new();
        let tasks = vec![
            spawn_event_task(rx, avtransport.clone(), playlist.clone(), cancel.clone()),
            spawn_position_poller(avtransport.clone(), options.poll_interval, cancel.clone()),
        ];

        info!(
            "🚀 MediaRenderer '{}' started on output '{}'",
            options.friendly_name,
            output.name()
        );

        Ok(Self {
            name: options.friendly_name,
            output,
            avtransport,
            rendering_control,
            connection_manager,
            playlist,
            cancel,
            tasks: Mutex::new(tasks),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> &Arc<dyn Output> {
        &self.output
    }

    pub fn avtransport(&self) -> &Arc<AVTransport> {
        &self.avtransport
    }

    pub fn rendering_control(&self) -> &Arc<RenderingControl> {
        &self.rendering_control
    }

    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }

    pub fn playlist(&self) -> &Arc<PlaylistService> {
        &self.playlist
    }

    /// Identifiants des services exposés.
    pub fn service_ids(&self) -> [&'static str; 4] {
        [
            AVTRANSPORT_SERVICE_ID,
            RENDERINGCONTROL_SERVICE_ID,
            CONNECTIONMANAGER_SERVICE_ID,
            PLAYLIST_SERVICE_ID,
        ]
    }

    /// Route une action vers le service `service_id`.
    ///
    /// Un service inconnu produit l'erreur 401 dans l'invocation.
    ///
    /// # Returns
    ///
    /// `true` si l'action a réussi.
    pub fn dispatch(&self, service_id: &str, invocation: &mut ActionInvocation) -> bool {
        match service_id {
            AVTRANSPORT_SERVICE_ID => self.avtransport.dispatch(invocation),
            RENDERINGCONTROL_SERVICE_ID => self.rendering_control.dispatch(invocation),
            CONNECTIONMANAGER_SERVICE_ID => self.connection_manager.dispatch(invocation),
            PLAYLIST_SERVICE_ID => self.playlist.dispatch(invocation),
            _ => {
                warn!("⚠️ Action for unknown service {}", service_id);
                invocation.set_error(401, &format!("Invalid Action: unknown service {}", service_id));
                false
            }
        }
    }

    /// Arrête les tâches de fond et la lecture.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!("⚠️ Renderer task ended abnormally: {}", e);
            }
        }
        if let Err(e) = self.output.stop() {
            warn!("⚠️ Output '{}' failed to stop: {}", self.output.name(), e);
        }
        info!("👋 MediaRenderer '{}' stopped", self.name);
    }
}

/// Tâche qui applique les évènements de l'`Output` et de l'AVTransport.
fn spawn_event_task(
    mut rx: UnboundedReceiver<RendererEvent>,
    avtransport: Arc<AVTransport>,
    playlist: Arc<PlaylistService>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            debug!("📨 Renderer event {:?}", event);
            match event {
                RendererEvent::Playback(playback) => {
                    avtransport.on_playback_event(playback);
                    if playback == PlaybackEvent::StartedNextStream {
                        let uri = avtransport.value(TransportVar::AVTransportURI);
                        playlist.on_stream_started(&uri);
                    }
                }
                RendererEvent::Metadata(metadata) => avtransport.on_metadata(&metadata),
                RendererEvent::TransportStateChanged(state) => playlist.on_transport_state(state),
            }
        }
        debug!("Renderer event task stopped");
    })
}
