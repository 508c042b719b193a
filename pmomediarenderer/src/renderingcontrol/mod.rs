//! # RenderingControl Service - Volume et mute
//!
//! Service RenderingControl:1 réduit au canal `Master`. `Volume` (0..100)
//! et `VolumeDB` (1/256 dB) sont toujours écrits ensemble, dans la même
//! transaction, après que l'[`Output`] a accepté le nouveau volume.

mod actions;
mod variables;

pub use variables::{
    ControlVar, FACTORY_DEFAULTS, MASTER_CHANNEL, VOLUME_DB_MAX, VOLUME_DB_MIN, VOLUME_MAX,
    db_to_volume, volume_to_db,
};

use std::sync::Arc;

use pmoupnp::{
    actions::ActionError,
    events::{ChangeCollector, EventSink, RCS_EVENT_NAMESPACE},
    services::{ServiceMutex, ServiceState},
    state_variables::VariableStore,
    variable_types::StateValueError,
};
use tracing::{debug, info, warn};

use crate::{errors::RendererError, output::Output};

pub const RENDERINGCONTROL_SERVICE_ID: &str = "urn:upnp-org:serviceId:RenderingControl";

/// Service RenderingControl.
pub struct RenderingControl {
    state: ServiceMutex<ServiceState>,
    output: Arc<dyn Output>,
    default_volume: u16,
}

impl RenderingControl {
    /// Crée le service.
    ///
    /// Le volume et le mute initiaux sont lus sur l'`Output` ; si celui-ci
    /// ne sait pas répondre, `default_volume` est appliqué.
    pub fn new(
        output: Arc<dyn Output>,
        sink: Arc<dyn EventSink>,
        default_volume: u16,
    ) -> Result<Self, RendererError> {
        let default_volume = default_volume.min(VOLUME_MAX);
        let mut store = VariableStore::new(variables::control_variables()?)?;

        let volume = match output.volume() {
            Ok(v) => (v.clamp(0.0, 1.0) * VOLUME_MAX as f32).round() as u16,
            Err(e) => {
                warn!(
                    "⚠️ Output '{}' has no volume ({}), using {}",
                    output.name(),
                    e,
                    default_volume
                );
                if let Err(e) = output.set_volume(default_volume as f32 / VOLUME_MAX as f32) {
                    warn!("⚠️ Cannot apply initial volume: {}", e);
                }
                default_volume
            }
        };
        let mute = output.mute().unwrap_or(false);

        store.set(ControlVar::Volume, volume.to_string());
        store.set(ControlVar::VolumeDB, volume_to_db(volume).to_string());
        store.set(ControlVar::Mute, if mute { "1" } else { "0" });

        let collector = ChangeCollector::attach_ignoring(
            &mut store,
            ControlVar::LastChange,
            variables::IGNORED,
            RCS_EVENT_NAMESPACE,
            RENDERINGCONTROL_SERVICE_ID,
            sink,
        )?;

        info!("✅ RenderingControl ready (volume {})", volume);

        Ok(Self {
            state: ServiceMutex::new(ServiceState::from_parts(store, collector)),
            output,
            default_volume,
        })
    }

    pub fn value(&self, var: ControlVar) -> String {
        self.state.read(|s| s.get(var).to_string())
    }

    pub fn volume(&self) -> u16 {
        self.state
            .read(|s| s.get_as(ControlVar::Volume))
            .unwrap_or(0)
    }

    pub fn is_muted(&self) -> bool {
        self.state
            .read(|s| s.store().get_bool(ControlVar::Mute))
            .unwrap_or(false)
    }

    /// Contrôle une entrée contre la définition de la variable `var`.
    ///
    /// Une valeur hors plage donne 601, toute autre erreur 402.
    pub(crate) fn check_input(&self, var: ControlVar, text: &str) -> Result<(), ActionError> {
        self.state
            .read(|s| s.validate(var, text))
            .map(|_| ())
            .map_err(|e| match e {
                StateValueError::RangeError(msg) => ActionError::ArgumentOutOfRange(msg),
                other => ActionError::InvalidArgs(other.to_string()),
            })
    }

    /// Règle le volume (0..100).
    ///
    /// # Errors
    ///
    /// - 601 si le volume sort de la plage de `Volume`
    /// - 501 si l'`Output` refuse
    pub fn set_volume(&self, volume: u16) -> Result<(), ActionError> {
        self.check_input(ControlVar::Volume, &volume.to_string())?;
        self.apply_volume(volume, volume_to_db(volume))
    }

    /// Règle le volume en 1/256 dB.
    pub fn set_volume_db(&self, db256: i16) -> Result<(), ActionError> {
        self.check_input(ControlVar::VolumeDB, &db256.to_string())?;
        self.apply_volume(db_to_volume(db256), db256)
    }

    fn apply_volume(&self, volume: u16, db256: i16) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        self.output
            .set_volume(volume as f32 / VOLUME_MAX as f32)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        debug!("🔊 Volume {} ({} /256 dB)", volume, db256);
        state.set(ControlVar::Volume, volume.to_string());
        state.set(ControlVar::VolumeDB, db256.to_string());
        Ok(())
    }

    pub fn set_mute(&self, mute: bool) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        self.output
            .set_mute(mute)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        state.set(ControlVar::Mute, if mute { "1" } else { "0" });
        Ok(())
    }

    pub fn set_loudness(&self, loudness: bool) {
        self.state
            .lock()
            .set(ControlVar::Loudness, if loudness { "1" } else { "0" });
    }

    /// Applique un preset. Seul `FactoryDefaults` existe : volume par
    /// défaut, mute et loudness désactivés.
    pub fn select_preset(&self, name: &str) -> Result<(), ActionError> {
        if name != FACTORY_DEFAULTS {
            return Err(ActionError::InvalidArgs(format!("unknown preset {}", name)));
        }

        let mut state = self.state.lock();
        self.output
            .set_volume(self.default_volume as f32 / VOLUME_MAX as f32)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        self.output
            .set_mute(false)
            .map_err(|e| ActionError::ActionFailed(e.to_string()))?;
        state.set(ControlVar::Volume, self.default_volume.to_string());
        state.set(
            ControlVar::VolumeDB,
            volume_to_db(self.default_volume).to_string(),
        );
        state.set(ControlVar::Mute, "0");
        state.set(ControlVar::Loudness, "0");
        Ok(())
    }
}
