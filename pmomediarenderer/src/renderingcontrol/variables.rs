//! Variables d'état du service RenderingControl:1.

use pmoupnp::{
    define_variable_ids,
    state_variables::VariableMeta,
    value_ranges::ValueRange,
    variable_types::{StateValueError, StateVarType},
};

define_variable_ids! {
    pub enum ControlVar {
        PresetNameList,
        Mute,
        Volume,
        VolumeDB,
        Loudness,
        ArgChannel,
        ArgInstanceId,
        ArgPresetName,
        LastChange,
    }
}

/// Volume maximal (échelle UPnP 0..100).
pub const VOLUME_MAX: u16 = 100;
/// Bornes de `VolumeDB`, en 1/256 dB (-60 dB .. 0 dB).
pub const VOLUME_DB_MIN: i16 = -60 * 256;
pub const VOLUME_DB_MAX: i16 = 0;
/// Seul canal supporté.
pub const MASTER_CHANNEL: &str = "Master";
/// Seul preset supporté.
pub const FACTORY_DEFAULTS: &str = "FactoryDefaults";

pub(crate) const IGNORED: [ControlVar; 3] = [
    ControlVar::ArgChannel,
    ControlVar::ArgInstanceId,
    ControlVar::ArgPresetName,
];

pub(crate) fn control_variables() -> Result<Vec<VariableMeta>, StateValueError> {
    use ControlVar::*;

    Ok(vec![
        VariableMeta::new(PresetNameList, StateVarType::String, "PresetNameList")
            .with_default(FACTORY_DEFAULTS),
        VariableMeta::new(Mute, StateVarType::Boolean, "Mute").with_default("0"),
        VariableMeta::new(Volume, StateVarType::UI2, "Volume")
            .with_default("0")
            .with_range(ValueRange::new(0, VOLUME_MAX as i64)?.with_step(1)?),
        VariableMeta::new(VolumeDB, StateVarType::I2, "VolumeDB")
            .with_default("0")
            .with_range(ValueRange::new(VOLUME_DB_MIN as i64, VOLUME_DB_MAX as i64)?),
        VariableMeta::new(Loudness, StateVarType::Boolean, "Loudness").with_default("0"),
        VariableMeta::new(ArgChannel, StateVarType::String, "A_ARG_TYPE_Channel")
            .with_default(MASTER_CHANNEL)
            .with_allowed_values(&[MASTER_CHANNEL]),
        VariableMeta::new(ArgInstanceId, StateVarType::UI4, "A_ARG_TYPE_InstanceID")
            .with_default("0"),
        VariableMeta::new(ArgPresetName, StateVarType::String, "A_ARG_TYPE_PresetName")
            .with_default(FACTORY_DEFAULTS)
            .with_allowed_values(&[FACTORY_DEFAULTS]),
        VariableMeta::new(LastChange, StateVarType::String, "LastChange")
            .with_default("")
            .evented(),
    ])
}

/// Convertit un volume `0..=100` en 1/256 dB.
///
/// La courbe est `20·log10(volume / 100)`, bornée à -60 dB ; le volume nul
/// donne la borne basse.
pub fn volume_to_db(volume: u16) -> i16 {
    if volume == 0 {
        return VOLUME_DB_MIN;
    }
    let ratio = volume.min(VOLUME_MAX) as f64 / VOLUME_MAX as f64;
    let db256 = (20.0 * ratio.log10() * 256.0).round();
    db256.clamp(VOLUME_DB_MIN as f64, VOLUME_DB_MAX as f64) as i16
}

/// Conversion inverse de [`volume_to_db`].
pub fn db_to_volume(db256: i16) -> u16 {
    let db256 = db256.clamp(VOLUME_DB_MIN, VOLUME_DB_MAX);
    if db256 == VOLUME_DB_MIN {
        return 0;
    }
    let ratio = 10f64.powf(db256 as f64 / 256.0 / 20.0);
    (ratio * VOLUME_MAX as f64).round().clamp(0.0, VOLUME_MAX as f64) as u16
}
