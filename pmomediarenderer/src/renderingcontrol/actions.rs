//! Handlers des actions RenderingControl:1.

use pmoupnp::{
    actions::{ActionEntry, ActionError, ActionInvocation},
    services::UpnpService,
    variable_types::parse_upnp_bool,
};

use crate::renderingcontrol::{
    ControlVar, RENDERINGCONTROL_SERVICE_ID, RenderingControl, VOLUME_DB_MAX, VOLUME_DB_MIN,
};

const RENDERINGCONTROL_ACTIONS: &[ActionEntry<RenderingControl>] = &[
    ActionEntry::new("ListPresets", RenderingControl::handle_list_presets),
    ActionEntry::new("SelectPreset", RenderingControl::handle_select_preset),
    ActionEntry::new("GetMute", RenderingControl::handle_get_mute),
    ActionEntry::new("SetMute", RenderingControl::handle_set_mute),
    ActionEntry::new("GetVolume", RenderingControl::handle_get_volume),
    ActionEntry::new("SetVolume", RenderingControl::handle_set_volume),
    ActionEntry::new("GetVolumeDB", RenderingControl::handle_get_volume_db),
    ActionEntry::new("SetVolumeDB", RenderingControl::handle_set_volume_db),
    ActionEntry::new("GetVolumeDBRange", RenderingControl::handle_get_volume_db_range),
    ActionEntry::new("GetLoudness", RenderingControl::handle_get_loudness),
    ActionEntry::new("SetLoudness", RenderingControl::handle_set_loudness),
];

impl UpnpService for RenderingControl {
    const SERVICE_ID: &'static str = RENDERINGCONTROL_SERVICE_ID;
    const SERVICE_TYPE: &'static str = "urn:schemas-upnp-org:service:RenderingControl:1";

    fn actions() -> &'static [ActionEntry<Self>] {
        RENDERINGCONTROL_ACTIONS
    }
}

fn bool_input(inv: &ActionInvocation, name: &str) -> Result<bool, ActionError> {
    let raw = inv.input(name)?;
    parse_upnp_bool(raw).map_err(|e| ActionError::InvalidArgs(e.to_string()))
}

impl RenderingControl {
    /// `InstanceID` et `Channel`, communs à presque toutes les actions.
    fn check_instance_and_channel(&self, inv: &ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        let channel = inv.input("Channel")?;
        self.check_input(ControlVar::ArgChannel, channel)
            .map_err(|e| ActionError::InvalidArgs(e.to_string()))
    }

    fn append(&self, inv: &mut ActionInvocation, var: ControlVar, param: &str) {
        self.state
            .read(|s| inv.append_variable(s.store(), var, param));
    }

    fn handle_list_presets(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        self.append(inv, ControlVar::PresetNameList, "CurrentPresetNameList");
        Ok(())
    }

    fn handle_select_preset(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        inv.instance_id()?;
        let preset = inv.input("PresetName")?.to_string();
        self.select_preset(&preset)
    }

    fn handle_get_mute(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        self.append(inv, ControlVar::Mute, "CurrentMute");
        Ok(())
    }

    fn handle_set_mute(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        let mute = bool_input(inv, "DesiredMute")?;
        self.set_mute(mute)
    }

    fn handle_get_volume(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        self.append(inv, ControlVar::Volume, "CurrentVolume");
        Ok(())
    }

    fn handle_set_volume(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        let volume: u16 = inv.input_as("DesiredVolume")?;
        self.set_volume(volume)
    }

    fn handle_get_volume_db(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        self.append(inv, ControlVar::VolumeDB, "CurrentVolume");
        Ok(())
    }

    fn handle_set_volume_db(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        let db256: i16 = inv.input_as("DesiredVolume")?;
        self.set_volume_db(db256)
    }

    fn handle_get_volume_db_range(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        inv.add_response("MinValue", &VOLUME_DB_MIN.to_string());
        inv.add_response("MaxValue", &VOLUME_DB_MAX.to_string());
        Ok(())
    }

    fn handle_get_loudness(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        self.append(inv, ControlVar::Loudness, "CurrentLoudness");
        Ok(())
    }

    fn handle_set_loudness(&self, inv: &mut ActionInvocation) -> Result<(), ActionError> {
        self.check_instance_and_channel(inv)?;
        let loudness = bool_input(inv, "DesiredLoudness")?;
        self.set_loudness(loudness);
        Ok(())
    }
}
