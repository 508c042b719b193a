use std::str::FromStr;

use crate::variable_types::{StateValueError, StateVarType};

const ALL_TYPES: [StateVarType; 8] = [
    StateVarType::UI1,
    StateVarType::UI2,
    StateVarType::UI4,
    StateVarType::I1,
    StateVarType::I2,
    StateVarType::I4,
    StateVarType::Boolean,
    StateVarType::String,
];

impl FromStr for StateVarType {
    type Err = StateValueError;

    /// Relit un nom de `<dataType>` SCPD, sans tenir compte de la casse.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ALL_TYPES
            .into_iter()
            .find(|t| t.upnp_name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| StateValueError::TypeError(format!("no UPnP data type named '{}'", name)))
    }
}

/// Interprète un booléen UPnP (`1`/`0`, `true`/`false`, `yes`/`no`).
pub fn parse_upnp_bool(text: &str) -> Result<bool, StateValueError> {
    let word = text.trim();
    if ["1", "true", "yes"].iter().any(|w| word.eq_ignore_ascii_case(w)) {
        Ok(true)
    } else if ["0", "false", "no"].iter().any(|w| word.eq_ignore_ascii_case(w)) {
        Ok(false)
    } else {
        Err(StateValueError::ParseError(format!("'{}' is not a boolean", text)))
    }
}
