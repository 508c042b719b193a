use std::fmt;

use crate::variable_types::StateVarType;

impl StateVarType {
    /// Nom du type tel qu'il apparaît dans `<dataType>` d'un SCPD.
    pub fn upnp_name(&self) -> &'static str {
        match self {
            StateVarType::UI1 => "ui1",
            StateVarType::UI2 => "ui2",
            StateVarType::UI4 => "ui4",
            StateVarType::I1 => "i1",
            StateVarType::I2 => "i2",
            StateVarType::I4 => "i4",
            StateVarType::Boolean => "boolean",
            StateVarType::String => "string",
        }
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(self, StateVarType::I1 | StateVarType::I2 | StateVarType::I4)
    }

    pub fn is_unsigned_int(&self) -> bool {
        matches!(self, StateVarType::UI1 | StateVarType::UI2 | StateVarType::UI4)
    }

    /// Bornes naturelles du type entier, `None` pour les autres types.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            StateVarType::UI1 => Some((0, u8::MAX as i64)),
            StateVarType::UI2 => Some((0, u16::MAX as i64)),
            StateVarType::UI4 => Some((0, u32::MAX as i64)),
            StateVarType::I1 => Some((i8::MIN as i64, i8::MAX as i64)),
            StateVarType::I2 => Some((i16::MIN as i64, i16::MAX as i64)),
            StateVarType::I4 => Some((i32::MIN as i64, i32::MAX as i64)),
            _ => None,
        }
    }
}

impl fmt::Display for StateVarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.upnp_name())
    }
}
