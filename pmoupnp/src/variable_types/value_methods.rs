use std::fmt;

use crate::variable_types::{StateValue, StateValueError, StateVarType, fromstr::parse_upnp_bool};

impl StateValue {
    /// Type UPnP porté par la valeur.
    pub fn var_type(&self) -> StateVarType {
        match self {
            StateValue::UI1(_) => StateVarType::UI1,
            StateValue::UI2(_) => StateVarType::UI2,
            StateValue::UI4(_) => StateVarType::UI4,
            StateValue::I1(_) => StateVarType::I1,
            StateValue::I2(_) => StateVarType::I2,
            StateValue::I4(_) => StateVarType::I4,
            StateValue::Boolean(_) => StateVarType::Boolean,
            StateValue::String(_) => StateVarType::String,
        }
    }

    /// Parse la forme textuelle `text` selon le type déclaré `vartype`.
    ///
    /// # Errors
    ///
    /// [`StateValueError::ParseError`] si le texte n'est pas une valeur
    /// valide du type (entier hors bornes compris).
    pub fn parse(vartype: StateVarType, text: &str) -> Result<StateValue, StateValueError> {
        let trimmed = text.trim();
        let bad = |_| {
            StateValueError::ParseError(format!("'{}' is not a valid {}", text, vartype))
        };

        let value = match vartype {
            StateVarType::UI1 => StateValue::UI1(trimmed.parse().map_err(bad)?),
            StateVarType::UI2 => StateValue::UI2(trimmed.parse().map_err(bad)?),
            StateVarType::UI4 => StateValue::UI4(trimmed.parse().map_err(bad)?),
            StateVarType::I1 => StateValue::I1(trimmed.parse().map_err(bad)?),
            StateVarType::I2 => StateValue::I2(trimmed.parse().map_err(bad)?),
            StateVarType::I4 => StateValue::I4(trimmed.parse().map_err(bad)?),
            StateVarType::Boolean => StateValue::Boolean(parse_upnp_bool(trimmed)?),
            StateVarType::String => StateValue::String(text.to_string()),
        };
        Ok(value)
    }

    /// Valeur entière, quel que soit le type entier sous-jacent.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::UI1(v) => Some(*v as i64),
            StateValue::UI2(v) => Some(*v as i64),
            StateValue::UI4(v) => Some(*v as i64),
            StateValue::I1(v) => Some(*v as i64),
            StateValue::I2(v) => Some(*v as i64),
            StateValue::I4(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        assert_eq!(
            StateValue::parse(StateVarType::UI2, "100").unwrap(),
            StateValue::UI2(100)
        );
        assert_eq!(
            StateValue::parse(StateVarType::I2, "-15360").unwrap(),
            StateValue::I2(-15360)
        );
        assert!(StateValue::parse(StateVarType::UI1, "256").is_err());
        assert!(StateValue::parse(StateVarType::UI4, "-1").is_err());
        assert!(StateValue::parse(StateVarType::I4, "abc").is_err());
    }

    #[test]
    fn test_parse_booleans() {
        for t in ["1", "true", "YES"] {
            assert_eq!(
                StateValue::parse(StateVarType::Boolean, t).unwrap(),
                StateValue::Boolean(true)
            );
        }
        for f in ["0", "False", "no"] {
            assert_eq!(
                StateValue::parse(StateVarType::Boolean, f).unwrap(),
                StateValue::Boolean(false)
            );
        }
        assert!(StateValue::parse(StateVarType::Boolean, "2").is_err());
    }

    #[test]
    fn test_display_round_trip_for_bool() {
        assert_eq!(StateValue::Boolean(false).to_string(), "0");
        assert_eq!(StateValue::I4(-3).as_i64(), Some(-3));
        assert_eq!(StateValue::String("x".into()).as_i64(), None);
    }
}

/// Forme textuelle échangée sur le fil : les booléens s'écrivent `1`/`0`.
impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Boolean(b) => f.write_str(if *b { "1" } else { "0" }),
            StateValue::String(text) => f.write_str(text),
            StateValue::UI1(n) => n.fmt(f),
            StateValue::UI2(n) => n.fmt(f),
            StateValue::UI4(n) => n.fmt(f),
            StateValue::I1(n) => n.fmt(f),
            StateValue::I2(n) => n.fmt(f),
            StateValue::I4(n) => n.fmt(f),
        }
    }
}
