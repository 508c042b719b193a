use std::convert::TryFrom;

use crate::variable_types::{StateValue, StateValueError};

macro_rules! impl_state_value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for StateValue {
                fn from(value: $ty) -> Self {
                    StateValue::$variant(value)
                }
            }

            impl TryFrom<&StateValue> for $ty {
                type Error = StateValueError;

                fn try_from(value: &StateValue) -> Result<Self, Self::Error> {
                    let n = value.as_i64().ok_or_else(|| {
                        StateValueError::TypeError(format!(
                            "Cannot cast {:?} to {}",
                            value,
                            stringify!($ty)
                        ))
                    })?;
                    <$ty>::try_from(n).map_err(|_| {
                        StateValueError::RangeError(format!(
                            "{} does not fit in {}",
                            n,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_state_value_conversions! {
    u8 => UI1,
    u16 => UI2,
    u32 => UI4,
    i8 => I1,
    i16 => I2,
    i32 => I4,
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Boolean(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::String(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::String(value)
    }
}

impl TryFrom<&StateValue> for bool {
    type Error = StateValueError;

    fn try_from(value: &StateValue) -> Result<Self, Self::Error> {
        match value {
            StateValue::Boolean(b) => Ok(*b),
            StateValue::String(s) => crate::variable_types::parse_upnp_bool(s),
            other => other
                .as_i64()
                .map(|n| n != 0)
                .ok_or_else(|| StateValueError::TypeError("Cannot cast to bool".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(StateValue::from(42u16), StateValue::UI2(42));
        assert_eq!(u8::try_from(&StateValue::I4(200)), Ok(200));
        assert!(matches!(
            u8::try_from(&StateValue::I4(-1)),
            Err(StateValueError::RangeError(_))
        ));
        assert!(i16::try_from(&StateValue::String("3".into())).is_err());
    }

    #[test]
    fn test_bool_conversions() {
        assert_eq!(bool::try_from(&StateValue::from("yes")), Ok(true));
        assert_eq!(bool::try_from(&StateValue::UI1(0)), Ok(false));
    }
}
