//! Types des variables d'état UPnP.
//!
//! Une variable d'état UPnP est stockée sous sa forme textuelle (c'est ce qui
//! circule dans les événements et les réponses SOAP), mais elle est déclarée
//! avec un type ([`StateVarType`]). [`StateValue`] est l'union étiquetée qui
//! permet de manipuler ces valeurs de façon typée avant de les écrire.
//!
//! # Examples
//!
//! ```rust
//! use pmoupnp::variable_types::{StateValue, StateVarType};
//!
//! let v = StateValue::parse(StateVarType::UI2, "42").unwrap();
//! assert_eq!(v, StateValue::UI2(42));
//! assert_eq!(StateValue::Boolean(true).to_string(), "1");
//! ```

mod conversions;
mod errors;
mod fromstr;
mod type_methods;
mod value_methods;

pub use errors::StateValueError;
pub use fromstr::parse_upnp_bool;

/// Types de données UPnP supportés par le renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVarType {
    UI1,     // Unsigned 8-bit integer
    UI2,     // Unsigned 16-bit integer
    UI4,     // Unsigned 32-bit integer
    I1,      // Signed 8-bit integer
    I2,      // Signed 16-bit integer
    I4,      // Signed 32-bit integer
    Boolean, // Boolean value
    String,  // Character string
}

/// Valeur typée d'une variable d'état.
#[derive(Clone, Debug, PartialEq)]
pub enum StateValue {
    UI1(u8),
    UI2(u16),
    UI4(u32),
    I1(i8),
    I2(i16),
    I4(i32),
    Boolean(bool),
    String(String),
}
