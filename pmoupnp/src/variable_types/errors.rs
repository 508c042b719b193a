use thiserror::Error;

/// Erreurs de lecture ou de validation d'une valeur de variable d'état.
///
/// Le texte porté par chaque variante est destiné aux logs ; les services
/// le traduisent en code d'erreur UPnP (402, 601...) au moment de répondre.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateValueError {
    /// Texte illisible pour le type déclaré.
    #[error("cannot parse value: {0}")]
    ParseError(String),

    /// Valeur hors de la plage `allowedValueRange`.
    #[error("value out of range: {0}")]
    RangeError(String),

    #[error("type mismatch: {0}")]
    TypeError(String),

    /// Valeur absente de `allowedValueList`.
    #[error("value not allowed: {0}")]
    ValidationError(String),
}
