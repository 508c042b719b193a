mod methods;

/// Plage de valeurs autorisées d'une variable numérique (`allowedValueRange`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRange {
    min: i64,
    max: i64,
    step: Option<i64>,
}
