use thiserror::Error;

/// Erreurs de construction d'une table de variables d'état.
///
/// Ce sont des erreurs de programmation (table statique incohérente) : elles
/// sont détectées une fois pour toutes à la création du service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateVariableError {
    #[error("Variable id {id} is out of range (table has {len} variables)")]
    IdOutOfRange { id: usize, len: usize },

    #[error("Variable id {id} is declared twice ('{first}' and '{second}')")]
    DuplicateId {
        id: usize,
        first: String,
        second: String,
    },

    #[error("Variable id {0} has no name")]
    MissingName(usize),

    #[error("Variable name '{0}' is declared twice")]
    DuplicateName(String),

    #[error("Variable '{0}' has no default value")]
    MissingDefault(String),

    #[error("Default value of '{name}' is invalid: {reason}")]
    InvalidDefault { name: String, reason: String },
}
