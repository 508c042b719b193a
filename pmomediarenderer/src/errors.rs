use pmoupnp::{state_variables::StateVariableError, variable_types::StateValueError};
use thiserror::Error;

/// Erreurs de construction du renderer et de ses services.
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Invalid state variable table: {0}")]
    Variables(#[from] StateVariableError),

    #[error("Invalid state value: {0}")]
    Values(#[from] StateValueError),
}
