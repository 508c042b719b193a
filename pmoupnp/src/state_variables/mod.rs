//! Variables d'état UPnP et leur stockage.
//!
//! - [`VariableMeta`] : définition statique d'une variable (nom, type,
//!   valeur par défaut, valeurs/plage autorisées, `sendEvents`)
//! - [`VariableStore`] : valeurs courantes des variables d'un service, avec
//!   détection des écritures sans effet et notification des listeners
//!
//! Les identifiants de variables sont des entiers denses `0..N`. Chaque
//! service les déclare sous la forme d'un enum (voir
//! [`define_variable_ids!`](crate::define_variable_ids)) et la table est
//! validée à la construction du store.

mod errors;
mod macros;
mod store;
mod variable_methods;

pub use errors::StateVariableError;
pub use store::VariableStore;

use crate::{value_ranges::ValueRange, variable_types::StateVarType};

/// Identifiant d'une variable dans son store.
pub trait VarId: Copy {
    fn index(self) -> usize;
}

impl VarId for usize {
    fn index(self) -> usize {
        self
    }
}

/// Définition d'une variable d'état.
#[derive(Debug, Clone)]
pub struct VariableMeta {
    id: usize,
    name: String,
    value_type: StateVarType,
    default_value: Option<String>,
    allowed_values: Vec<String>,
    value_range: Option<ValueRange>,
    send_events: bool,
}

/// Changement effectif d'une variable, tel que reçu par les listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableChange<'a> {
    pub id: usize,
    pub name: &'a str,
    pub old_value: &'a str,
    pub new_value: &'a str,
}

/// Listener de changement de variable.
///
/// Appelé de manière synchrone, sur la pile de l'appelant de
/// [`VariableStore::set`], pendant que le verrou du service est tenu.
/// Un listener observe : il ne doit ni bloquer ni faire d'entrée/sortie.
pub type VariableListener = Box<dyn Fn(&VariableChange<'_>) + Send + Sync>;
