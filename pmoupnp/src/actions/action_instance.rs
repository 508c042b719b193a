use std::{collections::HashMap, str::FromStr};

use crate::{
    actions::ActionError,
    state_variables::{VarId, VariableStore},
};

/// Erreur enregistrée dans une invocation (`UPnPError`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFault {
    pub code: u16,
    pub message: String,
}

/// Une invocation d'action : arguments d'entrée, réponse, erreur éventuelle.
///
/// C'est l'unique interface entre la couche SOAP (hors de ce crate) et les
/// handlers. Les arguments sont conservés sous forme textuelle ; les
/// arguments de sortie gardent leur ordre d'ajout.
#[derive(Debug, Clone, Default)]
pub struct ActionInvocation {
    action: String,
    inputs: HashMap<String, String>,
    outputs: Vec<(String, String)>,
    fault: Option<ActionFault>,
}

impl ActionInvocation {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Default::default()
        }
    }

    /// Ajoute un argument d'entrée (forme builder).
    pub fn with_input(mut self, name: &str, value: &str) -> Self {
        self.set_input(name, value);
        self
    }

    pub fn set_input(&mut self, name: &str, value: &str) {
        self.inputs.insert(name.to_string(), value.to_string());
    }

    pub fn action_name(&self) -> &str {
        &self.action
    }

    /// Argument d'entrée `name`.
    ///
    /// # Errors
    ///
    /// [`ActionError::InvalidArgs`] si l'argument est absent.
    pub fn input(&self, name: &str) -> Result<&str, ActionError> {
        self.inputs
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ActionError::InvalidArgs(format!("missing argument {}", name)))
    }

    /// Argument d'entrée converti avec `FromStr`.
    ///
    /// # Errors
    ///
    /// [`ActionError::InvalidArgs`] si l'argument est absent ou mal formé.
    pub fn input_as<T: FromStr>(&self, name: &str) -> Result<T, ActionError> {
        let raw = self.input(name)?;
        raw.trim().parse().map_err(|_| {
            ActionError::InvalidArgs(format!("argument {} has an invalid value '{}'", name, raw))
        })
    }

    /// Vérifie l'argument `InstanceID`.
    ///
    /// Le renderer ne gère qu'une instance : seul `0` est accepté.
    ///
    /// # Errors
    ///
    /// - 402 si l'argument est absent ou non numérique
    /// - 718 si l'instance n'existe pas
    pub fn instance_id(&self) -> Result<u32, ActionError> {
        let id: u32 = self.input_as("InstanceID")?;
        if id != 0 {
            return Err(ActionError::InvalidInstanceId(id.to_string()));
        }
        Ok(id)
    }

    /// Ajoute la valeur courante d'une variable comme argument de sortie.
    pub fn append_variable(&mut self, store: &VariableStore, id: impl VarId, param: &str) {
        let value = store.value(id).to_string();
        self.add_response(param, &value);
    }

    /// Ajoute un argument de sortie calculé.
    pub fn add_response(&mut self, name: &str, value: &str) {
        self.outputs.push((name.to_string(), value.to_string()));
    }

    /// Enregistre une erreur UPnP. La dernière erreur enregistrée l'emporte.
    pub fn set_error(&mut self, code: u16, message: &str) {
        self.fault = Some(ActionFault {
            code,
            message: message.to_string(),
        });
    }

    pub fn outputs(&self) -> &[(String, String)] {
        &self.outputs
    }

    /// Valeur de l'argument de sortie `name`.
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fault(&self) -> Option<&ActionFault> {
        self.fault.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.fault.is_none()
    }
}
