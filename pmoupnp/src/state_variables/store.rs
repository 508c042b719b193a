use std::{collections::HashMap, str::FromStr};

use tracing::trace;

use crate::{
    state_variables::{StateVariableError, VarId, VariableChange, VariableListener, VariableMeta},
    variable_types::{StateValue, StateValueError, parse_upnp_bool},
};

/// Valeurs courantes des variables d'état d'un service.
///
/// Le store garde chaque valeur sous sa forme textuelle UPnP. Une écriture
/// identique octet pour octet à la valeur courante est ignorée ; sinon les
/// listeners sont appelés dans leur ordre d'enregistrement.
pub struct VariableStore {
    metas: Vec<VariableMeta>,
    values: Vec<String>,
    by_name: HashMap<String, usize>,
    listeners: Vec<VariableListener>,
}

impl std::fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableStore")
            .field("values", &self.iter().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl VariableStore {
    /// Construit un store à partir des définitions de variables.
    ///
    /// Les définitions peuvent être fournies dans n'importe quel ordre, mais
    /// leurs identifiants doivent couvrir exactement `0..N`. Chaque variable
    /// démarre avec sa valeur par défaut.
    ///
    /// # Errors
    ///
    /// Une [`StateVariableError`] décrivant la première incohérence trouvée :
    /// identifiant hors plage ou dupliqué, nom vide ou dupliqué, valeur par
    /// défaut absente ou d'un type incorrect.
    pub fn new(definitions: Vec<VariableMeta>) -> Result<Self, StateVariableError> {
        let len = definitions.len();
        let mut slots: Vec<Option<VariableMeta>> = vec![None; len];
        let mut by_name = HashMap::with_capacity(len);

        for meta in definitions {
            let id = meta.id();
            if id >= len {
                return Err(StateVariableError::IdOutOfRange { id, len });
            }
            if meta.name().is_empty() {
                return Err(StateVariableError::MissingName(id));
            }
            if let Some(previous) = &slots[id] {
                return Err(StateVariableError::DuplicateId {
                    id,
                    first: previous.name().to_string(),
                    second: meta.name().to_string(),
                });
            }
            if by_name.insert(meta.name().to_string(), id).is_some() {
                return Err(StateVariableError::DuplicateName(meta.name().to_string()));
            }

            let default = meta
                .default_value()
                .ok_or_else(|| StateVariableError::MissingDefault(meta.name().to_string()))?;
            if let Err(e) = StateValue::parse(meta.value_type(), default) {
                return Err(StateVariableError::InvalidDefault {
                    name: meta.name().to_string(),
                    reason: e.to_string(),
                });
            }

            slots[id] = Some(meta);
        }

        // Tous les ids sont dans 0..len et aucun n'est dupliqué : chaque
        // case est remplie.
        let metas: Vec<VariableMeta> = slots.into_iter().flatten().collect();
        let values = metas
            .iter()
            .map(|m| m.default_value().unwrap_or_default().to_string())
            .collect();

        Ok(Self {
            metas,
            values,
            by_name,
            listeners: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    /// Retourne `(valeur, nom)` de la variable `id`.
    ///
    /// # Panics
    ///
    /// Si `id` n'appartient pas à la table.
    pub fn get(&self, id: impl VarId) -> (&str, &str) {
        let i = id.index();
        (&self.values[i], self.metas[i].name())
    }

    /// Valeur courante de la variable `id`.
    pub fn value(&self, id: impl VarId) -> &str {
        &self.values[id.index()]
    }

    /// Nom de la variable `id`.
    pub fn name(&self, id: impl VarId) -> &str {
        self.metas[id.index()].name()
    }

    /// Définition de la variable `id`.
    pub fn meta(&self, id: impl VarId) -> &VariableMeta {
        &self.metas[id.index()]
    }

    /// Recherche une variable par son nom UPnP.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Valeur courante convertie avec `FromStr`.
    pub fn get_as<T: FromStr>(&self, id: impl VarId) -> Option<T> {
        self.value(id).trim().parse().ok()
    }

    /// Valeur courante interprétée comme un booléen UPnP.
    pub fn get_bool(&self, id: impl VarId) -> Result<bool, StateValueError> {
        parse_upnp_bool(self.value(id))
    }

    /// Écrit une nouvelle valeur.
    ///
    /// # Returns
    ///
    /// `false` si la valeur était déjà identique (aucun listener appelé),
    /// `true` sinon.
    pub fn set(&mut self, id: impl VarId, new_value: impl Into<String>) -> bool {
        let i = id.index();
        let new_value = new_value.into();
        if self.values[i] == new_value {
            return false;
        }

        let old_value = std::mem::replace(&mut self.values[i], new_value);
        trace!(
            "🔄 {} : '{}' -> '{}'",
            self.metas[i].name(),
            old_value,
            self.values[i]
        );

        let change = VariableChange {
            id: i,
            name: self.metas[i].name(),
            old_value: &old_value,
            new_value: &self.values[i],
        };
        for listener in &self.listeners {
            listener(&change);
        }
        true
    }

    /// Écrit une valeur typée sous sa forme textuelle UPnP.
    pub fn set_value(&mut self, id: impl VarId, value: &StateValue) -> bool {
        self.set(id, value.to_string())
    }

    /// Ajoute un listener appelé à chaque changement effectif.
    ///
    /// Il n'existe pas de désinscription : un listener vit aussi longtemps
    /// que le store.
    pub fn register_listener<F>(&mut self, listener: F)
    where
        F: Fn(&VariableChange<'_>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Itère sur `(id, nom, valeur)` dans l'ordre des identifiants.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.metas
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .map(|(i, (m, v))| (i, m.name(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{define_variable_ids, variable_types::StateVarType};

    define_variable_ids! {
        enum TestVar {
            Volume,
            Mute,
            Uri,
        }
    }

    fn test_store() -> VariableStore {
        VariableStore::new(vec![
            VariableMeta::new(TestVar::Uri, StateVarType::String, "AVTransportURI").with_default(""),
            VariableMeta::new(TestVar::Volume, StateVarType::UI2, "Volume").with_default("50"),
            VariableMeta::new(TestVar::Mute, StateVarType::Boolean, "Mute").with_default("0"),
        ])
        .unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let mut store = test_store();
        assert_eq!(store.get(TestVar::Volume), ("50", "Volume"));

        assert!(store.set(TestVar::Volume, "70"));
        assert_eq!(store.value(TestVar::Volume), "70");
        assert_eq!(store.get_as::<u16>(TestVar::Volume), Some(70));
        assert_eq!(store.find("Mute"), Some(TestVar::Mute as usize));
        assert!(!store.get_bool(TestVar::Mute).unwrap());
    }

    #[test]
    fn test_same_value_fires_listeners_once() {
        let mut store = test_store();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        store.register_listener(move |c| {
            seen.lock().unwrap().push((
                c.id,
                c.name.to_string(),
                c.old_value.to_string(),
                c.new_value.to_string(),
            ));
        });

        assert!(store.set(TestVar::Uri, "http://a/b.flac"));
        assert!(!store.set(TestVar::Uri, "http://a/b.flac"));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            (
                2,
                "AVTransportURI".to_string(),
                String::new(),
                "http://a/b.flac".to_string()
            )
        );
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let mut store = test_store();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = order.clone();
            store.register_listener(move |_| order.lock().unwrap().push(tag));
        }

        store.set_value(TestVar::Mute, &StateValue::Boolean(true));
        assert_eq!(store.value(TestVar::Mute), "1");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_construction_errors() {
        let missing_default = VariableStore::new(vec![VariableMeta::new(
            0usize,
            StateVarType::String,
            "Foo",
        )]);
        assert_eq!(
            missing_default.unwrap_err(),
            StateVariableError::MissingDefault("Foo".into())
        );

        let hole = VariableStore::new(vec![
            VariableMeta::new(0usize, StateVarType::String, "A").with_default(""),
            VariableMeta::new(2usize, StateVarType::String, "B").with_default(""),
        ]);
        assert!(matches!(
            hole,
            Err(StateVariableError::IdOutOfRange { id: 2, len: 2 })
        ));

        let twice = VariableStore::new(vec![
            VariableMeta::new(0usize, StateVarType::String, "A").with_default(""),
            VariableMeta::new(1usize, StateVarType::String, "A").with_default(""),
        ]);
        assert!(matches!(twice, Err(StateVariableError::DuplicateName(_))));

        let bad_default = VariableStore::new(vec![
            VariableMeta::new(0usize, StateVarType::UI1, "Volume").with_default("300"),
        ]);
        assert!(matches!(
            bad_default,
            Err(StateVariableError::InvalidDefault { .. })
        ));
    }
}
