use std::{str::FromStr, sync::Arc};

use crate::{
    events::{ChangeCollector, EventSink},
    services::Evented,
    state_variables::{StateVariableError, VarId, VariableMeta, VariableStore},
    variable_types::{StateValue, StateValueError},
};

/// Variables d'un service et leur collecteur `LastChange`.
///
/// Toute écriture passe par [`set`](Self::set) : le store notifie d'abord
/// ses listeners, puis le collecteur reçoit le changement.
#[derive(Debug)]
pub struct ServiceState {
    store: VariableStore,
    collector: ChangeCollector,
}

impl ServiceState {
    /// Construit le store et y attache le collecteur.
    ///
    /// # Arguments
    ///
    /// * `variables` - Définitions des variables du service
    /// * `last_change_id` - Variable recevant les documents `LastChange`
    /// * `ignored` - Variables jamais publiées (arguments, positions...)
    /// * `namespace` - Espace de noms de l'évènement
    /// * `service_id` - Identifiant passé au sink
    /// * `sink` - Destinataire des évènements
    pub fn new<I: VarId>(
        variables: Vec<VariableMeta>,
        last_change_id: impl VarId,
        ignored: impl IntoIterator<Item = I>,
        namespace: &str,
        service_id: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, StateVariableError> {
        let mut store = VariableStore::new(variables)?;
        let collector = ChangeCollector::attach_ignoring(
            &mut store,
            last_change_id,
            ignored,
            namespace,
            service_id,
            sink,
        )?;
        Ok(Self { store, collector })
    }

    /// Construit l'état à partir d'un store déjà préparé (listeners
    /// enregistrés par exemple).
    pub fn from_parts(store: VariableStore, collector: ChangeCollector) -> Self {
        Self { store, collector }
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn collector(&self) -> &ChangeCollector {
        &self.collector
    }

    pub fn get(&self, id: impl VarId) -> &str {
        self.store.value(id)
    }

    pub fn get_as<T: FromStr>(&self, id: impl VarId) -> Option<T> {
        self.store.get_as(id)
    }

    /// Contrôle `text` contre le type, la liste et la plage déclarés pour
    /// la variable `id`, sans rien écrire.
    pub fn validate(&self, id: impl VarId, text: &str) -> Result<StateValue, StateValueError> {
        self.store.meta(id).validate(text)
    }

    /// Écrit une variable et transmet le changement au collecteur.
    pub fn set(&mut self, id: impl VarId, value: impl Into<String>) -> bool {
        let changed = self.store.set(id, value);
        if changed {
            self.collector.receive_change(&mut self.store, id);
        }
        changed
    }

    pub fn set_value(&mut self, id: impl VarId, value: &StateValue) -> bool {
        self.set(id, value.to_string())
    }

    pub fn add_ignore(&mut self, id: impl VarId) {
        self.collector.add_ignore(id);
    }

    pub fn start(&mut self) {
        self.collector.start();
    }

    pub fn finish(&mut self) {
        self.collector.finish(&mut self.store);
    }

    /// Exécute `f` dans une transaction.
    pub fn transaction<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.start();
        let result = f(self);
        self.finish();
        result
    }
}

impl Evented for ServiceState {
    fn start_transaction(&mut self) {
        self.start();
    }

    fn finish_transaction(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::{
        define_variable_ids,
        events::AVT_EVENT_NAMESPACE,
        services::ServiceMutex,
        variable_types::StateVarType,
    };

    define_variable_ids! {
        enum Var {
            TransportState,
            RelTime,
            LastChange,
        }
    }

    fn state(calls: Arc<Mutex<Vec<String>>>) -> ServiceState {
        let sink = move |_: &str, _: &[&str], values: &[String]| {
            calls.lock().push(values[0].clone());
        };
        ServiceState::new(
            vec![
                VariableMeta::new(Var::TransportState, StateVarType::String, "TransportState")
                    .with_default("STOPPED")
                    .with_allowed_values(&["STOPPED", "PLAYING", "TRANSITIONING"]),
                VariableMeta::new(Var::RelTime, StateVarType::String, "RelativeTimePosition")
                    .with_default("0:00:00"),
                VariableMeta::new(Var::LastChange, StateVarType::String, "LastChange")
                    .with_default(""),
            ],
            Var::LastChange,
            [Var::RelTime],
            AVT_EVENT_NAMESPACE,
            "AVTransport",
            Arc::new(sink),
        )
        .unwrap()
    }

    #[test]
    fn test_guard_is_a_transaction() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let service = ServiceMutex::new(state(calls.clone()));
        assert_eq!(calls.lock().len(), 1);

        {
            let mut guard = service.lock();
            assert!(guard.set(Var::TransportState, "TRANSITIONING"));
            assert!(guard.set(Var::TransportState, "PLAYING"));
            assert!(guard.set(Var::RelTime, "0:00:03"));
            assert_eq!(calls.lock().len(), 1);
        }

        let calls = calls.lock();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].contains("PLAYING"));
        assert!(!calls[1].contains("TRANSITIONING"));
        assert!(!calls[1].contains("RelativeTimePosition"));
    }

    #[test]
    fn test_ignored_only_transaction_is_silent() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut state = state(calls.clone());

        state.transaction(|s| {
            s.set(Var::RelTime, "0:00:01");
        });
        assert_eq!(calls.lock().len(), 1);
        assert_eq!(state.get(Var::RelTime), "0:00:01");
        assert_eq!(state.collector().depth(), 0);
    }

    #[test]
    fn test_validate_uses_declared_values() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = state(calls.clone());

        assert!(state.validate(Var::TransportState, "PLAYING").is_ok());
        assert!(matches!(
            state.validate(Var::TransportState, "RECORDING"),
            Err(StateValueError::ValidationError(_))
        ));
        // Valider n'écrit rien.
        assert_eq!(state.get(Var::TransportState), "STOPPED");
        assert_eq!(calls.lock().len(), 1);
    }
}
