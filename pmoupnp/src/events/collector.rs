use std::{collections::HashSet, sync::Arc};

use quick_xml::escape::escape;
use tracing::debug;

use crate::{
    events::{EventSink, LastChangeBuilder},
    state_variables::{StateVariableError, VarId, VariableStore},
};

/// Regroupe les changements d'un service en évènements `LastChange`.
///
/// Le collecteur ne possède pas le store : il le reçoit à chaque appel, ce
/// qui lui permet d'écrire le document produit dans la variable `LastChange`
/// du même store. Voir [`ServiceState`](crate::services::ServiceState).
pub struct ChangeCollector {
    service_id: String,
    last_change_id: usize,
    ignored: HashSet<usize>,
    depth: u32,
    builder: LastChangeBuilder,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ChangeCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCollector")
            .field("service_id", &self.service_id)
            .field("last_change_id", &self.last_change_id)
            .field("ignored", &self.ignored)
            .field("depth", &self.depth)
            .finish()
    }
}

impl ChangeCollector {
    /// Attache un collecteur à `store` et publie l'état complet initial.
    ///
    /// # Arguments
    ///
    /// * `store` - Variables du service
    /// * `last_change_id` - Identifiant de la variable `LastChange`
    /// * `namespace` - Espace de noms du document `<Event>`
    /// * `service_id` - Identifiant passé au sink
    /// * `sink` - Destinataire des évènements
    ///
    /// # Errors
    ///
    /// [`StateVariableError::IdOutOfRange`] si `last_change_id` n'existe pas.
    pub fn attach(
        store: &mut VariableStore,
        last_change_id: impl VarId,
        namespace: &str,
        service_id: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, StateVariableError> {
        Self::attach_ignoring(
            store,
            last_change_id,
            std::iter::empty::<usize>(),
            namespace,
            service_id,
            sink,
        )
    }

    /// Comme [`attach`](Self::attach), en déclarant d'emblée des variables
    /// ignorées : elles n'apparaissent pas non plus dans l'évènement initial.
    pub fn attach_ignoring<I>(
        store: &mut VariableStore,
        last_change_id: impl VarId,
        ignored: impl IntoIterator<Item = I>,
        namespace: &str,
        service_id: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, StateVariableError>
    where
        I: VarId,
    {
        let last_change_id = last_change_id.index();
        if last_change_id >= store.len() {
            return Err(StateVariableError::IdOutOfRange {
                id: last_change_id,
                len: store.len(),
            });
        }

        let mut ignored: HashSet<usize> = ignored.into_iter().map(VarId::index).collect();
        ignored.insert(last_change_id);

        let mut collector = Self {
            service_id: service_id.to_string(),
            last_change_id,
            ignored,
            depth: 0,
            builder: LastChangeBuilder::new(namespace),
            sink,
        };

        for (id, name, value) in store.iter() {
            if !collector.ignored.contains(&id) {
                collector.builder.add(name, value);
            }
        }
        collector.notify(store);

        Ok(collector)
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn last_change_id(&self) -> usize {
        self.last_change_id
    }

    /// Nombre de transactions ouvertes.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Exclut une variable des évènements `LastChange`.
    pub fn add_ignore(&mut self, id: impl VarId) {
        self.ignored.insert(id.index());
    }

    pub fn is_ignored(&self, id: impl VarId) -> bool {
        self.ignored.contains(&id.index())
    }

    /// Ouvre une transaction (imbricable).
    pub fn start(&mut self) {
        self.depth += 1;
    }

    /// Ferme une transaction ; la dernière fermeture publie l'évènement.
    ///
    /// # Panics
    ///
    /// Si aucune transaction n'est ouverte.
    pub fn finish(&mut self, store: &mut VariableStore) {
        assert!(
            self.depth > 0,
            "ChangeCollector::finish() without matching start() on {}",
            self.service_id
        );
        self.depth -= 1;
        self.notify(store);
    }

    /// Enregistre le changement effectif de la variable `id`.
    pub fn receive_change(&mut self, store: &mut VariableStore, id: impl VarId) {
        let id = id.index();
        if self.ignored.contains(&id) {
            return;
        }
        let (value, name) = store.get(id);
        self.builder.add(name, value);
        self.notify(store);
    }

    fn notify(&mut self, store: &mut VariableStore) {
        if self.depth > 0 {
            return;
        }

        let document = self.builder.build();
        if document.is_empty() {
            return;
        }

        if !store.set(self.last_change_id, document.clone()) {
            return;
        }

        debug!("📤 LastChange on {}: {}", self.service_id, document);
        let escaped = escape(document.as_str()).into_owned();
        self.sink
            .notify(&self.service_id, &["LastChange"], &[escaped]);
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::{
        define_variable_ids,
        events::RCS_EVENT_NAMESPACE,
        state_variables::VariableMeta,
        variable_types::StateVarType,
    };

    define_variable_ids! {
        enum RcVar {
            Volume,
            VolumeDB,
            Mute,
            InstanceArg,
            LastChange,
        }
    }

    type Calls = Arc<Mutex<Vec<(String, Vec<String>, Vec<String>)>>>;

    fn recording_sink() -> (Arc<dyn EventSink>, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        let sink = move |service: &str, names: &[&str], values: &[String]| {
            seen.lock().push((
                service.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
                values.to_vec(),
            ));
        };
        (Arc::new(sink), calls)
    }

    fn store() -> VariableStore {
        VariableStore::new(vec![
            VariableMeta::new(RcVar::Volume, StateVarType::UI2, "Volume").with_default("50"),
            VariableMeta::new(RcVar::VolumeDB, StateVarType::I2, "VolumeDB").with_default("0"),
            VariableMeta::new(RcVar::Mute, StateVarType::Boolean, "Mute").with_default("0"),
            VariableMeta::new(RcVar::InstanceArg, StateVarType::UI4, "A_ARG_TYPE_InstanceID")
                .with_default("0"),
            VariableMeta::new(RcVar::LastChange, StateVarType::String, "LastChange")
                .with_default(""),
        ])
        .unwrap()
    }

    fn set(collector: &mut ChangeCollector, store: &mut VariableStore, id: RcVar, v: &str) {
        if store.set(id, v) {
            collector.receive_change(store, id);
        }
    }

    #[test]
    fn test_initial_full_state_sync() {
        let mut store = store();
        let (sink, calls) = recording_sink();
        ChangeCollector::attach(&mut store, RcVar::LastChange, RCS_EVENT_NAMESPACE, "RCS", sink)
            .unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        let (service, names, values) = &calls[0];
        assert_eq!(service, "RCS");
        assert_eq!(names, &vec!["LastChange".to_string()]);
        for name in ["Volume", "VolumeDB", "Mute", "A_ARG_TYPE_InstanceID"] {
            assert!(values[0].contains(name), "{} missing", name);
        }
        assert!(!values[0].contains("&lt;LastChange"));
        // Le sink reçoit le document échappé, le store la forme brute.
        assert!(values[0].starts_with("&lt;Event"));
        assert!(store.value(RcVar::LastChange).starts_with("<Event"));
    }

    #[test]
    fn test_attach_rejects_unknown_last_change() {
        let mut store = store();
        let (sink, _) = recording_sink();
        let result = ChangeCollector::attach(&mut store, 42usize, RCS_EVENT_NAMESPACE, "RCS", sink);
        assert!(matches!(
            result,
            Err(StateVariableError::IdOutOfRange { id: 42, len: 5 })
        ));
    }

    #[test]
    fn test_one_event_per_transaction() {
        let mut store = store();
        let (sink, calls) = recording_sink();
        let mut collector = ChangeCollector::attach_ignoring(
            &mut store,
            RcVar::LastChange,
            [RcVar::InstanceArg],
            RCS_EVENT_NAMESPACE,
            "RCS",
            sink,
        )
        .unwrap();
        calls.lock().clear();

        collector.start();
        set(&mut collector, &mut store, RcVar::Volume, "16");
        set(&mut collector, &mut store, RcVar::VolumeDB, "0");
        set(&mut collector, &mut store, RcVar::InstanceArg, "3");
        assert!(calls.lock().is_empty());
        collector.finish(&mut store);

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        let doc = &calls[0].2[0];
        assert!(doc.contains("Volume channel=") || doc.contains("Volume val="));
        assert_eq!(doc.matches("channel=&quot;Master&quot;").count(), 1);
        assert!(!doc.contains("A_ARG_TYPE_InstanceID"));
    }

    #[test]
    fn test_master_channel_on_volume_pair() {
        let mut store = store();
        let (sink, calls) = recording_sink();
        let mut collector =
            ChangeCollector::attach(&mut store, RcVar::LastChange, RCS_EVENT_NAMESPACE, "RCS", sink)
                .unwrap();
        calls.lock().clear();

        collector.start();
        set(&mut collector, &mut store, RcVar::Volume, "16");
        set(&mut collector, &mut store, RcVar::VolumeDB, "-256");
        collector.finish(&mut store);

        let raw = store.value(RcVar::LastChange).to_string();
        assert_eq!(calls.lock().len(), 1);
        assert_eq!(raw.matches(r#"channel="Master""#).count(), 2);
        assert!(raw.contains(r#"val="16""#));
        assert!(raw.contains(r#"val="-256""#));
    }

    #[test]
    fn test_nested_transactions_flush_on_outermost_finish() {
        let mut store = store();
        let (sink, calls) = recording_sink();
        let mut collector =
            ChangeCollector::attach(&mut store, RcVar::LastChange, RCS_EVENT_NAMESPACE, "RCS", sink)
                .unwrap();
        calls.lock().clear();

        collector.start();
        collector.start();
        collector.finish(&mut store);
        set(&mut collector, &mut store, RcVar::Mute, "1");
        assert!(calls.lock().is_empty());
        collector.finish(&mut store);

        assert_eq!(calls.lock().len(), 1);
        assert_eq!(collector.depth(), 0);
    }

    #[test]
    fn test_no_event_without_change() {
        let mut store = store();
        let (sink, calls) = recording_sink();
        let mut collector =
            ChangeCollector::attach(&mut store, RcVar::LastChange, RCS_EVENT_NAMESPACE, "RCS", sink)
                .unwrap();
        calls.lock().clear();

        collector.start();
        set(&mut collector, &mut store, RcVar::Volume, "50");
        collector.finish(&mut store);
        assert!(calls.lock().is_empty());

        collector.add_ignore(RcVar::Mute);
        collector.start();
        set(&mut collector, &mut store, RcVar::Mute, "1");
        collector.finish(&mut store);
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_change_outside_transaction_flushes_immediately() {
        let mut store = store();
        let (sink, calls) = recording_sink();
        let mut collector =
            ChangeCollector::attach(&mut store, RcVar::LastChange, RCS_EVENT_NAMESPACE, "RCS", sink)
                .unwrap();
        calls.lock().clear();

        set(&mut collector, &mut store, RcVar::Mute, "1");
        set(&mut collector, &mut store, RcVar::Mute, "0");
        assert_eq!(calls.lock().len(), 2);
    }

    #[test]
    #[should_panic(expected = "without matching start")]
    fn test_unmatched_finish_panics() {
        let mut store = store();
        let (sink, _) = recording_sink();
        let mut collector =
            ChangeCollector::attach(&mut store, RcVar::LastChange, RCS_EVENT_NAMESPACE, "RCS", sink)
                .unwrap();
        collector.finish(&mut store);
    }
}
