use crate::{
    state_variables::{VarId, VariableMeta},
    value_ranges::ValueRange,
    variable_types::{StateValue, StateValueError, StateVarType},
};

impl VariableMeta {
    /// Crée la définition d'une variable.
    ///
    /// Sans appel à [`with_default`](Self::with_default), la variable n'a
    /// pas de valeur par défaut et [`VariableStore::new`](super::VariableStore::new)
    /// la refusera.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifiant dense de la variable dans son service
    /// * `value_type` - Type UPnP déclaré
    /// * `name` - Nom UPnP (`Volume`, `TransportState`...)
    pub fn new(id: impl VarId, value_type: StateVarType, name: &str) -> Self {
        Self {
            id: id.index(),
            name: name.to_string(),
            value_type,
            default_value: None,
            allowed_values: Vec::new(),
            value_range: None,
            send_events: false,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn with_allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_range(mut self, range: ValueRange) -> Self {
        self.value_range = Some(range);
        self
    }

    /// Marque la variable comme `sendEvents="yes"`.
    pub fn evented(mut self) -> Self {
        self.send_events = true;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> StateVarType {
        self.value_type
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    pub fn value_range(&self) -> Option<&ValueRange> {
        self.value_range.as_ref()
    }

    pub fn is_evented(&self) -> bool {
        self.send_events
    }

    /// Vérifie qu'un texte est une valeur acceptable pour cette variable.
    ///
    /// Contrôle successivement le type, la liste des valeurs autorisées et la
    /// plage numérique. Le store lui-même n'applique pas ces contraintes :
    /// c'est aux handlers d'actions de valider leurs entrées.
    ///
    /// # Errors
    ///
    /// - [`StateValueError::ParseError`] si le texte n'est pas du bon type
    /// - [`StateValueError::ValidationError`] si la valeur n'est pas dans la liste
    /// - [`StateValueError::RangeError`] si la valeur sort de la plage
    pub fn validate(&self, text: &str) -> Result<StateValue, StateValueError> {
        let value = StateValue::parse(self.value_type, text)?;

        if !self.allowed_values.is_empty() && !self.allowed_values.iter().any(|v| v == text) {
            return Err(StateValueError::ValidationError(format!(
                "'{}' is not an allowed value for {} ({})",
                text,
                self.name,
                self.allowed_values.join(",")
            )));
        }

        if let (Some(range), Some(n)) = (&self.value_range, value.as_i64()) {
            if !range.is_in_range(n) {
                return Err(StateValueError::RangeError(format!(
                    "{} is outside [{}, {}] for {}",
                    n,
                    range.get_minimum(),
                    range.get_maximum(),
                    self.name
                )));
            }
        }

        Ok(value)
    }
}
