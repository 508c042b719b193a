use crate::actions::{ActionError, ActionInvocation};

/// Handler d'une action pour le service `S`.
pub type ActionHandler<S> = fn(&S, &mut ActionInvocation) -> Result<(), ActionError>;

/// Entrée de la table d'actions d'un service.
///
/// Les tables sont des tranches `const`, énumérables à la compilation :
///
/// ```rust,ignore
/// const ACTIONS: &[ActionEntry<AVTransport>] = &[
///     ActionEntry::new("Play", AVTransport::handle_play),
///     ActionEntry::new("Stop", AVTransport::handle_stop),
/// ];
/// ```
pub struct ActionEntry<S> {
    pub name: &'static str,
    pub handler: ActionHandler<S>,
}

impl<S> ActionEntry<S> {
    pub const fn new(name: &'static str, handler: ActionHandler<S>) -> Self {
        Self { name, handler }
    }
}

impl<S> std::fmt::Debug for ActionEntry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEntry")
            .field("name", &self.name)
            .finish()
    }
}
