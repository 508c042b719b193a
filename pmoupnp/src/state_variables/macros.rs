/// Déclare l'enum des identifiants de variables d'un service.
///
/// L'ordre des variantes donne les identifiants `0..N`. L'enum implémente
/// [`VarId`](crate::state_variables::VarId).
///
/// # Examples
///
/// ```rust
/// use pmoupnp::define_variable_ids;
/// use pmoupnp::state_variables::VarId;
///
/// define_variable_ids! {
///     pub enum MixerVar {
///         Volume,
///         Mute,
///         LastChange,
///     }
/// }
///
/// assert_eq!(MixerVar::Mute.index(), 1);
/// ```
#[macro_export]
macro_rules! define_variable_ids {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(usize)]
        $vis enum $name {
            $($variant),*
        }

        impl $crate::state_variables::VarId for $name {
            fn index(self) -> usize {
                self as usize
            }
        }
    };
}
