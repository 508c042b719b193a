//! # pmoupnp - Cœur d'état des services UPnP
//!
//! Ce crate fournit les briques communes aux services UPnP AV du renderer :
//!
//! - [`variable_types`] et [`value_ranges`] : types UPnP et contraintes de valeur
//! - [`state_variables`] : définitions de variables et [`VariableStore`](state_variables::VariableStore)
//! - [`events`] : construction et collecte des évènements `LastChange`
//! - [`services`] : état de service, verrou transactionnel, dispatch des actions
//! - [`actions`] : contrat d'invocation des handlers et erreurs UPnP
//!
//! Le protocole réseau (SOAP, GENA, SSDP) n'est pas dans ce crate : il
//! consomme [`actions::ActionInvocation`] et implémente [`events::EventSink`].
//!
//! ## Exemple
//!
//! ```rust
//! use std::sync::Arc;
//! use pmoupnp::define_variable_ids;
//! use pmoupnp::events::{TracingEventSink, RCS_EVENT_NAMESPACE};
//! use pmoupnp::services::{ServiceMutex, ServiceState};
//! use pmoupnp::state_variables::VariableMeta;
//! use pmoupnp::variable_types::StateVarType;
//!
//! define_variable_ids! {
//!     pub enum Var { Volume, LastChange }
//! }
//!
//! let state = ServiceState::new(
//!     vec![
//!         VariableMeta::new(Var::Volume, StateVarType::UI2, "Volume").with_default("0"),
//!         VariableMeta::new(Var::LastChange, StateVarType::String, "LastChange").with_default(""),
//!     ],
//!     Var::LastChange,
//!     std::iter::empty::<Var>(),
//!     RCS_EVENT_NAMESPACE,
//!     "RenderingControl",
//!     Arc::new(TracingEventSink),
//! )
//! .unwrap();
//!
//! let service = ServiceMutex::new(state);
//! service.lock().set(Var::Volume, "30");
//! ```

pub mod actions;
pub mod events;
pub mod services;
pub mod state_variables;
pub mod value_ranges;
pub mod variable_types;
