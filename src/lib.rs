//! Flarebind binding catalog crate.
//!
//! This crate models the bindings a worker script declares (key-value namespaces, queues,
//! databases, rate limiters, secrets, service references and so on) as a typed catalog,
//! validates them as a whole, and converts them to and from the flat JSON objects the script
//! provisioning API exchanges.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod kind;
pub mod provision;
pub mod reference;
pub mod registry;

pub use crate::config::{ConfigError, RegistryConfig, RegistryConfigBuilder};
pub use crate::descriptor::{BindingDescriptor, RATE_LIMIT_PERIODS};
pub use crate::error::{BindingError, FlarebindError, Result, ValidationReport};
pub use crate::kind::{BindingKind, UnknownKind};
pub use crate::reference::{ReferenceResolver, Resolved};
pub use crate::registry::{BindingName, BindingRegistry};
pub use flarebind_wire::{ApiMessage, ApiResponse, ScriptMetadata, ScriptSettings, WireError};
