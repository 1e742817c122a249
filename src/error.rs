use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::kind::BindingKind;
use flarebind_wire::WireError;

pub type Result<T> = std::result::Result<T, FlarebindError>;

#[derive(Debug, Error)]
pub enum FlarebindError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Validation(#[from] ValidationReport),
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Configuration errors raised for a single binding.
///
/// Every variant is deterministic and none are retryable: they describe caller input, not
/// transient conditions.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("binding name must not be empty")]
    EmptyBindingName,
    #[error("binding `{name}` is already registered")]
    DuplicateBinding { name: String },
    #[error("binding `{name}` has unknown type `{kind}`")]
    UnknownVariant { name: String, kind: String },
    #[error("binding `{name}` ({kind}) is missing required field `{field}`")]
    MissingField {
        name: String,
        kind: BindingKind,
        field: &'static str,
    },
    #[error("binding `{name}` has invalid `{field}` value {value}; expected one of {expected}")]
    InvalidEnumValue {
        name: String,
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("binding `{name}` is malformed: {reason}")]
    MalformedDescriptor { name: String, reason: String },
    #[error("binding `{name}` not found")]
    NotFound { name: String },
    #[error("binding `{name}` cannot change type from {from} to {to}")]
    KindChanged {
        name: String,
        from: BindingKind,
        to: BindingKind,
    },
    #[error("cannot resolve {kind} reference: {reason}")]
    UnresolvedReference { kind: BindingKind, reason: String },
    #[error("invalid binding payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BindingError {
    /// Indicates whether the error describes a descriptor shape mismatch, as opposed to a
    /// lookup failure or a registry conflict.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BindingError::UnknownVariant { .. }
                | BindingError::MissingField { .. }
                | BindingError::InvalidEnumValue { .. }
                | BindingError::MalformedDescriptor { .. }
        )
    }
}

/// Every validation failure found in one pass over a registry, in binding name order.
#[derive(Debug, Default)]
pub struct ValidationReport {
    failures: Vec<(String, BindingError)>,
}

impl ValidationReport {
    pub(crate) fn new(failures: Vec<(String, BindingError)>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[(String, BindingError)] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<(String, BindingError)> {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid binding(s)", self.failures.len())?;
        for (_, error) in &self.failures {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
