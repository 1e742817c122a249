use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::descriptor::BindingDescriptor;
use crate::error::BindingError;
use crate::reference::{ReferenceResolver, Resolved};

/// Non-empty key under which a binding is exposed to the worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingName(String);

impl BindingName {
    pub fn new(name: impl Into<String>) -> Result<Self, BindingError> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindingError::EmptyBindingName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for BindingName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BindingName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mapping from binding name to descriptor.
///
/// Names iterate in sorted order so serialized output is deterministic. The registry does no
/// locking; hosts that register from several threads must serialize access themselves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingRegistry {
    bindings: BTreeMap<BindingName, BindingDescriptor>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts a descriptor.
    ///
    /// # Errors
    /// [`BindingError::EmptyBindingName`], [`BindingError::DuplicateBinding`] (the first
    /// registration is kept), or any validation error from
    /// [`BindingDescriptor::validate`]. The registry is unchanged on error.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: BindingDescriptor,
    ) -> Result<(), BindingError> {
        let name = self.vacant_name(name)?;
        if let Err(err) = descriptor.validate(name.as_str()) {
            tracing::warn!(
                binding = %name,
                kind = %descriptor.kind(),
                error = %err,
                "rejected binding"
            );
            return Err(err);
        }

        tracing::debug!(binding = %name, kind = %descriptor.kind(), "registered binding");
        self.bindings.insert(name, descriptor);
        Ok(())
    }

    /// Parses an untyped descriptor and registers it.
    ///
    /// Unknown `type` tags surface as [`BindingError::UnknownVariant`].
    pub fn register_value(
        &mut self,
        name: impl Into<String>,
        descriptor: Value,
    ) -> Result<(), BindingError> {
        let name = self.vacant_name(name)?;
        let descriptor = match BindingDescriptor::from_value(name.as_str(), descriptor) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(binding = %name, error = %err, "rejected binding");
                return Err(err);
            }
        };

        tracing::debug!(binding = %name, kind = %descriptor.kind(), "registered binding");
        self.bindings.insert(name, descriptor);
        Ok(())
    }

    /// Inserts a descriptor without shape validation, leaving it to [`Self::validate_all`].
    ///
    /// Empty and duplicate names are still rejected.
    pub fn stage(
        &mut self,
        name: impl Into<String>,
        descriptor: BindingDescriptor,
    ) -> Result<(), BindingError> {
        let name = self.vacant_name(name)?;
        tracing::debug!(binding = %name, kind = %descriptor.kind(), "staged binding");
        self.bindings.insert(name, descriptor);
        Ok(())
    }

    /// Mutates a registered descriptor in place.
    ///
    /// The kind of a binding is fixed once registered: if `f` swaps in a descriptor of another
    /// kind the original is restored and [`BindingError::KindChanged`] is returned. The new
    /// contents are not validated here.
    pub fn update<F>(&mut self, name: &str, f: F) -> Result<(), BindingError>
    where
        F: FnOnce(&mut BindingDescriptor),
    {
        let descriptor = self
            .bindings
            .get_mut(name)
            .ok_or_else(|| not_found(name))?;

        let original = descriptor.clone();
        f(descriptor);

        let (from, to) = (original.kind(), descriptor.kind());
        if from != to {
            *descriptor = original;
            return Err(BindingError::KindChanged {
                name: name.to_owned(),
                from,
                to,
            });
        }

        Ok(())
    }

    /// Validates every descriptor and returns all failures in name order.
    pub fn validate_all(&self) -> Vec<(BindingName, BindingError)> {
        let failures: Vec<_> = self
            .bindings
            .iter()
            .filter_map(|(name, descriptor)| {
                descriptor
                    .validate(name.as_str())
                    .err()
                    .map(|err| (name.clone(), err))
            })
            .collect();

        if !failures.is_empty() {
            tracing::warn!(
                invalid = failures.len(),
                total = self.bindings.len(),
                "binding registry has invalid descriptors"
            );
        }

        failures
    }

    /// Produces the flat wire object `{ "name", "type", ...fields }` for one binding.
    ///
    /// # Errors
    /// [`BindingError::NotFound`] for unregistered names, otherwise any validation error of
    /// the stored descriptor.
    pub fn serialize(&self, name: &str) -> Result<Value, BindingError> {
        let (name, descriptor) = self
            .bindings
            .get_key_value(name)
            .ok_or_else(|| not_found(name))?;
        descriptor.validate(name.as_str())?;

        let value = to_wire(name, descriptor)?;
        tracing::debug!(binding = %name, kind = %descriptor.kind(), "serialized binding");
        Ok(value)
    }

    /// Parses a flat wire object back into its name and descriptor.
    pub fn deserialize(value: Value) -> Result<(BindingName, BindingDescriptor), BindingError> {
        let name = match value.get("name") {
            Some(Value::String(name)) => BindingName::new(name.clone())?,
            Some(_) => {
                return Err(BindingError::MalformedDescriptor {
                    name: String::new(),
                    reason: "`name` must be a string".to_owned(),
                });
            }
            None => return Err(BindingError::EmptyBindingName),
        };

        let descriptor = BindingDescriptor::from_value(name.as_str(), value)?;
        Ok((name, descriptor))
    }

    /// Resolves a registered binding into its runtime-facing value.
    pub fn resolve(
        &self,
        name: &str,
        resolver: &ReferenceResolver,
    ) -> Result<Resolved, BindingError> {
        let descriptor = self.get(name).ok_or_else(|| not_found(name))?;
        resolver.resolve_reference(descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&BindingDescriptor> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&BindingName, &BindingDescriptor)> {
        self.bindings.iter()
    }

    fn vacant_name(&self, name: impl Into<String>) -> Result<BindingName, BindingError> {
        let name = BindingName::new(name)?;
        if self.bindings.contains_key(&name) {
            tracing::warn!(binding = %name, "duplicate binding name");
            return Err(BindingError::DuplicateBinding {
                name: name.as_str().to_owned(),
            });
        }
        Ok(name)
    }
}

pub(crate) fn to_wire(
    name: &BindingName,
    descriptor: &BindingDescriptor,
) -> Result<Value, BindingError> {
    let mut value = descriptor.to_value()?;
    if let Value::Object(object) = &mut value {
        object.insert("name".to_owned(), Value::String(name.as_str().to_owned()));
    }
    Ok(value)
}

fn not_found(name: &str) -> BindingError {
    BindingError::NotFound {
        name: name.to_owned(),
    }
}
