use serde_json::Value;

use crate::config::RegistryConfig;
use crate::descriptor::{BindingDescriptor, SelfReference, ServiceBinding};
use crate::error::BindingError;
use crate::kind::BindingKind;

/// Runtime-facing value of a binding.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    /// A value handed to the worker directly (JSON literals and text bindings).
    Literal(Value),
    /// A concrete binding the provisioning API understands.
    Binding(BindingDescriptor),
}

/// Turns reference descriptors into concrete values without touching the network.
#[derive(Clone, Debug, Default)]
pub struct ReferenceResolver {
    script_name: Option<String>,
    environment: Option<String>,
    dispatch_namespace: Option<String>,
}

impl ReferenceResolver {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            script_name: config.script_name.clone(),
            environment: config.environment.clone(),
            dispatch_namespace: config.dispatch_namespace.clone(),
        }
    }

    /// Resolves `descriptor` into the value the worker sees at runtime.
    ///
    /// A self reference becomes a service binding on the configured script. JSON literals and
    /// text bindings yield their payload. Every other descriptor is already concrete.
    pub fn resolve_reference(
        &self,
        descriptor: &BindingDescriptor,
    ) -> Result<Resolved, BindingError> {
        match descriptor {
            BindingDescriptor::SelfReference(reference) => {
                self.resolve_self(reference).map(Resolved::Binding)
            }
            BindingDescriptor::Json(binding) => Ok(Resolved::Literal(binding.json.clone())),
            BindingDescriptor::PlainText(binding) | BindingDescriptor::SecretText(binding) => {
                Ok(Resolved::Literal(Value::String(binding.text.clone())))
            }
            other => Ok(Resolved::Binding(other.clone())),
        }
    }

    /// Returns the descriptor to send to the provisioning API: references are replaced by
    /// their concrete binding, everything else passes through.
    pub fn concrete(
        &self,
        descriptor: &BindingDescriptor,
    ) -> Result<BindingDescriptor, BindingError> {
        match descriptor {
            BindingDescriptor::SelfReference(reference) => self.resolve_self(reference),
            other => Ok(other.clone()),
        }
    }

    fn resolve_self(&self, reference: &SelfReference) -> Result<BindingDescriptor, BindingError> {
        let script_name = self
            .script_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| BindingError::UnresolvedReference {
                kind: BindingKind::SelfReference,
                reason: "no script name configured".to_owned(),
            })?
            .to_owned();

        Ok(BindingDescriptor::Service(ServiceBinding {
            service: script_name,
            environment: self.environment.clone(),
            namespace: self.dispatch_namespace.clone(),
            entrypoint: reference.entrypoint.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver() -> ReferenceResolver {
        ReferenceResolver::new(
            &RegistryConfig::builder()
                .script_name("api-worker")
                .environment("staging")
                .build(),
        )
    }

    #[test]
    fn self_reference_becomes_service_binding() {
        let resolved = resolver()
            .resolve_reference(&BindingDescriptor::self_entrypoint("Admin"))
            .unwrap();

        assert_eq!(
            resolved,
            Resolved::Binding(BindingDescriptor::Service(ServiceBinding {
                service: "api-worker".into(),
                environment: Some("staging".into()),
                namespace: None,
                entrypoint: Some("Admin".into()),
            }))
        );
    }

    #[test]
    fn self_reference_needs_script_name() {
        let error = ReferenceResolver::default()
            .resolve_reference(&BindingDescriptor::self_reference())
            .unwrap_err();
        assert!(matches!(
            error,
            BindingError::UnresolvedReference {
                kind: BindingKind::SelfReference,
                ..
            }
        ));
    }

    #[test]
    fn blank_script_name_does_not_resolve() {
        for script_name in ["", "   "] {
            let resolver =
                ReferenceResolver::new(&RegistryConfig::builder().script_name(script_name).build());
            assert!(matches!(
                resolver.concrete(&BindingDescriptor::self_reference()),
                Err(BindingError::UnresolvedReference { .. })
            ));
        }
    }

    #[test]
    fn json_literal_resolves_to_its_value() {
        let value = json!({ "regions": ["wnam", "weur"], "retries": 3 });
        assert_eq!(
            resolver()
                .resolve_reference(&BindingDescriptor::json(value.clone()))
                .unwrap(),
            Resolved::Literal(value)
        );
    }

    #[test]
    fn text_bindings_resolve_to_strings() {
        assert_eq!(
            resolver()
                .resolve_reference(&BindingDescriptor::secret_text("hunter2"))
                .unwrap(),
            Resolved::Literal(json!("hunter2"))
        );
    }

    #[test]
    fn concrete_bindings_pass_through() {
        let queue = BindingDescriptor::queue("jobs");
        assert_eq!(
            resolver().resolve_reference(&queue).unwrap(),
            Resolved::Binding(queue.clone())
        );
        assert_eq!(resolver().concrete(&queue).unwrap(), queue);
    }

    #[test]
    fn concrete_keeps_json_bindings() {
        let json = BindingDescriptor::json(json!([1, 2, 3]));
        assert_eq!(resolver().concrete(&json).unwrap(), json);
    }
}
