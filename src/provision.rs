use flarebind_wire::{ApiResponse, ScriptMetadata, ScriptSettings};

use crate::error::{Result, ValidationReport};
use crate::reference::ReferenceResolver;
use crate::registry::{BindingRegistry, to_wire};

impl BindingRegistry {
    /// Builds the outbound upload metadata for every registered binding.
    ///
    /// All descriptors are validated first; if any fail the whole report is returned so the
    /// caller can fix everything in one go. Self references are replaced by the concrete
    /// service binding they point at.
    pub fn to_metadata(&self, resolver: &ReferenceResolver) -> Result<ScriptMetadata> {
        let failures = self.validate_all();
        if !failures.is_empty() {
            let failures = failures
                .into_iter()
                .map(|(name, err)| (name.as_str().to_owned(), err))
                .collect();
            return Err(ValidationReport::new(failures).into());
        }

        let mut bindings = Vec::with_capacity(self.len());
        for (name, descriptor) in self.iter() {
            if descriptor.kind().is_reference() {
                let concrete = resolver.concrete(descriptor)?;
                concrete.validate(name.as_str())?;
                bindings.push(to_wire(name, &concrete)?);
            } else {
                bindings.push(to_wire(name, descriptor)?);
            }
        }

        tracing::debug!(bindings = bindings.len(), "built script metadata");
        Ok(ScriptMetadata::new(bindings))
    }

    /// Rebuilds a registry from the bindings echoed back by the provisioning API.
    ///
    /// # Errors
    /// [`crate::FlarebindError::Wire`] when the API reported failure or the payload has no
    /// settings, [`crate::FlarebindError::Binding`] for the first entry that does not parse or
    /// repeats a name.
    pub fn from_acknowledgment(response: ApiResponse) -> Result<Self> {
        let settings = ScriptSettings::from_response(response)?;

        let mut registry = BindingRegistry::new();
        for entry in settings.bindings {
            let (name, descriptor) = BindingRegistry::deserialize(entry)?;
            registry.stage(name.as_str(), descriptor)?;
        }

        tracing::debug!(bindings = registry.len(), "read acknowledged bindings");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::descriptor::{BindingDescriptor, D1Binding};
    use crate::error::{BindingError, FlarebindError};
    use flarebind_wire::{ApiMessage, WireError};
    use serde_json::json;

    fn resolver() -> ReferenceResolver {
        ReferenceResolver::new(&RegistryConfig::builder().script_name("api-worker").build())
    }

    #[test]
    fn metadata_lists_flat_bindings_in_name_order() {
        let mut registry = BindingRegistry::new();
        registry
            .register("QUEUE", BindingDescriptor::queue("jobs"))
            .unwrap();
        registry
            .register("CACHE", BindingDescriptor::kv_namespace("kv-id"))
            .unwrap();
        registry
            .register("ADMIN", BindingDescriptor::self_entrypoint("Admin"))
            .unwrap();

        let metadata = registry.to_metadata(&resolver()).unwrap();
        assert_eq!(
            metadata.bindings,
            vec![
                json!({
                    "name": "ADMIN",
                    "type": "service",
                    "service": "api-worker",
                    "entrypoint": "Admin"
                }),
                json!({ "name": "CACHE", "type": "kv_namespace", "namespace_id": "kv-id" }),
                json!({ "name": "QUEUE", "type": "queue", "queue_name": "jobs" }),
            ]
        );
    }

    #[test]
    fn metadata_reports_all_invalid_bindings() {
        let mut registry = BindingRegistry::new();
        registry.stage("A", BindingDescriptor::queue("")).unwrap();
        registry
            .stage("B", BindingDescriptor::rate_limit("1001", 1, 5))
            .unwrap();

        match registry.to_metadata(&resolver()) {
            Err(FlarebindError::Validation(report)) => assert_eq!(report.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn metadata_fails_on_unresolvable_self_reference() {
        let mut registry = BindingRegistry::new();
        registry
            .register("SELF", BindingDescriptor::self_reference())
            .unwrap();

        assert!(matches!(
            registry.to_metadata(&ReferenceResolver::default()),
            Err(FlarebindError::Binding(BindingError::UnresolvedReference { .. }))
        ));
    }

    #[test]
    fn metadata_rejects_self_reference_with_empty_script_name() {
        let mut registry = BindingRegistry::new();
        registry
            .register("SELF", BindingDescriptor::self_reference())
            .unwrap();

        let resolver = ReferenceResolver::new(&RegistryConfig::builder().script_name("").build());
        assert!(matches!(
            registry.to_metadata(&resolver),
            Err(FlarebindError::Binding(BindingError::UnresolvedReference { .. }))
        ));
    }

    #[test]
    fn acknowledgment_rebuilds_registry() {
        let response = ApiResponse::ok(json!({
            "bindings": [
                { "name": "CACHE", "type": "kv_namespace", "namespace_id": "kv-id" },
                { "name": "LIMITER", "type": "ratelimit", "namespace_id": "1001",
                  "simple": { "limit": 100, "period": 60 } },
                { "name": "CONFIG", "type": "json", "json": { "a": [1, { "b": null }] } }
            ]
        }));

        let registry = BindingRegistry::from_acknowledgment(response).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get("LIMITER"),
            Some(&BindingDescriptor::rate_limit("1001", 100, 60))
        );
        assert_eq!(
            registry.get("CONFIG"),
            Some(&BindingDescriptor::json(json!({ "a": [1, { "b": null }] })))
        );
    }

    #[test]
    fn acknowledgment_round_trips_outbound_metadata() {
        let mut registry = BindingRegistry::new();
        registry
            .register("DB", BindingDescriptor::D1(D1Binding { id: "d1".into() }))
            .unwrap();
        registry
            .register("GREETING", BindingDescriptor::plain_text("hi"))
            .unwrap();

        let metadata = registry.to_metadata(&resolver()).unwrap();
        let response = ApiResponse::ok(json!({ "bindings": metadata.bindings }));

        assert_eq!(BindingRegistry::from_acknowledgment(response).unwrap(), registry);
    }

    #[test]
    fn acknowledgment_rejects_duplicate_names() {
        let response = ApiResponse::ok(json!({
            "bindings": [
                { "name": "AI", "type": "ai" },
                { "name": "AI", "type": "ai" }
            ]
        }));

        assert!(matches!(
            BindingRegistry::from_acknowledgment(response),
            Err(FlarebindError::Binding(BindingError::DuplicateBinding { .. }))
        ));
    }

    #[test]
    fn acknowledgment_surfaces_unknown_types() {
        let response = ApiResponse::ok(json!({
            "bindings": [{ "name": "X", "type": "quantum_link" }]
        }));

        assert!(matches!(
            BindingRegistry::from_acknowledgment(response),
            Err(FlarebindError::Binding(BindingError::UnknownVariant { .. }))
        ));
    }

    #[test]
    fn failed_acknowledgment_is_wire_error() {
        let response = ApiResponse {
            success: false,
            errors: vec![ApiMessage {
                code: 10021,
                message: "binding LIMITER is invalid".into(),
            }],
            messages: Vec::new(),
            result: serde_json::Value::Null,
        };

        assert!(matches!(
            BindingRegistry::from_acknowledgment(response),
            Err(FlarebindError::Wire(WireError::ApiFailure { .. }))
        ));
    }
}
