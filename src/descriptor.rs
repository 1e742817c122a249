use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::BindingError;
use crate::kind::BindingKind;

/// Periods (in seconds) accepted by the simple rate limiter.
pub const RATE_LIMIT_PERIODS: [u32; 2] = [10, 60];

const RATE_LIMIT_PERIODS_EXPECTED: &str = "10, 60";
const JURISDICTIONS: [&str; 3] = ["default", "eu", "fedramp"];
const KEY_FORMATS: [&str; 4] = ["raw", "pkcs8", "spki", "jwk"];
const KEY_USAGES: [&str; 8] = [
    "encrypt",
    "decrypt",
    "sign",
    "verify",
    "deriveKey",
    "deriveBits",
    "wrapKey",
    "unwrapKey",
];

/// Structured configuration describing one binding.
///
/// The serde representation is the flat wire object minus its `name`: a `type` tag followed
/// by the fields of the selected variant. Optional fields are left out when unset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BindingDescriptor {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "analytics_engine")]
    AnalyticsEngine(AnalyticsEngineBinding),
    #[serde(rename = "assets")]
    Assets,
    #[serde(rename = "browser")]
    Browser,
    #[serde(rename = "d1")]
    D1(D1Binding),
    #[serde(rename = "dispatch_namespace")]
    DispatchNamespace(DispatchNamespaceBinding),
    #[serde(rename = "durable_object_namespace")]
    DurableObjectNamespace(DurableObjectNamespaceBinding),
    #[serde(rename = "hyperdrive")]
    Hyperdrive(HyperdriveBinding),
    #[serde(rename = "images")]
    Images,
    #[serde(rename = "json")]
    Json(JsonBinding),
    #[serde(rename = "kv_namespace")]
    KvNamespace(KvNamespaceBinding),
    #[serde(rename = "mtls_certificate")]
    MtlsCertificate(MtlsCertificateBinding),
    #[serde(rename = "pipelines")]
    Pipelines(PipelineBinding),
    #[serde(rename = "plain_text")]
    PlainText(TextBinding),
    #[serde(rename = "queue")]
    Queue(QueueBinding),
    #[serde(rename = "ratelimit")]
    RateLimit(RateLimitBinding),
    #[serde(rename = "r2_bucket")]
    R2Bucket(R2BucketBinding),
    #[serde(rename = "secret_key")]
    SecretKey(SecretKeyBinding),
    #[serde(rename = "secret_text")]
    SecretText(TextBinding),
    #[serde(rename = "secrets_store")]
    SecretsStore(SecretsStoreBinding),
    #[serde(rename = "secrets_store_secret")]
    SecretsStoreSecret(SecretsStoreBinding),
    #[serde(rename = "service")]
    Service(ServiceBinding),
    #[serde(rename = "static_content")]
    StaticContent,
    #[serde(rename = "tail_consumer")]
    TailConsumer(TailConsumerBinding),
    #[serde(rename = "vectorize")]
    Vectorize(VectorizeBinding),
    #[serde(rename = "version_metadata")]
    VersionMetadata,
    #[serde(rename = "wasm_module")]
    WasmModule(WasmModuleBinding),
    #[serde(rename = "worker_loader")]
    WorkerLoader,
    #[serde(rename = "workflow")]
    Workflow(WorkflowBinding),
    #[serde(rename = "cloudflare::Worker::Self")]
    SelfReference(SelfReference),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEngineBinding {
    pub dataset: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct D1Binding {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchNamespaceBinding {
    pub namespace: String,
    /// Outbound worker configuration, passed through untouched. An explicit `null` is kept.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub outbound: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableObjectNamespaceBinding {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperdriveBinding {
    pub id: String,
}

/// Wraps an arbitrary JSON literal exposed to the worker as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonBinding {
    pub json: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvNamespaceBinding {
    pub namespace_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtlsCertificateBinding {
    pub certificate_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineBinding {
    pub pipeline: String,
}

/// Shared by `plain_text` and `secret_text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBinding {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBinding {
    pub queue_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBinding {
    pub namespace_id: String,
    pub simple: SimpleRateLimit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleRateLimit {
    /// Maximum number of requests per period.
    pub limit: u64,
    /// Window length in seconds; one of [`RATE_LIMIT_PERIODS`].
    pub period: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct R2BucketBinding {
    pub bucket_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<R2Jurisdiction>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum R2Jurisdiction {
    Default,
    Eu,
    Fedramp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecretKeyBinding {
    /// Algorithm parameters, opaque to the catalog.
    pub algorithm: Value,
    pub format: KeyFormat,
    pub usages: Vec<KeyUsage>,
    /// Required when `format` is `raw`, `pkcs8` or `spki`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_base64: Option<String>,
    /// Required when `format` is `jwk`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_jwk: Option<Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    Raw,
    Pkcs8,
    Spki,
    Jwk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    DeriveKey,
    DeriveBits,
    WrapKey,
    UnwrapKey,
}

/// Shared by `secrets_store` and `secrets_store_secret`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretsStoreBinding {
    pub store_id: String,
    pub secret_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailConsumerBinding {
    pub service: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizeBinding {
    pub index_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmModuleBinding {
    pub module: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowBinding {
    pub workflow_name: String,
    pub class_name: String,
    /// Defaults to the script the workflow is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
}

/// Points at the worker being provisioned, optionally at a named entrypoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfReference {
    #[serde(
        rename = "__entrypoint__",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub entrypoint: Option<String>,
}

impl BindingDescriptor {
    pub fn kv_namespace(namespace_id: impl Into<String>) -> Self {
        Self::KvNamespace(KvNamespaceBinding {
            namespace_id: namespace_id.into(),
        })
    }

    pub fn queue(queue_name: impl Into<String>) -> Self {
        Self::Queue(QueueBinding {
            queue_name: queue_name.into(),
        })
    }

    pub fn rate_limit(namespace_id: impl Into<String>, limit: u64, period: u32) -> Self {
        Self::RateLimit(RateLimitBinding {
            namespace_id: namespace_id.into(),
            simple: SimpleRateLimit { limit, period },
        })
    }

    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::PlainText(TextBinding { text: text.into() })
    }

    pub fn secret_text(text: impl Into<String>) -> Self {
        Self::SecretText(TextBinding { text: text.into() })
    }

    pub fn service(service: impl Into<String>) -> Self {
        Self::Service(ServiceBinding {
            service: service.into(),
            environment: None,
            namespace: None,
            entrypoint: None,
        })
    }

    /// Wraps an arbitrary JSON value.
    pub fn json(value: Value) -> Self {
        Self::Json(JsonBinding { json: value })
    }

    /// Reference to the worker being provisioned (its default entrypoint).
    pub fn self_reference() -> Self {
        Self::SelfReference(SelfReference::default())
    }

    /// Reference to a named entrypoint of the worker being provisioned.
    pub fn self_entrypoint(entrypoint: impl Into<String>) -> Self {
        Self::SelfReference(SelfReference {
            entrypoint: Some(entrypoint.into()),
        })
    }

    /// Returns the discriminator of this descriptor.
    pub fn kind(&self) -> BindingKind {
        match self {
            BindingDescriptor::Ai => BindingKind::Ai,
            BindingDescriptor::AnalyticsEngine(_) => BindingKind::AnalyticsEngine,
            BindingDescriptor::Assets => BindingKind::Assets,
            BindingDescriptor::Browser => BindingKind::Browser,
            BindingDescriptor::D1(_) => BindingKind::D1,
            BindingDescriptor::DispatchNamespace(_) => BindingKind::DispatchNamespace,
            BindingDescriptor::DurableObjectNamespace(_) => BindingKind::DurableObjectNamespace,
            BindingDescriptor::Hyperdrive(_) => BindingKind::Hyperdrive,
            BindingDescriptor::Images => BindingKind::Images,
            BindingDescriptor::Json(_) => BindingKind::Json,
            BindingDescriptor::KvNamespace(_) => BindingKind::KvNamespace,
            BindingDescriptor::MtlsCertificate(_) => BindingKind::MtlsCertificate,
            BindingDescriptor::Pipelines(_) => BindingKind::Pipelines,
            BindingDescriptor::PlainText(_) => BindingKind::PlainText,
            BindingDescriptor::Queue(_) => BindingKind::Queue,
            BindingDescriptor::RateLimit(_) => BindingKind::RateLimit,
            BindingDescriptor::R2Bucket(_) => BindingKind::R2Bucket,
            BindingDescriptor::SecretKey(_) => BindingKind::SecretKey,
            BindingDescriptor::SecretText(_) => BindingKind::SecretText,
            BindingDescriptor::SecretsStore(_) => BindingKind::SecretsStore,
            BindingDescriptor::SecretsStoreSecret(_) => BindingKind::SecretsStoreSecret,
            BindingDescriptor::Service(_) => BindingKind::Service,
            BindingDescriptor::StaticContent => BindingKind::StaticContent,
            BindingDescriptor::TailConsumer(_) => BindingKind::TailConsumer,
            BindingDescriptor::Vectorize(_) => BindingKind::Vectorize,
            BindingDescriptor::VersionMetadata => BindingKind::VersionMetadata,
            BindingDescriptor::WasmModule(_) => BindingKind::WasmModule,
            BindingDescriptor::WorkerLoader => BindingKind::WorkerLoader,
            BindingDescriptor::Workflow(_) => BindingKind::Workflow,
            BindingDescriptor::SelfReference(_) => BindingKind::SelfReference,
        }
    }

    /// Checks the descriptor against its variant's required-field set.
    ///
    /// Empty strings count as missing. `name` is only used to label the error.
    pub fn validate(&self, name: &str) -> Result<(), BindingError> {
        let kind = self.kind();
        for (field, value) in self.required_strings() {
            if value.trim().is_empty() {
                return Err(missing_field(name, kind, field));
            }
        }

        match self {
            BindingDescriptor::RateLimit(binding) => {
                if !RATE_LIMIT_PERIODS.contains(&binding.simple.period) {
                    return Err(BindingError::InvalidEnumValue {
                        name: name.to_owned(),
                        field: "simple.period",
                        value: binding.simple.period.to_string(),
                        expected: RATE_LIMIT_PERIODS_EXPECTED,
                    });
                }
            }
            BindingDescriptor::SecretKey(binding) => match binding.format {
                KeyFormat::Jwk => {
                    if binding.key_jwk.as_ref().is_none_or(Value::is_null) {
                        return Err(missing_field(name, kind, "key_jwk"));
                    }
                }
                KeyFormat::Raw | KeyFormat::Pkcs8 | KeyFormat::Spki => {
                    if binding
                        .key_base64
                        .as_deref()
                        .is_none_or(|key| key.trim().is_empty())
                    {
                        return Err(missing_field(name, kind, "key_base64"));
                    }
                }
            },
            _ => {}
        }

        Ok(())
    }

    /// Parses an untyped descriptor, reporting shape problems as typed [`BindingError`]s.
    ///
    /// A bare JSON string is accepted as a `plain_text` binding. A legacy `kv_namespace`
    /// object carrying `id` instead of `namespace_id` is normalized. Any `name` key is ignored.
    pub fn from_value(name: &str, value: Value) -> Result<Self, BindingError> {
        let mut object = match value {
            Value::String(text) => {
                let descriptor = Self::plain_text(text);
                descriptor.validate(name)?;
                return Ok(descriptor);
            }
            Value::Object(object) => object,
            other => {
                return Err(BindingError::MalformedDescriptor {
                    name: name.to_owned(),
                    reason: format!("expected an object, found {}", json_type(&other)),
                });
            }
        };

        let kind = match object.get("type") {
            Some(Value::String(tag)) => {
                tag.parse::<BindingKind>()
                    .map_err(|_| BindingError::UnknownVariant {
                        name: name.to_owned(),
                        kind: tag.clone(),
                    })?
            }
            Some(other) => {
                return Err(BindingError::UnknownVariant {
                    name: name.to_owned(),
                    kind: other.to_string(),
                });
            }
            None => {
                return Err(BindingError::MalformedDescriptor {
                    name: name.to_owned(),
                    reason: "missing `type` discriminator".to_owned(),
                });
            }
        };

        object.remove("name");
        if kind == BindingKind::KvNamespace && !object.contains_key("namespace_id") {
            if let Some(id) = object.remove("id") {
                object.insert("namespace_id".to_owned(), id);
            }
        }

        for &field in kind.required_fields() {
            let present = match lookup(&object, field) {
                Some(Value::Null) => kind == BindingKind::Json,
                Some(_) => true,
                None => false,
            };
            if !present {
                return Err(missing_field(name, kind, field));
            }
        }

        check_enumerations(name, kind, &object)?;

        let descriptor: BindingDescriptor = serde_json::from_value(Value::Object(object))
            .map_err(|err| BindingError::MalformedDescriptor {
                name: name.to_owned(),
                reason: err.to_string(),
            })?;
        descriptor.validate(name)?;
        Ok(descriptor)
    }

    /// Encodes the descriptor as its tagged JSON object (without a `name`).
    pub fn to_value(&self) -> Result<Value, BindingError> {
        Ok(serde_json::to_value(self)?)
    }

    fn required_strings(&self) -> Vec<(&'static str, &str)> {
        match self {
            BindingDescriptor::AnalyticsEngine(b) => vec![("dataset", &b.dataset)],
            BindingDescriptor::D1(b) => vec![("id", &b.id)],
            BindingDescriptor::DispatchNamespace(b) => vec![("namespace", &b.namespace)],
            BindingDescriptor::DurableObjectNamespace(b) => vec![("class_name", &b.class_name)],
            BindingDescriptor::Hyperdrive(b) => vec![("id", &b.id)],
            BindingDescriptor::KvNamespace(b) => vec![("namespace_id", &b.namespace_id)],
            BindingDescriptor::MtlsCertificate(b) => vec![("certificate_id", &b.certificate_id)],
            BindingDescriptor::Pipelines(b) => vec![("pipeline", &b.pipeline)],
            BindingDescriptor::PlainText(b) | BindingDescriptor::SecretText(b) => {
                vec![("text", &b.text)]
            }
            BindingDescriptor::Queue(b) => vec![("queue_name", &b.queue_name)],
            BindingDescriptor::RateLimit(b) => vec![("namespace_id", &b.namespace_id)],
            BindingDescriptor::R2Bucket(b) => vec![("bucket_name", &b.bucket_name)],
            BindingDescriptor::SecretsStore(b) | BindingDescriptor::SecretsStoreSecret(b) => {
                vec![("store_id", &b.store_id), ("secret_name", &b.secret_name)]
            }
            BindingDescriptor::Service(b) => vec![("service", &b.service)],
            BindingDescriptor::TailConsumer(b) => vec![("service", &b.service)],
            BindingDescriptor::Vectorize(b) => vec![("index_name", &b.index_name)],
            BindingDescriptor::WasmModule(b) => vec![("module", &b.module)],
            BindingDescriptor::Workflow(b) => vec![
                ("workflow_name", &b.workflow_name),
                ("class_name", &b.class_name),
            ],
            BindingDescriptor::Ai
            | BindingDescriptor::Assets
            | BindingDescriptor::Browser
            | BindingDescriptor::Images
            | BindingDescriptor::Json(_)
            | BindingDescriptor::SecretKey(_)
            | BindingDescriptor::StaticContent
            | BindingDescriptor::VersionMetadata
            | BindingDescriptor::WorkerLoader
            | BindingDescriptor::SelfReference(_) => Vec::new(),
        }
    }
}

/// A key that is present maps to `Some`, even when it holds `null`; absent keys fall back to
/// `None` through `#[serde(default)]`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn missing_field(name: &str, kind: BindingKind, field: &'static str) -> BindingError {
    BindingError::MissingField {
        name: name.to_owned(),
        kind,
        field,
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = object.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn check_enumerations(
    name: &str,
    kind: BindingKind,
    object: &Map<String, Value>,
) -> Result<(), BindingError> {
    let invalid = |field: &'static str, value: &Value, expected: &'static str| {
        BindingError::InvalidEnumValue {
            name: name.to_owned(),
            field,
            value: value.to_string(),
            expected,
        }
    };

    match kind {
        BindingKind::RateLimit => {
            if let Some(period) = lookup(object, "simple.period") {
                let accepted = period.as_u64().is_some_and(|period| {
                    RATE_LIMIT_PERIODS
                        .iter()
                        .any(|accepted| u64::from(*accepted) == period)
                });
                if !accepted {
                    return Err(invalid("simple.period", period, RATE_LIMIT_PERIODS_EXPECTED));
                }
            }
        }
        BindingKind::R2Bucket => {
            if let Some(jurisdiction) = object.get("jurisdiction").filter(|value| !value.is_null())
                && !is_one_of(jurisdiction, &JURISDICTIONS)
            {
                return Err(invalid("jurisdiction", jurisdiction, "default, eu, fedramp"));
            }
        }
        BindingKind::SecretKey => {
            if let Some(format) = object.get("format")
                && !is_one_of(format, &KEY_FORMATS)
            {
                return Err(invalid("format", format, "raw, pkcs8, spki, jwk"));
            }
            if let Some(Value::Array(usages)) = object.get("usages") {
                if let Some(usage) = usages.iter().find(|usage| !is_one_of(usage, &KEY_USAGES)) {
                    return Err(invalid(
                        "usages",
                        usage,
                        "encrypt, decrypt, sign, verify, deriveKey, deriveBits, wrapKey, unwrapKey",
                    ));
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn is_one_of(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().is_some_and(|value| allowed.contains(&value))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<BindingDescriptor, BindingError> {
        BindingDescriptor::from_value("BINDING", value)
    }

    #[test]
    fn serializes_as_tagged_object() {
        let descriptor = BindingDescriptor::rate_limit("1001", 100, 60);
        assert_eq!(
            descriptor.to_value().unwrap(),
            json!({
                "type": "ratelimit",
                "namespace_id": "1001",
                "simple": { "limit": 100, "period": 60 }
            })
        );
        assert_eq!(
            BindingDescriptor::Ai.to_value().unwrap(),
            json!({ "type": "ai" })
        );
    }

    #[test]
    fn optional_fields_are_omitted() {
        let descriptor = BindingDescriptor::R2Bucket(R2BucketBinding {
            bucket_name: "assets".into(),
            jurisdiction: None,
        });
        assert_eq!(
            descriptor.to_value().unwrap(),
            json!({ "type": "r2_bucket", "bucket_name": "assets" })
        );
    }

    #[test]
    fn rate_limit_accepts_both_periods() {
        assert!(BindingDescriptor::rate_limit("1001", 10, 10).validate("RL").is_ok());
        assert!(BindingDescriptor::rate_limit("1001", 10, 60).validate("RL").is_ok());
    }

    #[test]
    fn rate_limit_rejects_other_periods() {
        let error = BindingDescriptor::rate_limit("1001", 10, 30)
            .validate("RL")
            .unwrap_err();
        assert!(matches!(
            error,
            BindingError::InvalidEnumValue { field: "simple.period", ref value, .. } if value == "30"
        ));

        let error = parse(json!({
            "type": "ratelimit",
            "namespace_id": "1001",
            "simple": { "limit": 10, "period": 15 }
        }))
        .unwrap_err();
        assert!(matches!(
            error,
            BindingError::InvalidEnumValue { field: "simple.period", .. }
        ));
    }

    #[test]
    fn rate_limit_without_period_is_missing_field() {
        let error = parse(json!({
            "type": "ratelimit",
            "namespace_id": "1001",
            "simple": { "limit": 10 }
        }))
        .unwrap_err();
        assert!(matches!(
            error,
            BindingError::MissingField { kind: BindingKind::RateLimit, field: "simple.period", .. }
        ));
    }

    #[test]
    fn empty_required_string_is_missing() {
        let error = BindingDescriptor::queue("").validate("JOBS").unwrap_err();
        assert!(matches!(
            error,
            BindingError::MissingField { field: "queue_name", ref name, .. } if name == "JOBS"
        ));
    }

    #[test]
    fn first_missing_field_is_reported() {
        let error = parse(json!({ "type": "workflow" })).unwrap_err();
        assert!(matches!(
            error,
            BindingError::MissingField { field: "workflow_name", .. }
        ));

        let error = parse(json!({ "type": "secrets_store_secret", "store_id": "s1" })).unwrap_err();
        assert!(matches!(
            error,
            BindingError::MissingField { field: "secret_name", .. }
        ));
    }

    #[test]
    fn unknown_tag_is_unknown_variant() {
        let error = parse(json!({ "type": "kv", "namespace_id": "x" })).unwrap_err();
        assert!(matches!(error, BindingError::UnknownVariant { ref kind, .. } if kind == "kv"));

        let error = parse(json!({ "type": 7 })).unwrap_err();
        assert!(matches!(error, BindingError::UnknownVariant { .. }));
    }

    #[test]
    fn missing_tag_is_malformed() {
        let error = parse(json!({ "queue_name": "jobs" })).unwrap_err();
        assert!(matches!(error, BindingError::MalformedDescriptor { .. }));
    }

    #[test]
    fn non_object_is_malformed() {
        let error = parse(json!([1, 2])).unwrap_err();
        assert!(matches!(
            error,
            BindingError::MalformedDescriptor { ref reason, .. } if reason == "expected an object, found an array"
        ));
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let error = parse(json!({ "type": "queue", "queue_name": 42 })).unwrap_err();
        assert!(matches!(error, BindingError::MalformedDescriptor { .. }));
    }

    #[test]
    fn bare_string_is_plain_text() {
        assert_eq!(
            parse(json!("hello")).unwrap(),
            BindingDescriptor::plain_text("hello")
        );
    }

    #[test]
    fn legacy_kv_id_is_normalized() {
        let descriptor = parse(json!({ "type": "kv_namespace", "id": "abc" })).unwrap();
        assert_eq!(descriptor, BindingDescriptor::kv_namespace("abc"));
    }

    #[test]
    fn name_key_is_ignored() {
        let descriptor = parse(json!({ "name": "JOBS", "type": "queue", "queue_name": "jobs" }))
            .unwrap();
        assert_eq!(descriptor, BindingDescriptor::queue("jobs"));
    }

    #[test]
    fn r2_jurisdiction_is_enumerated() {
        let descriptor = parse(json!({
            "type": "r2_bucket",
            "bucket_name": "assets",
            "jurisdiction": "eu"
        }))
        .unwrap();
        assert!(matches!(
            descriptor,
            BindingDescriptor::R2Bucket(R2BucketBinding { jurisdiction: Some(R2Jurisdiction::Eu), .. })
        ));

        let error = parse(json!({
            "type": "r2_bucket",
            "bucket_name": "assets",
            "jurisdiction": "mars"
        }))
        .unwrap_err();
        assert!(matches!(
            error,
            BindingError::InvalidEnumValue { field: "jurisdiction", .. }
        ));
    }

    #[test]
    fn secret_key_checks_format_and_key_material() {
        let base = json!({
            "type": "secret_key",
            "algorithm": { "name": "HMAC", "hash": "SHA-256" },
            "format": "raw",
            "usages": ["sign", "verify"],
            "key_base64": "c2VjcmV0"
        });
        assert!(parse(base.clone()).is_ok());

        let mut bad_usage = base.clone();
        bad_usage["usages"] = json!(["sign", "launch"]);
        assert!(matches!(
            parse(bad_usage).unwrap_err(),
            BindingError::InvalidEnumValue { field: "usages", ref value, .. } if value == "\"launch\""
        ));

        let mut bad_format = base.clone();
        bad_format["format"] = json!("pem");
        assert!(matches!(
            parse(bad_format).unwrap_err(),
            BindingError::InvalidEnumValue { field: "format", .. }
        ));

        let mut jwk_without_key = base;
        jwk_without_key["format"] = json!("jwk");
        assert!(matches!(
            parse(jwk_without_key).unwrap_err(),
            BindingError::MissingField { field: "key_jwk", .. }
        ));
    }

    #[test]
    fn json_literal_may_be_null_but_must_be_present() {
        assert_eq!(
            parse(json!({ "type": "json", "json": null })).unwrap(),
            BindingDescriptor::json(Value::Null)
        );
        assert!(matches!(
            parse(json!({ "type": "json" })).unwrap_err(),
            BindingError::MissingField { field: "json", .. }
        ));
    }

    #[test]
    fn self_reference_uses_entrypoint_marker() {
        let descriptor = BindingDescriptor::self_entrypoint("Admin");
        assert_eq!(
            descriptor.to_value().unwrap(),
            json!({ "type": "cloudflare::Worker::Self", "__entrypoint__": "Admin" })
        );
        assert_eq!(
            parse(json!({ "type": "cloudflare::Worker::Self" })).unwrap(),
            BindingDescriptor::self_reference()
        );
    }
}
