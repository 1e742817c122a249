use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Discriminator selecting which descriptor shape a binding uses.
///
/// The string form is the `type` tag the provisioning API expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
    Ai,
    AnalyticsEngine,
    Assets,
    Browser,
    D1,
    DispatchNamespace,
    DurableObjectNamespace,
    Hyperdrive,
    Images,
    Json,
    KvNamespace,
    MtlsCertificate,
    Pipelines,
    PlainText,
    Queue,
    RateLimit,
    R2Bucket,
    SecretKey,
    SecretText,
    SecretsStore,
    SecretsStoreSecret,
    Service,
    StaticContent,
    TailConsumer,
    Vectorize,
    VersionMetadata,
    WasmModule,
    WorkerLoader,
    Workflow,
    /// Reference to the worker being provisioned. Never sent as-is.
    SelfReference,
}

impl BindingKind {
    pub const ALL: [BindingKind; 30] = [
        BindingKind::Ai,
        BindingKind::AnalyticsEngine,
        BindingKind::Assets,
        BindingKind::Browser,
        BindingKind::D1,
        BindingKind::DispatchNamespace,
        BindingKind::DurableObjectNamespace,
        BindingKind::Hyperdrive,
        BindingKind::Images,
        BindingKind::Json,
        BindingKind::KvNamespace,
        BindingKind::MtlsCertificate,
        BindingKind::Pipelines,
        BindingKind::PlainText,
        BindingKind::Queue,
        BindingKind::RateLimit,
        BindingKind::R2Bucket,
        BindingKind::SecretKey,
        BindingKind::SecretText,
        BindingKind::SecretsStore,
        BindingKind::SecretsStoreSecret,
        BindingKind::Service,
        BindingKind::StaticContent,
        BindingKind::TailConsumer,
        BindingKind::Vectorize,
        BindingKind::VersionMetadata,
        BindingKind::WasmModule,
        BindingKind::WorkerLoader,
        BindingKind::Workflow,
        BindingKind::SelfReference,
    ];

    /// Returns the wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Ai => "ai",
            BindingKind::AnalyticsEngine => "analytics_engine",
            BindingKind::Assets => "assets",
            BindingKind::Browser => "browser",
            BindingKind::D1 => "d1",
            BindingKind::DispatchNamespace => "dispatch_namespace",
            BindingKind::DurableObjectNamespace => "durable_object_namespace",
            BindingKind::Hyperdrive => "hyperdrive",
            BindingKind::Images => "images",
            BindingKind::Json => "json",
            BindingKind::KvNamespace => "kv_namespace",
            BindingKind::MtlsCertificate => "mtls_certificate",
            BindingKind::Pipelines => "pipelines",
            BindingKind::PlainText => "plain_text",
            BindingKind::Queue => "queue",
            BindingKind::RateLimit => "ratelimit",
            BindingKind::R2Bucket => "r2_bucket",
            BindingKind::SecretKey => "secret_key",
            BindingKind::SecretText => "secret_text",
            BindingKind::SecretsStore => "secrets_store",
            BindingKind::SecretsStoreSecret => "secrets_store_secret",
            BindingKind::Service => "service",
            BindingKind::StaticContent => "static_content",
            BindingKind::TailConsumer => "tail_consumer",
            BindingKind::Vectorize => "vectorize",
            BindingKind::VersionMetadata => "version_metadata",
            BindingKind::WasmModule => "wasm_module",
            BindingKind::WorkerLoader => "worker_loader",
            BindingKind::Workflow => "workflow",
            BindingKind::SelfReference => "cloudflare::Worker::Self",
        }
    }

    /// Required fields in declaration order. Nested fields use dotted paths.
    ///
    /// `secret_key` additionally requires `key_base64` or `key_jwk` depending on its
    /// `format`; that rule is checked by the descriptor itself.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            BindingKind::Ai
            | BindingKind::Assets
            | BindingKind::Browser
            | BindingKind::Images
            | BindingKind::StaticContent
            | BindingKind::VersionMetadata
            | BindingKind::WorkerLoader
            | BindingKind::SelfReference => &[],
            BindingKind::AnalyticsEngine => &["dataset"],
            BindingKind::D1 | BindingKind::Hyperdrive => &["id"],
            BindingKind::DispatchNamespace => &["namespace"],
            BindingKind::DurableObjectNamespace => &["class_name"],
            BindingKind::Json => &["json"],
            BindingKind::KvNamespace => &["namespace_id"],
            BindingKind::MtlsCertificate => &["certificate_id"],
            BindingKind::Pipelines => &["pipeline"],
            BindingKind::PlainText | BindingKind::SecretText => &["text"],
            BindingKind::Queue => &["queue_name"],
            BindingKind::RateLimit => &["namespace_id", "simple.limit", "simple.period"],
            BindingKind::R2Bucket => &["bucket_name"],
            BindingKind::SecretKey => &["algorithm", "format", "usages"],
            BindingKind::SecretsStore | BindingKind::SecretsStoreSecret => {
                &["store_id", "secret_name"]
            }
            BindingKind::Service | BindingKind::TailConsumer => &["service"],
            BindingKind::Vectorize => &["index_name"],
            BindingKind::WasmModule => &["module"],
            BindingKind::Workflow => &["workflow_name", "class_name"],
        }
    }

    /// Kinds that only exist on the configuration side and must be resolved into a concrete
    /// binding before they reach the provisioning API.
    pub fn is_reference(&self) -> bool {
        matches!(self, BindingKind::SelfReference)
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

/// Returned when a `type` tag names no known binding kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown binding type: {0}")]
pub struct UnknownKind(pub String);
