use flarebind::{BindingDescriptor, BindingRegistry, ReferenceResolver, RegistryConfig};
use serde_json::json;

fn main() -> flarebind::Result<()> {
    tracing_subscriber::fmt::init();

    let config = RegistryConfig::from_env()?;
    let config = RegistryConfig {
        script_name: config.script_name.or_else(|| Some("basic-demo".to_owned())),
        ..config
    };

    let mut registry = BindingRegistry::new();
    registry.register(
        "CACHE",
        BindingDescriptor::kv_namespace("0f2ac74b498b48028cb68387c421e279"),
    )?;
    registry.register("JOBS", BindingDescriptor::queue("jobs"))?;
    registry.register("LIMITER", BindingDescriptor::rate_limit("1001", 100, 60))?;
    registry.register(
        "FEATURES",
        BindingDescriptor::json(json!({ "beta": true, "regions": ["wnam"] })),
    )?;
    registry.register("ADMIN", BindingDescriptor::self_entrypoint("Admin"))?;
    registry.register_value(
        "UPLOADS",
        json!({ "type": "r2_bucket", "bucket_name": "uploads", "jurisdiction": "eu" }),
    )?;

    let metadata = registry
        .to_metadata(&ReferenceResolver::new(&config))?
        .compatibility_date("2025-01-01");
    tracing::info!(bindings = metadata.bindings.len(), "registry is valid");

    println!("{}", metadata.to_json()?);
    Ok(())
}
