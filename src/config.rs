use std::env;

use dotenvy::Error as DotenvError;
use thiserror::Error;

const SCRIPT_NAME_ENV: &str = "FLAREBIND_SCRIPT_NAME";
const ENVIRONMENT_ENV: &str = "FLAREBIND_ENVIRONMENT";
const DISPATCH_NAMESPACE_ENV: &str = "FLAREBIND_DISPATCH_NAMESPACE";

/// Context used when turning reference bindings into concrete ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Name of the worker script being provisioned. Self references point here.
    pub script_name: Option<String>,
    pub environment: Option<String>,
    /// Dispatch namespace the script lives in, if any.
    pub dispatch_namespace: Option<String>,
}

impl RegistryConfig {
    /// Loads configuration from `FLAREBIND_*` environment variables.
    ///
    /// Values from a local `.env` file (parsed via [`dotenvy::dotenv_override`]) override
    /// whatever is already set in the process environment. Empty values count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_overrides()?;

        Ok(Self {
            script_name: read_var(SCRIPT_NAME_ENV),
            environment: read_var(ENVIRONMENT_ENV),
            dispatch_namespace: read_var(DISPATCH_NAMESPACE_ENV),
        })
    }

    /// Returns a builder for programmatic overrides.
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }
}

/// Builder type for [`RegistryConfig`].
#[derive(Default, Clone, Debug)]
pub struct RegistryConfigBuilder {
    script_name: Option<String>,
    environment: Option<String>,
    dispatch_namespace: Option<String>,
}

impl RegistryConfigBuilder {
    pub fn script_name(mut self, name: impl Into<String>) -> Self {
        self.script_name = Some(name.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn dispatch_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.dispatch_namespace = Some(namespace.into());
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> RegistryConfig {
        RegistryConfig {
            script_name: self.script_name,
            environment: self.environment,
            dispatch_namespace: self.dispatch_namespace,
        }
    }
}

/// Errors that can occur while building [`RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load .env overrides: {0}")]
    Dotenv(#[from] DotenvError),
}

fn load_env_overrides() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}

fn read_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
