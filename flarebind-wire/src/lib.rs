use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Metadata part of a worker script upload.
///
/// The provisioning API receives bindings as a flat list of JSON objects, each carrying a
/// `name`, a `type` discriminator and the fields specific to that binding type. This crate
/// keeps the entries untyped so it can frame requests without knowing the binding catalog.
///
/// # Examples
/// ```ignore
/// use flarebind_wire::ScriptMetadata;
/// use serde_json::json;
///
/// let metadata = ScriptMetadata::new(vec![json!({
///     "name": "CACHE",
///     "type": "kv_namespace",
///     "namespace_id": "0f2ac74b498b48028cb68387c421e279",
/// })]);
/// let body = metadata.to_json()?;
/// # Ok::<(), flarebind_wire::WireError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    /// Flat binding objects (`{ "name", "type", ... }`).
    #[serde(default)]
    pub bindings: Vec<Value>,
    /// Entry module of the uploaded bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatibility_flags: Vec<String>,
    /// Binding types the API should carry over from the previous deployment untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keep_bindings: Vec<String>,
}

impl ScriptMetadata {
    /// Creates metadata carrying only the provided bindings.
    pub fn new(bindings: Vec<Value>) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Sets the entry module name.
    pub fn main_module(mut self, module: impl Into<String>) -> Self {
        self.main_module = Some(module.into());
        self
    }

    /// Sets the compatibility date (`YYYY-MM-DD`).
    pub fn compatibility_date(mut self, date: impl Into<String>) -> Self {
        self.compatibility_date = Some(date.into());
        self
    }

    /// Appends a compatibility flag.
    pub fn compatibility_flag(mut self, flag: impl Into<String>) -> Self {
        self.compatibility_flags.push(flag.into());
        self
    }

    /// Asks the API to keep existing bindings of the given type.
    pub fn keep_binding(mut self, binding_type: impl Into<String>) -> Self {
        self.keep_bindings.push(binding_type.into());
        self
    }

    /// Encodes the metadata as the JSON request body.
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A single entry of the `errors`/`messages` arrays in an API envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// Envelope returned by the provisioning API for every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Indicates whether the API accepted the request.
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    /// Call-specific payload (defaults to `null`).
    #[serde(default)]
    pub result: Value,
}

impl ApiResponse {
    /// Constructs a success envelope around `result`.
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            messages: Vec::new(),
            result,
        }
    }

    /// Parses an envelope from a raw response body.
    pub fn from_json(body: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Returns the `result` payload, or an [`WireError::ApiFailure`] when the API reported
    /// `success: false`.
    ///
    /// # Errors
    /// A failed envelope is turned into [`WireError::ApiFailure`] whose diagnostic joins every
    /// reported error as `code: message`. A successful envelope with a `null` result yields
    /// [`WireError::MissingResult`].
    pub fn into_result(self) -> Result<Value, WireError> {
        if !self.success {
            let diagnostic = if self.errors.is_empty() {
                "provisioning API returned failure".to_owned()
            } else {
                self.errors
                    .iter()
                    .map(|error| format!("{}: {}", error.code, error.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            return Err(WireError::ApiFailure {
                diagnostic,
                payload: self.result,
            });
        }

        if self.result.is_null() {
            return Err(WireError::MissingResult);
        }

        Ok(self.result)
    }
}

/// Script settings echoed back by the API after a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptSettings {
    #[serde(default)]
    pub bindings: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatibility_flags: Vec<String>,
}

impl ScriptSettings {
    /// Extracts settings from an acknowledgment envelope.
    pub fn from_response(response: ApiResponse) -> Result<Self, WireError> {
        let result = response.into_result()?;
        Ok(serde_json::from_value(result)?)
    }
}

/// Errors emitted while framing requests or reading API envelopes.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("provisioning API failed: {diagnostic}")]
    ApiFailure { diagnostic: String, payload: Value },
    #[error("provisioning API response carried no result")]
    MissingResult,
    #[error("invalid wire payload: {0}")]
    Serialization(#[from] serde_json::Error),
}
