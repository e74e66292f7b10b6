//! Declarative tool metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A single query parameter accepted by a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub key: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl ParameterSpec {
    /// Declares a parameter the schema layer must reject when missing.
    pub fn required(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            required: true,
            description: description.into(),
        }
    }

    /// Declares an optional parameter.
    pub fn optional(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            required: false,
            description: description.into(),
        }
    }
}

/// One callable REST endpoint: what it is called and where it points.
///
/// `path` is appended verbatim to the configured base URL, so it starts with
/// `/` and carries no query string of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub path: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            path: path.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Keys the caller must supply, in declared order.
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|param| param.required)
            .map(|param| param.key.as_str())
    }

    /// JSON Schema for the tool's argument object.
    ///
    /// Every parameter is declared as a string; the binder stringifies
    /// whatever scalar actually arrives.
    #[must_use]
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|param| {
                (
                    param.key.clone(),
                    json!({
                        "type": "string",
                        "description": param.description,
                    }),
                )
            })
            .collect();
        let required: Vec<Value> = self
            .required_keys()
            .map(|key| Value::String(key.to_string()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        schema
    }
}
