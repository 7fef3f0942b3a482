//! Payload ingestion and field normalization

use serde::Deserialize;
use tracing::warn;

use crate::value::{ContractRecord, Context, Value};

/// A generation request as received from the caller.
///
/// `template` is accepted for compatibility and ignored: the template is
/// fixed by configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub template: Option<String>,
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl Payload {
    /// Wrap an already-extracted context map
    pub fn from_context(context: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            template: None,
            context,
        }
    }

    /// Parse a request body.
    ///
    /// Accepts `{"template": ..., "context": {...}}` or a bare context object.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Same as [`Payload::from_json_str`] for an already parsed document
    pub fn from_json_value(value: serde_json::Value) -> serde_json::Result<Self> {
        match value {
            serde_json::Value::Object(map)
                if map.get("context").is_some_and(serde_json::Value::is_object) =>
            {
                serde_json::from_value(serde_json::Value::Object(map))
            }
            serde_json::Value::Object(map) => Ok(Self::from_context(map)),
            other => Err(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Turn the raw payload into typed context values.
///
/// Numbers and booleans keep their types so later stages can format them;
/// [`normalize`] turns whatever is left into text.
pub fn ingest(payload: &Payload) -> Context {
    payload
        .context
        .iter()
        .map(|(key, raw)| (key.clone(), ingest_value(key, raw)))
        .collect()
}

/// Convert one raw JSON value
pub fn ingest_value(key: &str, raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Text(String::new()),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) if items.iter().all(serde_json::Value::is_object) => {
            match serde_json::from_value::<Vec<ContractRecord>>(raw.clone()) {
                Ok(records) => Value::Contracts(records),
                Err(e) => {
                    warn!(field = %key, error = %e, "list is not a contract list, keeping it as text");
                    Value::Text(raw.to_string())
                }
            }
        }
        other => Value::Text(other.to_string()),
    }
}

/// Coerce every remaining scalar into text.
///
/// Contract lists and rich-text blocks pass through untouched.
pub fn normalize(ctx: Context) -> Context {
    ctx.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Number(n) => Value::Text(n.to_string()),
                Value::Bool(b) => Value::Text(b.to_string()),
                other => other,
            };
            (key, value)
        })
        .collect()
}
