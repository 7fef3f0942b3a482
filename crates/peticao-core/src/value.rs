//! Context values
//!
//! A petition context maps field names to [`Value`]s. Most values end up as
//! plain text; contract lists and rich-text clauses stay structured so the
//! template engine can loop over them or emit formatted runs.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single context value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Plain text, substituted verbatim
    Text(String),
    /// A number as received from the payload
    Number(serde_json::Number),
    /// A boolean flag
    Bool(bool),
    /// A list of contract line items
    Contracts(Vec<ContractRecord>),
    /// A paragraph with inline bold emphasis
    Rich(RichText),
}

impl Value {
    /// Create a text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Borrow the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of a number value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Contract records, if this is a contract list
    pub fn as_contracts(&self) -> Option<&[ContractRecord]> {
        match self {
            Value::Contracts(records) => Some(records),
            _ => None,
        }
    }

    /// Rich text, if this is a rich-text block
    pub fn as_rich(&self) -> Option<&RichText> {
        match self {
            Value::Rich(rich) => Some(rich),
            _ => None,
        }
    }

    /// Whether the value holds nothing to render
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Number(_) | Value::Bool(_) => false,
            Value::Contracts(records) => records.is_empty(),
            Value::Rich(rich) => rich.is_empty(),
        }
    }

    /// Truthiness used by template conditionals.
    ///
    /// Empty text, the text `"false"` (any case), zero, `false`, empty lists
    /// and empty rich text are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::Bool(b) => *b,
            Value::Contracts(records) => !records.is_empty(),
            Value::Rich(rich) => !rich.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            // Lowercase, matching what normalization writes for booleans
            Value::Bool(b) => write!(f, "{}", b),
            Value::Contracts(records) => {
                let lines: Vec<String> = records.iter().map(|r| r.summary_line()).collect();
                f.write_str(&lines.join("\n\n"))
            }
            Value::Rich(rich) => f.write_str(&rich.plain_text()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<RichText> for Value {
    fn from(rich: RichText) -> Self {
        Value::Rich(rich)
    }
}

/// One styled piece of a [`RichText`] paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Segment text
    pub text: String,
    /// Render in bold
    pub bold: bool,
}

/// An ordered sequence of styled text segments forming one paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    /// An empty block
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(text, bold)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(text, bold)| Segment {
                text: text.into(),
                bold,
            })
            .collect()
    }

    /// The segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when there are no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text without formatting
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Texts of the bold segments
    pub fn bold_phrases(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.bold)
            .map(|s| s.text.as_str())
    }
}

impl FromIterator<Segment> for RichText {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// One loan contract listed in the petition.
///
/// Every field is optional. The payload may carry strings or numbers; both
/// are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub inicio: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub fim: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub situacao: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub parcela: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub pago: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub a_pagar: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub copia: Option<String>,
}

impl ContractRecord {
    /// Look up a field by its payload name
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "numero" => &self.numero,
            "inicio" => &self.inicio,
            "fim" => &self.fim,
            "situacao" => &self.situacao,
            "parcela" => &self.parcela,
            "pago" => &self.pago,
            "a_pagar" => &self.a_pagar,
            "copia" => &self.copia,
            _ => return None,
        };
        value.as_deref()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// The rendering context: field name to value.
///
/// Keys are kept sorted so serialized output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    fields: BTreeMap<String, Value>,
}

impl Context {
    /// An empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a text value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Iterate over keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when there are no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replace the value stored under `key` with `f(value)`, if present
    pub fn map_value<F>(mut self, key: &str, f: F) -> Self
    where
        F: FnOnce(Value) -> Value,
    {
        if let Some(value) = self.fields.remove(key) {
            self.fields.insert(key.to_string(), f(value));
        }
        self
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Context {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::text("sim").is_truthy());
        assert!(!Value::text("").is_truthy());
        assert!(!Value::text("FALSE").is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.into()).is_truthy());
        assert!(Value::Number(3.into()).is_truthy());
        assert!(!Value::Contracts(Vec::new()).is_truthy());
        assert!(!Value::Rich(RichText::new()).is_truthy());
    }

    #[test]
    fn test_contract_record_accepts_numbers() {
        let record: ContractRecord = serde_json::from_value(serde_json::json!({
            "numero": "123",
            "pago": 1500.5,
            "a_pagar": 0,
            "copia": null,
            "id": 7
        }))
        .unwrap();

        assert_eq!(record.field("numero"), Some("123"));
        assert_eq!(record.field("pago"), Some("1500.5"));
        assert_eq!(record.field("a_pagar"), Some("0"));
        assert_eq!(record.field("copia"), None);
        assert_eq!(record.field("inicio"), None);
        assert_eq!(record.field("unknown"), None);
    }

    #[test]
    fn test_rich_text_plain_and_bold() {
        let rich = RichText::from_pairs([("a ", false), ("b", true), (" c", false)]);
        assert_eq!(rich.plain_text(), "a b c");
        assert_eq!(rich.bold_phrases().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(rich.segments().len(), 3);
    }

    #[test]
    fn test_context_map_value() {
        let ctx = Context::new()
            .with("CIDADE", "campinas")
            .map_value("CIDADE", |v| Value::text(v.to_string().to_uppercase()))
            .map_value("MISSING", |_| Value::text("x"));

        assert_eq!(ctx.get_str("CIDADE"), Some("CAMPINAS"));
        assert!(!ctx.contains_key("MISSING"));
    }

    #[test]
    fn test_context_serializes_untagged() {
        let ctx = Context::new()
            .with("A", "texto")
            .with("B", true)
            .with("C", RichText::from_pairs([("x", true)]));
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "A": "texto",
                "B": true,
                "C": [{"text": "x", "bold": true}]
            })
        );
    }
}
