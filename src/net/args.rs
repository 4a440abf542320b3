use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Request arguments: either a raw string sent verbatim as the body, or ordered key/value pairs.
///
/// For GET requests the pairs end up in the query string (a raw string is read as a query string
/// there); for every other method they become a form-url-encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    Raw(String),
    Form(Vec<(String, String)>),
}

impl Args {
    /// Key/value view used for query strings. Raw strings are parsed as `a=1&b=2`.
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            Args::Raw(raw) => url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect(),
            Args::Form(pairs) => pairs.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Args::Raw(raw) => raw.is_empty(),
            Args::Form(pairs) => pairs.is_empty(),
        }
    }

    /// Wire encoding for a request body: raw strings verbatim, pairs form-url-encoded.
    pub fn encode(&self) -> String {
        match self {
            Args::Raw(raw) => raw.clone(),
            Args::Form(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Args::Raw(raw) => Value::String(raw.clone()),
            Args::Form(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Args {
    fn from(raw: &str) -> Self {
        Args::Raw(raw.to_string())
    }
}

impl From<String> for Args {
    fn from(raw: String) -> Self {
        Args::Raw(raw)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Args {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Args::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Args {
    fn from(pairs: [(K, V); N]) -> Self {
        Args::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for Args {
    fn from(map: BTreeMap<K, V>) -> Self {
        Args::Form(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for Args {
    fn from(map: HashMap<K, V>) -> Self {
        Args::Form(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Objects become pairs (scalars stringified), strings stay raw, anything else is JSON text.
impl From<Value> for Args {
    fn from(value: Value) -> Self {
        match value {
            Value::String(raw) => Args::Raw(raw),
            Value::Object(map) => Args::Form(
                map.into_iter()
                    .map(|(k, v)| (k, crate::options::to_text(&v)))
                    .collect(),
            ),
            Value::Null => Args::Form(Vec::new()),
            other => Args::Raw(other.to_string()),
        }
    }
}
