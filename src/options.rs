//! Per-call configuration.
//!
//! [`Options`] is a loose, JSON-shaped mapping with typed accessors on top. Constructing it from
//! a partial mapping always yields the complete set of known keys: anything missing is filled
//! from the defaults below. Merging is a flat overlay (key by key), nested maps such as
//! `headers` are replaced as a whole, never merged recursively.
//!
//! ```
//! use courier::Options;
//! use serde_json::json;
//!
//! let opts = Options::from(json!({ "timeout": "3", "verify": 0 }));
//! assert_eq!(opts.timeout(), 3);
//! assert!(!opts.verify());
//! assert!(opts.allow_redirects());
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_DRIVER: &str = "Reqwest";
pub const DEFAULT_TIMEOUT: u64 = 10;
pub const DEFAULT_VERIFY: bool = true;
pub const DEFAULT_EXCEPTIONS: bool = false;
pub const DEFAULT_ALLOW_REDIRECTS: bool = true;
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_USER_AGENT: &str = "Courier/Http-Client";

/// Raw option mapping, as accepted by [`Options::new`] and [`Options::merge`].
pub type OptionsMap = Map<String, Value>;

/// Resolved option bag. Cheap to clone, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    values: OptionsMap,
}

impl Default for Options {
    fn default() -> Self {
        Self::new(OptionsMap::new())
    }
}

impl From<OptionsMap> for Options {
    fn from(partial: OptionsMap) -> Self {
        Self::new(partial)
    }
}

/// Anything but a JSON object yields the defaults.
impl From<Value> for Options {
    fn from(value: Value) -> Self {
        Self::new(into_map(value))
    }
}

impl Options {
    /// Builds a complete option set: defaults first, then every key of `partial` on top.
    pub fn new(partial: OptionsMap) -> Self {
        let mut values = defaults();
        values.extend(partial);
        Self { values }
    }

    /// Returns a new option set with `overrides` laid over this one (overrides win per key).
    pub fn merge(&self, overrides: &OptionsMap) -> Self {
        let mut values = self.values.clone();
        for (key, value) in overrides {
            values.insert(key.clone(), value.clone());
        }
        Self { values }
    }

    /// Returns a copy with a single key replaced.
    pub fn with(&self, key: &str, value: impl Into<Value>) -> Self {
        let mut values = self.values.clone();
        values.insert(key.to_string(), value.into());
        Self { values }
    }

    /// Raw value of any key, including ones this crate does not know about.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Configured driver name, trimmed. Matching against known drivers is case-insensitive.
    pub fn driver(&self) -> String {
        match self.values.get("driver").map(to_text) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => DEFAULT_DRIVER.to_string(),
        }
    }

    /// Timeout in whole seconds. `0` means no timeout.
    pub fn timeout(&self) -> u64 {
        self.values
            .get("timeout")
            .and_then(to_int)
            .map(|t| t.max(0) as u64)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// [`Options::timeout`] as a duration, `None` when disabled.
    pub fn timeout_duration(&self) -> Option<Duration> {
        match self.timeout() {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Whether TLS certificates are verified.
    pub fn verify(&self) -> bool {
        self.flag("verify", DEFAULT_VERIFY)
    }

    /// Whether failures (transport or status >= 400) are raised instead of returned as a response.
    pub fn exceptions(&self) -> bool {
        self.flag("exceptions", DEFAULT_EXCEPTIONS)
    }

    pub fn allow_redirects(&self) -> bool {
        self.flag("allow_redirects", DEFAULT_ALLOW_REDIRECTS)
    }

    pub fn max_redirects(&self) -> u32 {
        self.values
            .get("max_redirects")
            .and_then(to_int)
            .map(|n| n.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(DEFAULT_MAX_REDIRECTS)
    }

    /// User agent to send. When the stored agent is still the default and a `suffix` is given,
    /// returns `"{default} ({suffix})"`, so drivers can tag the default agent with their own name
    /// without clobbering a caller-supplied one.
    pub fn user_agent(&self, suffix: Option<&str>) -> String {
        let agent = self
            .values
            .get("user_agent")
            .map(to_text)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        match suffix {
            Some(suffix) if !suffix.is_empty() && agent == DEFAULT_USER_AGENT => {
                format!("{agent} ({suffix})")
            }
            _ => agent,
        }
    }

    /// Basic auth credentials as an ordered `(user, password)` pair. Accepts `["user", "pass"]`
    /// or `{"0": "user", "1": "pass"}`; anything empty means no auth.
    pub fn auth(&self) -> Option<(String, String)> {
        let (user, password) = match self.values.get("auth")? {
            Value::Array(items) => (items.first()?, items.get(1)),
            Value::Object(map) => (map.get("0")?, map.get("1")),
            _ => return None,
        };

        let user = to_text(user);
        if user.is_empty() {
            return None;
        }
        Some((user, password.map(to_text).unwrap_or_default()))
    }

    /// Default headers for every request made with these options.
    pub fn headers(&self) -> BTreeMap<String, String> {
        match self.values.get("headers") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, value)| (name.clone(), to_text(value)))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// The full resolved mapping.
    pub fn to_map(&self) -> OptionsMap {
        self.values.clone()
    }

    pub fn as_map(&self) -> &OptionsMap {
        &self.values
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.values.get(key).map(to_bool).unwrap_or(default)
    }
}

fn defaults() -> OptionsMap {
    let mut map = OptionsMap::new();
    map.insert("auth".into(), Value::Array(Vec::new()));
    map.insert("headers".into(), Value::Object(Map::new()));
    map.insert("driver".into(), DEFAULT_DRIVER.into());
    map.insert("timeout".into(), DEFAULT_TIMEOUT.into());
    map.insert("verify".into(), DEFAULT_VERIFY.into());
    map.insert("exceptions".into(), DEFAULT_EXCEPTIONS.into());
    map.insert("allow_redirects".into(), DEFAULT_ALLOW_REDIRECTS.into());
    map.insert("max_redirects".into(), DEFAULT_MAX_REDIRECTS.into());
    map.insert("user_agent".into(), DEFAULT_USER_AGENT.into());
    map
}

/// Non-object values become an empty mapping.
pub(crate) fn into_map(value: Value) -> OptionsMap {
    match value {
        Value::Object(map) => map,
        _ => OptionsMap::new(),
    }
}

/// Loose truthiness: `"1"`, `"true"`, `"yes"`, `"on"` and non-zero numbers are true.
pub(crate) fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "n" | "off" | "null" | "none"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Loose integer: numbers truncate, strings parse their leading numeric part, booleans are 0/1.
pub(crate) fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(*b as i64),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse::<f64>().ok().map(|f| f as i64)
        }
        _ => None,
    }
}

/// Loose string: strings as-is, scalars formatted, null empty.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOCUMENTED_KEYS: [&str; 9] = [
        "auth",
        "headers",
        "driver",
        "timeout",
        "verify",
        "exceptions",
        "allow_redirects",
        "max_redirects",
        "user_agent",
    ];

    #[test]
    fn defaults_are_complete() {
        let opts = Options::default();
        let map = opts.to_map();

        assert_eq!(map.len(), DOCUMENTED_KEYS.len());
        for key in DOCUMENTED_KEYS {
            assert!(map.contains_key(key), "missing {key}");
            assert!(!map[key].is_null(), "null {key}");
        }

        assert_eq!(opts.driver(), "Reqwest");
        assert_eq!(opts.timeout(), 10);
        assert!(opts.verify());
        assert!(!opts.exceptions());
        assert!(opts.allow_redirects());
        assert_eq!(opts.max_redirects(), 10);
        assert_eq!(opts.user_agent(None), DEFAULT_USER_AGENT);
        assert_eq!(opts.auth(), None);
        assert!(opts.headers().is_empty());
    }

    #[test]
    fn partial_is_filled_and_kept() {
        let opts = Options::from(json!({ "timeout": 3, "driver": "ureq" }));
        let map = opts.to_map();

        assert_eq!(map["timeout"], json!(3));
        assert_eq!(map["driver"], json!("ureq"));
        assert_eq!(map["max_redirects"], json!(10));
        for key in DOCUMENTED_KEYS {
            assert!(map.contains_key(key));
        }
    }

    #[test]
    fn non_object_value_gives_defaults() {
        assert_eq!(Options::from(json!("nope")), Options::default());
        assert_eq!(Options::from(Value::Null), Options::default());
    }

    #[test]
    fn loose_booleans() {
        for truthy in [json!("1"), json!("true"), json!("yes"), json!(1), json!(2.5), json!(true)] {
            let opts = Options::from(json!({ "exceptions": truthy.clone() }));
            assert!(opts.exceptions(), "{truthy} should be true");
        }
        for falsy in [json!("0"), json!(""), json!("false"), json!("off"), json!(0), json!(null)] {
            let opts = Options::from(json!({ "verify": falsy.clone() }));
            assert!(!opts.verify(), "{falsy} should be false");
        }
    }

    #[test]
    fn loose_integers() {
        assert_eq!(Options::from(json!({ "timeout": "5" })).timeout(), 5);
        assert_eq!(Options::from(json!({ "timeout": "7s" })).timeout(), 7);
        assert_eq!(Options::from(json!({ "timeout": 2.9 })).timeout(), 2);
        assert_eq!(Options::from(json!({ "timeout": -4 })).timeout(), 0);
        assert_eq!(Options::from(json!({ "timeout": "abc" })).timeout(), DEFAULT_TIMEOUT);
        assert_eq!(Options::from(json!({ "max_redirects": "3" })).max_redirects(), 3);
    }

    #[test]
    fn zero_timeout_disables_it() {
        assert_eq!(Options::from(json!({ "timeout": 0 })).timeout_duration(), None);
        assert_eq!(
            Options::default().timeout_duration(),
            Some(Duration::from_secs(DEFAULT_TIMEOUT))
        );
    }

    #[test]
    fn user_agent_suffix_only_on_default() {
        let opts = Options::default();
        assert_eq!(opts.user_agent(Some("Reqwest")), "Courier/Http-Client (Reqwest)");
        assert_eq!(opts.user_agent(Some("")), DEFAULT_USER_AGENT);

        let custom = Options::from(json!({ "user_agent": "Qwerty Agent v123" }));
        assert_eq!(custom.user_agent(Some("Reqwest")), "Qwerty Agent v123");
    }

    #[test]
    fn auth_pair() {
        let opts = Options::from(json!({ "auth": ["user", "passwd"] }));
        assert_eq!(opts.auth(), Some(("user".into(), "passwd".into())));

        let opts = Options::from(json!({ "auth": { "0": "user", "1": "passwd" } }));
        assert_eq!(opts.auth(), Some(("user".into(), "passwd".into())));

        let opts = Options::from(json!({ "auth": ["user"] }));
        assert_eq!(opts.auth(), Some(("user".into(), String::new())));

        assert_eq!(Options::from(json!({ "auth": [] })).auth(), None);
        assert_eq!(Options::from(json!({ "auth": false })).auth(), None);
    }

    #[test]
    fn headers_are_stringified() {
        let opts = Options::from(json!({ "headers": { "X-Id": 42, "X-Name": "a" } }));
        let headers = opts.headers();
        assert_eq!(headers["X-Id"], "42");
        assert_eq!(headers["X-Name"], "a");
    }

    #[test]
    fn merge_is_flat_overlay() {
        let base = Options::from(json!({ "headers": { "A": "1", "B": "2" }, "timeout": 5 }));
        let merged = base.merge(&into_map(json!({ "headers": { "C": "3" } })));

        let headers = merged.headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["C"], "3");
        assert_eq!(merged.timeout(), 5);

        // The source is left untouched
        assert_eq!(base.headers().len(), 2);
    }

    #[test]
    fn unknown_keys_survive() {
        let opts = Options::from(json!({ "proxy": "socks5://x" })).merge(&OptionsMap::new());
        assert_eq!(opts.get("proxy"), Some(&json!("socks5://x")));
    }

    #[test]
    fn driver_is_trimmed_and_defaulted() {
        assert_eq!(Options::from(json!({ "driver": "  ureq " })).driver(), "ureq");
        assert_eq!(Options::from(json!({ "driver": "" })).driver(), DEFAULT_DRIVER);
    }
}
