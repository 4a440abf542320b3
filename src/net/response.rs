//! Buffered HTTP response model.
//!
//! A [`Response`] holds everything a driver received: status code, headers, body text and the
//! elapsed wall-clock time, plus a shared reference to the [`Request`] that produced it.
//!
//! ## Notes
//! - `code == 0` means the request never completed (transport failure, see [`Response::from_error`]).
//! - Header names are stored as the backend reported them. Multi-valued headers are joined with `;`.
//!   Use [`Response::header`] for case-insensitive lookups.
//! - The body is kept as text. Binary payloads are decoded lossily.
//! - [`Response::json`] parses the body once and caches the result until the body changes.
//!   Repeated calls hand out the same `Arc`, so callers can rely on pointer identity.
//!
use crate::errors::HttpError;
use crate::net::request::Request;
use crate::net::status;
use crate::net::xml::{self, XmlNode};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Default)]
pub struct Response {
    code: u16,
    headers: BTreeMap<String, String>,
    body: Option<String>,
    time: Option<f64>,
    request: Option<Arc<Request>>,
    /// Parsed body. Reset whenever the body is replaced.
    json: OnceLock<Option<Arc<Value>>>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Degraded response describing a failed call: the error's code, no headers, the error
    /// message as body.
    pub fn from_error(error: &HttpError, request: Option<Arc<Request>>) -> Self {
        let response = Response::new()
            .with_code(error.code())
            .with_body(error.to_string());
        match request {
            Some(request) => response.with_request(request),
            None => response,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Collects a header map, joining repeated names with `;`.
    pub fn with_header_map(mut self, headers: &http::HeaderMap) -> Self {
        let mut collected: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            collected
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push(';');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        self.headers = collected;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.set_body(body);
        self
    }

    pub fn with_time(mut self, seconds: f64) -> Self {
        self.time = Some(seconds);
        self
    }

    pub fn with_request(mut self, request: Arc<Request>) -> Self {
        self.request = Some(request);
        self
    }

    /// Replaces the body and drops the cached JSON.
    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(body.into());
        self.json = OnceLock::new();
        self
    }

    pub fn set_time(&mut self, seconds: f64) -> &mut Self {
        self.time = Some(seconds);
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// Canonical reason phrase for [`Response::code`], if there is one.
    pub fn reason(&self) -> Option<&'static str> {
        status::description(self.code)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Looks up a header. With `ignore_case`, both the key and the stored names are lowercased
    /// before comparing.
    pub fn header(&self, name: &str, ignore_case: bool) -> Option<&str> {
        if !ignore_case {
            return self.headers.get(name).map(String::as_str);
        }

        let wanted = name.to_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Elapsed wall-clock time in seconds.
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    pub fn request(&self) -> Option<&Arc<Request>> {
        self.request.as_ref()
    }

    /// Body parsed as JSON. `None` when the body is empty or not valid JSON.
    pub fn json(&self) -> Option<Arc<Value>> {
        self.json
            .get_or_init(|| {
                let body = self.body.as_deref().filter(|b| !b.is_empty())?;
                match serde_json::from_str::<Value>(body) {
                    Ok(value) => Some(Arc::new(value)),
                    Err(e) => {
                        log::debug!("Response[{}]: body is not JSON: {}", self.code, e);
                        None
                    }
                }
            })
            .clone()
    }

    /// Body parsed as an XML tree, returning the root element.
    pub fn xml(&self) -> Result<XmlNode, HttpError> {
        xml::parse(self.body.as_deref().unwrap_or_default())
    }

    /// `{request, response: {code, body, headers, time}}`. With `parse_json`, a JSON body is
    /// rendered as the parsed structure instead of the raw text.
    pub fn to_value(&self, parse_json: bool) -> Value {
        let body = match (parse_json, self.json()) {
            (true, Some(parsed)) => parsed.as_ref().clone(),
            _ => self.body.clone().map(Value::String).unwrap_or(Value::Null),
        };

        json!({
            "request": self.request.as_ref().map(|r| r.to_value()).unwrap_or(Value::Null),
            "response": {
                "code": self.code,
                "body": body,
                "headers": self.headers,
                "time": self.time,
            }
        })
    }
}
