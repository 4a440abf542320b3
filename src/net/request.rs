//! A single HTTP call, fully specified but not yet executed.
//!
//! [`Request`] is built once (by the client, or by hand in tests) and then handed to a driver
//! behind an `Arc`; nothing mutates it afterwards. All wire-facing values are derived on demand:
//!
//! - [`Request::uri`]: for GET the args are merged into the query string, otherwise the URL as given.
//! - [`Request::args`]: `None` for GET (the args moved into the URI), the raw args otherwise.
//! - [`Request::headers`]: option-level headers overlaid by request-level headers.
//!
//! [`RequestSpec`] is the caller-facing description of a call, the `[url, args?, method?, options?]`
//! tuple accepted by [`HttpClient::request`](crate::HttpClient::request) and by batch entries.

use crate::errors::HttpError;
use crate::net::args::Args;
use crate::net::method::Method;
use crate::options::{into_map, Options, OptionsMap};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    url: String,
    args: Option<Args>,
    method: Method,
    headers: BTreeMap<String, String>,
    options: Options,
}

impl Request {
    /// GET request for `url` with default options.
    pub fn new(url: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().trim().to_string(),
            args: None,
            method: Method::Get,
            headers: BTreeMap::new(),
            options: Options::default(),
        }
    }

    pub fn with_args(mut self, args: impl Into<Args>) -> Self {
        self.args = Some(args.into());
        self
    }

    pub fn without_args(mut self) -> Self {
        self.args = None;
        self
    }

    /// Sets the method from a loose string (`"post"`, `" Get "`, `""`). Fails for anything outside
    /// GET/HEAD/PUT/POST/PATCH/DELETE.
    pub fn with_method(mut self, method: &str) -> Result<Self, HttpError> {
        self.method = Method::parse(method)?;
        Ok(self)
    }

    pub fn with_verb(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replaces the request-level headers.
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

    /// Lays `overrides` over the current options, producing a fresh option set.
    pub fn with_options(mut self, overrides: &OptionsMap) -> Self {
        self.options = self.options.merge(overrides);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Effective URI. For GET, args are merged into the existing query string: existing pairs
    /// keep their position, a repeated key takes the arg's value, new keys are appended.
    pub fn uri(&self) -> String {
        match (&self.args, self.method.args_in_query()) {
            (Some(args), true) if !args.is_empty() => merge_query(&self.url, &args.pairs()),
            _ => self.url.clone(),
        }
    }

    /// Effective args for the transport: always `None` for GET.
    pub fn args(&self) -> Option<&Args> {
        if self.method.args_in_query() {
            None
        } else {
            self.args.as_ref()
        }
    }

    /// Effective headers: option headers overlaid by request headers.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.options.headers();
        headers.extend(self.headers.clone());
        headers
    }

    /// `{uri, method, args, headers, options}` snapshot used in logs, assertions and
    /// [`Response::to_value`](crate::Response::to_value).
    pub fn to_value(&self) -> Value {
        json!({
            "uri": self.uri(),
            "method": self.method.as_str(),
            "args": self.args().map(Args::to_value).unwrap_or(Value::Null),
            "headers": self.headers(),
            "options": Value::Object(self.options.to_map()),
        })
    }
}

fn merge_query(url: &str, args: &[(String, String)]) -> String {
    let mut merged: Vec<(String, String)> = Vec::new();

    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Request[{url}]: not an absolute URL ({e}), appending args verbatim");
            let separator = if url.contains('?') { '&' } else { '?' };
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(args)
                .finish();
            return format!("{url}{separator}{query}");
        }
    };

    for (key, value) in parsed.query_pairs().into_owned().chain(args.iter().cloned()) {
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => merged.push((key, value)),
        }
    }

    parsed.query_pairs_mut().clear().extend_pairs(&merged);
    parsed.to_string()
}

/// Caller-side description of one call: `url`, optional `args`, method (default GET) and option
/// overrides. Tuples convert into it, mirroring the `[url]`, `[url, args]`, `[url, args, method]`
/// and `[url, args, method, options]` batch entry forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSpec {
    pub url: String,
    pub args: Option<Args>,
    pub method: String,
    pub options: OptionsMap,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn args(mut self, args: impl Into<Args>) -> Self {
        self.args = Some(args.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Option overrides for this call only. Non-object values are ignored.
    pub fn options(mut self, options: impl Into<Value>) -> Self {
        self.options = into_map(options.into());
        self
    }

    /// Builds the request: `defaults` first, then this call's own overrides.
    pub fn build(self, defaults: &Options) -> Result<Request, HttpError> {
        let mut request = Request::new(&self.url).with_method(&self.method)?;
        request.args = self.args;
        request.options = defaults.merge(&self.options);
        Ok(request)
    }
}

impl From<&str> for RequestSpec {
    fn from(url: &str) -> Self {
        RequestSpec::new(url)
    }
}

impl From<String> for RequestSpec {
    fn from(url: String) -> Self {
        RequestSpec::new(url)
    }
}

impl<U: Into<String>> From<(U,)> for RequestSpec {
    fn from((url,): (U,)) -> Self {
        RequestSpec::new(url)
    }
}

impl<U: Into<String>, A: Into<Args>> From<(U, A)> for RequestSpec {
    fn from((url, args): (U, A)) -> Self {
        RequestSpec::new(url).args(args)
    }
}

impl<U: Into<String>, A: Into<Args>, M: Into<String>> From<(U, A, M)> for RequestSpec {
    fn from((url, args, method): (U, A, M)) -> Self {
        RequestSpec::new(url).args(args).method(method)
    }
}

impl<U: Into<String>, A: Into<Args>, M: Into<String>> From<(U, A, M, Value)> for RequestSpec {
    fn from((url, args, method, options): (U, A, M, Value)) -> Self {
        RequestSpec::new(url).args(args).method(method).options(options)
    }
}
