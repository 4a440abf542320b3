//! Transport drivers.
//!
//! A [`Driver`] executes [`Request`]s against the network and hands back [`Response`]s. Every
//! implementation must behave the same way from the outside:
//!
//! - the request goes to [`Request::uri`] with [`Request::method`];
//! - GET never carries a body, other methods send [`Request::args`] as a form-url-encoded body
//!   (pairs) or verbatim (raw string);
//! - headers are [`Request::headers`] plus a `User-Agent` tagged with the driver name;
//! - timeout, TLS verification, redirects and basic auth come from the request's
//!   [`Options`](crate::Options);
//! - a status of 400 or above with `exceptions` enabled becomes [`HttpError::Status`]
//!   (see [`check_status`]);
//! - transport failures are returned as [`HttpError::Transport`], never panics;
//! - batches run concurrently and return exactly one response per input key. A failed entry
//!   yields a degraded response, not a missing key.
//!
//! Available drivers are chosen at build time through Cargo features (`reqwest`, `ureq`).
//! [`DriverKind::Auto`] picks the best one that was compiled in (see [`auto`]).

pub mod auto;
#[cfg(feature = "reqwest")]
pub mod reqwest;
#[cfg(feature = "ureq")]
pub mod ureq;

use crate::errors::HttpError;
use crate::net::{Args, Request, Response};
use crate::options::Options;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Name-keyed collection used for batches.
pub type Batch<T> = BTreeMap<String, T>;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub trait Driver: Send + Sync {
    /// Name used in the user agent suffix and in logs.
    fn name(&self) -> &'static str;

    /// Performs exactly one call.
    fn request(&self, request: Arc<Request>) -> Result<Response, HttpError>;

    /// Performs all calls concurrently. The result has the same keys as `requests`.
    fn multi_request(&self, requests: &Batch<Arc<Request>>) -> Result<Batch<Response>, HttpError>;
}

/// Known drivers. Parsed case-insensitively from the `driver` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Auto,
    Reqwest,
    Ureq,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Auto => "Auto",
            DriverKind::Reqwest => "Reqwest",
            DriverKind::Ureq => "Ureq",
        }
    }

    /// Whether the driver was compiled into this build. `Auto` always is.
    pub fn is_available(&self) -> bool {
        match self {
            DriverKind::Auto => true,
            DriverKind::Reqwest => cfg!(feature = "reqwest"),
            DriverKind::Ureq => cfg!(feature = "ureq"),
        }
    }
}

impl FromStr for DriverKind {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(DriverKind::Auto),
            "reqwest" => Ok(DriverKind::Reqwest),
            "ureq" => Ok(DriverKind::Ureq),
            _ => Err(HttpError::DriverNotFound(s.trim().to_string())),
        }
    }
}

impl Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Instantiates the driver for `kind`, resolving `Auto` first.
pub fn create_driver(kind: DriverKind) -> Result<Box<dyn Driver>, HttpError> {
    let kind = match kind {
        DriverKind::Auto => auto::detect(&auto::available())
            .ok_or_else(|| HttpError::DriverNotFound(DriverKind::Auto.to_string()))?,
        other => other,
    };

    match kind {
        #[cfg(feature = "reqwest")]
        DriverKind::Reqwest => Ok(Box::new(self::reqwest::ReqwestDriver::new())),
        #[cfg(feature = "ureq")]
        DriverKind::Ureq => Ok(Box::new(self::ureq::UreqDriver::new())),
        other => Err(HttpError::DriverNotFound(other.to_string())),
    }
}

/// Resolves a driver from its configured name.
pub fn driver_for_name(name: &str) -> Result<Box<dyn Driver>, HttpError> {
    create_driver(name.parse()?)
}

/// Body to put on the wire, already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Empty,
    Raw(String),
    Form(String),
}

impl Payload {
    pub fn for_request(request: &Request) -> Self {
        match request.args() {
            None => Payload::Empty,
            Some(args) if args.is_empty() => Payload::Empty,
            Some(Args::Raw(raw)) => Payload::Raw(raw.clone()),
            Some(args @ Args::Form(_)) => Payload::Form(args.encode()),
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Payload::Empty => None,
            Payload::Raw(body) | Payload::Form(body) => Some(body.into_bytes()),
        }
    }
}

/// Everything a driver needs to put one call on the wire.
#[derive(Debug, Clone)]
pub struct WireCall {
    pub method: http::Method,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub payload: Payload,
    /// `Authorization` value to add for the `auth` option. `None` when there are no credentials
    /// or the caller already sent an `Authorization` header.
    pub authorization: Option<String>,
    pub options: Options,
}

impl WireCall {
    /// Computes the effective wire shape of `request` for the driver called `driver_name`.
    pub fn prepare(request: &Request, driver_name: &str) -> Self {
        let options = request.options().clone();
        let payload = Payload::for_request(request);

        let mut headers = request.headers();
        if !has_header(&headers, "user-agent") {
            headers.insert("User-Agent".into(), options.user_agent(Some(driver_name)));
        }
        if matches!(payload, Payload::Form(_)) && !has_header(&headers, "content-type") {
            headers.insert("Content-Type".into(), FORM_CONTENT_TYPE.into());
        }
        let authorization = if has_header(&headers, "authorization") {
            None
        } else {
            options.auth().map(|(user, password)| basic_credentials(&user, &password))
        };

        Self {
            method: request.method().into(),
            uri: request.uri(),
            headers,
            payload,
            authorization,
            options,
        }
    }
}

fn basic_credentials(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

fn has_header(headers: &BTreeMap<String, String>, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// The status rule shared by every driver: with `exceptions` on, a status of 400 or above fails
/// with the body as message and the status as code.
pub fn check_status(options: &Options, code: u16, body: &str) -> Result<(), HttpError> {
    if code >= 400 && options.exceptions() {
        return Err(HttpError::Status {
            code,
            body: body.to_string(),
        });
    }
    Ok(())
}

/// Seconds since `start`, for stamping [`Response::time`].
pub fn elapsed(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

/// Converts a per-entry batch outcome into a response: failures become degraded responses so
/// the key is never dropped.
pub(crate) fn settle(
    name: &str,
    request: &Arc<Request>,
    outcome: Result<Response, HttpError>,
) -> Response {
    match outcome {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Driver[batch]: entry '{}' failed: {}", name, e);
            Response::from_error(&e, Some(request.clone()))
        }
    }
}
