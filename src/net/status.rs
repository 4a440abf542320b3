//! HTTP status classification.
//!
//! Convenience helpers for callers and tests. The client itself never branches on these; the
//! only status check in the request path is the `>= 400` rule applied by every driver.

use http::StatusCode;

pub const OK: u16 = 200;
pub const MULTIPLE_CHOICES: u16 = 300;
pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// 2xx
pub fn is_successful(code: u16) -> bool {
    (OK..MULTIPLE_CHOICES).contains(&code)
}

/// 3xx
pub fn is_redirect(code: u16) -> bool {
    (MULTIPLE_CHOICES..BAD_REQUEST).contains(&code)
}

/// 4xx and 5xx
pub fn is_error(code: u16) -> bool {
    code >= BAD_REQUEST
}

/// 5xx
pub fn is_fatal_error(code: u16) -> bool {
    code >= INTERNAL_SERVER_ERROR
}

pub fn is_forbidden(code: u16) -> bool {
    code == FORBIDDEN
}

pub fn is_not_found(code: u16) -> bool {
    code == NOT_FOUND
}

pub fn is_unauthorized(code: u16) -> bool {
    code == UNAUTHORIZED
}

/// Neither 401 nor 403.
pub fn has_access(code: u16) -> bool {
    !is_forbidden(code) && !is_unauthorized(code)
}

/// Reason phrase for `code`. Covers the registered codes plus a few widely used
/// proxy/CDN extensions.
pub fn description(code: u16) -> Option<&'static str> {
    let extension = match code {
        306 => Some("Switch Proxy"),
        425 => Some("Too Early"),
        499 => Some("Client Closed Request"),
        520 => Some("Unknown Error"),
        521 => Some("Web Server Is Down"),
        522 => Some("Connection Timed Out"),
        523 => Some("Origin Is Unreachable"),
        524 => Some("A Timeout Occurred"),
        525 => Some("SSL Handshake Failed"),
        526 => Some("Invalid SSL Certificate"),
        _ => None,
    };

    extension.or_else(|| {
        StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
    })
}
