use crate::errors::HttpError;
use std::fmt::Display;
use std::str::FromStr;

/// HTTP methods a [`Request`](crate::Request) may use. Anything else is rejected when the request
/// is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Put,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Get,
        Method::Head,
        Method::Put,
        Method::Post,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Trims and uppercases `raw`; an empty string means GET.
    pub fn parse(raw: &str) -> Result<Self, HttpError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Ok(Method::Get);
        }

        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or(HttpError::InvalidMethod(normalized))
    }

    /// Methods whose args travel in the URI instead of the body.
    pub fn args_in_query(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::parse(s)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Head => http::Method::HEAD,
            Method::Put => http::Method::PUT,
            Method::Post => http::Method::POST,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
        }
    }
}
