//! Error type shared by the client, the requests it builds and every driver.
//!
//! Two families live in the same enum:
//!
//! - **Misuse**: [`HttpError::InvalidMethod`] and [`HttpError::DriverNotFound`]. These point at
//!   a bug in the calling code and are always returned as `Err`, whatever the `exceptions` option says.
//! - **Operational**: [`HttpError::Transport`] and [`HttpError::Status`]. These are expected at
//!   runtime. The client turns them into an `Err` only when `exceptions` is enabled, and into a
//!   degraded [`Response`](crate::Response) otherwise.
//!
//! [`HttpError::Xml`] is only produced when the caller asks for an XML view of a response body.

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Undefined HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Driver '{0}' not found")]
    DriverNotFound(String),

    /// The backend could not complete the call (DNS, connect, TLS, timeout, malformed response).
    #[error("{message}")]
    Transport {
        message: String,
        code: u16,
        #[source]
        source: Option<BoxError>,
    },

    /// A well-formed response with a status of 400 or above, raised because `exceptions` is on.
    #[error("{body}")]
    Status { code: u16, body: String },

    #[error("Can't parse xml document from HTTP response. Details: {0}")]
    Xml(String),
}

impl HttpError {
    /// Wraps a backend error as a transport failure. Neither backend exposes a numeric error
    /// code, so the code is always 0 (the "never completed" response code).
    pub fn transport<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HttpError::Transport {
            message: source.to_string(),
            code: 0,
            source: Some(Box::new(source)),
        }
    }

    /// Numeric code: the HTTP status for [`HttpError::Status`], the native code for
    /// [`HttpError::Transport`], 0 for everything else.
    pub fn code(&self) -> u16 {
        match self {
            HttpError::Transport { code, .. } => *code,
            HttpError::Status { code, .. } => *code,
            _ => 0,
        }
    }

    /// True for errors caused by the caller (bad method, unknown driver).
    pub fn is_misuse(&self) -> bool {
        matches!(self, HttpError::InvalidMethod(_) | HttpError::DriverNotFound(_))
    }
}
