//! Driver-abstracted HTTP client.
//!
//! One blocking request/response API over interchangeable transport backends. The backend is
//! picked by the `driver` option (`"Reqwest"`, `"Ureq"` or `"Auto"`) and every backend honours the
//! same contract for URIs, bodies, headers, timeouts, redirects, auth and error reporting.
//!
//! ```no_run
//! use courier::HttpClient;
//! use serde_json::json;
//!
//! let mut client = HttpClient::new(json!({ "timeout": 5, "exceptions": true }));
//! let response = client.request(("https://httpbin.org/get", [("q", "rust")])).unwrap();
//! println!("{} {:?}", response.code(), response.json());
//! ```

#[cfg(not(any(feature = "reqwest", feature = "ureq")))]
compile_error!("courier requires at least one transport feature: enable `reqwest` or `ureq`");

pub mod client;
pub mod driver;
pub mod errors;
pub mod events;
pub mod net;
pub mod options;

pub use client::HttpClient;
pub use driver::{Driver, DriverKind};
pub use errors::HttpError;
pub use events::HttpEvent;
pub use net::{Args, Method, Request, RequestSpec, Response, XmlNode};
pub use options::Options;
