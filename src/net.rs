//! Transport-independent request/response model.
//!
//! Everything here is plain data: building a [`Request`], reading a [`Response`]. No I/O happens
//! in this module; drivers in [`crate::driver`] do the actual network work.

pub mod args;
pub mod method;
pub mod request;
pub mod response;
pub mod status;
pub mod xml;

pub use args::Args;
pub use method::Method;
pub use request::{Request, RequestSpec};
pub use response::Response;
pub use xml::XmlNode;
