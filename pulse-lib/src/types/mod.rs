#![allow(unreachable_pub)]

mod endpoint;
mod error;
mod status;

pub use endpoint::{DEFAULT_METHOD, Endpoint, load_endpoints, parse_endpoints};
pub use error::ErrorKind;
pub use status::ProbeStatus;

/// The pulse `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
