//! HTTP plumbing: request execution, endpoint payloads and envelope decoding.

mod decoder;
mod endpoints;
mod executor;

pub use decoder::{decode, decode_envelope};
pub use endpoints::*;
pub use executor::{Executor, HttpExecutor, PostRequest, RawResponse, X_AUTH_TOKEN};
