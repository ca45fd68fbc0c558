//! Validated value types.

mod api_url;

pub use api_url::{ApiUrl, SALT_API_PORT};
