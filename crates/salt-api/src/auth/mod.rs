//! Authentication types and token management.
//!
//! A [`Credential`] is the long-lived identity forwarded to the login
//! endpoint; a [`Token`] is the short-lived session it yields, held by a
//! [`TokenSlot`].

mod credentials;
mod token;

pub use credentials::{BEARER, Credential};
pub use token::{Token, TokenSlot};
