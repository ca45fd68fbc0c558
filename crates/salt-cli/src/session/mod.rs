//! Session token persistence between invocations.

pub mod storage;

pub use storage::TokenCache;
