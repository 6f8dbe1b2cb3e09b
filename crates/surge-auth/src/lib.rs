//! Credential acquisition for surge.
//!
//! [`TokenCache`] is the only entry point other crates use; it owns the
//! [`Authenticator`] and guarantees at most one token exchange in flight.

mod config;
pub use config::AuthConfig;

mod error;
pub use error::AuthError;

mod authenticator;
pub use authenticator::{Authenticator, parse_retry_after};

mod cache;
pub use cache::TokenCache;
