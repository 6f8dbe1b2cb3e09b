use surge_transport::TransportError;
use thiserror::Error;

/// Authentication failure.
///
/// `Clone` so a single failed exchange can be handed to every caller that waited on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("failed to fetch token: server answered {status}: {body}")]
    Failed { status: u16, body: String },

    #[error("failed to fetch token: maximum authentication retries {max_retries} exceeded")]
    Exhausted { max_retries: u32 },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("token request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("authentication cancelled")]
    Cancelled,
}
