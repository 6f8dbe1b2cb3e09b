use surge_auth::AuthError;
use surge_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to create event: server answered {status}: {detail}")]
    SubmissionFailed { status: u16, detail: String },

    #[error("unexpected status {status} from {path}: {body}")]
    UnexpectedStatus {
        path: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("access token is not a valid header value")]
    InvalidToken,
}
