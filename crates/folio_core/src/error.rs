use thiserror::Error;

/// Why a request for a remote value failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The server answered with a status code the call did not expect.
    #[error("unexpected http status {status} {status_text}")]
    Transport { status: u16, status_text: String },
    /// A well-formed response reporting a semantic failure.
    #[error("rejected: {message}")]
    Rejection { message: String },
    /// Detected before any request was made.
    #[error("invalid input: {message}")]
    ClientValidation { message: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("timed out: {message}")]
    Timeout { message: String },
    #[error("unexpected response body: {message}")]
    Decode { message: String },
    #[error("cancelled")]
    Cancelled,
}

impl RequestError {
    pub fn transport(status: u16, status_text: impl Into<String>) -> Self {
        Self::Transport {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn rejection(message: impl Into<String>) -> Self {
        Self::Rejection {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
