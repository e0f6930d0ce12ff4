use thiserror::Error;

/// Boxed error handed over by the transport collaborator.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ResponsesError {
    /// Incoming JSON was malformed or did not match the wire contract
    /// (missing required or required-nullable key, wrong JSON kind, a
    /// malformed stream frame).
    #[error("Decode error: {0}")]
    Decode(String),
    /// An in-memory value violates a wire-required invariant and cannot be
    /// encoded (e.g. a response `error` without `code`).
    #[error("Encode error: {0}")]
    Encode(String),
    /// The request breaks a business rule and was rejected before any
    /// network interaction.
    #[error("Invalid request: {0}")]
    Validation(String),
    /// The event stream violated ordering rules, such as a sequence number
    /// that did not increase.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// The transport failed. Passed through untouched.
    #[error("Transport error: {0}")]
    Transport(TransportError),
    /// The server answered with a non-success status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
}

/// Coarse grouping used to pick a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller built an invalid request.
    InvalidRequest,
    /// The server's output did not match the protocol.
    InvalidResponse,
    /// The network or server failed.
    Network,
}

impl ResponsesError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::Encode(_) => ErrorCategory::InvalidRequest,
            Self::Decode(_) | Self::Protocol(_) => ErrorCategory::InvalidResponse,
            Self::Transport(_) | Self::StatusCode(..) => ErrorCategory::Network,
        }
    }

    /// Only transport failures, rate limiting and server-side statuses are
    /// worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::StatusCode(status, _) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }

    pub(crate) fn decode(message: impl std::fmt::Display) -> Self {
        Self::Decode(message.to_string())
    }

    pub(crate) fn encode(message: impl std::fmt::Display) -> Self {
        Self::Encode(message.to_string())
    }
}

impl From<reqwest::Error> for ResponsesError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}

pub type ResponsesResult<T> = Result<T, ResponsesError>;
