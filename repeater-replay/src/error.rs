use std::fmt;

use repeater_codec::CodecError;
use repeater_web::RequestError;
use thiserror::Error;

/// Why an exchange produced no HTTP response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    Aborted,
    InvalidRequest,
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Aborted => "aborted",
            Self::InvalidRequest => "invalid-request",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<RequestError> for TransportError {
    fn from(err: RequestError) -> Self {
        let kind = match &err {
            RequestError::Timeout(_) => FailureKind::Timeout,
            RequestError::Connect(_)
            | RequestError::Tls(_)
            | RequestError::Io(_)
            | RequestError::InvalidResponse(_) => FailureKind::Network,
            RequestError::InvalidUrl(_) | RequestError::UnsupportedScheme(_) => {
                FailureKind::InvalidRequest
            }
        };
        Self::new(kind, err.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("replay failed ({kind}): {message}")]
    Transport { kind: FailureKind, message: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ReplayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { kind, .. } => *kind,
            Self::InvalidRequest(_) | Self::Codec(_) => FailureKind::InvalidRequest,
        }
    }
}

impl From<TransportError> for ReplayError {
    fn from(err: TransportError) -> Self {
        Self::Transport {
            kind: err.kind,
            message: err.message,
        }
    }
}
