use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("entry has no request section")]
    MissingRequest,
    #[error("entry has no response section")]
    MissingResponse,
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid HAR json: {0}")]
    InvalidJson(String),
}

impl From<repeater_core::CoreError> for NormalizeError {
    fn from(err: repeater_core::CoreError) -> Self {
        match err {
            repeater_core::CoreError::InvalidUrl { url, reason } => Self::InvalidUrl { url, reason },
            repeater_core::CoreError::MissingHost(url) => Self::InvalidUrl {
                url,
                reason: "no host".to_string(),
            },
        }
    }
}
