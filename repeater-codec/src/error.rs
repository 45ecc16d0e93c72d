use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty request")]
    EmptyRequest,
    #[error("invalid request line: `{0}`")]
    InvalidRequestLine(String),
    #[error("URL must be absolute or Host header required")]
    HostRequired,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
