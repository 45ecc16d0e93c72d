use repeater_codec::CodecError;
use repeater_core::RequestId;
use repeater_replay::ReplayError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("no request with id `{0}`")]
    NotFound(RequestId),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}
