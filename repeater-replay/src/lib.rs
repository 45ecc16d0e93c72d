mod error;
mod service;
mod transport;

pub use error::{FailureKind, ReplayError, TransportError};
pub use service::{ReplayRequest, ReplayService, has_body_semantics};
pub use transport::{ExecuteRequest, ExecuteResponse, Transport};
