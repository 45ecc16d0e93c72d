mod decode;
mod encode;
mod error;

pub use decode::{DecodeOptions, RequestFields, decode};
pub use encode::{encode, encode_response};
pub use error::CodecError;
