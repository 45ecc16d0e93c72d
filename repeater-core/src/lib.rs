mod body;
mod error;
mod filter;
mod format;
mod headers;
mod request;
mod response;

pub use body::{binary_placeholder, is_json_content_type, is_textual_content_type, materialize_body};
pub use error::CoreError;
pub use filter::RequestFilter;
pub use format::{format_size, status_class};
pub use headers::{Header, Headers};
pub use request::{QueryParam, Request, RequestId, UrlParts, now_millis};
pub use response::Response;
