mod body;
mod error;
mod model;
mod normalize;

pub use body::CapturedBody;
pub use error::NormalizeError;
pub use model::{
    HarContent, HarEntry, HarFile, HarHeader, HarLog, HarPostData, HarQueryParam, HarRequest,
    HarResponse, HarTimings,
};
pub use normalize::{normalize_entry, normalize_json, parse_log, total_duration};
