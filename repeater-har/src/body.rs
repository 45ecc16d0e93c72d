use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use repeater_core::materialize_body;

/// Response content delivered by the host, possibly after the entry itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedBody {
    pub text: String,
    pub encoding: Option<String>,
}

impl CapturedBody {
    pub fn new(text: impl Into<String>, encoding: Option<String>) -> Self {
        Self {
            text: text.into(),
            encoding,
        }
    }

    /// Raw payload bytes. Base64 that fails to decode is kept as literal text.
    pub fn bytes(&self) -> Vec<u8> {
        let is_base64 = self
            .encoding
            .as_deref()
            .is_some_and(|encoding| encoding.eq_ignore_ascii_case("base64"));
        if is_base64 {
            match STANDARD.decode(self.text.trim()) {
                Ok(bytes) => return bytes,
                Err(err) => tracing::debug!(error = %err, "body is not valid base64"),
            }
        }
        self.text.as_bytes().to_vec()
    }

    /// Body text as stored on a response, and the payload size in bytes.
    pub fn materialize(&self, content_type: Option<&str>) -> (String, u64) {
        let bytes = self.bytes();
        (materialize_body(content_type, &bytes), bytes.len() as u64)
    }
}
