use serde::{Deserialize, Serialize};

/// `{ "log": { "entries": [...] } }` as written by browser exports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarFile {
    pub log: HarLog,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarLog {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

/// One network-activity record. Sections are optional here so a truncated
/// entry is reported by the normalizer instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    #[serde(default)]
    pub started_date_time: Option<String>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub request: Option<HarRequest>,
    #[serde(default)]
    pub response: Option<HarResponse>,
    #[serde(default)]
    pub timings: Option<HarTimings>,
    #[serde(default, rename = "serverIPAddress")]
    pub server_ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub http_version: Option<String>,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(default)]
    pub query_string: Vec<HarQueryParam>,
    #[serde(default)]
    pub post_data: Option<HarPostData>,
    #[serde(default)]
    pub body_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub http_version: Option<String>,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(default)]
    pub content: HarContent,
    #[serde(default)]
    pub body_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarQueryParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarPostData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Phase durations in milliseconds; `-1` marks a phase that does not apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarTimings {
    #[serde(default)]
    pub blocked: Option<f64>,
    #[serde(default)]
    pub dns: Option<f64>,
    #[serde(default)]
    pub connect: Option<f64>,
    #[serde(default)]
    pub send: Option<f64>,
    #[serde(default)]
    pub wait: Option<f64>,
    #[serde(default)]
    pub receive: Option<f64>,
    #[serde(default)]
    pub ssl: Option<f64>,
}
