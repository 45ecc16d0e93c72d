use futures::future::BoxFuture;
use repeater_core::{Request, RequestId};
use repeater_har::{CapturedBody, HarEntry};
use repeater_storage::Settings;

/// Response content that the host hands over after the entry itself.
pub type BodyFuture = BoxFuture<'static, Result<CapturedBody, String>>;

/// One finished exchange reported by the host.
pub struct CaptureEvent {
    pub entry: HarEntry,
    pub body: Option<BodyFuture>,
}

impl CaptureEvent {
    pub fn new(entry: HarEntry) -> Self {
        Self { entry, body: None }
    }

    pub fn with_body(mut self, body: BodyFuture) -> Self {
        self.body = Some(body);
        self
    }
}

impl From<HarEntry> for CaptureEvent {
    fn from(entry: HarEntry) -> Self {
        Self::new(entry)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Captured(Request),
    Updated(Request),
    BodyAttached(RequestId),
    ResponseAttached(RequestId),
    Deleted(RequestId),
    Cleared { removed: usize },
    CaptureStarted,
    CaptureStopped,
    SettingsChanged(Settings),
}
