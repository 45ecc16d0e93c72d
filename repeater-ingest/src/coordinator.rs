use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::{Stream, StreamExt};
use repeater_codec::{DecodeOptions, RequestFields, decode, encode, encode_response};
use repeater_core::{Request, RequestFilter, RequestId, Response};
use repeater_har::normalize_entry;
use repeater_replay::{ReplayError, ReplayRequest, ReplayService, Transport};
use repeater_storage::{
    KeyValueStore, Settings, SettingsPatch, SharedIndex, SnapshotHandle, SnapshotWorkerConfig,
    StorageError, Theme, WorkspaceConfig, load_settings, restore_index, save_settings,
    spawn_snapshot_worker,
};
use tokio::sync::broadcast;

use crate::error::CoordinatorError;
use crate::event::{CaptureEvent, PanelEvent};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub max_stored: usize,
    pub auto_capture: bool,
    pub recent_limit: usize,
    pub debounce: Duration,
    pub default_scheme: String,
    pub include_credentials: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from_workspace(&WorkspaceConfig::default())
    }
}

impl CoordinatorConfig {
    pub fn from_workspace(config: &WorkspaceConfig) -> Self {
        Self {
            max_stored: config.capture.max_stored,
            auto_capture: config.capture.auto_capture,
            recent_limit: config.persistence.recent_limit,
            debounce: Duration::from_millis(config.persistence.debounce_ms),
            default_scheme: config.replay.default_scheme.clone(),
            include_credentials: config.replay.include_credentials,
        }
    }

    fn default_settings(&self) -> Settings {
        Settings {
            auto_capture: self.auto_capture,
            max_requests: self.max_stored,
            ..Settings::default()
        }
    }
}

/// Owns the capture flag and wires capture events, the index, persistence and
/// replay together. Every index mutation schedules a snapshot write.
pub struct Coordinator<T> {
    index: SharedIndex,
    store: Arc<dyn KeyValueStore>,
    replay: ReplayService<T>,
    snapshots: SnapshotHandle,
    capturing: AtomicBool,
    settings: Mutex<Settings>,
    events: broadcast::Sender<PanelEvent>,
    decode_options: DecodeOptions,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(
        index: SharedIndex,
        store: Arc<dyn KeyValueStore>,
        transport: T,
        config: CoordinatorConfig,
    ) -> Self {
        let settings = load_settings(store.as_ref(), config.default_settings());
        let evicted = index.set_max_stored(settings.max_requests);
        if !evicted.is_empty() {
            tracing::debug!(evicted = evicted.len(), "trimmed index to configured capacity");
        }
        let snapshots = spawn_snapshot_worker(
            index.clone(),
            Arc::clone(&store),
            SnapshotWorkerConfig {
                debounce: config.debounce,
                recent_limit: config.recent_limit,
            },
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        if settings.auto_capture {
            tracing::info!("auto capture enabled");
        }

        Self {
            index,
            capturing: AtomicBool::new(settings.auto_capture),
            replay: ReplayService::new(transport).with_credentials(config.include_credentials),
            store,
            snapshots,
            settings: Mutex::new(settings),
            events,
            decode_options: DecodeOptions::with_scheme(config.default_scheme),
        }
    }

    /// Builds the index from the last persisted snapshot before starting.
    pub fn restore(store: Arc<dyn KeyValueStore>, transport: T, config: CoordinatorConfig) -> Self {
        let settings = load_settings(store.as_ref(), config.default_settings());
        let index = restore_index(store.as_ref(), settings.max_requests, config.recent_limit);
        Self::new(SharedIndex::new(index), store, transport, config)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub fn transport(&self) -> &T {
        self.replay.transport()
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn start_capture(&self) {
        if !self.capturing.swap(true, Ordering::SeqCst) {
            tracing::info!("capture started");
            self.emit(PanelEvent::CaptureStarted);
        }
    }

    pub fn stop_capture(&self) {
        if self.capturing.swap(false, Ordering::SeqCst) {
            tracing::info!("capture stopped");
            self.emit(PanelEvent::CaptureStopped);
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Normalizes and indexes one entry. Ignored while capture is stopped;
    /// malformed entries are logged and dropped. A pending body is awaited on
    /// its own task so later entries are indexed without waiting for it.
    pub async fn handle_capture(&self, event: CaptureEvent) -> Option<Request> {
        if !self.is_capturing() {
            return None;
        }
        let request = match normalize_entry(&event.entry) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "dropping capture entry");
                return None;
            }
        };

        let outcome = self.index.insert(request.clone());
        tracing::debug!(
            id = %request.id(),
            domain = request.hostname(),
            evicted = outcome.evicted.len(),
            "captured request"
        );
        self.snapshots.schedule();
        self.emit(PanelEvent::Captured(request.clone()));

        if let (Some(body), Some(captured)) = (event.body, request.response().cloned()) {
            let id = request.id().clone();
            let index = self.index.clone();
            let snapshots = self.snapshots.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                match body.await {
                    Ok(body) => {
                        let (text, size) = body.materialize(captured.content_type.as_deref());
                        if index.attach_body(&id, &captured, text, size) {
                            snapshots.schedule();
                            let _ = events.send(PanelEvent::BodyAttached(id));
                        }
                    }
                    Err(err) => tracing::warn!(%id, error = %err, "response body unavailable"),
                }
            });
        }
        Some(request)
    }

    pub async fn ingest_stream(&self, mut events: impl Stream<Item = CaptureEvent> + Unpin) {
        while let Some(event) = events.next().await {
            self.handle_capture(event).await;
        }
    }

    pub fn get(&self, id: &RequestId) -> Option<Request> {
        self.index.get(id)
    }

    pub fn get_all(&self) -> Vec<Request> {
        self.index.get_all()
    }

    pub fn get_by_domain(&self) -> BTreeMap<String, Vec<Request>> {
        self.index.list_by_domain()
    }

    pub fn filtered(&self, filter: &RequestFilter) -> Vec<Request> {
        self.index
            .read(|index| filter.apply(index.iter()).into_iter().cloned().collect())
    }

    pub fn delete(&self, id: &RequestId) -> Result<Request, CoordinatorError> {
        let removed = self
            .index
            .delete(id)
            .ok_or_else(|| CoordinatorError::NotFound(id.clone()))?;
        self.snapshots.schedule();
        self.emit(PanelEvent::Deleted(id.clone()));
        Ok(removed)
    }

    pub fn clear(&self) -> usize {
        let removed = self.index.clear();
        self.snapshots.schedule();
        self.emit(PanelEvent::Cleared { removed });
        removed
    }

    pub fn encode_raw(&self, request: &Request) -> String {
        encode(request)
    }

    pub fn encode_raw_response(&self, response: &Response) -> String {
        encode_response(response)
    }

    /// Decodes with the configured default scheme.
    pub fn decode_raw(&self, text: &str) -> Result<RequestFields, CoordinatorError> {
        Ok(decode(text, &self.decode_options)?)
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_options
    }

    /// Executes without touching the index.
    pub async fn replay(&self, request: ReplayRequest) -> Result<Response, ReplayError> {
        self.replay.replay(request).await
    }

    pub async fn replay_raw(&self, text: &str, options: &DecodeOptions) -> Result<Response, ReplayError> {
        self.replay.replay_raw(text, options).await
    }

    /// Copy of a stored request under a fresh id, placed at the head.
    pub fn duplicate(&self, id: &RequestId) -> Result<Request, CoordinatorError> {
        let original = self
            .index
            .get(id)
            .ok_or_else(|| CoordinatorError::NotFound(id.clone()))?;
        let copy = original.duplicate();
        self.index.insert(copy.clone());
        self.snapshots.schedule();
        self.emit(PanelEvent::Captured(copy.clone()));
        Ok(copy)
    }

    /// Replaces a stored request with the decoded text, keeping its id and
    /// position. The old response is dropped.
    pub fn apply_raw_edit(&self, id: &RequestId, text: &str) -> Result<Request, CoordinatorError> {
        let existing = self
            .index
            .get(id)
            .ok_or_else(|| CoordinatorError::NotFound(id.clone()))?;
        let fields = decode(text, &DecodeOptions::for_request(&existing))?;
        let mime_type = fields.headers.get("content-type").map(str::to_string);
        let edited = Request::with_id(id.clone(), existing.timestamp, fields.method, &fields.url)
            .map_err(|err| repeater_codec::CodecError::InvalidUrl(err.to_string()))?
            .with_headers(fields.headers)
            .with_body(fields.body, mime_type);

        if !self.index.insert(edited.clone()).replaced {
            tracing::debug!(%id, "edited request was removed meanwhile, re-added");
        }
        self.snapshots.schedule();
        self.emit(PanelEvent::Updated(edited.clone()));
        Ok(edited)
    }

    /// Replays a stored request and attaches the new response on success.
    /// A failed replay leaves the stored request and its old response alone.
    pub async fn resend(&self, id: &RequestId) -> Result<Response, CoordinatorError> {
        let stored = self
            .index
            .get(id)
            .ok_or_else(|| CoordinatorError::NotFound(id.clone()))?;
        let response = self.replay.replay(ReplayRequest::from(&stored)).await?;
        if self.index.attach_response(id, response.clone()) {
            self.snapshots.schedule();
            self.emit(PanelEvent::ResponseAttached(id.clone()));
        }
        Ok(response)
    }

    pub fn settings(&self) -> Settings {
        self.lock_settings().clone()
    }

    pub fn update_settings(&self, patch: SettingsPatch) -> Settings {
        let updated = {
            let mut settings = self.lock_settings();
            patch.apply(&mut settings);
            settings.clone()
        };
        if let Err(err) = save_settings(self.store.as_ref(), &updated) {
            tracing::warn!(error = %err, "failed to persist settings");
        }
        let evicted = self.index.set_max_stored(updated.max_requests);
        if !evicted.is_empty() {
            self.snapshots.schedule();
        }
        self.emit(PanelEvent::SettingsChanged(updated.clone()));
        updated
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.settings().theme.toggled();
        self.update_settings(SettingsPatch {
            theme: Some(theme),
            ..SettingsPatch::default()
        });
        theme
    }

    /// Writes any pending snapshot before returning.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.snapshots.flush()
    }

    fn lock_settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PanelEvent) {
        let _ = self.events.send(event);
    }
}
