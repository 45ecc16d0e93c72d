use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::error::StorageError;
use crate::shared::SharedIndex;
use crate::snapshot::DEFAULT_RECENT_LIMIT;
use crate::store::KeyValueStore;

#[derive(Debug, Clone)]
pub struct SnapshotWorkerConfig {
    pub debounce: Duration,
    pub recent_limit: usize,
}

impl Default for SnapshotWorkerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

enum SnapshotSignal {
    Changed,
    Flush(Sender<()>),
}

/// Schedules debounced snapshot writes. When the last handle is dropped the
/// worker writes any pending snapshot and exits.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    sender: Sender<SnapshotSignal>,
}

impl SnapshotHandle {
    /// Marks the index dirty. Repeated calls inside the debounce window collapse
    /// into one write.
    pub fn schedule(&self) {
        match self.sender.try_send(SnapshotSignal::Changed) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("snapshot worker stopped, change not persisted");
            }
        }
    }

    /// Writes a pending snapshot now and waits for it to land.
    pub fn flush(&self) -> Result<(), StorageError> {
        let (ack, done) = bounded(1);
        self.sender
            .send(SnapshotSignal::Flush(ack))
            .map_err(|_| StorageError::WorkerStopped)?;
        done.recv().map_err(|_| StorageError::WorkerStopped)
    }
}

pub fn spawn_snapshot_worker(
    index: SharedIndex,
    store: Arc<dyn KeyValueStore>,
    config: SnapshotWorkerConfig,
) -> SnapshotHandle {
    let (sender, receiver) = bounded(1);
    std::thread::spawn(move || worker_loop(receiver, index, store, config));
    SnapshotHandle { sender }
}

fn worker_loop(
    receiver: Receiver<SnapshotSignal>,
    index: SharedIndex,
    store: Arc<dyn KeyValueStore>,
    config: SnapshotWorkerConfig,
) {
    loop {
        match receiver.recv() {
            Ok(SnapshotSignal::Changed) => {}
            Ok(SnapshotSignal::Flush(ack)) => {
                let _ = ack.send(());
                continue;
            }
            Err(_) => return,
        }

        let mut deadline = Instant::now() + config.debounce;
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(wait) {
                Ok(SnapshotSignal::Changed) => {
                    deadline = Instant::now() + config.debounce;
                }
                Ok(SnapshotSignal::Flush(ack)) => {
                    write_snapshot(&index, store.as_ref(), config.recent_limit);
                    let _ = ack.send(());
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    write_snapshot(&index, store.as_ref(), config.recent_limit);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    write_snapshot(&index, store.as_ref(), config.recent_limit);
                    return;
                }
            }
        }
    }
}

fn write_snapshot(index: &SharedIndex, store: &dyn KeyValueStore, recent_limit: usize) {
    let snapshot = index.snapshot(recent_limit);
    match snapshot.write(store) {
        Ok(()) => tracing::debug!(
            recent = snapshot.recent_requests.len(),
            total = snapshot.request_count,
            "wrote request snapshot"
        ),
        Err(err) => tracing::warn!(error = %err, "failed to persist request snapshot"),
    }
}
