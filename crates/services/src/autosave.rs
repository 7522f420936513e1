//! Debounced snapshot persistence.
//!
//! Rapid successive edits coalesce into a single write: each scheduled
//! snapshot replaces any pending one and restarts the timer. Dropping the
//! handle cancels whatever is still pending, which is safe because every
//! write is an idempotent full-state snapshot. `flush` forces the pending
//! write immediately for orderly shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::error;

use storage::repository::{ChecklistSnapshot, ChecklistStore, StorageError};

enum Msg {
    Queue(Box<ChecklistSnapshot>),
    Flush(oneshot::Sender<Result<(), StorageError>>),
}

/// Handle to the background autosave task.
pub struct Autosave {
    tx: mpsc::UnboundedSender<Msg>,
}

impl Autosave {
    /// Spawns the autosave task with the given debounce window.
    #[must_use]
    pub fn start(store: Arc<dyn ChecklistStore>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(store, debounce, rx));
        Self { tx }
    }

    /// Queues a snapshot, replacing any pending one and resetting the timer.
    pub fn schedule(&self, snapshot: ChecklistSnapshot) {
        // A closed channel means the task is gone; nothing useful to do.
        let _ = self.tx.send(Msg::Queue(Box::new(snapshot)));
    }

    /// Writes the pending snapshot now, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the forced write fails.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Msg::Flush(ack)).is_err() {
            return Ok(());
        }
        done.await.unwrap_or(Ok(()))
    }
}

async fn run(
    store: Arc<dyn ChecklistStore>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Msg>,
) {
    let mut pending: Option<Box<ChecklistSnapshot>> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        // With nothing pending, park far in the future; the guard below keeps
        // the timer branch disabled anyway.
        let when = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3_600));

        tokio::select! {
            msg = rx.recv() => match msg {
                Some(Msg::Queue(snapshot)) => {
                    pending = Some(snapshot);
                    deadline = Some(Instant::now() + debounce);
                }
                Some(Msg::Flush(ack)) => {
                    let result = write_pending(store.as_ref(), &mut pending).await;
                    deadline = None;
                    let _ = ack.send(result);
                }
                // Handle dropped: cancel any pending write and stop.
                None => break,
            },
            () = tokio::time::sleep_until(when), if deadline.is_some() => {
                if let Err(err) = write_pending(store.as_ref(), &mut pending).await {
                    // Non-fatal: keep serving the in-memory state.
                    error!(error = %err, "autosave write failed");
                }
                deadline = None;
            }
        }
    }
}

async fn write_pending(
    store: &dyn ChecklistStore,
    pending: &mut Option<Box<ChecklistSnapshot>>,
) -> Result<(), StorageError> {
    match pending.take() {
        Some(snapshot) => store.save(&snapshot).await,
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preflight_core::model::{Checklist, ChecklistId, TemplateId};
    use preflight_core::time::fixed_now;
    use storage::repository::InMemoryStore;

    fn snapshot(title: &str) -> ChecklistSnapshot {
        let checklist = Checklist::new(
            ChecklistId::generate(),
            TemplateId::new("test"),
            title,
            None,
            fixed_now(),
        )
        .unwrap();
        ChecklistSnapshot::from_checklist(&checklist)
    }

    #[tokio::test]
    async fn rapid_schedules_coalesce_into_one_write() {
        let store = InMemoryStore::new();
        let autosave = Autosave::start(Arc::new(store.clone()), Duration::from_millis(50));

        for i in 0..10 {
            autosave.schedule(snapshot(&format!("edit {i}")));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.save_count(), 1);
        let saved = store.load().await.unwrap().unwrap();
        assert_eq!(saved.title, "edit 9");
    }

    #[tokio::test]
    async fn flush_forces_an_immediate_write() {
        let store = InMemoryStore::new();
        let autosave = Autosave::start(Arc::new(store.clone()), Duration::from_secs(300));

        autosave.schedule(snapshot("urgent"));
        autosave.flush().await.unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().await.unwrap().unwrap().title, "urgent");
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_pending_writes() {
        let store = InMemoryStore::new();
        let autosave = Autosave::start(Arc::new(store.clone()), Duration::from_millis(50));

        autosave.schedule(snapshot("never written"));
        drop(autosave);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.save_count(), 0);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn flush_with_nothing_pending_is_a_no_op() {
        let store = InMemoryStore::new();
        let autosave = Autosave::start(Arc::new(store.clone()), Duration::from_millis(50));

        autosave.flush().await.unwrap();
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn timer_resets_on_every_schedule() {
        let store = InMemoryStore::new();
        let autosave = Autosave::start(Arc::new(store.clone()), Duration::from_millis(100));

        autosave.schedule(snapshot("first"));
        tokio::time::sleep(Duration::from_millis(60)).await;
        autosave.schedule(snapshot("second"));
        tokio::time::sleep(Duration::from_millis(60)).await;

        // 120ms after the first schedule, but only 60ms after the second:
        // the debounce window restarted, so nothing is written yet.
        assert_eq!(store.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().await.unwrap().unwrap().title, "second");
    }
}
