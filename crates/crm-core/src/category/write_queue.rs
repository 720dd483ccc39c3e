//! Background write-through queue for the category list.
//!
//! Callers enqueue full snapshots and return immediately. A single worker
//! task drains the queue and writes to the repository. Snapshots queued while
//! a write is in flight are coalesced: only the newest one is written, since
//! each snapshot supersedes the previous.
//!
//! Failed writes are logged and dropped, not retried. The in-memory store
//! stays authoritative until the next successful write. A flush reports the
//! outcome of the most recent write so that callers which must surface
//! storage failures can.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::model::Category;
use super::repository::CategoryRepository;
use crate::error::{CrmError, Result};

type FlushReply = oneshot::Sender<Result<()>>;

enum WriteOp {
    Save(Vec<Category>),
    Clear,
    Flush(FlushReply),
}

/// Handle to the write worker. Cloning shares the same worker.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl WriteQueue {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// The worker exits once every handle has been dropped and the queue
    /// is drained.
    pub fn spawn(repository: Arc<dyn CategoryRepository>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(repository, rx));
        Self { tx }
    }

    /// Queues a snapshot for persistence.
    pub fn save(&self, snapshot: Vec<Category>) {
        self.send(WriteOp::Save(snapshot));
    }

    /// Queues removal of the persisted list.
    pub fn clear(&self) {
        self.send(WriteOp::Clear);
    }

    /// Waits until every operation queued before this call has been attempted
    /// and returns the outcome of the most recent write. `Ok` when nothing has
    /// been written yet.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(WriteOp::Flush(done_tx));
        done_rx
            .await
            .map_err(|_| CrmError::internal("write worker stopped before flushing"))?
    }

    fn send(&self, op: WriteOp) {
        if self.tx.send(op).is_err() {
            tracing::error!("[WriteQueue] Worker is gone; write dropped");
        }
    }
}

async fn run_worker(
    repository: Arc<dyn CategoryRepository>,
    mut rx: mpsc::UnboundedReceiver<WriteOp>,
) {
    let mut last_result = Ok(());
    while let Some(op) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        absorb(op, &mut latest, &mut waiters);

        while let Ok(op) = rx.try_recv() {
            absorb(op, &mut latest, &mut waiters);
        }

        if let Some(op) = latest {
            last_result = apply(repository.as_ref(), op).await;
        }

        for waiter in waiters {
            let _ = waiter.send(last_result.clone());
        }
    }

    tracing::debug!("[WriteQueue] Worker stopped");
}

fn absorb(op: WriteOp, latest: &mut Option<WriteOp>, waiters: &mut Vec<FlushReply>) {
    match op {
        WriteOp::Flush(waiter) => waiters.push(waiter),
        write => *latest = Some(write),
    }
}

async fn apply(repository: &dyn CategoryRepository, op: WriteOp) -> Result<()> {
    let result = match &op {
        WriteOp::Save(snapshot) => {
            tracing::debug!("[WriteQueue] Saving {} categories", snapshot.len());
            repository.save(snapshot).await
        }
        WriteOp::Clear => {
            tracing::debug!("[WriteQueue] Clearing persisted categories");
            repository.clear().await
        }
        WriteOp::Flush(_) => return Ok(()),
    };

    match &result {
        Ok(()) => {}
        Err(e) if e.is_transient() => {
            tracing::warn!("[WriteQueue] Storage unavailable, write dropped: {}", e);
        }
        Err(e) => tracing::error!("[WriteQueue] Failed to persist categories: {}", e),
    }
    result
}
