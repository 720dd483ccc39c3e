//! Handle through which view glue talks to a running engine.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crm_core::category::{Category, CategoryTarget};
use crm_core::error::{CrmError, Result};

use super::event::{Confirmation, EngineCommand, EngineEvent, EngineStatus};
use crate::stats::CategoryStats;

/// Cloneable sender side of the engine loop.
///
/// Host events are fire-and-forget. Commands await the engine's reply and
/// fail with [`CrmError::Internal`] only if the engine has stopped.
pub struct EngineHandle<N> {
    tx: mpsc::UnboundedSender<EngineEvent<N>>,
    cancel: CancellationToken,
}

impl<N> Clone for EngineHandle<N> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<N: Send + 'static> EngineHandle<N> {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<EngineEvent<N>>,
        cancel: CancellationToken,
    ) -> Self {
        Self { tx, cancel }
    }

    pub fn list_mutated(&self) {
        self.send(EngineEvent::ListMutated);
    }

    pub fn drag_start(&self, node: N) {
        self.send(EngineEvent::DragStart(node));
    }

    pub fn drag_end(&self, node: N) {
        self.send(EngineEvent::DragEnd(node));
    }

    pub fn drag_over(&self, zone: CategoryTarget) {
        self.send(EngineEvent::DragOver(zone));
    }

    pub fn drag_leave(&self, zone: CategoryTarget) {
        self.send(EngineEvent::DragLeave(zone));
    }

    /// Reports a drop on `zone`. Glue must also suppress the host's default
    /// drop handling.
    pub fn drop_on(&self, zone: CategoryTarget) {
        self.send(EngineEvent::Drop(zone));
    }

    pub fn storage_changed(&self) {
        self.send(EngineEvent::StorageChanged);
    }

    pub async fn create_category(&self, name: impl Into<String>) -> Result<Option<Category>> {
        let name = name.into();
        self.request(|reply| EngineCommand::CreateCategory { name, reply }).await
    }

    pub async fn rename_category(
        &self,
        category_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<bool> {
        let category_id = category_id.into();
        let name = name.into();
        self.request(|reply| EngineCommand::RenameCategory {
            category_id,
            name,
            reply,
        })
        .await
    }

    /// Deletes a category if `confirmation` is [`Confirmation::Confirmed`].
    pub async fn delete_category(
        &self,
        category_id: impl Into<String>,
        confirmation: Confirmation,
    ) -> Result<bool> {
        let category_id = category_id.into();
        self.request(|reply| EngineCommand::DeleteCategory {
            category_id,
            confirmation,
            reply,
        })
        .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.request(|reply| EngineCommand::Categories { reply }).await
    }

    pub async fn category_of(&self, conversation_id: impl Into<String>) -> Result<Option<String>> {
        let conversation_id = conversation_id.into();
        self.request(|reply| EngineCommand::CategoryOf {
            conversation_id,
            reply,
        })
        .await
    }

    pub async fn stats(&self) -> Result<CategoryStats> {
        self.request(|reply| EngineCommand::Stats { reply }).await
    }

    /// Clears all categories and durable storage, then asks the host to
    /// reload. Requires confirmation.
    pub async fn reset(&self, confirmation: Confirmation) -> Result<bool> {
        self.request(|reply| EngineCommand::Reset {
            confirmation,
            reply,
        })
        .await
    }

    pub async fn reinitialize(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Reinitialize { reply }).await
    }

    /// Waits until queued storage writes have been attempted. Write failures
    /// are logged by the store, not returned here.
    pub async fn flush(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Flush { reply }).await
    }

    pub async fn status(&self) -> Result<EngineStatus> {
        self.request(|reply| EngineCommand::Status { reply }).await
    }

    /// Stops the engine loop. Pending events are dropped.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.tx.is_closed()
    }

    fn send(&self, event: EngineEvent<N>) {
        if self.tx.send(event).is_err() {
            tracing::debug!("[EngineHandle] Engine stopped; event dropped");
        }
    }

    async fn request<T, F>(&self, command: F) -> Result<T>
    where
        F: FnOnce(oneshot::Sender<T>) -> EngineCommand,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineEvent::Command(command(reply_tx)))
            .map_err(|_| CrmError::internal("Engine is not running"))?;
        reply_rx
            .await
            .map_err(|_| CrmError::internal("Engine stopped before replying"))
    }
}
