//! Events and commands consumed by the engine loop.

use tokio::sync::oneshot;

use crm_core::category::{Category, CategoryTarget};

use crate::stats::CategoryStats;

/// Explicit user confirmation required before destructive operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        self == Confirmation::Confirmed
    }
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Everything that can happen to the engine, in arrival order.
pub enum EngineEvent<N> {
    /// The observed list may have changed membership.
    ListMutated,
    DragStart(N),
    DragEnd(N),
    DragOver(CategoryTarget),
    DragLeave(CategoryTarget),
    Drop(CategoryTarget),
    /// Durable storage was changed by someone else.
    StorageChanged,
    Command(EngineCommand),
}

/// Requests from view glue, each with a reply channel.
pub enum EngineCommand {
    CreateCategory {
        name: String,
        reply: oneshot::Sender<Option<Category>>,
    },
    RenameCategory {
        category_id: String,
        name: String,
        reply: oneshot::Sender<bool>,
    },
    DeleteCategory {
        category_id: String,
        confirmation: Confirmation,
        reply: oneshot::Sender<bool>,
    },
    Categories {
        reply: oneshot::Sender<Vec<Category>>,
    },
    CategoryOf {
        conversation_id: String,
        reply: oneshot::Sender<Option<String>>,
    },
    Stats {
        reply: oneshot::Sender<CategoryStats>,
    },
    Reset {
        confirmation: Confirmation,
        reply: oneshot::Sender<bool>,
    },
    /// Drops the current observation and restarts container attachment.
    Reinitialize { reply: oneshot::Sender<()> },
    Flush { reply: oneshot::Sender<()> },
    Status { reply: oneshot::Sender<EngineStatus> },
}

/// Where the engine is in its attachment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachPhase {
    /// Still looking for the container.
    Searching,
    /// Observing the container.
    Observing,
    /// Gave up looking; running without observation.
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    pub phase: AttachPhase,
    pub dragging: bool,
}
