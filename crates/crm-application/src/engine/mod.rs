//! The engine loop.
//!
//! [`CrmEngine`] owns the [`LiveListSynchronizer`] and processes every host
//! event and command on a single task, one at a time. A drop, a render pass
//! and a reload therefore never interleave. Storage writes run on the store's
//! write worker and never block the loop.
//!
//! Lifecycle: `boot` loads the store and annotates whatever is already on
//! screen. `run` then retries locating the list container every
//! `retry_interval` until it is found or `timeout` elapses, after which the
//! engine keeps serving drops and commands without observing the list.

mod event;
mod handle;

pub use event::{AttachPhase, Confirmation, EngineCommand, EngineEvent, EngineStatus};
pub use handle::EngineHandle;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crm_core::category::{CategoryRepository, CategoryStore};
use crm_core::config::{AttachConfig, CrmConfig};
use crm_core::host::{ChangeCallback, HostPage};
use crm_core::identity::IdentityResolver;

use crate::stats::CategoryStats;
use crate::synchronizer::LiveListSynchronizer;

enum Step<N> {
    Stop,
    Retry,
    Deadline,
    Event(EngineEvent<N>),
}

pub struct CrmEngine<H: HostPage> {
    sync: LiveListSynchronizer<H>,
    attach: AttachConfig,
    rx: mpsc::UnboundedReceiver<EngineEvent<H::Node>>,
    /// Observer callbacks hold only a weak sender, so the loop ends once
    /// every [`EngineHandle`] is gone.
    weak_tx: mpsc::WeakUnboundedSender<EngineEvent<H::Node>>,
    cancel: CancellationToken,
    phase: AttachPhase,
}

impl<H: HostPage> CrmEngine<H> {
    /// Loads persisted categories and reconciles the currently rendered
    /// list. Observation starts in [`CrmEngine::run`].
    pub async fn boot(
        config: &CrmConfig,
        host: Arc<H>,
        repository: Arc<dyn CategoryRepository>,
    ) -> (Self, EngineHandle<H::Node>) {
        let mut store = CategoryStore::new(repository);
        let loaded = store.load().await.len();
        tracing::info!("[CrmEngine] Booting with {} categories", loaded);

        let resolver = IdentityResolver::from_config(config);
        let mut sync = LiveListSynchronizer::new(host, store, resolver, config.probes.clone());
        sync.reconcile();

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let engine = Self {
            sync,
            attach: config.attach.clone(),
            rx,
            weak_tx: tx.downgrade(),
            cancel: cancel.clone(),
            phase: AttachPhase::Searching,
        };
        (engine, EngineHandle::new(tx, cancel))
    }

    /// Runs the loop on a new task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub fn phase(&self) -> AttachPhase {
        self.phase
    }

    /// Processes events until shutdown or until every handle is dropped,
    /// then disconnects the observer and flushes pending writes.
    pub async fn run(mut self) {
        // Attach right away when the container is already rendered, before
        // any queued event runs. The timer only drives later attempts.
        self.try_attach();
        let retry_interval = self.attach.retry_interval();
        let mut retry = tokio::time::interval_at(Instant::now() + retry_interval, retry_interval);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = tokio::time::sleep(self.attach.timeout());
        tokio::pin!(deadline);

        loop {
            let searching = self.phase == AttachPhase::Searching;
            let step = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Step::Stop,
                _ = retry.tick(), if searching => Step::Retry,
                _ = &mut deadline, if searching => Step::Deadline,
                event = self.rx.recv() => match event {
                    Some(event) => Step::Event(event),
                    None => Step::Stop,
                },
            };

            match step {
                Step::Stop => break,
                Step::Retry => {
                    self.try_attach();
                }
                Step::Deadline => self.degrade(),
                Step::Event(event) => {
                    let before = self.phase;
                    self.handle(event).await;
                    if before != AttachPhase::Searching && self.phase == AttachPhase::Searching {
                        retry.reset();
                        deadline
                            .as_mut()
                            .reset(Instant::now() + self.attach.timeout());
                    }
                }
            }
        }

        self.sync.detach();
        if let Err(e) = self.sync.store().flush().await {
            tracing::warn!("[CrmEngine] Last write before stopping failed: {}", e);
        }
        tracing::info!("[CrmEngine] Stopped");
    }

    fn try_attach(&mut self) -> bool {
        let Some(container) = self.sync.locate_container() else {
            tracing::debug!("[CrmEngine] Conversation list not found yet");
            return false;
        };
        let on_change = self.change_callback();
        let outcome = self.sync.attach(container, on_change);
        tracing::debug!("[CrmEngine] Attach outcome: {:?}", outcome);
        self.phase = AttachPhase::Observing;
        true
    }

    fn degrade(&mut self) {
        tracing::info!(
            "[CrmEngine] Conversation list not found after {:?}; continuing without observation",
            self.attach.timeout()
        );
        self.phase = AttachPhase::Degraded;
        self.sync.handle_mutations();
    }

    fn change_callback(&self) -> ChangeCallback {
        let weak_tx = self.weak_tx.clone();
        Box::new(move || {
            if let Some(tx) = weak_tx.upgrade() {
                let _ = tx.send(EngineEvent::ListMutated);
            }
        })
    }

    async fn handle(&mut self, event: EngineEvent<H::Node>) {
        match event {
            EngineEvent::ListMutated => {
                let held = self.coalesce_mutations();
                self.sync.handle_mutations();
                if let Some(next) = held {
                    self.dispatch(next).await;
                }
            }
            other => self.dispatch(other).await,
        }
    }

    /// Drains queued mutation notifications so a burst costs one pass.
    /// Returns the first non-mutation event found, which must run after the
    /// pass to keep arrival order.
    fn coalesce_mutations(&mut self) -> Option<EngineEvent<H::Node>> {
        let mut coalesced = 0;
        while let Ok(next) = self.rx.try_recv() {
            match next {
                EngineEvent::ListMutated => coalesced += 1,
                other => {
                    if coalesced > 0 {
                        tracing::trace!("[CrmEngine] Coalesced {} mutation batches", coalesced);
                    }
                    return Some(other);
                }
            }
        }
        if coalesced > 0 {
            tracing::trace!("[CrmEngine] Coalesced {} mutation batches", coalesced);
        }
        None
    }

    async fn dispatch(&mut self, event: EngineEvent<H::Node>) {
        match event {
            EngineEvent::ListMutated => {
                self.sync.handle_mutations();
            }
            EngineEvent::DragStart(node) => self.sync.drag_start(node),
            EngineEvent::DragEnd(node) => self.sync.drag_end(node),
            EngineEvent::DragOver(zone) => self.sync.drag_over(&zone),
            EngineEvent::DragLeave(zone) => self.sync.drag_leave(&zone),
            EngineEvent::Drop(zone) => {
                self.sync.drop_on(&zone);
            }
            EngineEvent::StorageChanged => {
                tracing::info!("[CrmEngine] Storage changed externally, reloading");
                self.sync.reload().await;
            }
            EngineEvent::Command(command) => self.execute(command).await,
        }
    }

    async fn execute(&mut self, command: EngineCommand) {
        // A dropped reply receiver means the caller stopped waiting.
        match command {
            EngineCommand::CreateCategory { name, reply } => {
                let _ = reply.send(self.sync.create_category(&name));
            }
            EngineCommand::RenameCategory {
                category_id,
                name,
                reply,
            } => {
                let _ = reply.send(self.sync.rename_category(&category_id, &name));
            }
            EngineCommand::DeleteCategory {
                category_id,
                confirmation,
                reply,
            } => {
                let deleted = if confirmation.is_confirmed() {
                    self.sync.delete_category(&category_id).is_some()
                } else {
                    tracing::info!(
                        "[CrmEngine] Delete of category {} not confirmed",
                        category_id
                    );
                    false
                };
                let _ = reply.send(deleted);
            }
            EngineCommand::Categories { reply } => {
                let _ = reply.send(self.sync.store().categories().to_vec());
            }
            EngineCommand::CategoryOf {
                conversation_id,
                reply,
            } => {
                let category_id = self
                    .sync
                    .store()
                    .reverse_index()
                    .category_of(&conversation_id)
                    .map(str::to_string);
                let _ = reply.send(category_id);
            }
            EngineCommand::Stats { reply } => {
                let stats = CategoryStats::from_categories(self.sync.store().categories());
                let _ = reply.send(stats);
            }
            EngineCommand::Reset {
                confirmation,
                reply,
            } => {
                if confirmation.is_confirmed() {
                    self.sync.reset();
                } else {
                    tracing::info!("[CrmEngine] Reset not confirmed");
                }
                let _ = reply.send(confirmation.is_confirmed());
            }
            EngineCommand::Reinitialize { reply } => {
                tracing::info!("[CrmEngine] Reinitializing");
                self.sync.detach();
                self.phase = AttachPhase::Searching;
                self.try_attach();
                let _ = reply.send(());
            }
            EngineCommand::Flush { reply } => {
                // Write failures were logged by the worker; the loop rides them out.
                let _ = self.sync.store().flush().await;
                let _ = reply.send(());
            }
            EngineCommand::Status { reply } => {
                let _ = reply.send(EngineStatus {
                    phase: self.phase,
                    dragging: self.sync.is_dragging(),
                });
            }
        }
    }
}
