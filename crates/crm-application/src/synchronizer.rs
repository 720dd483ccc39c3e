//! Live-list synchronizer.
//!
//! Bridges the host's continuously mutating conversation list and the
//! [`CategoryStore`]. It wires drag handling onto conversation items, tracks
//! the item currently being dragged, turns drops into store assignments, and
//! re-annotates the list from the reverse index after every change.
//!
//! The synchronizer only reads the store's reverse index; every mutation goes
//! through the store API.

use std::sync::Arc;

use crm_core::category::{AssignOutcome, Category, CategoryStore, CategoryTarget};
use crm_core::config::ProbeConfig;
use crm_core::host::{
    Annotation, CategoryCount, CategoryCounts, ChangeCallback, ConversationNode, HostPage,
    Observation,
};
use crm_core::identity::IdentityResolver;

/// Result of [`LiveListSynchronizer::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Observation started.
    Attached,
    /// The container was already observed; nothing changed.
    AlreadyAttached,
    /// A different container was observed before; that observation was
    /// disconnected and replaced.
    Replaced,
}

/// Result of a drop on a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No item was being dragged.
    NothingDragged,
    /// The dragged conversation was moved.
    Moved {
        conversation_id: String,
        outcome: AssignOutcome,
    },
}

/// Summary of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Nodes annotated in this pass.
    pub annotated: usize,
    pub counts: CategoryCounts,
}

struct ObservedContainer<C> {
    container: C,
    observation: Box<dyn Observation>,
}

pub struct LiveListSynchronizer<H: HostPage> {
    host: Arc<H>,
    store: CategoryStore,
    resolver: IdentityResolver,
    probes: ProbeConfig,
    dragged: Option<H::Node>,
    observed: Option<ObservedContainer<H::Container>>,
}

impl<H: HostPage> LiveListSynchronizer<H> {
    /// `store` must already be loaded.
    pub fn new(
        host: Arc<H>,
        store: CategoryStore,
        resolver: IdentityResolver,
        probes: ProbeConfig,
    ) -> Self {
        Self {
            host,
            store,
            resolver,
            probes,
            dragged: None,
            observed: None,
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CategoryStore {
        &mut self.store
    }

    pub fn is_attached(&self) -> bool {
        self.observed.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Finds the list container using the container probe chain.
    pub fn locate_container(&self) -> Option<H::Container> {
        self.probes
            .container
            .first_match(|selector| self.host.query_container(selector))
    }

    /// Current conversation items, from the first conversation probe that
    /// matches anything.
    pub fn conversation_nodes(&self) -> Vec<H::Node> {
        self.probes
            .conversation
            .first_non_empty(|selector| self.host.query_conversations(selector))
    }

    /// Starts observing `container`, then wires and annotates the current
    /// items.
    ///
    /// Attaching to the container already observed is a no-op. Attaching to
    /// a different one disconnects the previous observation first, so at most
    /// one observer is ever live.
    pub fn attach(&mut self, container: H::Container, on_change: ChangeCallback) -> AttachOutcome {
        let outcome = match self.observed.take() {
            Some(observed) if observed.container == container => {
                self.observed = Some(observed);
                return AttachOutcome::AlreadyAttached;
            }
            Some(mut previous) => {
                tracing::info!(
                    "[Synchronizer] Replacing observation of {:?} with {:?}",
                    previous.container,
                    container
                );
                previous.observation.disconnect();
                AttachOutcome::Replaced
            }
            None => AttachOutcome::Attached,
        };

        let observation = self.host.observe(&container, on_change);
        tracing::info!("[Synchronizer] Observing conversation list {:?}", container);
        self.observed = Some(ObservedContainer {
            container,
            observation,
        });

        self.handle_mutations();
        outcome
    }

    /// Disconnects the current observation, if any.
    pub fn detach(&mut self) {
        if let Some(mut observed) = self.observed.take() {
            observed.observation.disconnect();
            tracing::info!(
                "[Synchronizer] Stopped observing {:?}",
                observed.container
            );
        }
    }

    /// Wires every conversation item that does not carry the wired marker
    /// yet. Returns how many were wired in this call.
    pub fn wire_conversations(&mut self) -> usize {
        let mut wired = 0;
        for node in self.conversation_nodes() {
            if node.is_wired() {
                continue;
            }
            node.mark_wired();
            node.set_draggable(true);
            node.register_drag_handlers();
            wired += 1;
        }
        if wired > 0 {
            tracing::debug!("[Synchronizer] Wired {} conversations", wired);
        }
        wired
    }

    /// Handles one coalesced batch of list mutations.
    pub fn handle_mutations(&mut self) -> RenderSummary {
        self.wire_conversations();
        self.refresh_annotations()
    }

    pub fn drag_start(&mut self, node: H::Node) {
        if let Some(stale) = self.dragged.take() {
            stale.set_drag_marker(false);
        }
        node.set_drag_marker(true);
        self.dragged = Some(node);
        tracing::debug!("[Synchronizer] Drag started");
    }

    /// Ends the drag, whether or not a drop happened.
    pub fn drag_end(&mut self, node: H::Node) {
        node.set_drag_marker(false);
        if let Some(captured) = self.dragged.take() {
            captured.set_drag_marker(false);
        }
        tracing::debug!("[Synchronizer] Drag ended");
    }

    pub fn drag_over(&self, zone: &CategoryTarget) {
        self.host.highlight_zone(zone, true);
    }

    pub fn drag_leave(&self, zone: &CategoryTarget) {
        self.host.highlight_zone(zone, false);
    }

    /// Assigns the dragged conversation to `zone` and re-renders.
    ///
    /// The captured item stays captured until `drag_end`; a second drop
    /// before that moves it again.
    pub fn drop_on(&mut self, zone: &CategoryTarget) -> DropOutcome {
        self.host.highlight_zone(zone, false);

        let Some(node) = self.dragged.as_ref() else {
            tracing::debug!("[Synchronizer] Drop on {} with nothing dragged", zone);
            return DropOutcome::NothingDragged;
        };

        let resolved = self.resolver.resolve(node);
        if resolved.is_synthetic() {
            tracing::warn!(
                "[Synchronizer] Dropped conversation has no title; '{}' is not stable",
                resolved
            );
        }
        let conversation_id = resolved.into_string();
        let outcome = self.store.assign(&conversation_id, zone);
        tracing::info!(
            "[Synchronizer] Moved conversation '{}' to {} ({:?})",
            conversation_id,
            zone,
            outcome
        );

        self.refresh_annotations();
        DropOutcome::Moved {
            conversation_id,
            outcome,
        }
    }

    /// Re-annotates every conversation item from the reverse index and
    /// publishes the zone counts.
    pub fn refresh_annotations(&mut self) -> RenderSummary {
        let nodes = self.conversation_nodes();
        let index = self.store.reverse_index();

        let mut uncategorized = 0;
        for node in &nodes {
            let conversation_id = self.resolver.resolve(node);
            let annotation = match index.category_of(conversation_id.as_str()) {
                Some(category_id) => Annotation::Categorized {
                    category_id: category_id.to_string(),
                },
                None => {
                    uncategorized += 1;
                    Annotation::Uncategorized
                }
            };
            node.annotate(&annotation);
        }

        let counts = CategoryCounts {
            uncategorized,
            categories: self
                .store
                .categories()
                .iter()
                .map(|category| CategoryCount {
                    category_id: category.id.clone(),
                    name: category.name.clone(),
                    count: category.len(),
                })
                .collect(),
        };
        self.host.render_counts(&counts);

        tracing::debug!(
            "[Synchronizer] Render pass: {} nodes, {} uncategorized",
            nodes.len(),
            uncategorized
        );
        RenderSummary {
            annotated: nodes.len(),
            counts,
        }
    }

    /// Boot-time reconciliation: annotate whatever the list already shows
    /// from the persisted categories, before any observation starts.
    pub fn reconcile(&mut self) -> RenderSummary {
        tracing::info!(
            "[Synchronizer] Reconciling {} persisted assignments",
            self.store.reverse_index().len()
        );
        self.refresh_annotations()
    }

    pub fn create_category(&mut self, name: &str) -> Option<Category> {
        let created = self.store.create(name);
        if created.is_some() {
            self.refresh_annotations();
        }
        created
    }

    pub fn rename_category(&mut self, category_id: &str, name: &str) -> bool {
        let renamed = self.store.rename(category_id, name);
        if renamed {
            self.refresh_annotations();
        }
        renamed
    }

    pub fn delete_category(&mut self, category_id: &str) -> Option<Category> {
        let deleted = self.store.delete(category_id);
        if deleted.is_some() {
            self.refresh_annotations();
        }
        deleted
    }

    /// Clears every category and durable storage, then asks the host to
    /// reload.
    pub fn reset(&mut self) {
        self.store.reset();
        self.refresh_annotations();
        self.host.request_reload();
    }

    /// Re-reads durable storage after an external change and re-renders.
    pub async fn reload(&mut self) -> RenderSummary {
        self.store.reload().await;
        self.refresh_annotations()
    }
}

impl<H: HostPage> Drop for LiveListSynchronizer<H> {
    fn drop(&mut self) {
        self.detach();
    }
}
