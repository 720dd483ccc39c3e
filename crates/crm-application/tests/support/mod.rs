//! In-memory stand-in for the chat page, shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crm_application::{CrmEngine, EngineHandle};
use crm_core::category::{CategoryRepository, CategoryTarget};
use crm_core::config::CrmConfig;
use crm_core::host::{
    Annotation, CategoryCounts, ChangeCallback, ConversationNode, HostPage, Observation,
};
use crm_infrastructure::{InMemoryKeyValueStore, KvCategoryRepository};

pub const CONTAINER: &str = "[data-testid=\"chat-list\"]";
pub const CONVERSATION: &str = "[data-testid=\"conversation\"]";
pub const TITLE: &str = "[data-testid=\"conversation-title\"]";

#[derive(Default)]
struct NodeState {
    texts: HashMap<String, String>,
    wired: bool,
    draggable: bool,
    handler_registrations: usize,
    drag_marker: bool,
    annotation: Option<Annotation>,
}

/// A rendered conversation item. Clones share state, like DOM references.
#[derive(Clone, Default)]
pub struct FakeNode {
    state: Arc<Mutex<NodeState>>,
}

impl FakeNode {
    pub fn titled(title: &str) -> Self {
        Self::with_text(TITLE, title)
    }

    pub fn with_text(selector: &str, text: &str) -> Self {
        let node = Self::default();
        node.state
            .lock()
            .unwrap()
            .texts
            .insert(selector.to_string(), text.to_string());
        node
    }

    /// A node with no title text at all.
    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn annotation(&self) -> Option<Annotation> {
        self.state.lock().unwrap().annotation.clone()
    }

    pub fn annotated_category(&self) -> Option<String> {
        self.annotation()
            .and_then(|a| a.category_id().map(str::to_string))
    }

    pub fn is_draggable(&self) -> bool {
        self.state.lock().unwrap().draggable
    }

    pub fn handler_registrations(&self) -> usize {
        self.state.lock().unwrap().handler_registrations
    }

    pub fn has_drag_marker(&self) -> bool {
        self.state.lock().unwrap().drag_marker
    }
}

impl ConversationNode for FakeNode {
    fn query_text(&self, selector: &str) -> Option<String> {
        self.state.lock().unwrap().texts.get(selector).cloned()
    }

    fn is_wired(&self) -> bool {
        self.state.lock().unwrap().wired
    }

    fn mark_wired(&self) {
        self.state.lock().unwrap().wired = true;
    }

    fn set_draggable(&self, draggable: bool) {
        self.state.lock().unwrap().draggable = draggable;
    }

    fn register_drag_handlers(&self) {
        self.state.lock().unwrap().handler_registrations += 1;
    }

    fn set_drag_marker(&self, active: bool) {
        self.state.lock().unwrap().drag_marker = active;
    }

    fn annotate(&self, annotation: &Annotation) {
        self.state.lock().unwrap().annotation = Some(annotation.clone());
    }
}

struct ObserverSlot {
    container: String,
    active: AtomicBool,
    callback: ChangeCallback,
}

struct FakeObservation {
    slot: Arc<ObserverSlot>,
}

impl Observation for FakeObservation {
    fn disconnect(&mut self) {
        self.slot.active.store(false, Ordering::SeqCst);
    }
}

/// The chat page: which containers exist, which items are rendered, and
/// everything the engine published back.
#[derive(Default)]
pub struct FakeHost {
    containers: Mutex<HashSet<String>>,
    conversation_selector: Mutex<String>,
    nodes: Mutex<Vec<FakeNode>>,
    observers: Mutex<Vec<Arc<ObserverSlot>>>,
    counts: Mutex<Vec<CategoryCounts>>,
    highlights: Mutex<Vec<(CategoryTarget, bool)>>,
    reloads: AtomicUsize,
}

impl FakeHost {
    /// A page that already shows its chat list.
    pub fn with_list(nodes: Vec<FakeNode>) -> Arc<Self> {
        let host = Self::without_list(nodes);
        host.show_container(CONTAINER);
        host
    }

    /// A page whose chat list container has not rendered yet.
    pub fn without_list(nodes: Vec<FakeNode>) -> Arc<Self> {
        let host = Self::default();
        *host.conversation_selector.lock().unwrap() = CONVERSATION.to_string();
        *host.nodes.lock().unwrap() = nodes;
        Arc::new(host)
    }

    pub fn show_container(&self, selector: &str) {
        self.containers.lock().unwrap().insert(selector.to_string());
    }

    pub fn hide_container(&self, selector: &str) {
        self.containers.lock().unwrap().remove(selector);
    }

    /// Serves items under a different conversation selector.
    pub fn set_conversation_selector(&self, selector: &str) {
        *self.conversation_selector.lock().unwrap() = selector.to_string();
    }

    /// Adds items and notifies active observers, as a host re-render would.
    pub fn insert_nodes(&self, nodes: impl IntoIterator<Item = FakeNode>) {
        self.nodes.lock().unwrap().extend(nodes);
        self.notify_observers();
    }

    /// Replaces every rendered item and notifies active observers.
    pub fn replace_nodes(&self, nodes: Vec<FakeNode>) {
        *self.nodes.lock().unwrap() = nodes;
        self.notify_observers();
    }

    pub fn notify_observers(&self) {
        let slots: Vec<_> = self.observers.lock().unwrap().clone();
        for slot in slots {
            if slot.active.load(Ordering::SeqCst) {
                (slot.callback)();
            }
        }
    }

    pub fn active_observers(&self) -> usize {
        self.observers
            .lock()
            .unwrap()
            .iter()
            .filter(|slot| slot.active.load(Ordering::SeqCst))
            .count()
    }

    pub fn observed_containers(&self) -> Vec<String> {
        self.observers
            .lock()
            .unwrap()
            .iter()
            .filter(|slot| slot.active.load(Ordering::SeqCst))
            .map(|slot| slot.container.clone())
            .collect()
    }

    pub fn total_observations(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    pub fn last_counts(&self) -> Option<CategoryCounts> {
        self.counts.lock().unwrap().last().cloned()
    }

    pub fn render_passes(&self) -> usize {
        self.counts.lock().unwrap().len()
    }

    pub fn highlights(&self) -> Vec<(CategoryTarget, bool)> {
        self.highlights.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl HostPage for FakeHost {
    type Node = FakeNode;
    type Container = String;

    fn query_container(&self, selector: &str) -> Option<String> {
        self.containers
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
    }

    fn query_conversations(&self, selector: &str) -> Vec<FakeNode> {
        if *self.conversation_selector.lock().unwrap() == selector {
            self.nodes.lock().unwrap().clone()
        } else {
            Vec::new()
        }
    }

    fn observe(&self, container: &String, on_change: ChangeCallback) -> Box<dyn Observation> {
        let slot = Arc::new(ObserverSlot {
            container: container.clone(),
            active: AtomicBool::new(true),
            callback: on_change,
        });
        self.observers.lock().unwrap().push(slot.clone());
        Box::new(FakeObservation { slot })
    }

    fn render_counts(&self, counts: &CategoryCounts) {
        self.counts.lock().unwrap().push(counts.clone());
    }

    fn highlight_zone(&self, zone: &CategoryTarget, active: bool) {
        self.highlights.lock().unwrap().push((zone.clone(), active));
    }

    fn request_reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

/// A repository over an in-memory key-value store, returned alongside the
/// store so tests can inspect or corrupt the raw value.
pub fn memory_repository() -> (Arc<InMemoryKeyValueStore>, Arc<dyn CategoryRepository>) {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let repository: Arc<dyn CategoryRepository> =
        Arc::new(KvCategoryRepository::with_default_key(kv.clone()));
    (kv, repository)
}

/// Boots an engine with default configuration and runs it on a new task.
pub async fn start_engine(
    host: Arc<FakeHost>,
    repository: Arc<dyn CategoryRepository>,
) -> (EngineHandle<FakeNode>, JoinHandle<()>) {
    let (engine, handle) = CrmEngine::boot(&CrmConfig::default(), host, repository).await;
    (handle, engine.spawn())
}
