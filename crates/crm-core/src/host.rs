//! Host page collaborator traits.
//!
//! The chat list is rendered and mutated by a page this crate does not
//! control. These traits are the narrow surface the engine needs from it:
//! locating elements by selector, observing structural changes, and writing
//! annotations back onto conversation items. A browser binding implements
//! them over the DOM; tests implement them over plain structs.

use serde::Serialize;
use std::fmt::Debug;

use crate::category::CategoryTarget;

/// Callback invoked by the host whenever the observed subtree may have
/// changed membership. Calls may arrive in bursts; consumers coalesce them.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// A live subscription to structural changes of a container.
pub trait Observation: Send {
    /// Stops delivering change notifications. Must be idempotent.
    fn disconnect(&mut self);
}

/// Visual/state annotation applied to a conversation item after a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Categorized { category_id: String },
    Uncategorized,
}

impl Annotation {
    pub fn category_id(&self) -> Option<&str> {
        match self {
            Annotation::Categorized { category_id } => Some(category_id),
            Annotation::Uncategorized => None,
        }
    }
}

/// One rendered conversation item.
///
/// The handle is opaque: its internal structure belongs to the host and may
/// vary between host versions.
pub trait ConversationNode: Clone + Send + Sync + 'static {
    /// Text content of the first descendant matching `selector`, untrimmed.
    fn query_text(&self, selector: &str) -> Option<String>;

    /// Whether the node carries the "wired" marker.
    fn is_wired(&self) -> bool;

    fn mark_wired(&self);

    fn set_draggable(&self, draggable: bool);

    /// Registers the host-side `dragstart`/`dragend` listeners that forward
    /// into the engine.
    fn register_drag_handlers(&self);

    /// Toggles the "being dragged" visual marker.
    fn set_drag_marker(&self, active: bool);

    /// Replaces any previous annotation.
    fn annotate(&self, annotation: &Annotation);
}

/// Count of conversations per drop zone, as displayed next to each zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    /// Number of rendered nodes annotated as uncategorized.
    pub uncategorized: usize,
    /// Per category, in store order.
    pub categories: Vec<CategoryCount>,
}

impl CategoryCounts {
    pub fn count_for(&self, category_id: &str) -> Option<usize> {
        self.categories
            .iter()
            .find(|c| c.category_id == category_id)
            .map(|c| c.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category_id: String,
    pub name: String,
    pub count: usize,
}

/// The page rendering the chat list.
pub trait HostPage: Send + Sync + 'static {
    type Node: ConversationNode;
    type Container: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// The element matching `selector`, if any.
    fn query_container(&self, selector: &str) -> Option<Self::Container>;

    /// All conversation items matching `selector`, in document order.
    fn query_conversations(&self, selector: &str) -> Vec<Self::Node>;

    /// Subscribes to insertions/removals anywhere under `container`.
    fn observe(&self, container: &Self::Container, on_change: ChangeCallback)
    -> Box<dyn Observation>;

    /// Publishes recomputed zone counts to the view.
    fn render_counts(&self, counts: &CategoryCounts);

    /// Toggles the drag-over highlight of a drop zone.
    fn highlight_zone(&self, zone: &CategoryTarget, active: bool);

    /// Asks every open instance of the host page to reload.
    fn request_reload(&self);
}
