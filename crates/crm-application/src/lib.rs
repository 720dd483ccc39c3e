//! Application layer for Chat CRM.
//!
//! Hosts the live-list synchronizer and the single-task engine loop that
//! drives it from host events and user commands.

pub mod engine;
pub mod stats;
pub mod synchronizer;

pub use engine::{AttachPhase, Confirmation, CrmEngine, EngineHandle, EngineStatus};
pub use stats::{CategoryStats, load_statistics};
pub use synchronizer::{AttachOutcome, DropOutcome, LiveListSynchronizer, RenderSummary};
