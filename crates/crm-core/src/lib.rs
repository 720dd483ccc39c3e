//! Domain layer of the Chat CRM engine.
//!
//! Holds the category store, conversation identity resolution, probe
//! configuration, and the traits through which the engine talks to the host
//! page and to durable storage.

pub mod category;
pub mod config;
pub mod error;
pub mod host;
pub mod identity;
pub mod probe;
pub mod storage;

// Re-export common error type
pub use error::CrmError;
