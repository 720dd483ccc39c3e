//! Category domain: models, reverse index, persistence, and the store.
//!
//! The store owns the category list; everything else only reads it.

mod index;
mod model;
mod repository;
mod store;
mod write_queue;

pub use index::CategoryIndex;
pub use model::{Category, CategoryTarget, UNCATEGORIZED};
pub use repository::CategoryRepository;
pub use store::{AssignOutcome, CategoryStore};
pub use write_queue::WriteQueue;
