//! Infrastructure layer for Chat CRM: durable storage backends, the
//! key-value backed category repository, paths, and configuration loading.

pub mod config_service;
mod dto;
pub mod kv_category_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::kv_category_repository::KvCategoryRepository;
pub use crate::paths::CrmPaths;
pub use crate::storage::{FileKeyValueStore, InMemoryKeyValueStore};
