//! Versioned persistence schemas.
//!
//! These DTOs are private to the infrastructure layer. Each carries a
//! `version` so files written by older builds migrate forward on load.
//!
//! ### CrmConfig Version History
//! - **1.0.0**: storage key, probe lists, attach policy, identity fallback

mod crm_config;

pub use crm_config::{CRM_CONFIG_ENTITY, CrmConfigV1_0_0, create_crm_config_migrator};
