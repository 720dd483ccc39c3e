//! CrmConfig DTOs and migrations

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Migrator, Versioned};

use crm_core::config::{AttachConfig, CrmConfig, IdentityConfig, ProbeConfig};
use crm_core::error::Result;

/// Entity name under which the configuration is stored.
pub const CRM_CONFIG_ENTITY: &str = "crm_config";

/// Engine configuration V1.0.0. Missing fields take their defaults, so a
/// partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(default)]
pub struct CrmConfigV1_0_0 {
    pub storage_key: String,
    pub probes: ProbeConfig,
    pub attach: AttachConfig,
    pub identity: IdentityConfig,
}

impl Default for CrmConfigV1_0_0 {
    fn default() -> Self {
        Self::from_domain(CrmConfig::default())
    }
}

impl IntoDomain<CrmConfig> for CrmConfigV1_0_0 {
    fn into_domain(self) -> CrmConfig {
        CrmConfig {
            storage_key: self.storage_key,
            probes: self.probes,
            attach: self.attach,
            identity: self.identity,
        }
    }
}

impl FromDomain<CrmConfig> for CrmConfigV1_0_0 {
    fn from_domain(config: CrmConfig) -> Self {
        CrmConfigV1_0_0 {
            storage_key: config.storage_key,
            probes: config.probes,
            attach: config.attach,
            identity: config.identity,
        }
    }
}

/// Creates a Migrator for the `crm_config` entity.
pub fn create_crm_config_migrator() -> Result<Migrator> {
    let migrator = version_migrate::migrator!("crm_config" => [
        CrmConfigV1_0_0,
        CrmConfig
    ], save = true)?;
    Ok(migrator)
}
