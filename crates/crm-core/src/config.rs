//! Engine configuration.
//!
//! Every field carries a serde default so that a partial `config.toml` (or no
//! file at all) yields a working configuration. The probe lists are data, not
//! code: extending support for a new host rendering means adding a selector
//! here, never touching the engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use version_migrate::DeriveQueryable as Queryable;

use crate::probe::ProbeChain;

/// Storage key holding the whole category list.
pub const DEFAULT_STORAGE_KEY: &str = "chatCrmCategories";

/// Keys older builds stored the list under, read when the primary key is
/// absent.
pub const LEGACY_STORAGE_KEYS: &[&str] = &["whatsappCrmCategories"];

/// Prefix of synthetic conversation identifiers.
pub const DEFAULT_FALLBACK_PREFIX: &str = "unknown_";

/// Root configuration for the engine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Queryable)]
#[queryable(entity = "crm_config")]
pub struct CrmConfig {
    /// Durable store key for the category list.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub probes: ProbeConfig,
    #[serde(default)]
    pub attach: AttachConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            probes: ProbeConfig::default(),
            attach: AttachConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Prioritized selector lists used to locate host elements.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Selectors for the chat list container, highest priority first.
    #[serde(default = "default_container_probes")]
    pub container: ProbeChain,
    /// Selectors for conversation items.
    #[serde(default = "default_conversation_probes")]
    pub conversation: ProbeChain,
    /// Selectors, relative to one conversation item, for its title text.
    #[serde(default = "default_title_probes")]
    pub title: ProbeChain,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            container: default_container_probes(),
            conversation: default_conversation_probes(),
            title: default_title_probes(),
        }
    }
}

fn default_container_probes() -> ProbeChain {
    ProbeChain::new([
        "[data-testid=\"chat-list\"]",
        "#pane-side",
        "[role=\"tabpanel\"]",
        ".app-wrapper-web ._2Ts6i._3RGKj",
    ])
}

fn default_conversation_probes() -> ProbeChain {
    ProbeChain::new([
        "[data-testid=\"conversation\"]",
        "div[role=\"listitem\"]",
        "._21S-L",
        ".zoWT4",
    ])
}

fn default_title_probes() -> ProbeChain {
    ProbeChain::new([
        "[data-testid=\"conversation-title\"]",
        "span[title]",
        "span[dir=\"auto\"]",
        "._21S-L span",
        ".zoWT4 span",
    ])
}

/// Container attachment retry policy.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AttachConfig {
    /// Delay between attempts to locate the container.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Safety timeout after which the engine runs without observation.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AttachConfig {
    pub fn retry_interval(&self) -> Duration {
        // A zero interval would spin the retry timer.
        Duration::from_millis(self.retry_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_retry_interval_ms() -> u64 {
    1_000
}

fn default_timeout_ms() -> u64 {
    15_000
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            fallback_prefix: default_fallback_prefix(),
        }
    }
}

fn default_fallback_prefix() -> String {
    DEFAULT_FALLBACK_PREFIX.to_string()
}
