//! Conversation identity resolution.
//!
//! A conversation is identified by its visible title. Two conversations with
//! the same title therefore share an identifier; that collision is inherent to
//! title-based identity and is not worked around here.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::CrmConfig;
use crate::host::ConversationNode;
use crate::probe::ProbeChain;

static LAST_FALLBACK_STAMP: AtomicI64 = AtomicI64::new(0);

/// A resolved conversation identifier and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationId {
    /// Read from the node's visible title.
    Titled(String),
    /// Generated because no title probe matched. Never stable across renders.
    Synthetic(String),
}

impl ConversationId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Titled(id) | Self::Synthetic(id) => id,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Titled(id) | Self::Synthetic(id) => id,
        }
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives a conversation identifier from a rendered node.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    title_probes: ProbeChain,
    fallback_prefix: String,
}

impl IdentityResolver {
    pub fn new(title_probes: ProbeChain, fallback_prefix: impl Into<String>) -> Self {
        Self {
            title_probes,
            fallback_prefix: fallback_prefix.into(),
        }
    }

    pub fn from_config(config: &CrmConfig) -> Self {
        Self::new(
            config.probes.title.clone(),
            config.identity.fallback_prefix.clone(),
        )
    }

    /// Returns the trimmed title of `node`, or a fresh synthetic identifier
    /// when no probe yields non-empty text. The variant says which.
    ///
    /// Synthetic identifiers are unique per call, so an untitled node never
    /// matches a persisted assignment.
    pub fn resolve<N: ConversationNode>(&self, node: &N) -> ConversationId {
        self.title_probes
            .first_match(|selector| {
                node.query_text(selector)
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
            })
            .map(ConversationId::Titled)
            .unwrap_or_else(|| self.synthetic_id())
    }

    fn synthetic_id(&self) -> ConversationId {
        ConversationId::Synthetic(format!("{}{}", self.fallback_prefix, next_fallback_stamp()))
    }
}

/// Nanosecond wall-clock stamp, forced strictly increasing within the process.
fn next_fallback_stamp() -> i64 {
    let now = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    let mut last = LAST_FALLBACK_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_FALLBACK_STAMP.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}
