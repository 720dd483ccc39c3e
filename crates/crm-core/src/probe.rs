//! Prioritized probe chains.
//!
//! The host page renders the same thing in several known shapes. A
//! [`ProbeChain`] holds one selector per shape, highest priority first, and
//! evaluates them in order until one matches.

use serde::{Deserialize, Serialize};

/// An ordered list of selectors. First match wins.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct ProbeChain(Vec<String>);

impl ProbeChain {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(selectors.into_iter().map(Into::into).collect())
    }

    pub fn selectors(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the result of the first selector for which `probe` yields `Some`.
    pub fn first_match<T, F>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut(&str) -> Option<T>,
    {
        self.0.iter().find_map(|selector| probe(selector))
    }

    /// Returns the result of the first selector for which `probe` yields a
    /// non-empty collection, or an empty vector when none does.
    pub fn first_non_empty<T, F>(&self, mut probe: F) -> Vec<T>
    where
        F: FnMut(&str) -> Vec<T>,
    {
        for selector in &self.0 {
            let found = probe(selector);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}
