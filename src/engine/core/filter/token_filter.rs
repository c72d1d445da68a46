use tracing::debug;
use xorf::{BinaryFuse8, Filter};

use crate::shared::hash::stable_hash64;

/// Approximate membership sketch over the tokens of one column within a
/// part. May over-accept, never under-accepts.
#[derive(Clone, Debug)]
pub struct TokenFilter {
    inner: Option<BinaryFuse8>,
}

impl TokenFilter {
    pub fn new(tokens: &[String]) -> Self {
        if tokens.is_empty() {
            return Self { inner: None };
        }
        debug!(
            target: "vlotlog::tokenfilter",
            "Creating token filter from {} tokens",
            tokens.len()
        );
        let mut hashes: Vec<u64> = tokens.iter().map(|t| stable_hash64(t)).collect();
        hashes.sort_unstable();
        hashes.dedup();

        let filter = BinaryFuse8::try_from_iterator(hashes.iter().cloned())
            .expect("Failed to create token filter");

        Self {
            inner: Some(filter),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        match &self.inner {
            Some(filter) => filter.contains(&stable_hash64(token)),
            None => false,
        }
    }

    /// True iff every token is (probably) present. An empty token list
    /// carries no information and cannot reject.
    pub fn contains_all(&self, tokens: &[String]) -> bool {
        tokens.iter().all(|t| self.contains(t))
    }
}
