use std::fmt;
use std::sync::{Arc, OnceLock};

use ahash::AHashSet;
use tracing::debug;

use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::types::{StreamId, TenantID};

/// Comparison applied by one stream label matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamMatchOp {
    Eq,
    Ne,
}

/// One `label=value` / `label!=value` matcher inside `{...}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamLabelMatcher {
    pub label: String,
    pub op: StreamMatchOp,
    pub value: String,
}

/// The parsed `{...}` stream selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSelector {
    pub matchers: Vec<StreamLabelMatcher>,
}

impl StreamSelector {
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl fmt::Display for StreamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, m) in self.matchers.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            let op = match m.op {
                StreamMatchOp::Eq => "=",
                StreamMatchOp::Ne => "!=",
            };
            write!(f, "{}{}{:?}", m.label, op, m.value)?;
        }
        write!(f, "}}")
    }
}

/// Resolves a stream selector to the matching stream ids. Supplied by the
/// index collaborator; the filter only caches the result.
pub trait StreamIndex: Send + Sync {
    fn search_stream_ids(&self, tenant_ids: &[TenantID], selector: &StreamSelector)
        -> Vec<StreamId>;
}

/// The filter for `_stream:{...}`. The selector is resolved to a set of
/// stream ids lazily, at most once per query.
pub struct StreamFilter {
    selector: StreamSelector,
    tenant_ids: Vec<TenantID>,
    index: Arc<dyn StreamIndex>,

    stream_ids: OnceLock<AHashSet<StreamId>>,
}

impl StreamFilter {
    pub fn new(
        selector: StreamSelector,
        tenant_ids: Vec<TenantID>,
        index: Arc<dyn StreamIndex>,
    ) -> Self {
        Self {
            selector,
            tenant_ids,
            index,
            stream_ids: OnceLock::new(),
        }
    }

    pub fn selector(&self) -> &StreamSelector {
        &self.selector
    }

    fn stream_ids(&self) -> &AHashSet<StreamId> {
        self.stream_ids.get_or_init(|| {
            let ids = self
                .index
                .search_stream_ids(&self.tenant_ids, &self.selector);
            debug!(
                target: "vlotlog::filter",
                selector = %self.selector,
                resolved = ids.len(),
                "Resolved stream selector"
            );
            ids.into_iter().collect()
        })
    }

    pub fn apply(&self, bs: &BlockSearch, bm: &mut Bitmap) {
        if self.selector.is_empty() {
            return;
        }
        if !self.stream_ids().contains(&bs.stream_id()) {
            bm.reset_bits();
        }
    }
}

impl fmt::Debug for StreamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamFilter")
            .field("selector", &self.selector)
            .field("tenant_ids", &self.tenant_ids)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for StreamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.selector.to_string();
        if s == "{}" {
            return Ok(());
        }
        write!(f, "_stream:{s}")
    }
}
