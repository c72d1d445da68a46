use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Shared per-query flags, polled cooperatively by workers and pipes.
///
/// `stop` is raised by the caller (timeout, client gone); `cancel` is raised
/// from inside the pipeline (e.g. the stats memory budget ran out) to tell
/// upstream producers to stop feeding blocks.
#[derive(Debug, Default)]
pub struct QueryContext {
    stop: AtomicBool,
    canceled: AtomicBool,
}

impl QueryContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        debug!(target: "vlotlog::query", "Query canceled from inside the pipeline");
        self.canceled.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }
}
