use once_cell::sync::Lazy;
use std::sync::Mutex;

/// Process-wide pool of scratch strings used while rendering column cells.
/// A checkout lives for a single visitor callback and is always returned.
pub struct ScratchPool {
    buffers: Mutex<Vec<String>>,
}

impl ScratchPool {
    fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    fn get(&self) -> String {
        let mut buffers = self.buffers.lock().expect("scratch pool poisoned");
        buffers.pop().unwrap_or_default()
    }

    fn put(&self, mut buf: String) {
        buf.clear();
        let mut buffers = self.buffers.lock().expect("scratch pool poisoned");
        buffers.push(buf);
    }
}

static SCRATCH_POOL: Lazy<ScratchPool> = Lazy::new(ScratchPool::new);

/// Runs `f` with a pooled scratch string. The buffer is returned to the pool
/// on every exit path.
pub fn with_scratch<R>(f: impl FnOnce(&mut String) -> R) -> R {
    let mut buf = SCRATCH_POOL.get();
    let out = f(&mut buf);
    SCRATCH_POOL.put(buf);
    out
}

#[cfg(test)]
mod tests {
    use super::with_scratch;

    #[test]
    fn scratch_is_cleared_between_checkouts() {
        with_scratch(|buf| buf.push_str("leftover"));
        with_scratch(|buf| assert!(buf.is_empty()));
    }
}
