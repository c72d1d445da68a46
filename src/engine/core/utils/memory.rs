use std::sync::OnceLock;

use sysinfo::System;
use tracing::info;

use crate::shared::config::CONFIG;

static ALLOWED: OnceLock<u64> = OnceLock::new();

/// Memory the engine may use for query state: the configured override, or
/// 60% of system memory. Cached for the process lifetime.
pub fn allowed_memory() -> u64 {
    *ALLOWED.get_or_init(|| {
        if let Some(bytes) = CONFIG.query.memory_limit_bytes {
            info!(target: "vlotlog::memory", bytes, "Using configured memory limit");
            return bytes;
        }
        let mut system = System::new();
        system.refresh_memory();
        let allowed = (system.total_memory() as f64 * 0.6) as u64;
        info!(
            target: "vlotlog::memory",
            total = system.total_memory(),
            allowed,
            "Derived memory allowance from system memory"
        );
        allowed
    })
}
