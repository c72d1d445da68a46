pub mod model;

use once_cell::sync::Lazy;
use std::sync::Arc;

use model::{load_settings, Settings};

/// Process-wide settings, loaded once on first touch. Query code paths read
/// engine/query knobs from here; the ingestion boundary reads its field
/// mappings via `JournalParams::from_settings`. Every section is defaulted,
/// so only a present-but-malformed config file can fail here.
pub static CONFIG: Lazy<Arc<Settings>> =
    Lazy::new(|| Arc::new(load_settings().expect("invalid vlotlog configuration")));
