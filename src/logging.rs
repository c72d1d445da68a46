use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::CONFIG;

/// Installs the global subscriber for a process embedding the engine:
/// a stdout layer, plus a daily-rolling file layer when `logging.log_dir`
/// is configured. Engines embedded in a host that already installed its own
/// subscriber should skip this and let the host's layers receive the
/// `vlotlog::*` targets.
pub fn init() -> anyhow::Result<()> {
    let cfg = &CONFIG.logging;
    let stdout_filter = cfg.stdout_level.parse::<LevelFilter>()?;

    let stdout_layer = fmt::layer().with_ansi(true).with_filter(stdout_filter);

    let file_layer = if cfg.log_dir.is_empty() {
        None
    } else {
        let file_filter = cfg.file_level.parse::<LevelFilter>()?;
        let file_appender = tracing_appender::rolling::daily(&cfg.log_dir, "vlotlog.log");
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender)
                .with_filter(file_filter),
        )
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!(
        target: "vlotlog::init",
        stdout_level = %cfg.stdout_level,
        file_level = %cfg.file_level,
        log_dir = %cfg.log_dir,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter =
            EnvFilter::from_default_env().add_directive("vlotlog=debug".parse().unwrap());

        // Route through the captured test writer so logs surface only for
        // failing tests.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
