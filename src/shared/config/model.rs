use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    // Overrides the sysinfo-derived memory allowance when set.
    pub memory_limit_bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "log".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub time_field: String,
    pub msg_field: String,
    pub stream_fields: Vec<String>,
    pub ignore_fields: Vec<String>,
    pub include_entry_metadata: bool,
    pub tenant_id: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            time_field: "__REALTIME_TIMESTAMP".to_string(),
            msg_field: "MESSAGE".to_string(),
            stream_fields: Vec::new(),
            ignore_fields: Vec::new(),
            include_entry_metadata: false,
            tenant_id: "0:0".to_string(),
        }
    }
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("VLOTLOG_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
