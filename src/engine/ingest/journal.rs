use ahash::AHashSet;
use tracing::debug;

use crate::engine::errors::IngestError;
use crate::engine::types::{Field, TenantID};
use crate::shared::config::model::Settings;

/// Receives parsed log rows from an ingestion parser.
pub trait RowSink {
    fn add_row(&mut self, timestamp_nanos: i64, fields: &[Field]);
}

/// Knobs consumed at the ingestion boundary.
#[derive(Clone, Debug)]
pub struct JournalParams {
    /// Field carrying the row timestamp, in decimal microseconds.
    pub time_field: String,
    /// Field renamed to `_msg`.
    pub msg_field: String,
    /// Fields treated as stream labels downstream.
    pub stream_fields: Vec<String>,
    /// Fields dropped before storage.
    pub ignore_fields: AHashSet<String>,
    /// Keep `__`-prefixed journal entry metadata.
    pub include_entry_metadata: bool,
    /// Tenant applied when the caller supplies none.
    pub tenant: TenantID,
}

impl JournalParams {
    pub fn from_settings(settings: &Settings) -> Result<Self, IngestError> {
        let cfg = &settings.ingest;
        Ok(Self {
            time_field: cfg.time_field.clone(),
            msg_field: cfg.msg_field.clone(),
            stream_fields: cfg.stream_fields.clone(),
            ignore_fields: cfg.ignore_fields.iter().cloned().collect(),
            include_entry_metadata: cfg.include_entry_metadata,
            tenant: TenantID::parse(&cfg.tenant_id)?,
        })
    }
}

/// Parses systemd journal export format: `NAME=value` lines, binary fields
/// as `NAME\n` + 8-byte little-endian length + payload + `\n`, entries
/// separated by blank lines. Returns the number of rows fed to `sink`.
///
/// Entries without the time field get `now_nanos`. The journal reports
/// microseconds; timestamps are scaled to nanoseconds.
pub fn parse_journal_export(
    data: &[u8],
    now_nanos: i64,
    params: &JournalParams,
    sink: &mut dyn RowSink,
) -> Result<usize, IngestError> {
    let mut fields: Vec<Field> = Vec::new();
    let mut ts: i64 = 0;
    let mut rows_ingested = 0;
    let mut data = data;

    while !data.is_empty() {
        let line;
        match data.iter().position(|&b| b == b'\n') {
            Some(0) => {
                // Blank line: the entry is complete.
                data = &data[1..];
                if !fields.is_empty() {
                    if ts == 0 {
                        ts = now_nanos;
                    }
                    sink.add_row(ts, &fields);
                    rows_ingested += 1;
                    fields.clear();
                    ts = 0;
                }
                continue;
            }
            Some(idx) => {
                line = &data[..idx];
                data = &data[idx + 1..];
            }
            None => {
                line = data;
                data = &data[..0];
            }
        }

        let name;
        let value;
        match line.iter().position(|&b| b == b'=') {
            Some(idx) if idx > 0 => {
                name = String::from_utf8_lossy(&line[..idx]).into_owned();
                value = String::from_utf8_lossy(&line[idx + 1..]).into_owned();
            }
            _ => {
                // Binary field: the line holds only the name; the value
                // follows as a length-prefixed payload.
                name = String::from_utf8_lossy(line).into_owned();
                if data.len() < 8 {
                    return Err(IngestError::BinaryFieldSize { field: name });
                }
                let size = u64::from_le_bytes(
                    data[..8].try_into().expect("sliced eight bytes"),
                );
                data = &data[8..];
                let size_usize = usize::try_from(size).unwrap_or(usize::MAX);
                if size_usize > data.len() {
                    return Err(IngestError::BinaryFieldTooLong {
                        field: name,
                        size,
                        remaining: data.len(),
                    });
                }
                value = String::from_utf8_lossy(&data[..size_usize]).into_owned();
                data = &data[size_usize..];
                // The payload is terminated by a newline of its own.
                if let Some((&b'\n', tail)) = data.split_first() {
                    data = tail;
                }
            }
        }

        if name == params.time_field {
            let parsed = value.parse::<i64>().map_err(|_| IngestError::InvalidTimestamp {
                field: name.clone(),
                value: value.clone(),
            })?;
            ts = parsed * 1_000;
            continue;
        }

        let name = if name == params.msg_field {
            "_msg".to_string()
        } else {
            name
        };

        if !params.include_entry_metadata && name.starts_with("__") {
            continue;
        }
        if params.ignore_fields.contains(&name) {
            continue;
        }
        fields.push(Field { name, value });
    }

    if !fields.is_empty() {
        if ts == 0 {
            ts = now_nanos;
        }
        sink.add_row(ts, &fields);
        rows_ingested += 1;
    }

    debug!(
        target: "vlotlog::ingest",
        rows = rows_ingested,
        tenant = %params.tenant,
        "Parsed journal export payload"
    );
    Ok(rows_ingested)
}
