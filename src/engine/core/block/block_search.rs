use ahash::AHashMap;

use crate::engine::core::column::header::{ColumnHeader, ColumnValueType, ValuesDict};
use crate::engine::core::column::render::{
    marshal_float64, marshal_timestamp, marshal_uint, to_float64_string, to_ipv4_string,
    to_timestamp_iso8601_string,
};
use crate::engine::core::filter::token_filter::TokenFilter;
use crate::engine::core::text::tokenizer::tokenize;
use crate::engine::types::{Field, StreamId};
use crate::shared::pool::with_scratch;

/// Read-only view over one block of rows selected from a storage part:
/// const-column hints, column headers, physical cells and per-column token
/// filters. This is the unit the filter tree evaluates against.
#[derive(Debug)]
pub struct BlockSearch {
    part_path: String,
    stream_id: StreamId,
    timestamps: Vec<i64>,
    const_columns: Vec<Field>,
    headers: Vec<ColumnHeader>,
    values: AHashMap<String, Vec<Vec<u8>>>,
    token_filters: AHashMap<String, TokenFilter>,
}

impl BlockSearch {
    pub fn new(part_path: impl Into<String>, stream_id: StreamId, timestamps: Vec<i64>) -> Self {
        Self {
            part_path: part_path.into(),
            stream_id,
            timestamps,
            const_columns: Vec::new(),
            headers: Vec::new(),
            values: AHashMap::new(),
            token_filters: AHashMap::new(),
        }
    }

    pub fn part_path(&self) -> &str {
        &self.part_path
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns the const value advertised for `name`, or "" when the column
    /// is not const within this block.
    pub fn get_const_column_value(&self, name: &str) -> &str {
        self.const_columns
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn get_column_header(&self, name: &str) -> Option<&ColumnHeader> {
        self.headers.iter().find(|ch| ch.name == name)
    }

    /// Returns the physical cells for the column described by `ch`.
    pub fn get_values_for_column(&self, ch: &ColumnHeader) -> &[Vec<u8>] {
        match self.values.get(&ch.name) {
            Some(cells) => cells,
            None => panic!(
                "FATAL: {}: missing values for column {:?}",
                self.part_path, ch.name
            ),
        }
    }

    pub fn get_token_filter_for_column(&self, ch: &ColumnHeader) -> Option<&TokenFilter> {
        self.token_filters.get(&ch.name)
    }

    // --- builders -----------------------------------------------------
    //
    // Blocks are normally materialised by the part reader; the builders
    // below stand in for it and keep header hints, cells and token filters
    // consistent by construction.

    pub fn add_const_column(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.const_columns.push(Field::new(name, value));
    }

    pub fn add_string_column(&mut self, name: &str, values: &[&str]) {
        assert_eq!(values.len(), self.row_count(), "column height mismatch");
        let header = ColumnHeader::new(name, ColumnValueType::String);
        let mut tokens = Vec::new();
        for v in values {
            tokens.extend(tokenize(v));
        }
        self.token_filters
            .insert(name.to_string(), TokenFilter::new(&tokens));
        self.values.insert(
            name.to_string(),
            values.iter().map(|v| v.as_bytes().to_vec()).collect(),
        );
        self.headers.push(header);
    }

    pub fn add_dict_column(&mut self, name: &str, dict: &[&str], codes: &[u8]) {
        assert_eq!(codes.len(), self.row_count(), "column height mismatch");
        let mut header = ColumnHeader::new(name, ColumnValueType::Dict);
        header.values_dict = ValuesDict::new(dict.iter().map(|s| s.to_string()).collect());
        self.values
            .insert(name.to_string(), codes.iter().map(|c| vec![*c]).collect());
        self.headers.push(header);
    }

    pub fn add_uint_column(&mut self, name: &str, value_type: ColumnValueType, values: &[u64]) {
        assert_eq!(values.len(), self.row_count(), "column height mismatch");
        let width = match value_type.cell_width() {
            Some(w) if matches!(
                value_type,
                ColumnValueType::Uint8
                    | ColumnValueType::Uint16
                    | ColumnValueType::Uint32
                    | ColumnValueType::Uint64
            ) =>
            {
                w
            }
            _ => panic!("BUG: add_uint_column called with {value_type:?}"),
        };
        let mut header = ColumnHeader::new(name, value_type);
        header.min_value = values.iter().copied().min().unwrap_or(0);
        header.max_value = values.iter().copied().max().unwrap_or(0);
        let tokens: Vec<String> = values.iter().map(|n| n.to_string()).collect();
        self.token_filters
            .insert(name.to_string(), TokenFilter::new(&tokens));
        self.values.insert(
            name.to_string(),
            values.iter().map(|n| marshal_uint(*n, width)).collect(),
        );
        self.headers.push(header);
    }

    pub fn add_float64_column(&mut self, name: &str, values: &[f64]) {
        assert_eq!(values.len(), self.row_count(), "column height mismatch");
        let header = ColumnHeader::new(name, ColumnValueType::Float64);
        let cells: Vec<Vec<u8>> = values.iter().map(|f| marshal_float64(*f)).collect();
        let tokens = with_scratch(|buf| {
            let mut tokens = Vec::new();
            for cell in &cells {
                tokens.extend(tokenize(to_float64_string(buf, cell, &self.part_path)));
            }
            tokens
        });
        self.token_filters
            .insert(name.to_string(), TokenFilter::new(&tokens));
        self.values.insert(name.to_string(), cells);
        self.headers.push(header);
    }

    pub fn add_ipv4_column(&mut self, name: &str, values: &[[u8; 4]]) {
        assert_eq!(values.len(), self.row_count(), "column height mismatch");
        let header = ColumnHeader::new(name, ColumnValueType::Ipv4);
        let cells: Vec<Vec<u8>> = values.iter().map(|v| v.to_vec()).collect();
        let tokens = with_scratch(|buf| {
            let mut tokens = Vec::new();
            for cell in &cells {
                tokens.extend(tokenize(to_ipv4_string(buf, cell, &self.part_path)));
            }
            tokens
        });
        self.token_filters
            .insert(name.to_string(), TokenFilter::new(&tokens));
        self.values.insert(name.to_string(), cells);
        self.headers.push(header);
    }

    pub fn add_timestamp_column(&mut self, name: &str, values: &[i64]) {
        assert_eq!(values.len(), self.row_count(), "column height mismatch");
        let header = ColumnHeader::new(name, ColumnValueType::TimestampIso8601);
        let cells: Vec<Vec<u8>> = values.iter().map(|n| marshal_timestamp(*n)).collect();
        let tokens = with_scratch(|buf| {
            let mut tokens = Vec::new();
            for cell in &cells {
                tokens.extend(tokenize(to_timestamp_iso8601_string(
                    buf,
                    cell,
                    &self.part_path,
                )));
            }
            tokens
        });
        self.token_filters
            .insert(name.to_string(), TokenFilter::new(&tokens));
        self.values.insert(name.to_string(), cells);
        self.headers.push(header);
    }
}
