use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::types::StreamId;

enum ColumnSpec {
    Const(String, String),
    Str(String, Vec<String>),
    Dict(String, Vec<String>, Vec<u8>),
    Uint(String, ColumnValueType, Vec<u64>),
    Float(String, Vec<f64>),
    Ipv4(String, Vec<[u8; 4]>),
    Timestamp(String, Vec<i64>),
}

/// Factory for constructing in-memory `BlockSearch` instances for tests.
pub struct BlockSearchFactory {
    part_path: String,
    stream_id: StreamId,
    timestamps: Vec<i64>,
    columns: Vec<ColumnSpec>,
}

impl BlockSearchFactory {
    /// A block of `rows` rows with timestamps 0..rows.
    pub fn new(rows: usize) -> Self {
        Self {
            part_path: "part-test".to_string(),
            stream_id: StreamId(0),
            timestamps: (0..rows as i64).collect(),
            columns: Vec::new(),
        }
    }

    pub fn with_part_path(mut self, part_path: &str) -> Self {
        self.part_path = part_path.to_string();
        self
    }

    pub fn with_stream_id(mut self, stream_id: StreamId) -> Self {
        self.stream_id = stream_id;
        self
    }

    pub fn with_timestamps(mut self, timestamps: &[i64]) -> Self {
        self.timestamps = timestamps.to_vec();
        self
    }

    pub fn with_const_column(mut self, name: &str, value: &str) -> Self {
        self.columns
            .push(ColumnSpec::Const(name.to_string(), value.to_string()));
        self
    }

    pub fn with_string_column(mut self, name: &str, values: &[&str]) -> Self {
        self.columns.push(ColumnSpec::Str(
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn with_dict_column(mut self, name: &str, dict: &[&str], codes: &[u8]) -> Self {
        self.columns.push(ColumnSpec::Dict(
            name.to_string(),
            dict.iter().map(|v| v.to_string()).collect(),
            codes.to_vec(),
        ));
        self
    }

    pub fn with_uint_column(
        mut self,
        name: &str,
        value_type: ColumnValueType,
        values: &[u64],
    ) -> Self {
        self.columns.push(ColumnSpec::Uint(
            name.to_string(),
            value_type,
            values.to_vec(),
        ));
        self
    }

    pub fn with_float64_column(mut self, name: &str, values: &[f64]) -> Self {
        self.columns
            .push(ColumnSpec::Float(name.to_string(), values.to_vec()));
        self
    }

    pub fn with_ipv4_column(mut self, name: &str, values: &[[u8; 4]]) -> Self {
        self.columns
            .push(ColumnSpec::Ipv4(name.to_string(), values.to_vec()));
        self
    }

    pub fn with_timestamp_column(mut self, name: &str, values: &[i64]) -> Self {
        self.columns
            .push(ColumnSpec::Timestamp(name.to_string(), values.to_vec()));
        self
    }

    pub fn create(self) -> BlockSearch {
        let mut block = BlockSearch::new(self.part_path, self.stream_id, self.timestamps);
        for spec in self.columns {
            match spec {
                ColumnSpec::Const(name, value) => block.add_const_column(name, value),
                ColumnSpec::Str(name, values) => {
                    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                    block.add_string_column(&name, &refs);
                }
                ColumnSpec::Dict(name, dict, codes) => {
                    let refs: Vec<&str> = dict.iter().map(String::as_str).collect();
                    block.add_dict_column(&name, &refs, &codes);
                }
                ColumnSpec::Uint(name, value_type, values) => {
                    block.add_uint_column(&name, value_type, &values);
                }
                ColumnSpec::Float(name, values) => block.add_float64_column(&name, &values),
                ColumnSpec::Ipv4(name, values) => block.add_ipv4_column(&name, &values),
                ColumnSpec::Timestamp(name, values) => block.add_timestamp_column(&name, &values),
            }
        }
        block
    }
}
