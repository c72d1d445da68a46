use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::core::column::render::{
    append_float, to_float64_string, to_ipv4_string, to_timestamp_iso8601_string,
    to_uint16_string, to_uint32_string, to_uint64_string, to_uint8_string, try_parse_float64,
};
use crate::shared::pool::with_scratch;

/// One column of a result block. Const columns store their single value once.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultColumn {
    pub name: String,
    pub is_const: bool,
    pub values: Vec<String>,
}

impl ResultColumn {
    pub fn value_at_row(&self, row: usize) -> &str {
        if self.is_const {
            return self.values.first().map(String::as_str).unwrap_or("");
        }
        self.values.get(row).map(String::as_str).unwrap_or("")
    }
}

/// A block of string-rendered rows flowing between pipes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockResult {
    pub timestamps: Vec<i64>,
    columns: Vec<ResultColumn>,
}

impl BlockResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    pub fn get_column_by_name(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Value of `name` at `row`; missing columns read as "".
    pub fn column_value_at(&self, name: &str, row: usize) -> &str {
        self.get_column_by_name(name)
            .map(|c| c.value_at_row(row))
            .unwrap_or("")
    }

    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.columns.push(ResultColumn {
            name: name.into(),
            is_const: false,
            values,
        });
    }

    pub fn add_const_column(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.columns.push(ResultColumn {
            name: name.into(),
            is_const: true,
            values: vec![value.into()],
        });
    }

    pub fn add_empty_string_column(&mut self, name: impl Into<String>) {
        self.add_column(name, Vec::new());
    }

    /// Appends one row across every column. The value arity must match the
    /// column arity.
    pub fn add_row(&mut self, timestamp: i64, values: &[String]) {
        if values.len() != self.columns.len() {
            panic!(
                "BUG: unexpected number of row values; got {}; want {}",
                values.len(),
                self.columns.len()
            );
        }
        self.timestamps.push(timestamp);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.values.push(value.clone());
        }
    }

    pub fn reset_rows(&mut self) {
        self.timestamps.clear();
        for column in &mut self.columns {
            column.values.clear();
        }
    }

    /// Per-row values of `name`, bucketed when `bucket_size > 0`. Missing
    /// columns expand to empty strings; const columns are expanded per row.
    pub fn get_bucketed_column_values(
        &self,
        name: &str,
        bucket_size: f64,
        bucket_offset: f64,
    ) -> Vec<String> {
        let rows = self.row_count();
        let Some(column) = self.get_column_by_name(name) else {
            return vec![String::new(); rows];
        };
        let mut out = Vec::with_capacity(rows);
        for row in 0..rows {
            out.push(bucket_value(
                column.value_at_row(row),
                bucket_size,
                bucket_offset,
            ));
        }
        out
    }

    /// Renders the rows of `bs` that survive `bm` into a result block
    /// carrying `fields` columns.
    pub fn from_block_search(bs: &BlockSearch, bm: &Bitmap, fields: &[String]) -> Self {
        let mut rows = Vec::new();
        bm.for_each_set_bit_readonly(|row| rows.push(row));

        let mut br = BlockResult::new();
        br.timestamps = rows.iter().map(|&row| bs.timestamps()[row]).collect();

        for field in fields {
            let const_value = bs.get_const_column_value(field);
            if !const_value.is_empty() {
                br.add_const_column(field.clone(), const_value);
                continue;
            }
            let Some(ch) = bs.get_column_header(field) else {
                br.add_const_column(field.clone(), "");
                continue;
            };
            let cells = bs.get_values_for_column(ch);
            let values = with_scratch(|buf| {
                let mut values = Vec::with_capacity(rows.len());
                for &row in &rows {
                    let cell = cells[row].as_slice();
                    let rendered: &str = match ch.value_type {
                        ColumnValueType::String => std::str::from_utf8(cell).unwrap_or(""),
                        ColumnValueType::Dict => {
                            if cell.len() != 1 {
                                panic!(
                                    "FATAL: {}: unexpected length for dict value: got {}; want 1",
                                    bs.part_path(),
                                    cell.len()
                                );
                            }
                            ch.values_dict
                                .values
                                .get(cell[0] as usize)
                                .map(String::as_str)
                                .unwrap_or_else(|| {
                                    panic!(
                                        "FATAL: {}: dict code {} out of range",
                                        bs.part_path(),
                                        cell[0]
                                    )
                                })
                        }
                        ColumnValueType::Uint8 => to_uint8_string(buf, cell, bs.part_path()),
                        ColumnValueType::Uint16 => to_uint16_string(buf, cell, bs.part_path()),
                        ColumnValueType::Uint32 => to_uint32_string(buf, cell, bs.part_path()),
                        ColumnValueType::Uint64 => to_uint64_string(buf, cell, bs.part_path()),
                        ColumnValueType::Float64 => to_float64_string(buf, cell, bs.part_path()),
                        ColumnValueType::Ipv4 => to_ipv4_string(buf, cell, bs.part_path()),
                        ColumnValueType::TimestampIso8601 => {
                            to_timestamp_iso8601_string(buf, cell, bs.part_path())
                        }
                    };
                    values.push(rendered.to_string());
                }
                values
            });
            br.add_column(field.clone(), values);
        }
        br
    }
}

/// Buckets a rendered value: `floor((x - offset) / size) * size + offset`.
/// Non-numeric values and non-positive sizes pass through unchanged.
pub fn bucket_value(value: &str, bucket_size: f64, bucket_offset: f64) -> String {
    if bucket_size <= 0.0 {
        return value.to_string();
    }
    let Some(x) = try_parse_float64(value) else {
        return value.to_string();
    };
    let bucketed = ((x - bucket_offset) / bucket_size).floor() * bucket_size + bucket_offset;
    let mut out = String::new();
    if bucketed.fract() == 0.0 && bucketed.abs() < 9.007_199_254_740_992e15 {
        use std::fmt::Write as _;
        let _ = write!(out, "{}", bucketed as i64);
    } else {
        append_float(&mut out, bucketed);
    }
    out
}
