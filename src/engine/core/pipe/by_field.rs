use std::fmt;

use crate::engine::core::column::render::try_parse_float64;
use crate::engine::core::filter::filter::quote_token_if_needed;
use crate::engine::errors::QueryError;

/// One `by (...)` grouping field with optional bucketing:
/// `name` or `name:bucket [offset o]`, where values are grouped into
/// `floor((x - offset) / bucket) * bucket + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct ByField {
    pub name: String,

    pub bucket_size_str: String,
    pub bucket_size: f64,

    pub bucket_offset_str: String,
    pub bucket_offset: f64,
}

impl ByField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket_size_str: String::new(),
            bucket_size: 0.0,
            bucket_offset_str: String::new(),
            bucket_offset: 0.0,
        }
    }

    /// Builds a bucketed by-field from its textual bucket spec.
    pub fn with_bucket(
        name: impl Into<String>,
        bucket_size_str: &str,
        bucket_offset_str: Option<&str>,
    ) -> Result<Self, QueryError> {
        let name = name.into();
        let Some(bucket_size) = try_parse_bucket_size(bucket_size_str) else {
            return Err(QueryError::InvalidBucketSize {
                field: name,
                input: bucket_size_str.to_string(),
            });
        };
        let mut bf = Self::new(name);
        bf.bucket_size_str = bucket_size_str.to_string();
        bf.bucket_size = bucket_size;
        if let Some(offset_str) = bucket_offset_str {
            let Some(bucket_offset) = try_parse_bucket_offset(offset_str) else {
                return Err(QueryError::InvalidBucketOffset {
                    field: bf.name,
                    input: offset_str.to_string(),
                });
            };
            bf.bucket_offset_str = offset_str.to_string();
            bf.bucket_offset = bucket_offset;
        }
        Ok(bf)
    }
}

impl fmt::Display for ByField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_token_if_needed(&self.name))?;
        if !self.bucket_size_str.is_empty() {
            write!(f, ":{}", self.bucket_size_str)?;
            if !self.bucket_offset_str.is_empty() {
                write!(f, " offset {}", self.bucket_offset_str)?;
            }
        }
        Ok(())
    }
}

/// Bucket offsets accept plain numbers, durations (converted to nanoseconds)
/// and byte sizes.
pub fn try_parse_bucket_offset(s: &str) -> Option<f64> {
    if let Some(f) = try_parse_float64(s) {
        return Some(f);
    }
    if let Some(nanos) = try_parse_duration(s) {
        return Some(nanos as f64);
    }
    if let Some(n) = try_parse_bytes(s) {
        return Some(n as f64);
    }
    None
}

/// Bucket sizes accept plain numbers, durations, byte sizes and IPv4 masks.
pub fn try_parse_bucket_size(s: &str) -> Option<f64> {
    if let Some(f) = try_parse_float64(s) {
        return Some(f);
    }
    if let Some(nanos) = try_parse_duration(s) {
        return Some(nanos as f64);
    }
    if let Some(n) = try_parse_bytes(s) {
        return Some(n as f64);
    }
    if let Some(n) = try_parse_ipv4_mask(s) {
        return Some(n as f64);
    }
    None
}

/// Parses durations like `1.5s`, `5m`, `2h`, `1d`, `3w` into nanoseconds.
/// Concatenated parts (`1h30m`) are summed.
pub fn try_parse_duration(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    let mut total: f64 = 0.0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
            .unwrap_or(rest.len());
        if digits_end == 0 || digits_end == rest.len() {
            return None;
        }
        let number = try_parse_float64(&rest[..digits_end])?;
        let unit_end = digits_end
            + rest[digits_end..]
                .find(|c: char| c.is_ascii_digit() || c == '.' || c == '-')
                .unwrap_or(rest.len() - digits_end);
        let unit_nanos: f64 = match &rest[digits_end..unit_end] {
            "ns" => 1.0,
            "µs" | "us" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3_600.0 * 1e9,
            "d" => 24.0 * 3_600.0 * 1e9,
            "w" => 7.0 * 24.0 * 3_600.0 * 1e9,
            _ => return None,
        };
        total += number * unit_nanos;
        rest = &rest[unit_end..];
    }
    Some(total as i64)
}

/// Parses byte sizes like `1.5KiB`, `2MB`, `3GiB` into bytes.
pub fn try_parse_bytes(s: &str) -> Option<i64> {
    let unit_start = s.find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')?;
    let number = try_parse_float64(&s[..unit_start])?;
    let multiplier: f64 = match &s[unit_start..] {
        "B" => 1.0,
        "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((number * multiplier) as i64)
}

/// Parses an IPv4 mask like `/24` into the bucket width `2^(32-bits)`.
pub fn try_parse_ipv4_mask(s: &str) -> Option<u64> {
    let bits = s.strip_prefix('/')?.parse::<u32>().ok()?;
    if bits > 32 {
        return None;
    }
    Some(1u64 << (32 - bits))
}
