use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime};

/// Renders a 1-byte uint cell into `buf` and returns the canonical decimal.
pub fn to_uint8_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    if cell.len() != 1 {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of uint8 number: got {}; want 1",
            cell.len()
        );
    }
    append_uint(buf, u64::from(cell[0]))
}

/// Renders a 2-byte little-endian uint cell.
pub fn to_uint16_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    let Ok(bytes) = <[u8; 2]>::try_from(cell) else {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of uint16 number: got {}; want 2",
            cell.len()
        );
    };
    append_uint(buf, u64::from(u16::from_le_bytes(bytes)))
}

/// Renders a 4-byte little-endian uint cell.
pub fn to_uint32_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    let Ok(bytes) = <[u8; 4]>::try_from(cell) else {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of uint32 number: got {}; want 4",
            cell.len()
        );
    };
    append_uint(buf, u64::from(u32::from_le_bytes(bytes)))
}

/// Renders an 8-byte little-endian uint cell.
pub fn to_uint64_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    let Ok(bytes) = <[u8; 8]>::try_from(cell) else {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of uint64 number: got {}; want 8",
            cell.len()
        );
    };
    append_uint(buf, u64::from_le_bytes(bytes))
}

/// Renders an 8-byte float cell into its canonical decimal form.
pub fn to_float64_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    let Ok(bytes) = <[u8; 8]>::try_from(cell) else {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of floating-point number: got {}; want 8",
            cell.len()
        );
    };
    let f = f64::from_le_bytes(bytes);
    buf.clear();
    append_float(buf, f);
    buf.as_str()
}

/// Renders a 4-byte IPv4 cell as a dotted quad.
pub fn to_ipv4_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    let Ok(bytes) = <[u8; 4]>::try_from(cell) else {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of IPv4: got {}; want 4",
            cell.len()
        );
    };
    buf.clear();
    let _ = write!(buf, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3]);
    buf.as_str()
}

/// Renders an 8-byte big-endian nanosecond timestamp cell as ISO8601 with a
/// fixed 9-digit fraction, e.g. `2024-05-01T12:34:56.000000789Z`.
pub fn to_timestamp_iso8601_string<'a>(buf: &'a mut String, cell: &[u8], part_path: &str) -> &'a str {
    let Ok(bytes) = <[u8; 8]>::try_from(cell) else {
        panic!(
            "FATAL: {part_path}: unexpected length for binary representation of ISO8601 timestamp: got {}; want 8",
            cell.len()
        );
    };
    let nanos = i64::from_be_bytes(bytes);
    let dt = DateTime::from_timestamp_nanos(nanos);
    buf.clear();
    let _ = write!(buf, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.9fZ"));
    buf.as_str()
}

/// Canonical decimal form of `f`: shortest round-trip representation, with
/// negative zero collapsed to `0`.
pub fn append_float(buf: &mut String, f: f64) {
    if f == 0.0 {
        buf.push('0');
        return;
    }
    let _ = write!(buf, "{f}");
}

fn append_uint<'a>(buf: &'a mut String, n: u64) -> &'a str {
    buf.clear();
    let _ = write!(buf, "{n}");
    buf.as_str()
}

/// Parses a plain decimal uint. Signs, spaces and separators are rejected.
pub fn try_parse_uint64(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > 20 {
        return None;
    }
    let mut n: u64 = 0;
    for b in s.bytes() {
        if !b.is_ascii_digit() {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }
    Some(n)
}

/// Parses a finite decimal float with an optional sign, fraction and
/// exponent. Non-numeric spellings such as `inf` and `NaN` are rejected.
pub fn try_parse_float64(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut i = 0;
    if bytes[i] == b'-' || bytes[i] == b'+' {
        i += 1;
    }
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
            i += 1;
        }
        let mut exp_digits = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            exp_digits += 1;
        }
        if exp_digits == 0 {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    let f = s.parse::<f64>().ok()?;
    f.is_finite().then_some(f)
}

/// Parses a strict dotted quad: four decimal octets of at most 3 digits each.
pub fn try_parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse::<u16>().ok().filter(|&n| n <= 255)? as u8;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Parses a complete ISO8601 timestamp (`YYYY-MM-DDTHH:MM:SS[.fraction]Z`)
/// into nanoseconds since the epoch. Partial timestamps are rejected.
pub fn try_parse_timestamp_iso8601(s: &str) -> Option<i64> {
    let body = s.strip_suffix('Z')?;
    let dt = NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    dt.and_utc().timestamp_nanos_opt()
}

/// Little-endian binary form of `n` at the given fixed cell width.
pub fn marshal_uint(n: u64, width: usize) -> Vec<u8> {
    n.to_le_bytes()[..width].to_vec()
}

/// Binary cell form of a float value.
pub fn marshal_float64(f: f64) -> Vec<u8> {
    f.to_le_bytes().to_vec()
}

/// Binary cell form of a nanosecond timestamp.
pub fn marshal_timestamp(nanos: i64) -> Vec<u8> {
    nanos.to_be_bytes().to_vec()
}
