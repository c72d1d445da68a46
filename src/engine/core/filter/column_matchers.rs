use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::column::header::{ColumnHeader, ColumnValueType};
use crate::engine::core::column::render::{
    append_float, marshal_float64, marshal_timestamp, marshal_uint, to_float64_string,
    to_ipv4_string, to_timestamp_iso8601_string, to_uint16_string, to_uint32_string,
    to_uint64_string, to_uint8_string, try_parse_float64, try_parse_ipv4,
    try_parse_timestamp_iso8601, try_parse_uint64,
};
use crate::engine::core::text::matcher::{match_any_case_phrase, match_phrase, match_prefix};
use crate::engine::core::text::tokenizer::tokenize;
use crate::shared::pool::with_scratch;

/// True iff every token is (probably) present in the column's token filter.
/// An empty token list carries no information and cannot reject.
pub fn match_bloom_filter_all_tokens(bs: &BlockSearch, ch: &ColumnHeader, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    match bs.get_token_filter_for_column(ch) {
        Some(tf) => tf.contains_all(tokens),
        None => true,
    }
}

/// Visits the cells of live rows, clearing the bits whose cell fails `f`.
pub fn visit_values(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    mut f: impl FnMut(&[u8]) -> bool,
) {
    if bm.is_zero() {
        // Fast path - nothing to visit.
        return;
    }
    let values = bs.get_values_for_column(ch);
    bm.for_each_set_bit(|row| f(&values[row]));
}

fn cell_str(cell: &[u8]) -> &str {
    std::str::from_utf8(cell).unwrap_or("")
}

// --- string columns ---------------------------------------------------

pub fn match_string_by_phrase(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    phrase: &str,
    tokens: &[String],
) {
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    visit_values(bs, ch, bm, |cell| match_phrase(cell_str(cell), phrase));
}

pub fn match_string_by_prefix(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    prefix: &str,
    tokens: &[String],
) {
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    visit_values(bs, ch, bm, |cell| match_prefix(cell_str(cell), prefix));
}

pub fn match_string_by_any_case_phrase(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    phrase_lowercase: &str,
) {
    visit_values(bs, ch, bm, |cell| {
        match_any_case_phrase(cell_str(cell), phrase_lowercase)
    });
}

// --- dict columns -----------------------------------------------------

pub fn match_values_dict_by_phrase(bs: &BlockSearch, ch: &ColumnHeader, bm: &mut Bitmap, phrase: &str) {
    let mut encoded = Vec::new();
    for (i, v) in ch.values_dict.values.iter().enumerate() {
        if match_phrase(v, phrase) {
            encoded.push(i as u8);
        }
    }
    match_encoded_values_dict(bs, ch, bm, &encoded);
}

pub fn match_values_dict_by_prefix(bs: &BlockSearch, ch: &ColumnHeader, bm: &mut Bitmap, prefix: &str) {
    let mut encoded = Vec::new();
    for (i, v) in ch.values_dict.values.iter().enumerate() {
        if match_prefix(v, prefix) {
            encoded.push(i as u8);
        }
    }
    match_encoded_values_dict(bs, ch, bm, &encoded);
}

pub fn match_values_dict_by_any_case_phrase(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    phrase_lowercase: &str,
) {
    let mut encoded = Vec::new();
    for (i, v) in ch.values_dict.values.iter().enumerate() {
        if match_any_case_phrase(v, phrase_lowercase) {
            encoded.push(i as u8);
        }
    }
    match_encoded_values_dict(bs, ch, bm, &encoded);
}

fn match_encoded_values_dict(bs: &BlockSearch, ch: &ColumnHeader, bm: &mut Bitmap, encoded: &[u8]) {
    if encoded.is_empty() {
        // Fast path - the needle is missing from the values dict.
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    visit_values(bs, ch, bm, |cell| {
        if cell.len() != 1 {
            panic!(
                "FATAL: {part_path}: unexpected length for dict value: got {}; want 1",
                cell.len()
            );
        }
        encoded.contains(&cell[0])
    });
}

// --- fixed-width uint columns -----------------------------------------

fn to_uint_string<'a>(
    buf: &'a mut String,
    cell: &[u8],
    value_type: ColumnValueType,
    part_path: &str,
) -> &'a str {
    match value_type {
        ColumnValueType::Uint8 => to_uint8_string(buf, cell, part_path),
        ColumnValueType::Uint16 => to_uint16_string(buf, cell, part_path),
        ColumnValueType::Uint32 => to_uint32_string(buf, cell, part_path),
        ColumnValueType::Uint64 => to_uint64_string(buf, cell, part_path),
        _ => panic!("FATAL: {part_path}: unexpected uint valueType={value_type:?}"),
    }
}

/// Exact decimal match over a uint column, pruned by min/max hints and the
/// token filter before any per-row visitation. The token probe uses the
/// canonical decimal form of the parsed value, so spellings like `0404`
/// cannot be rejected for a block that holds `404`.
pub fn match_uint_by_exact_value(bs: &BlockSearch, ch: &ColumnHeader, bm: &mut Bitmap, phrase: &str) {
    let Some(n) = try_parse_uint64(phrase) else {
        bm.reset_bits();
        return;
    };
    if n < ch.min_value || n > ch.max_value {
        bm.reset_bits();
        return;
    }
    let width = ch
        .value_type
        .cell_width()
        .unwrap_or_else(|| panic!("FATAL: {}: uint column without width", bs.part_path()));
    let tokens = vec![n.to_string()];
    match_binary_value(bs, ch, bm, &marshal_uint(n, width), &tokens);
}

/// Prefix match over a uint column. The prefix may be a partial number, so
/// live cells are rendered to their decimal form and prefix-matched.
pub fn match_uint_by_prefix(bs: &BlockSearch, ch: &ColumnHeader, bm: &mut Bitmap, prefix: &str) {
    if prefix.is_empty() {
        // Fast path - all the uint values match an empty prefix aka `*`.
        return;
    }
    let Some(n) = try_parse_uint64(prefix) else {
        bm.reset_bits();
        return;
    };
    if n > ch.max_value {
        bm.reset_bits();
        return;
    }
    // No token filter probe here: a partial prefix is not a whole token.
    let value_type = ch.value_type;
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_uint_string(buf, cell, value_type, part_path);
            match_prefix(s, prefix)
        });
    });
}

/// Matches live rows whose cell equals `needle` byte for byte, after the
/// token filter had its chance to reject the whole block.
pub fn match_binary_value(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    needle: &[u8],
    tokens: &[String],
) {
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    visit_values(bs, ch, bm, |cell| cell == needle);
}

// --- float64 columns --------------------------------------------------

pub fn match_float64_by_phrase(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    phrase: &str,
    tokens: &[String],
) {
    // The phrase may contain a part of a floating-point number, e.g. `123`
    // must match `123`, `123.456` and `-0.123`, so binary search is out and
    // the string form is scanned instead.
    let parsed = try_parse_float64(phrase);
    if parsed.is_none() && phrase != "." && phrase != "+" && phrase != "-" {
        bm.reset_bits();
        return;
    }
    if let Some(f) = parsed {
        if let Some(dot) = phrase.find('.') {
            if dot > 0 && dot < phrase.len() - 1 {
                // Fast path - the phrase is a complete floating-point
                // number, so exact binary search applies.
                match_float64_by_exact_value(bs, ch, bm, f);
                return;
            }
        }
    }
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_float64_string(buf, cell, part_path);
            match_phrase(s, phrase)
        });
    });
}

pub fn match_float64_by_prefix(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    prefix: &str,
    tokens: &[String],
) {
    if prefix.is_empty() {
        // Fast path - all the float64 values match an empty prefix aka `*`.
        return;
    }
    let parsed = try_parse_float64(prefix);
    if parsed.is_none()
        && prefix != "."
        && prefix != "+"
        && prefix != "-"
        && !prefix.starts_with('e')
        && !prefix.starts_with('E')
    {
        bm.reset_bits();
        return;
    }
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_float64_string(buf, cell, part_path);
            match_prefix(s, prefix)
        });
    });
}

fn match_float64_by_exact_value(bs: &BlockSearch, ch: &ColumnHeader, bm: &mut Bitmap, f: f64) {
    // The token probe uses the canonical render of the value, which may
    // differ from the query spelling (`1.5e3` renders as `1500`).
    let mut canonical = String::new();
    append_float(&mut canonical, f);
    let tokens = tokenize(&canonical);
    match_binary_value(bs, ch, bm, &marshal_float64(f), &tokens);
}

// --- IPv4 columns -----------------------------------------------------

pub fn match_ipv4_by_phrase(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    phrase: &str,
    tokens: &[String],
) {
    if let Some(octets) = try_parse_ipv4(phrase) {
        // Fast path - the phrase is a complete address, exact match applies.
        // The token probe uses the canonical dotted form of the parsed
        // octets rather than the query spelling.
        let canonical = with_scratch(|buf| to_ipv4_string(buf, &octets, bs.part_path()).to_string());
        let exact_tokens = tokenize(&canonical);
        match_binary_value(bs, ch, bm, &octets, &exact_tokens);
        return;
    }
    // Slow path - the phrase may hold part of an address; `1.23` must match
    // `1.23.4.5` and `4.1.23.54`, so the dotted form is scanned.
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_ipv4_string(buf, cell, part_path);
            match_phrase(s, phrase)
        });
    });
}

pub fn match_ipv4_by_prefix(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    prefix: &str,
    tokens: &[String],
) {
    if prefix.is_empty() {
        // Fast path - all the ipv4 values match an empty prefix aka `*`.
        return;
    }
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_ipv4_string(buf, cell, part_path);
            match_prefix(s, prefix)
        });
    });
}

// --- ISO8601 timestamp columns ----------------------------------------

pub fn match_timestamp_iso8601_by_phrase(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    phrase: &str,
    tokens: &[String],
) {
    if let Some(nanos) = try_parse_timestamp_iso8601(phrase) {
        // Fast path - the phrase holds a complete timestamp. The token probe
        // uses the canonical 9-digit render, which may differ from the query
        // spelling when the fraction is shortened.
        let cell = marshal_timestamp(nanos);
        let canonical =
            with_scratch(|buf| to_timestamp_iso8601_string(buf, &cell, bs.part_path()).to_string());
        let exact_tokens = tokenize(&canonical);
        match_binary_value(bs, ch, bm, &cell, &exact_tokens);
        return;
    }
    // Slow path - incomplete timestamp; scan the string form.
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_timestamp_iso8601_string(buf, cell, part_path);
            match_phrase(s, phrase)
        });
    });
}

pub fn match_timestamp_iso8601_by_prefix(
    bs: &BlockSearch,
    ch: &ColumnHeader,
    bm: &mut Bitmap,
    prefix: &str,
    tokens: &[String],
) {
    if prefix.is_empty() {
        // Fast path - all the timestamp values match an empty prefix aka `*`.
        return;
    }
    // A prefix may hold an incomplete timestamp, so the binary form cannot
    // be compared; scan the string form.
    if !match_bloom_filter_all_tokens(bs, ch, tokens) {
        bm.reset_bits();
        return;
    }
    let part_path = bs.part_path();
    with_scratch(|buf| {
        visit_values(bs, ch, bm, |cell| {
            let s = to_timestamp_iso8601_string(buf, cell, part_path);
            match_prefix(s, prefix)
        });
    });
}
