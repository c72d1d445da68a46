use std::fmt;
use std::sync::OnceLock;

use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::core::filter::column_matchers::{
    match_float64_by_prefix, match_ipv4_by_prefix, match_string_by_prefix,
    match_timestamp_iso8601_by_prefix, match_uint_by_prefix, match_values_dict_by_prefix,
};
use crate::engine::core::filter::filter::{quote_field_name_if_needed, quote_token_if_needed};
use crate::engine::core::text::matcher::match_prefix;
use crate::engine::core::text::tokenizer::tokenize_skip_last;

/// Filters field entries by prefix match.
///
/// The special case of an empty prefix matches any non-empty value for the
/// field, i.e. `field:*` means "field is present with a non-empty value".
#[derive(Debug)]
pub struct PrefixFilter {
    pub field_name: String,
    pub prefix: String,

    tokens: OnceLock<Vec<String>>,
}

impl PrefixFilter {
    pub fn new(field_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            prefix: prefix.into(),
            tokens: OnceLock::new(),
        }
    }

    fn tokens(&self) -> &[String] {
        // The trailing word of a prefix may be partial, so it cannot be
        // required of the token filter.
        self.tokens.get_or_init(|| tokenize_skip_last(&self.prefix))
    }

    pub fn apply(&self, bs: &BlockSearch, bm: &mut Bitmap) {
        let prefix = self.prefix.as_str();

        // Verify whether the filter matches a const column.
        let v = bs.get_const_column_value(&self.field_name);
        if !v.is_empty() {
            if !match_prefix(v, prefix) {
                bm.reset_bits();
            }
            return;
        }

        // Verify whether the filter matches other columns.
        let Some(ch) = bs.get_column_header(&self.field_name) else {
            // Fast path - the field is missing from the block.
            bm.reset_bits();
            return;
        };

        let tokens = self.tokens();

        match ch.value_type {
            ColumnValueType::String => match_string_by_prefix(bs, ch, bm, prefix, tokens),
            ColumnValueType::Dict => match_values_dict_by_prefix(bs, ch, bm, prefix),
            ColumnValueType::Uint8
            | ColumnValueType::Uint16
            | ColumnValueType::Uint32
            | ColumnValueType::Uint64 => match_uint_by_prefix(bs, ch, bm, prefix),
            ColumnValueType::Float64 => match_float64_by_prefix(bs, ch, bm, prefix, tokens),
            ColumnValueType::Ipv4 => match_ipv4_by_prefix(bs, ch, bm, prefix, tokens),
            ColumnValueType::TimestampIso8601 => {
                match_timestamp_iso8601_by_prefix(bs, ch, bm, prefix, tokens)
            }
        }
    }
}

impl fmt::Display for PrefixFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            return write!(f, "{}*", quote_field_name_if_needed(&self.field_name));
        }
        write!(
            f,
            "{}{}*",
            quote_field_name_if_needed(&self.field_name),
            quote_token_if_needed(&self.prefix)
        )
    }
}
