use std::fmt;
use std::sync::OnceLock;

use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::core::filter::column_matchers::{
    match_float64_by_phrase, match_ipv4_by_phrase, match_string_by_phrase,
    match_timestamp_iso8601_by_phrase, match_uint_by_exact_value, match_values_dict_by_phrase,
};
use crate::engine::core::filter::filter::{quote_field_name_if_needed, quote_token_if_needed};
use crate::engine::core::text::matcher::match_phrase;
use crate::engine::core::text::tokenizer::tokenize;

/// Filters field entries by phrase match (aka full text search).
///
/// A phrase is any number of words with delimiters between them. An empty
/// phrase matches only an empty value.
#[derive(Debug)]
pub struct PhraseFilter {
    pub field_name: String,
    pub phrase: String,

    tokens: OnceLock<Vec<String>>,
}

impl PhraseFilter {
    pub fn new(field_name: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            phrase: phrase.into(),
            tokens: OnceLock::new(),
        }
    }

    fn tokens(&self) -> &[String] {
        self.tokens.get_or_init(|| tokenize(&self.phrase))
    }

    pub fn apply(&self, bs: &BlockSearch, bm: &mut Bitmap) {
        let phrase = self.phrase.as_str();

        // Verify whether the filter matches a const column.
        let v = bs.get_const_column_value(&self.field_name);
        if !v.is_empty() {
            if !match_phrase(v, phrase) {
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
            ColumnValueType::String => match_string_by_phrase(bs, ch, bm, phrase, tokens),
            ColumnValueType::Dict => match_values_dict_by_phrase(bs, ch, bm, phrase),
            ColumnValueType::Uint8
            | ColumnValueType::Uint16
            | ColumnValueType::Uint32
            | ColumnValueType::Uint64 => match_uint_by_exact_value(bs, ch, bm, phrase),
            ColumnValueType::Float64 => match_float64_by_phrase(bs, ch, bm, phrase, tokens),
            ColumnValueType::Ipv4 => match_ipv4_by_phrase(bs, ch, bm, phrase, tokens),
            ColumnValueType::TimestampIso8601 => {
                match_timestamp_iso8601_by_phrase(bs, ch, bm, phrase, tokens)
            }
        }
    }
}

impl fmt::Display for PhraseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            quote_field_name_if_needed(&self.field_name),
            quote_token_if_needed(&self.phrase)
        )
    }
}
