use std::fmt;
use std::sync::OnceLock;

use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::core::filter::column_matchers::{
    match_float64_by_phrase, match_ipv4_by_phrase, match_string_by_any_case_phrase,
    match_timestamp_iso8601_by_phrase, match_uint_by_exact_value,
    match_values_dict_by_any_case_phrase,
};
use crate::engine::core::filter::filter::{quote_field_name_if_needed, quote_token_if_needed};
use crate::engine::core::text::matcher::match_any_case_phrase;
use crate::engine::core::text::tokenizer::tokenize;

/// Filters field entries by case-insensitive phrase match.
#[derive(Debug)]
pub struct AnyCasePhraseFilter {
    pub field_name: String,
    pub phrase: String,

    phrase_lowercase: OnceLock<String>,
    tokens: OnceLock<Vec<String>>,
}

impl AnyCasePhraseFilter {
    pub fn new(field_name: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            phrase: phrase.into(),
            phrase_lowercase: OnceLock::new(),
            tokens: OnceLock::new(),
        }
    }

    fn phrase_lowercase(&self) -> &str {
        self.phrase_lowercase
            .get_or_init(|| self.phrase.to_lowercase())
    }

    fn tokens(&self) -> &[String] {
        self.tokens
            .get_or_init(|| tokenize(self.phrase_lowercase()))
    }

    pub fn apply(&self, bs: &BlockSearch, bm: &mut Bitmap) {
        let phrase_lowercase = self.phrase_lowercase();

        // Verify whether the filter matches a const column.
        let v = bs.get_const_column_value(&self.field_name);
        if !v.is_empty() {
            if !match_any_case_phrase(v, phrase_lowercase) {
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
            ColumnValueType::String => {
                match_string_by_any_case_phrase(bs, ch, bm, phrase_lowercase)
            }
            ColumnValueType::Dict => {
                match_values_dict_by_any_case_phrase(bs, ch, bm, phrase_lowercase)
            }
            ColumnValueType::Uint8
            | ColumnValueType::Uint16
            | ColumnValueType::Uint32
            | ColumnValueType::Uint64 => match_uint_by_exact_value(bs, ch, bm, phrase_lowercase),
            ColumnValueType::Float64 => match_float64_by_phrase(bs, ch, bm, phrase_lowercase, tokens),
            ColumnValueType::Ipv4 => match_ipv4_by_phrase(bs, ch, bm, phrase_lowercase, tokens),
            ColumnValueType::TimestampIso8601 => {
                // The canonical timestamp form is uppercase, so the needle
                // and its tokens are upper-cased for this path.
                let phrase_uppercase = self.phrase.to_uppercase();
                let tokens_uppercase = tokenize(&phrase_uppercase);
                match_timestamp_iso8601_by_phrase(bs, ch, bm, &phrase_uppercase, &tokens_uppercase)
            }
        }
    }
}

impl fmt::Display for AnyCasePhraseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}i({})",
            quote_field_name_if_needed(&self.field_name),
            quote_token_if_needed(&self.phrase)
        )
    }
}
