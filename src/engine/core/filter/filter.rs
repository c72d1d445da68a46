use std::fmt;

use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::block::block_result::BlockResult;
use crate::engine::core::block::block_search::BlockSearch;
use crate::engine::core::filter::any_case_phrase_filter::AnyCasePhraseFilter;
use crate::engine::core::filter::phrase_filter::PhraseFilter;
use crate::engine::core::filter::prefix_filter::PrefixFilter;
use crate::engine::core::filter::stream_filter::StreamFilter;
use crate::engine::core::text::matcher::{match_any_case_phrase, match_phrase, match_prefix};
use crate::engine::core::text::tokenizer::is_token_rune;

/// A node of the validated filter tree produced by the query surface.
#[derive(Debug)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Stream(StreamFilter),
    Phrase(PhraseFilter),
    Prefix(PrefixFilter),
    AnyCasePhrase(AnyCasePhraseFilter),
}

impl Filter {
    /// Narrows `bm` to the rows of `bs` matching this filter. Bits are only
    /// ever cleared, never set.
    pub fn apply(&self, bs: &BlockSearch, bm: &mut Bitmap) {
        match self {
            Filter::And(children) => {
                for child in children {
                    child.apply(bs, bm);
                    if bm.is_zero() {
                        return;
                    }
                }
            }
            Filter::Or(children) => {
                let mut result = Bitmap::new(bm.len());
                result.reset_bits();
                for child in children {
                    let mut child_bm = bm.clone();
                    child.apply(bs, &mut child_bm);
                    result.or(&child_bm);
                }
                bm.and(&result);
            }
            Filter::Not(child) => {
                let mut child_bm = bm.clone();
                child.apply(bs, &mut child_bm);
                bm.and_not(&child_bm);
            }
            Filter::Stream(f) => f.apply(bs, bm),
            Filter::Phrase(f) => f.apply(bs, bm),
            Filter::Prefix(f) => f.apply(bs, bm),
            Filter::AnyCasePhrase(f) => f.apply(bs, bm),
        }
    }

    /// Evaluates this filter against one row of an already-rendered result
    /// block. Used by `if (...)` clauses on downstream pipes, where every
    /// column is in string form. A stream filter has no stream id to test
    /// here and matches all rows.
    pub fn matches_result_row(&self, br: &BlockResult, row: usize) -> bool {
        match self {
            Filter::And(children) => children.iter().all(|c| c.matches_result_row(br, row)),
            Filter::Or(children) => children.iter().any(|c| c.matches_result_row(br, row)),
            Filter::Not(child) => !child.matches_result_row(br, row),
            Filter::Stream(_) => true,
            Filter::Phrase(f) => match_phrase(br.column_value_at(&f.field_name, row), &f.phrase),
            Filter::Prefix(f) => match_prefix(br.column_value_at(&f.field_name, row), &f.prefix),
            Filter::AnyCasePhrase(f) => match_any_case_phrase(
                br.column_value_at(&f.field_name, row),
                &f.phrase.to_lowercase(),
            ),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Filter::Or(children) => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
            Filter::Not(child) => write!(f, "!{child}"),
            Filter::Stream(inner) => write!(f, "{inner}"),
            Filter::Phrase(inner) => write!(f, "{inner}"),
            Filter::Prefix(inner) => write!(f, "{inner}"),
            Filter::AnyCasePhrase(inner) => write!(f, "{inner}"),
        }
    }
}

pub fn is_msg_field_name(field_name: &str) -> bool {
    field_name.is_empty() || field_name == "_msg"
}

pub fn quote_field_name_if_needed(field_name: &str) -> String {
    if is_msg_field_name(field_name) {
        return String::new();
    }
    format!("{}:", quote_token_if_needed(field_name))
}

pub fn quote_token_if_needed(token: &str) -> String {
    if !token.is_empty() && token.chars().all(|c| is_token_rune(c) || c == '.' || c == '-') {
        return token.to_string();
    }
    format!("{token:?}")
}
