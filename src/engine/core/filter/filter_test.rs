use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::filter::filter::Filter;
use crate::engine::core::filter::phrase_filter::PhraseFilter;
use crate::engine::core::filter::prefix_filter::PrefixFilter;
use crate::test_helpers::factories::{BlockSearchFactory, ResultBlockFactory};

fn live_rows(bm: &Bitmap) -> Vec<usize> {
    let mut rows = Vec::new();
    bm.for_each_set_bit_readonly(|i| rows.push(i));
    rows
}

fn phrase(field: &str, phrase: &str) -> Filter {
    Filter::Phrase(PhraseFilter::new(field, phrase))
}

#[test]
fn and_intersects_children() {
    let bs = BlockSearchFactory::new(4)
        .with_string_column("msg", &["disk full", "disk ok", "disk full", "cpu hot"])
        .with_string_column("lvl", &["error", "error", "info", "error"])
        .create();
    let f = Filter::And(vec![phrase("msg", "disk"), phrase("lvl", "error")]);
    let mut bm = Bitmap::new(4);
    f.apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0, 1]);
}

#[test]
fn or_unions_children_within_input() {
    let bs = BlockSearchFactory::new(4)
        .with_string_column("lvl", &["error", "warn", "info", "warn"])
        .create();
    let f = Filter::Or(vec![phrase("lvl", "error"), phrase("lvl", "warn")]);
    let mut bm = Bitmap::new(4);
    bm.clear_bit(3);
    f.apply(&bs, &mut bm);
    // Row 3 matches `warn` but was already cleared upstream.
    assert_eq!(live_rows(&bm), vec![0, 1]);
}

#[test]
fn not_inverts_within_input() {
    let bs = BlockSearchFactory::new(3)
        .with_string_column("lvl", &["error", "warn", "error"])
        .create();
    let f = Filter::Not(Box::new(phrase("lvl", "error")));
    let mut bm = Bitmap::new(3);
    f.apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1]);
}

#[test]
fn composite_application_is_monotone() {
    let bs = BlockSearchFactory::new(8)
        .with_string_column(
            "msg",
            &["a", "b", "a", "b", "a", "b", "a", "b"],
        )
        .create();
    let f = Filter::Or(vec![
        phrase("msg", "a"),
        Filter::Not(Box::new(phrase("msg", "a"))),
    ]);
    let mut bm = Bitmap::new(8);
    bm.clear_bit(0);
    bm.clear_bit(5);
    let before = live_rows(&bm);
    f.apply(&bs, &mut bm);
    // The tautology keeps exactly the upstream survivors.
    assert_eq!(live_rows(&bm), before);
}

#[test]
fn and_short_circuits_on_zero() {
    let bs = BlockSearchFactory::new(2)
        .with_string_column("msg", &["a", "b"])
        .create();
    let f = Filter::And(vec![phrase("msg", "nope"), phrase("msg", "a")]);
    let mut bm = Bitmap::new(2);
    f.apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn matches_result_rows_for_if_clauses() {
    let br = ResultBlockFactory::new()
        .with_column("lvl", &["error", "warn"])
        .with_column("msg", &["disk full", "disk ok"])
        .create();
    let f = Filter::And(vec![
        phrase("lvl", "error"),
        Filter::Prefix(PrefixFilter::new("msg", "disk")),
    ]);
    assert!(f.matches_result_row(&br, 0));
    assert!(!f.matches_result_row(&br, 1));
}

#[test]
fn filter_display_reads_like_a_query() {
    let f = Filter::And(vec![
        phrase("lvl", "error"),
        Filter::Prefix(PrefixFilter::new("msg", "disk")),
    ]);
    assert_eq!(f.to_string(), "lvl:error msg:disk*");
    assert_eq!(phrase("_msg", "disk full").to_string(), "\"disk full\"");
}
