use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::core::filter::any_case_phrase_filter::AnyCasePhraseFilter;
use crate::test_helpers::factories::BlockSearchFactory;

fn live_rows(bm: &Bitmap) -> Vec<usize> {
    let mut rows = Vec::new();
    bm.for_each_set_bit_readonly(|i| rows.push(i));
    rows
}

#[test]
fn matches_regardless_of_case() {
    let bs = BlockSearchFactory::new(3)
        .with_string_column("msg", &["Disk Full", "disk full", "disk ok"])
        .create();
    let mut bm = Bitmap::new(3);
    AnyCasePhraseFilter::new("msg", "DISK FULL").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0, 1]);
}

#[test]
fn dict_columns_match_any_case() {
    let bs = BlockSearchFactory::new(4)
        .with_dict_column("level", &["INFO", "Warn", "warn", "error"], &[0, 1, 2, 3])
        .create();
    let mut bm = Bitmap::new(4);
    AnyCasePhraseFilter::new("level", "warn").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1, 2]);
}

#[test]
fn uint_columns_use_exact_value_semantics() {
    let bs = BlockSearchFactory::new(3)
        .with_uint_column("code", ColumnValueType::Uint32, &[200, 404, 500])
        .create();
    let mut bm = Bitmap::new(3);
    AnyCasePhraseFilter::new("code", "404").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1]);
}

#[test]
fn timestamp_needle_is_uppercased() {
    let nanos = 3_600_000_000_000i64;
    let bs = BlockSearchFactory::new(2)
        .with_timestamp_column("_time", &[nanos, nanos + 1])
        .create();
    // The canonical form uses uppercase T/Z; a lowercased query still hits
    // the exact-match fast path on this code path.
    let mut bm = Bitmap::new(2);
    AnyCasePhraseFilter::new("_time", "1970-01-01t01:00:00.000000000z").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0]);
}

#[test]
fn const_column_equivalence() {
    let bs = BlockSearchFactory::new(2)
        .with_const_column("host", "Web-1")
        .create();
    let mut bm = Bitmap::new(2);
    AnyCasePhraseFilter::new("host", "web-1").apply(&bs, &mut bm);
    assert_eq!(bm.ones_count(), 2);

    let mut bm = Bitmap::new(2);
    AnyCasePhraseFilter::new("host", "db-1").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn absent_column_clears_all() {
    let bs = BlockSearchFactory::new(1)
        .with_string_column("msg", &["x"])
        .create();
    let mut bm = Bitmap::new(1);
    AnyCasePhraseFilter::new("nope", "x").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}
