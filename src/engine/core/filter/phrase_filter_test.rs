use crate::engine::core::block::bitmap::Bitmap;
use crate::engine::core::column::header::ColumnValueType;
use crate::engine::core::filter::phrase_filter::PhraseFilter;
use crate::test_helpers::factories::BlockSearchFactory;

fn live_rows(bm: &Bitmap) -> Vec<usize> {
    let mut rows = Vec::new();
    bm.for_each_set_bit_readonly(|i| rows.push(i));
    rows
}

#[test]
fn exact_integer_match() {
    let bs = BlockSearchFactory::new(4)
        .with_uint_column("code", ColumnValueType::Uint32, &[200, 404, 200, 500])
        .create();
    let mut bm = Bitmap::new(4);
    PhraseFilter::new("code", "404").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1]);
}

#[test]
fn integer_phrase_above_max_clears_all() {
    let bs = BlockSearchFactory::new(2)
        .with_uint_column("code", ColumnValueType::Uint8, &[1, 2])
        .create();
    let mut bm = Bitmap::new(2);
    PhraseFilter::new("code", "300").apply(&bs, &mut bm);
    assert!(bm.is_zero());

    let mut bm = Bitmap::new(2);
    PhraseFilter::new("code", "not-a-number").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn tokenised_phrase_on_string_column() {
    let bs = BlockSearchFactory::new(3)
        .with_string_column("msg", &["error: disk full", "disk-ok", "disk full today"])
        .create();
    let mut bm = Bitmap::new(3);
    PhraseFilter::new("msg", "disk full").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0, 2]);
}

#[test]
fn phrase_on_dict_column() {
    let bs = BlockSearchFactory::new(5)
        .with_dict_column("level", &["info", "warn", "warning", "error"], &[0, 1, 2, 3, 1])
        .create();
    let mut bm = Bitmap::new(5);
    PhraseFilter::new("level", "warn").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1, 4]);
}

#[test]
fn ipv4_partial_phrase() {
    let bs = BlockSearchFactory::new(3)
        .with_ipv4_column(
            "src",
            &[[10, 0, 0, 1], [192, 168, 1, 23], [10, 1, 23, 4]],
        )
        .create();
    let mut bm = Bitmap::new(3);
    PhraseFilter::new("src", "1.23").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1, 2]);
}

#[test]
fn ipv4_full_address_is_exact() {
    let bs = BlockSearchFactory::new(2)
        .with_ipv4_column("src", &[[10, 0, 0, 1], [10, 0, 0, 11]])
        .create();
    let mut bm = Bitmap::new(2);
    PhraseFilter::new("src", "10.0.0.1").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0]);
}

#[test]
fn timestamp_full_value_is_exact() {
    let nanos = 1_714_567_890_123_456_789i64;
    let bs = BlockSearchFactory::new(2)
        .with_timestamp_column("_time", &[nanos, nanos + 1])
        .create();
    let mut bm = Bitmap::new(2);
    let needle = {
        let mut buf = String::new();
        crate::engine::core::column::render::to_timestamp_iso8601_string(
            &mut buf,
            &nanos.to_be_bytes(),
            "part",
        )
        .to_string()
    };
    PhraseFilter::new("_time", &needle).apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0]);
}

#[test]
fn timestamp_partial_phrase_scans_rendered_form() {
    let bs = BlockSearchFactory::new(2)
        .with_timestamp_column("_time", &[0, 86_400_000_000_000])
        .create();
    // Renders as 1970-01-01T00:00:00.000000000Z / 1970-01-02T00:00:00.000000000Z
    let mut bm = Bitmap::new(2);
    PhraseFilter::new("_time", "02T00").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![1]);
}

#[test]
fn float_phrase_with_interior_dot_is_exact() {
    let bs = BlockSearchFactory::new(3)
        .with_float64_column("lat", &[12.5, 12.55, -12.5])
        .create();
    let mut bm = Bitmap::new(3);
    PhraseFilter::new("lat", "12.5").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0]);
}

#[test]
fn float_partial_phrase_scans_rendered_form() {
    let bs = BlockSearchFactory::new(3)
        .with_float64_column("lat", &[123.0, 123.456, -0.123])
        .create();
    // `123` must match `123`, `123.456` and `-0.123`.
    let mut bm = Bitmap::new(3);
    PhraseFilter::new("lat", "123").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0, 1, 2]);
}

#[test]
fn float_garbage_phrase_clears_all() {
    let bs = BlockSearchFactory::new(1)
        .with_float64_column("lat", &[1.0])
        .create();
    let mut bm = Bitmap::new(1);
    PhraseFilter::new("lat", "abc").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn const_column_equivalence() {
    let bs = BlockSearchFactory::new(3)
        .with_const_column("host", "web-1")
        .create();

    let mut bm = Bitmap::new(3);
    PhraseFilter::new("host", "web-1").apply(&bs, &mut bm);
    assert_eq!(bm.ones_count(), 3);

    let mut bm = Bitmap::new(3);
    PhraseFilter::new("host", "web-2").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn absent_column_clears_all_bits() {
    let bs = BlockSearchFactory::new(2)
        .with_string_column("msg", &["a", "b"])
        .create();

    let mut bm = Bitmap::new(2);
    PhraseFilter::new("nope", "a").apply(&bs, &mut bm);
    assert!(bm.is_zero());

    let mut bm = Bitmap::new(2);
    PhraseFilter::new("nope", "").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn empty_phrase_matches_only_empty_cells() {
    let bs = BlockSearchFactory::new(3)
        .with_string_column("msg", &["", "x", ""])
        .create();
    let mut bm = Bitmap::new(3);
    PhraseFilter::new("msg", "").apply(&bs, &mut bm);
    assert_eq!(live_rows(&bm), vec![0, 2]);
}

#[test]
fn bloom_rejects_before_row_visitation() {
    // Soundness: a token absent from the column's token filter clears the
    // whole block.
    let bs = BlockSearchFactory::new(2)
        .with_string_column("msg", &["disk full", "disk ok"])
        .create();
    let mut bm = Bitmap::new(2);
    PhraseFilter::new("msg", "quota exceeded").apply(&bs, &mut bm);
    assert!(bm.is_zero());
}

#[test]
fn filters_never_set_bits() {
    let bs = BlockSearchFactory::new(4)
        .with_string_column("msg", &["a", "b", "a", "b"])
        .create();
    let mut bm = Bitmap::new(4);
    bm.clear_bit(0);
    PhraseFilter::new("msg", "a").apply(&bs, &mut bm);
    // Row 0 matches the phrase but was already cleared upstream.
    assert_eq!(live_rows(&bm), vec![2]);
}
