use crate::engine::core::column::header::ColumnValueType;
use crate::test_helpers::factories::BlockSearchFactory;

#[test]
fn const_column_lookup() {
    let bs = BlockSearchFactory::new(3)
        .with_const_column("host", "web-1")
        .create();
    assert_eq!(bs.get_const_column_value("host"), "web-1");
    assert_eq!(bs.get_const_column_value("missing"), "");
}

#[test]
fn header_lookup_and_cells() {
    let bs = BlockSearchFactory::new(4)
        .with_uint_column("code", ColumnValueType::Uint32, &[200, 404, 200, 500])
        .create();
    let ch = bs.get_column_header("code").expect("header");
    assert_eq!(ch.value_type, ColumnValueType::Uint32);
    assert_eq!(ch.min_value, 200);
    assert_eq!(ch.max_value, 500);
    let cells = bs.get_values_for_column(ch);
    assert_eq!(cells.len(), 4);
    assert_eq!(cells[1], 404u32.to_le_bytes().to_vec());
}

#[test]
fn token_filter_reflects_column_tokens() {
    let bs = BlockSearchFactory::new(2)
        .with_string_column("msg", &["error: disk full", "disk-ok"])
        .create();
    let ch = bs.get_column_header("msg").unwrap();
    let tf = bs.get_token_filter_for_column(ch).expect("token filter");
    assert!(tf.contains("disk"));
    assert!(tf.contains("full"));
    assert!(!tf.contains("quota"));
}
