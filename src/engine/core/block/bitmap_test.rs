use crate::engine::core::block::bitmap::Bitmap;

#[test]
fn new_bitmap_has_all_bits_set() {
    let bm = Bitmap::new(70);
    assert_eq!(bm.len(), 70);
    assert_eq!(bm.ones_count(), 70);
    assert!(bm.is_set_bit(0));
    assert!(bm.is_set_bit(69));
    assert!(!bm.is_zero());
}

#[test]
fn reset_clears_everything() {
    let mut bm = Bitmap::new(5);
    bm.reset_bits();
    assert!(bm.is_zero());
    assert_eq!(bm.ones_count(), 0);
}

#[test]
fn for_each_set_bit_clears_on_false() {
    let mut bm = Bitmap::new(8);
    bm.for_each_set_bit(|i| i % 2 == 0);
    assert_eq!(bm.ones_count(), 4);
    assert!(bm.is_set_bit(0));
    assert!(!bm.is_set_bit(1));
    assert!(bm.is_set_bit(6));

    // A second pass only sees surviving bits.
    let mut visited = Vec::new();
    bm.for_each_set_bit(|i| {
        visited.push(i);
        true
    });
    assert_eq!(visited, vec![0, 2, 4, 6]);
}

#[test]
fn narrowing_is_monotone() {
    let mut bm = Bitmap::new(130);
    bm.for_each_set_bit(|i| i < 100);
    let after_first = bm.ones_count();
    bm.for_each_set_bit(|i| i >= 50);
    assert!(bm.ones_count() <= after_first);
    assert_eq!(bm.ones_count(), 50);
}

#[test]
fn boolean_combinations() {
    let mut a = Bitmap::new(10);
    a.for_each_set_bit(|i| i < 6);
    let mut b = Bitmap::new(10);
    b.for_each_set_bit(|i| i >= 4);

    let mut and = a.clone();
    and.and(&b);
    assert_eq!(and.ones_count(), 2);
    assert!(and.is_set_bit(4) && and.is_set_bit(5));

    let mut or = a.clone();
    or.or(&b);
    assert_eq!(or.ones_count(), 10);

    let mut not = a.clone();
    not.and_not(&b);
    assert_eq!(not.ones_count(), 4);
    assert!(not.is_set_bit(0) && !not.is_set_bit(4));
}

#[test]
fn tail_bits_beyond_len_stay_clear() {
    let bm = Bitmap::new(3);
    let mut seen = Vec::new();
    bm.for_each_set_bit_readonly(|i| seen.push(i));
    assert_eq!(seen, vec![0, 1, 2]);
}
