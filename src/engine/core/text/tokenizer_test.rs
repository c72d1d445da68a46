use crate::engine::core::text::tokenizer::{is_token_rune, tokenize, tokenize_skip_last};

#[test]
fn token_runes_are_letters_digits_underscore() {
    assert!(is_token_rune('a'));
    assert!(is_token_rune('Z'));
    assert!(is_token_rune('7'));
    assert!(is_token_rune('_'));
    assert!(is_token_rune('é'));
    assert!(is_token_rune('д'));
    assert!(!is_token_rune('-'));
    assert!(!is_token_rune('.'));
    assert!(!is_token_rune(' '));
}

#[test]
fn tokenize_splits_on_non_token_runs() {
    assert_eq!(tokenize("error: disk full"), vec!["error", "disk", "full"]);
    assert_eq!(tokenize("foo--bar__baz"), vec!["foo", "bar__baz"]);
    assert_eq!(tokenize(""), Vec::<String>::new());
    assert_eq!(tokenize("..,,.."), Vec::<String>::new());
}

#[test]
fn tokenize_deduplicates_in_first_seen_order() {
    assert_eq!(tokenize("a b a c b"), vec!["a", "b", "c"]);
}

#[test]
fn tokenize_skip_last_trims_trailing_word() {
    assert_eq!(tokenize_skip_last("foo:abc"), vec!["foo"]);
    assert_eq!(tokenize_skip_last("foo bar"), vec!["foo"]);
    assert_eq!(tokenize_skip_last("abc"), Vec::<String>::new());
    // Trailing delimiter keeps every token.
    assert_eq!(tokenize_skip_last("foo bar "), vec!["foo", "bar"]);
}

#[test]
fn tokenize_skip_last_handles_unicode_tail() {
    assert_eq!(tokenize_skip_last("naïve café"), vec!["naïve"]);
}
