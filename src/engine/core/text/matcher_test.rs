use crate::engine::core::text::matcher::{
    is_ascii_lowercase, match_any_case_phrase, match_phrase, match_prefix,
};

#[test]
fn phrase_requires_both_boundaries() {
    assert!(match_phrase("foo-bar", "foo"));
    assert!(!match_phrase("foobar", "foo"));
    assert!(match_phrase("error: disk full", "disk full"));
    assert!(!match_phrase("disk-ok", "disk full"));
    assert!(match_phrase("disk full today", "disk full"));
}

#[test]
fn empty_phrase_matches_only_empty_string() {
    assert!(match_phrase("", ""));
    assert!(!match_phrase("x", ""));
}

#[test]
fn phrase_restarts_after_failed_boundary() {
    // The first "abc" occurrence fails the left boundary; a later one passes.
    assert!(match_phrase("xabc abc", "abc"));
    assert!(!match_phrase("xabcy", "abc"));
    assert!(match_phrase("x.abcy.abc", "abc"));
}

#[test]
fn phrase_edges_at_string_ends_are_boundaries() {
    assert!(match_phrase("abc", "abc"));
    assert!(match_phrase("abc def", "abc"));
    assert!(match_phrase("def abc", "abc"));
}

#[test]
fn phrase_with_non_token_edges_matches_inside_words() {
    // A needle that begins and ends with non-token runes needs no boundaries.
    assert!(match_phrase("a=b=c", "=b="));
}

#[test]
fn prefix_enforces_left_boundary_only() {
    assert!(match_prefix("foo-bar", "foo"));
    assert!(!match_prefix("xfoo", "foo"));
    assert!(match_prefix("warning", "war"));
    assert!(match_prefix("x.abcy", "abc"));
    assert!(!match_prefix("xabcy", "abc"));
}

#[test]
fn empty_prefix_matches_any_non_empty_value() {
    assert!(match_prefix("x", ""));
    assert!(!match_prefix("", ""));
}

#[test]
fn prefix_restart_finds_later_candidates() {
    assert!(match_prefix("xabc abcy", "abc"));
}

#[test]
fn unicode_boundaries_are_respected() {
    assert!(!match_phrase("наappend", "append"));
    assert!(match_phrase("на append", "append"));
    assert!(!match_prefix("наab", "ab"));
}

#[test]
fn ascii_lowercase_detection() {
    assert!(is_ascii_lowercase("abc-123"));
    assert!(!is_ascii_lowercase("aBc"));
    assert!(!is_ascii_lowercase("naïve"));
}

#[test]
fn any_case_phrase_fast_and_slow_paths_agree() {
    let cases = [
        ("Disk Full", "disk full", true),
        ("disk full", "disk full", true),
        ("DISK-FULL", "disk", true),
        ("diskfull", "disk", false),
        ("Naïve Plan", "naïve", true),
        ("ERROR: ДИСК", "диск", true),
    ];
    for (s, phrase, want) in cases {
        assert_eq!(
            match_any_case_phrase(s, phrase),
            want,
            "s={s:?} phrase={phrase:?}"
        );
        // The slow path must agree when forced through a mixed-case copy.
        let mixed = format!("\u{00C0} {s}");
        assert_eq!(
            match_any_case_phrase(&mixed, phrase),
            want,
            "mixed={mixed:?} phrase={phrase:?}"
        );
    }
}

#[test]
fn any_case_empty_phrase_matches_only_empty() {
    assert!(match_any_case_phrase("", ""));
    assert!(!match_any_case_phrase("x", ""));
}
