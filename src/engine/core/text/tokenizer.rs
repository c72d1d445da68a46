use ahash::AHashSet;

/// A token rune is what the engine considers part of a word:
/// a Unicode letter, a Unicode digit, or an underscore.
#[inline]
pub fn is_token_rune(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Splits `s` on maximal runs of non-token runes and returns the distinct
/// tokens in first-seen order. Tokens are what the per-column token filters
/// are queried with.
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut seen: AHashSet<&str> = AHashSet::new();
    for part in s.split(|c| !is_token_rune(c)) {
        if part.is_empty() {
            continue;
        }
        if seen.insert(part) {
            tokens.push(part.to_string());
        }
    }
    tokens
}

/// Tokenizes `s` after trimming any trailing token-rune run. A prefix needle
/// may end mid-word, so only the tokens strictly before the final
/// possibly-partial word can be required of a token filter.
pub fn tokenize_skip_last(s: &str) -> Vec<String> {
    let mut end = s.len();
    for (i, c) in s.char_indices().rev() {
        if !is_token_rune(c) {
            break;
        }
        end = i;
    }
    tokenize(&s[..end])
}
