use crate::engine::core::text::tokenizer::is_token_rune;
use crate::shared::pool::with_scratch;

/// Returns true iff `phrase` occurs in `s` with non-token runes (or string
/// edges) on both sides. An empty phrase matches only the empty string.
pub fn match_phrase(s: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return s.is_empty();
    }
    phrase_pos(s, phrase).is_some()
}

fn phrase_pos(s: &str, phrase: &str) -> Option<usize> {
    if phrase.is_empty() {
        return Some(0);
    }
    if phrase.len() > s.len() {
        return None;
    }

    let starts_with_token = phrase.chars().next().map(is_token_rune).unwrap_or(false);
    let ends_with_token = phrase.chars().next_back().map(is_token_rune).unwrap_or(false);

    let mut pos = 0;
    loop {
        let n = s[pos..].find(phrase)?;
        pos += n;
        // The candidate must carry non-token runes at both edges. A failed
        // boundary restarts the scan one position later, not after the
        // candidate, so shorter matches inside longer runs are not skipped.
        if starts_with_token && pos > 0 {
            let prev = s[..pos].chars().next_back();
            if prev.map(is_token_rune).unwrap_or(false) {
                pos = next_char_boundary(s, pos + 1);
                continue;
            }
        }
        let end = pos + phrase.len();
        if ends_with_token && end < s.len() {
            let next = s[end..].chars().next();
            if next.map(is_token_rune).unwrap_or(false) {
                pos = next_char_boundary(s, pos + 1);
                continue;
            }
        }
        return Some(pos);
    }
}

/// Like `match_phrase`, but only the left boundary is enforced.
/// An empty prefix matches any non-empty `s`.
pub fn match_prefix(s: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return !s.is_empty();
    }
    if prefix.len() > s.len() {
        return false;
    }

    let starts_with_token = prefix.chars().next().map(is_token_rune).unwrap_or(false);

    let mut offset = 0;
    loop {
        let Some(n) = s[offset..].find(prefix) else {
            return false;
        };
        offset += n;
        if starts_with_token && offset > 0 {
            let prev = s[..offset].chars().next_back();
            if prev.map(is_token_rune).unwrap_or(false) {
                offset = next_char_boundary(s, offset + 1);
                continue;
            }
        }
        return true;
    }
}

/// Case-insensitive phrase match. `phrase_lowercase` must already be
/// lowercased by the caller.
pub fn match_any_case_phrase(s: &str, phrase_lowercase: &str) -> bool {
    if phrase_lowercase.is_empty() {
        return s.is_empty();
    }
    if phrase_lowercase.len() > s.len() {
        return false;
    }

    if is_ascii_lowercase(s) {
        // Fast path - s is already in lowercase.
        return match_phrase(s, phrase_lowercase);
    }

    // Slow path - lowercase s into a pooled scratch buffer before matching.
    with_scratch(|buf| {
        buf.clear();
        for c in s.chars() {
            buf.extend(c.to_lowercase());
        }
        match_phrase(buf, phrase_lowercase)
    })
}

pub fn is_ascii_lowercase(s: &str) -> bool {
    s.bytes().all(|b| b < 0x80 && !b.is_ascii_uppercase())
}

#[inline]
fn next_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
