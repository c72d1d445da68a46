use rustc_hash::FxHasher;
use std::hash::Hasher;

/// 64-bit hash of a token, stable across processes and runs.
///
/// Token filters are built when a part is written and probed at query time,
/// potentially by a different process. `contains_all` may only short-circuit
/// a block when a probe misses, so both sides must key the hasher
/// identically; a randomly seeded hasher would turn every probe into a miss
/// and reject blocks that do match.
pub fn stable_hash64(token: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(token.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::stable_hash64;

    #[test]
    fn equal_tokens_hash_equal_across_calls() {
        assert_eq!(stable_hash64("disk"), stable_hash64("disk"));
        assert_ne!(stable_hash64("disk"), stable_hash64("full"));
    }

    #[test]
    fn hash_covers_the_whole_token() {
        // Shared prefixes must not collide trivially.
        assert_ne!(stable_hash64("warn"), stable_hash64("warning"));
    }
}
