//! Bijective base-26 short-name enumeration.
//!
//! Index `0` is `"a"`, `25` is `"z"`, `26` is `"aa"`, `701` is `"zz"` and
//! `702` is `"aaa"`. Every index maps to exactly one lowercase string and
//! every lowercase string decodes back to exactly one index, so a persisted
//! name can always be turned back into its rank in the sequence.

use serde::{Deserialize, Serialize};

const ALPHABET_LEN: u128 = 26;

/// Produce the short name at position `index` of the enumeration.
///
/// Pure and total: the same index yields the same name on every call.
pub fn generate_name(index: u64) -> String {
    // Shift to 1-based so there is no zero digit.
    let mut n = u128::from(index) + 1;
    let mut digits = Vec::with_capacity(4);

    while n > 0 {
        n -= 1;
        digits.push(b'a' + (n % ALPHABET_LEN) as u8);
        n /= ALPHABET_LEN;
    }

    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Decode a short name back into its rank.
///
/// Returns `None` for the empty string, for any character outside `a..=z`,
/// and for names whose rank does not fit in a `u64`.
pub fn decode_name(name: &str) -> Option<u64> {
    if name.is_empty() {
        return None;
    }

    let mut value: u128 = 0;
    for byte in name.bytes() {
        if !byte.is_ascii_lowercase() {
            return None;
        }
        let digit = u128::from(byte - b'a') + 1;
        value = value.checked_mul(ALPHABET_LEN)?.checked_add(digit)?;
    }

    u64::try_from(value - 1).ok()
}

/// Whether `name` is a syntactically valid short name.
pub fn is_short_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase())
}

/// Monotonic allocator cursor: the next index to try.
///
/// Once index `u64::MAX` has been handed out the cursor is exhausted and
/// draws return `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCursor {
    next: u64,
    #[serde(default)]
    exhausted: bool,
}

impl NameCursor {
    /// Cursor positioned at `next`
    pub fn starting_at(next: u64) -> Self {
        Self {
            next,
            exhausted: false,
        }
    }

    /// Index the next draw will use
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Whether every index has been handed out
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Take the current index and move past it
    pub fn advance(&mut self) -> Option<u64> {
        if self.exhausted {
            return None;
        }
        let index = self.next;
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Some(index)
    }

    /// Make sure the cursor sits beyond an already-used rank.
    pub fn observe(&mut self, rank: u64) {
        if self.exhausted || rank < self.next {
            return;
        }
        match rank.checked_add(1) {
            Some(next) => self.next = next,
            None => {
                self.next = rank;
                self.exhausted = true;
            }
        }
    }

    /// Draw the next name from the enumeration.
    pub fn next_name(&mut self) -> Option<String> {
        self.advance().map(generate_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_enumeration_boundaries() {
        assert_eq!(generate_name(0), "a");
        assert_eq!(generate_name(1), "b");
        assert_eq!(generate_name(25), "z");
        assert_eq!(generate_name(26), "aa");
        assert_eq!(generate_name(27), "ab");
        assert_eq!(generate_name(51), "az");
        assert_eq!(generate_name(52), "ba");
        assert_eq!(generate_name(701), "zz");
        assert_eq!(generate_name(702), "aaa");
    }

    #[test]
    fn test_generate_is_deterministic() {
        for index in [0, 17, 701, 702, 123_456] {
            assert_eq!(generate_name(index), generate_name(index));
        }
    }

    #[test]
    fn test_first_thousand_are_distinct() {
        let names: HashSet<String> = (0..1000).map(generate_name).collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn test_largest_index_is_total() {
        let name = generate_name(u64::MAX);
        assert!(is_short_name(&name));
        assert_eq!(decode_name(&name), Some(u64::MAX));
    }

    #[test]
    fn test_decode_known_names() {
        assert_eq!(decode_name("a"), Some(0));
        assert_eq!(decode_name("z"), Some(25));
        assert_eq!(decode_name("aa"), Some(26));
        assert_eq!(decode_name("zz"), Some(701));
        assert_eq!(decode_name("aaa"), Some(702));
    }

    #[test]
    fn test_decode_rejects_invalid_names() {
        assert_eq!(decode_name(""), None);
        assert_eq!(decode_name("A"), None);
        assert_eq!(decode_name("a1"), None);
        assert_eq!(decode_name("my_var"), None);
        assert_eq!(decode_name("é"), None);
    }

    #[test]
    fn test_decode_rejects_overflow() {
        let too_long = "z".repeat(40);
        assert_eq!(decode_name(&too_long), None);
    }

    #[test]
    fn test_cursor_observe_only_moves_forward() {
        let mut cursor = NameCursor::default();
        cursor.observe(4);
        assert_eq!(cursor.peek(), 5);
        cursor.observe(2);
        assert_eq!(cursor.peek(), 5);
        assert_eq!(cursor.next_name().as_deref(), Some("f"));
        assert_eq!(cursor.peek(), 6);
    }

    #[test]
    fn test_cursor_stops_after_last_index() {
        let mut cursor = NameCursor::starting_at(u64::MAX);
        assert_eq!(cursor.advance(), Some(u64::MAX));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.next_name(), None);

        let mut observed = NameCursor::default();
        observed.observe(u64::MAX);
        assert!(observed.is_exhausted());
        assert_eq!(observed.next_name(), None);
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_generate(index in 0u64..10_000_000) {
            prop_assert_eq!(decode_name(&generate_name(index)), Some(index));
        }

        #[test]
        fn prop_distinct_indices_give_distinct_names(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            prop_assume!(a != b);
            prop_assert_ne!(generate_name(a), generate_name(b));
        }

        #[test]
        fn prop_generated_names_are_lowercase(index in any::<u64>()) {
            prop_assert!(is_short_name(&generate_name(index)));
        }
    }
}
