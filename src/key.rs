//! Runtime key helpers called by generated finders.
//!
//! A finder first switches on [`lead_key`], the arity and packed value of
//! the first `min(len, 4)` bytes:
//!
//! ```text
//! "br"         → (2, 0x0000_7262)
//! "body"       → (4, 0x7964_6f62)
//! "blockquote" → (4, 0x636f_6c62)   then suffix "kquote"
//! ```
//!
//! Byte `i` lands in bits `[8 * i, 8 * i + 8)`. These functions mirror
//! `html_lookup_build::key` bit for bit; the generator computes constants
//! with one and the generated code compares against them with the other.

/// Number of leading bytes that form the lead key.
pub const LEAD_BYTES: usize = 4;

/// ASCII-fold `byte` when `fold_case` is set.
#[inline]
pub const fn fold(byte: u8, fold_case: bool) -> u8 {
    if fold_case {
        byte.to_ascii_lowercase()
    } else {
        byte
    }
}

/// Pack the first `count` bytes of `bytes` into a little-endian `u32`.
///
/// # Panics
///
/// Panics if `count > 4` or `count > bytes.len()`.
#[inline]
pub const fn pack(bytes: &[u8], count: usize, fold_case: bool) -> u32 {
    assert!(count <= LEAD_BYTES);
    let mut key = 0u32;
    let mut i = 0;
    while i < count {
        key |= (fold(bytes[i], fold_case) as u32) << (8 * i);
        i += 1;
    }
    key
}

/// Arity and packed key of the first `min(len, 4)` bytes of `name`.
#[inline]
pub const fn lead_key(name: &[u8], fold_case: bool) -> (usize, u32) {
    let arity = if name.len() < LEAD_BYTES {
        name.len()
    } else {
        LEAD_BYTES
    };
    (arity, pack(name, arity, fold_case))
}

/// Compare the bytes after the lead key with a stored suffix.
///
/// `expected` is stored already folded for case-insensitive tables, so only
/// `rest` needs folding.
#[inline]
pub const fn suffix_eq(rest: &[u8], expected: &[u8], fold_case: bool) -> bool {
    if rest.len() != expected.len() {
        return false;
    }
    let mut i = 0;
    while i < rest.len() {
        if fold(rest[i], fold_case) != expected[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_is_little_endian() {
        assert_eq!(pack(b"a", 1, false), 0x61);
        assert_eq!(pack(b"br", 2, false), 0x7262);
        assert_eq!(pack(b"body", 4, false), 0x7964_6f62);
    }

    #[test]
    fn pack_ignores_trailing_bytes() {
        assert_eq!(pack(b"bodyguard", 4, false), pack(b"body", 4, false));
        assert_eq!(pack(b"xyz", 0, false), 0);
    }

    #[test]
    fn folding_only_touches_ascii_letters() {
        assert_eq!(pack(b"BR", 2, true), pack(b"br", 2, false));
        assert_ne!(pack(b"BR", 2, false), pack(b"br", 2, false));
        assert_eq!(fold(b'-', true), b'-');
        assert_eq!(fold(0xC9, true), 0xC9);
    }

    #[test]
    fn lead_key_arity() {
        assert_eq!(lead_key(b"", false), (0, 0));
        assert_eq!(lead_key(b"a", false), (1, 0x61));
        assert_eq!(lead_key(b"blockquote", false), (4, 0x636f_6c62));
        // Same packed value, different arity.
        assert_ne!(lead_key(b"a\0", false), lead_key(b"a", false));
    }

    #[test]
    fn lead_key_is_usable_in_const() {
        const BR: (usize, u32) = lead_key(b"br", false);
        assert_eq!(BR, (2, 0x7262));
    }

    #[test]
    fn suffix_comparison() {
        assert!(suffix_eq(b"kquote", b"kquote", false));
        assert!(suffix_eq(b"KQuote", b"kquote", true));
        assert!(!suffix_eq(b"KQuote", b"kquote", false));
        assert!(!suffix_eq(b"kquot", b"kquote", true));
        assert!(suffix_eq(b"", b"", false));
    }

    #[test]
    fn matches_build_side_packing() {
        for name in [&b"a"[..], b"br", b"body", b"Blockquote", b"mbp:pagebreak", b""] {
            for fold_case in [false, true] {
                assert_eq!(
                    lead_key(name, fold_case),
                    html_lookup_build::key::lead_key(name, fold_case)
                );
            }
        }
    }
}
