//! Packed lookup keys.
//!
//! The first dispatch step of every generated finder switches on the first
//! `min(len, 4)` bytes of the input packed into a `u32`. Byte `i` lands in
//! bits `[8 * i, 8 * i + 8)`, so `"br"` packs to `0x0000_7262`.
//!
//! The runtime crate carries `const fn` twins of these helpers; both sides
//! must agree bit for bit.

/// Number of leading bytes that form the lead key.
pub const LEAD_BYTES: usize = 4;

/// Longest name whose suffix still fits a second packed key.
pub const PACKED_SUFFIX_MAX: usize = 2 * LEAD_BYTES;

/// Fold a single byte when `fold_case` is set (ASCII only).
#[inline]
pub fn fold(byte: u8, fold_case: bool) -> u8 {
    if fold_case {
        byte.to_ascii_lowercase()
    } else {
        byte
    }
}

/// Pack the first `count` bytes of `bytes` into a `u32`.
///
/// # Panics
///
/// Panics if `count > 4` or `count > bytes.len()`.
pub fn pack(bytes: &[u8], count: usize, fold_case: bool) -> u32 {
    assert!(count <= LEAD_BYTES, "cannot pack {count} bytes into a u32 key");
    bytes[..count]
        .iter()
        .enumerate()
        .fold(0u32, |key, (i, &b)| key | (u32::from(fold(b, fold_case)) << (8 * i)))
}

/// Arity and packed key of the first `min(len, 4)` bytes of `name`.
///
/// The arity partitions the key space: `(2, k)` and `(4, k)` never match
/// each other even when `k` is equal. An empty name yields `(0, 0)`.
pub fn lead_key(name: &[u8], fold_case: bool) -> (usize, u32) {
    let arity = name.len().min(LEAD_BYTES);
    (arity, pack(name, arity, fold_case))
}

/// Copy of `bytes` with case folding applied.
pub fn folded(bytes: &[u8], fold_case: bool) -> Vec<u8> {
    bytes.iter().map(|&b| fold(b, fold_case)).collect()
}
