//! Filename character validation.

/// Inclusive ASCII ranges a filename may use: `!`, `#`..`)`, `-`..`9`,
/// `A`..`Z`, `a`..`z`.
const ALLOWED: [(u8, u8); 5] = [
    (b'!', b'!'),
    (b'#', b')'),
    (b'-', b'9'),
    (b'A', b'Z'),
    (b'a', b'z'),
];

/// True when every byte of `name` falls in an allowed range.
///
/// The empty string passes.
pub fn check_allowed_characters(name: &str) -> bool {
    name.bytes()
        .all(|b| ALLOWED.iter().any(|&(lo, hi)| (lo..=hi).contains(&b)))
}
