//! # Primitives
//!
//! Hardcoded constants and the bucketing primitive.
//!
//! The key layout constants are shared with every store that has ever held
//! toggle state, so they must never change.

/// Namespace prefix of every key owned by a feature.
pub const KEY_PREFIX: &str = "feature";

/// Separator between key segments.
///
/// Feature names may not contain it, or the key-to-name inverse breaks.
pub const KEY_SEPARATOR: char = ':';

/// Suffix of the group membership set.
pub const GROUPS_SUFFIX: &str = "groups";

/// Suffix of the user membership set.
pub const USERS_SUFFIX: &str = "users";

/// Suffix of the percentage threshold scalar.
pub const PERCENTAGE_SUFFIX: &str = "percentage";

/// Name of the built-in group that matches everyone.
pub const ALL_GROUP: &str = "all";

/// Number of buckets identities are spread over.
pub const BUCKET_COUNT: u64 = 100;

/// Lower bound of a meaningful percentage threshold.
pub const MIN_PERCENTAGE: i64 = 0;

/// Upper bound of a meaningful percentage threshold.
pub const MAX_PERCENTAGE: i64 = 100;

/// Bucket of an identity.
#[must_use]
pub const fn bucket(id: u64) -> u64 {
    id % BUCKET_COUNT
}

/// Whether `id` falls inside a `threshold` percent rollout.
///
/// `id mod 100 < threshold`. Deterministic: exactly `threshold` identities
/// in every consecutive block of 100 are inside. Negative thresholds admit
/// nobody, thresholds above 100 admit everybody.
#[must_use]
pub const fn within_percentage(id: u64, threshold: i64) -> bool {
    (bucket(id) as i64) < threshold
}

/// Whether `threshold` is inside `[0, 100]`.
#[must_use]
pub const fn is_percentage_in_range(threshold: i64) -> bool {
    threshold >= MIN_PERCENTAGE && threshold <= MAX_PERCENTAGE
}

/// Leading integer of a stored threshold.
///
/// Leading whitespace is skipped, then an optional sign and a run of digits
/// (single underscores between digits allowed) are read; the rest is
/// ignored. No digits reads as 0. Overflow saturates. The flag is true only
/// when nothing but whitespace follows the digits.
#[must_use]
pub fn leading_integer(raw: &str) -> (i64, bool) {
    let bytes = raw.trim_start().as_bytes();
    let (negative, mut pos) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    let mut magnitude: i64 = 0;
    let mut digits = 0usize;
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'0'..=b'9' => {
                magnitude = magnitude
                    .saturating_mul(10)
                    .saturating_add(i64::from(b - b'0'));
                digits += 1;
            }
            b'_' if digits > 0 && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) => {}
            _ => break,
        }
        pos += 1;
    }

    let value = if negative { -magnitude } else { magnitude };
    let clean = digits > 0
        && bytes
            .get(pos..)
            .is_some_and(|rest| rest.iter().all(u8::is_ascii_whitespace));
    (value, clean)
}
