//! Invite codes for joining shared boards.

use chrono::Duration;

use crate::types::Timestamp;

/// Random bytes behind a code; rendered as twice as many hex digits.
const CODE_BYTES: usize = 6;

/// A fresh 12-character lowercase hex code.
pub fn generate_code() -> String {
    rand::random::<[u8; CODE_BYTES]>()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Expiry for an invite valid for `hours` from `now`. Zero or negative
/// means the invite never expires.
pub fn expiry_from_hours(now: Timestamp, hours: i64) -> Option<Timestamp> {
    (hours > 0).then(|| now + Duration::hours(hours))
}

/// Clamp a requested use limit. `0` means unlimited.
pub fn normalize_max_uses(requested: Option<i32>) -> i32 {
    requested.unwrap_or(0).max(0)
}

/// Whether an invite with these counters can still admit someone at `now`.
pub fn is_redeemable(
    expires_at: Option<Timestamp>,
    max_uses: i32,
    used_count: i32,
    now: Timestamp,
) -> bool {
    if expires_at.is_some_and(|exp| now > exp) {
        return false;
    }
    max_uses <= 0 || used_count < max_uses
}
