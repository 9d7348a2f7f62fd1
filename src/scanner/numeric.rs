//! ASCII-to-number scanners.
//!
//! Both scanners are total: they never fail, they stop at the first byte
//! they do not understand and return whatever accumulated up to that point.
//! Callers depend on this truncate-don't-fail behavior for malformed but
//! tolerable input, so it must not be tightened into strict parsing.

/// Scan an unsigned decimal integer from a byte range.
///
/// Accumulates digits left-to-right (wrapping on overflow) and stops
/// silently at the first non-digit. An empty range yields `None`; a range
/// starting with a non-digit yields `Some(0)`.
pub fn scan_int(bytes: &[u8]) -> Option<i32> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: i32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add(i32::from(b - b'0'));
    }
    Some(value)
}

/// Scan an unsigned decimal number with an optional fractional part.
///
/// Digits before and after a `.` accumulate into a single value scaled by
/// the number of fractional digits. There is no sign handling: negative
/// values cannot be represented. Stops silently at the first byte that is
/// neither a digit nor `.`. An empty range yields `None`.
pub fn scan_float(bytes: &[u8]) -> Option<f32> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: f32 = 0.0;
    let mut divider: f32 = 1.0;
    let mut fractional = false;
    for &b in bytes {
        if b == b'.' {
            fractional = true;
        } else if b.is_ascii_digit() {
            value = value * 10.0 + f32::from(b - b'0');
            if fractional {
                divider *= 10.0;
            }
        } else {
            break;
        }
    }
    Some(value / divider)
}

/// [`scan_int`] with the legacy `-1` sentinel for an empty range.
///
/// The sentinel is indistinguishable from a legitimately scanned `-1`
/// (which the digit rules cannot actually produce); prefer [`scan_int`]
/// unless byte-compatible legacy output is required.
pub fn scan_int_or_sentinel(bytes: &[u8]) -> i32 {
    scan_int(bytes).unwrap_or(-1)
}

/// [`scan_float`] with the legacy `-1.0` sentinel for an empty range.
pub fn scan_float_or_sentinel(bytes: &[u8]) -> f32 {
    scan_float(bytes).unwrap_or(-1.0)
}
