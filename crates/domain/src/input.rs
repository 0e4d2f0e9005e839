//! Lenient coercion of operator-typed numbers.
//!
//! Text that does not parse as a finite number reads as zero instead of
//! being rejected.

/// Parse a threshold or force value; anything unreadable becomes `0.0`.
#[must_use]
pub fn parse_lenient_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse a pulse interval in milliseconds.
///
/// Fractions are truncated toward zero and negative values floor at `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_lenient_pulse(text: &str) -> u32 {
    let value = parse_lenient_number(text).trunc();
    if value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
