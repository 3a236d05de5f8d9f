//! Unit-in-last-place per BF16 exponent segment

/// Retained mantissa bits
pub const MANTISSA_BITS: i32 = 7;

/// Smallest normal exponent
const MIN_EXPONENT: i32 = -126;

/// One same-exponent segment `[2^e, 2^(e+1))` and its spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UlpSegment {
    pub exponent: i32,
    pub ulp: f64,
}

/// ULPs of every normal segment from `2^-126` up to (excluding) `2^max_exponent`.
pub fn segment_ulps(max_exponent: i32) -> Vec<UlpSegment> {
    (MIN_EXPONENT..max_exponent)
        .map(|exponent| UlpSegment {
            exponent,
            ulp: 2f64.powi(exponent - MANTISSA_BITS),
        })
        .collect()
}

/// Unweighted mean over segments; narrow segments count as much as wide ones.
pub fn average_ulp(segments: &[UlpSegment]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }
    segments.iter().map(|s| s.ulp).sum::<f64>() / segments.len() as f64
}
