//! Piecewise-linear sigmoid coefficients
//!
//! Each segment between two breakpoints is stored as `y = slope * x +
//! intercept`. Coefficients are rendered as BF16 bits and as unsigned 3.7
//! fixed-point bits for hardware initialisation.

use actlut_bf16::Bf16;
use actlut_fixed_point::Fixed;
use serde::{Deserialize, Serialize};

use crate::error::{LutError, Result};

/// Eight segments of equal height between `sigmoid(0)` and `sigmoid(4)`
pub const EQUAL_Y_BREAKPOINTS: [(f64, f64); 9] = [
    (0.0, 0.500000),
    (0.242184, 0.560252),
    (0.491686, 0.620503),
    (0.757244, 0.680755),
    (1.051208, 0.741007),
    (1.394179, 0.801259),
    (1.827891, 0.861510),
    (2.466533, 0.921762),
    (4.0, 0.982014),
];

/// [`EQUAL_Y_BREAKPOINTS`] with x snapped to BF16 and y re-evaluated there
pub const EQUAL_Y_BF16_BREAKPOINTS: [(f64, f64); 9] = [
    (0.0, 0.500000),
    (0.242188, 0.560253),
    (0.492188, 0.620622),
    (0.757812, 0.680879),
    (1.054688, 0.741674),
    (1.390625, 0.800692),
    (1.828125, 0.861538),
    (2.468750, 0.921922),
    (4.0, 0.982014),
];

/// Two unit-width segments on `[4, 6]`
pub const EQUAL_X_BREAKPOINTS: [(f64, f64); 3] = [(4.0, 0.982014), (5.0, 0.993307), (6.0, 0.997527)];

/// Integer bits of the coefficient fixed-point rendering
pub const COEFFICIENT_INT_BITS: u8 = 3;

/// Fraction bits of the coefficient fixed-point rendering
pub const COEFFICIENT_FRAC_BITS: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PwlSegment {
    pub start: f64,
    pub end: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl PwlSegment {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }
}

/// Slope and intercept of every segment between consecutive breakpoints
pub fn segments(breakpoints: &[(f64, f64)]) -> Result<Vec<PwlSegment>> {
    if breakpoints.len() < 2 {
        return Err(LutError::InvalidConfig(format!(
            "need at least 2 breakpoints, got {}",
            breakpoints.len()
        )));
    }
    breakpoints
        .windows(2)
        .map(|pair| {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if !(x1 > x0) {
                return Err(LutError::InvalidConfig(format!(
                    "breakpoints must be strictly increasing in x ({} then {})",
                    x0, x1
                )));
            }
            let slope = (y1 - y0) / (x1 - x0);
            Ok(PwlSegment {
                start: x0,
                end: x1,
                slope,
                intercept: y0 - slope * x0,
            })
        })
        .collect()
}

/// Evaluate the first segment covering `x`
pub fn evaluate(segments: &[PwlSegment], x: f64) -> Option<f64> {
    segments
        .iter()
        .find(|s| s.contains(x))
        .map(|s| s.evaluate(x))
}

/// A coefficient in every format the hardware consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRendering {
    pub value: f64,
    pub bf16: Bf16,
    /// Truncated 3.7 fixed-point bits, `iii_fffffff`
    pub fixed_bits: String,
    pub decoded: f32,
}

pub fn render_value(value: f64) -> Result<CoefficientRendering> {
    let bf16 = Bf16::from_f32(value as f32);
    let fixed = Fixed::from_f64_trunc(value, COEFFICIENT_FRAC_BITS)?;
    Ok(CoefficientRendering {
        value,
        bf16,
        fixed_bits: fixed.unsigned_bits(COEFFICIENT_INT_BITS),
        decoded: bf16.to_f32(),
    })
}

impl CoefficientRendering {
    /// `(value, ordinal, bf16Bits, fixedBits, decoded)`
    pub fn row(&self, ordinal: usize) -> String {
        format!(
            "({:.6}, {}, {}, {}, {:.6})",
            self.value, ordinal, self.bf16, self.fixed_bits, self.decoded
        )
    }
}
