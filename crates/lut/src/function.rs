//! Target activation functions

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LutError;

/// The activation a table approximates.
///
/// `InverseSigmoid` is evaluated over sigmoid *outputs* `y` and yields the
/// input `x` with `sigmoid(x) = y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFunction {
    Silu,
    Tanh,
    Gelu,
    InverseSigmoid,
}

impl TargetFunction {
    pub const ALL: [TargetFunction; 4] = [
        TargetFunction::Silu,
        TargetFunction::Tanh,
        TargetFunction::Gelu,
        TargetFunction::InverseSigmoid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TargetFunction::Silu => "silu",
            TargetFunction::Tanh => "tanh",
            TargetFunction::Gelu => "gelu",
            TargetFunction::InverseSigmoid => "sigmoidInv",
        }
    }

    /// Evaluate at full f64 precision
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            TargetFunction::Silu => x / (1.0 + (-x).exp()),
            TargetFunction::Tanh => x.tanh(),
            TargetFunction::Gelu => x * 0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2)),
            TargetFunction::InverseSigmoid => -(1.0 / x - 1.0).ln(),
        }
    }

    /// Whether the table is indexed by the fixed-point input grid
    pub fn is_grid_indexed(&self) -> bool {
        !matches!(self, TargetFunction::InverseSigmoid)
    }
}

impl std::fmt::Display for TargetFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetFunction {
    type Err = LutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silu" | "swish" => Ok(TargetFunction::Silu),
            "tanh" | "dyt" => Ok(TargetFunction::Tanh),
            "gelu" => Ok(TargetFunction::Gelu),
            "sigmoidinv" | "sigmoid-inv" | "inverse-sigmoid" | "inverse_sigmoid" => {
                Ok(TargetFunction::InverseSigmoid)
            }
            _ => Err(LutError::UnknownFunction(s.to_string())),
        }
    }
}

/// Round to `digits` decimal places.
///
/// Goes through the exact decimal expansion so the result is the f64
/// nearest to the correctly rounded decimal, not `(x * 10^d).round() / 10^d`.
pub fn round_decimal(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_points() {
        assert_eq!(TargetFunction::Silu.evaluate(0.0), 0.0);
        assert_eq!(TargetFunction::Tanh.evaluate(0.0), 0.0);
        assert_eq!(TargetFunction::Gelu.evaluate(0.0), 0.0);
        assert_eq!(TargetFunction::InverseSigmoid.evaluate(0.5), 0.0);
    }

    #[test]
    fn test_known_values() {
        let silu = TargetFunction::Silu.evaluate(1.0);
        assert!((silu - 0.7310585786300049).abs() < 1e-15);

        let gelu = TargetFunction::Gelu.evaluate(1.0);
        assert!((gelu - 0.8413447460685429).abs() < 1e-12);

        let gelu_neg = TargetFunction::Gelu.evaluate(-1.0);
        assert!((gelu_neg + 0.15865525393145707).abs() < 1e-12);

        let inv = TargetFunction::InverseSigmoid.evaluate(63.0 / 64.0);
        assert!((inv - 63f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_sigmoid_inverts_sigmoid() {
        for &x in &[0.1f64, 0.75, 2.0, 3.5] {
            let y = 1.0 / (1.0 + (-x).exp());
            let back = TargetFunction::InverseSigmoid.evaluate(y);
            assert!((back - x).abs() < 1e-9, "x={} back={}", x, back);
        }
    }

    #[test]
    fn test_parse_names() {
        for f in TargetFunction::ALL {
            assert_eq!(f.name().parse::<TargetFunction>().unwrap(), f);
        }
        assert_eq!("DyT".parse::<TargetFunction>().unwrap(), TargetFunction::Tanh);
        assert!(matches!(
            "relu".parse::<TargetFunction>(),
            Err(LutError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_round_decimal() {
        assert_eq!(round_decimal(0.7310585786300049, 6), 0.731059);
        assert_eq!(round_decimal(-0.0753, 2), -0.08);
        assert_eq!(round_decimal(63f64.ln(), 7), 4.1431347);
        assert_eq!(round_decimal(0.0, 6), 0.0);
        assert!(round_decimal(f64::NAN, 3).is_nan());
    }
}
