//! Mean squared error of LUT-backed piecewise approximations
//!
//! Inside the LUT domain the approximation is the decoded BF16 table value;
//! outside it falls back to the function's asymptote (`0`/`x` for SiLU and
//! GELU, `-1`/`+1` for tanh). The exact reference is the unrounded f64
//! evaluator.

use actlut_fixed_point::FixedPointDomain;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LutConfig;
use crate::error::{LutError, Result};
use crate::function::TargetFunction;
use crate::table::generate_table;

/// `(int_bits, frac_bits)` shapes compared by [`sweep`]
pub const STANDARD_SHAPES: [(u8, u8); 4] = [(2, 4), (2, 5), (3, 4), (3, 5)];

/// One MSE measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MseReport {
    pub function: TargetFunction,
    pub int_bits: u8,
    pub frac_bits: u8,
    pub test_min: f64,
    pub test_max: f64,
    pub samples: usize,
    pub mse: f64,
}

impl std::fmt::Display for MseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}.{} [{}, {}] samples={} mse={:.7}",
            self.function,
            self.int_bits,
            self.frac_bits,
            self.test_min,
            self.test_max,
            self.samples,
            self.mse
        )
    }
}

/// Value used below the LUT domain
fn lower_tail(function: TargetFunction) -> f64 {
    match function {
        TargetFunction::Tanh => -1.0,
        _ => 0.0,
    }
}

/// Value used at or above the LUT domain max
fn upper_tail(function: TargetFunction, x: f64) -> f64 {
    match function {
        TargetFunction::Tanh => 1.0,
        _ => x,
    }
}

/// Number of points in `test_min, test_min + step, ..., test_max`
fn sample_count(test_min: f64, test_max: f64, step: f64) -> Result<usize> {
    if !(test_min.is_finite() && test_max.is_finite()) || test_min > test_max {
        return Err(LutError::InvalidConfig(format!(
            "test range [{}, {}] is empty or not finite",
            test_min, test_max
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(LutError::InvalidConfig(format!(
            "test step must be positive, got {}",
            step
        )));
    }
    let spans = (test_max - test_min) / step;
    if spans.fract() != 0.0 {
        return Err(LutError::InvalidConfig(format!(
            "test range [{}, {}] is not a whole number of {} steps",
            test_min, test_max, step
        )));
    }
    Ok(spans as usize + 1)
}

/// MSE of the LUT-backed approximation of `function` over
/// `[test_min, test_max]`, sampled at the domain step.
///
/// `test_min` must lie on the domain's grid spacing so every in-domain
/// sample hits a table entry exactly.
pub fn piecewise_mse(
    function: TargetFunction,
    domain: FixedPointDomain,
    test_min: f64,
    test_max: f64,
) -> Result<MseReport> {
    if !function.is_grid_indexed() {
        return Err(LutError::InvalidConfig(format!(
            "{} has no piecewise approximation",
            function
        )));
    }
    let step = domain.step();
    let samples = sample_count(test_min, test_max, step)?;
    if (test_min / step).fract() != 0.0 {
        return Err(LutError::InvalidConfig(format!(
            "test_min {} is not aligned to the {} grid",
            test_min, domain
        )));
    }

    let table = generate_table(&LutConfig::new(function, domain))?;

    let mut sum = 0.0;
    for k in 0..samples {
        let x = test_min + k as f64 * step;
        let approx = if x < domain.min() {
            lower_tail(function)
        } else if x >= domain.max() {
            upper_tail(function, x)
        } else {
            let pos = domain.position_of(x).ok_or_else(|| {
                LutError::InvalidConfig(format!("{} is not on the {} grid", x, domain))
            })?;
            table.entries[pos].decoded as f64
        };
        let diff = function.evaluate(x) - approx;
        sum += diff * diff;
    }

    let report = MseReport {
        function,
        int_bits: domain.int_bits(),
        frac_bits: domain.frac_bits(),
        test_min,
        test_max,
        samples,
        mse: sum / samples as f64,
    };
    debug!(%report, "piecewise mse");
    Ok(report)
}

/// `x * relu6(x + 3) / 6`
pub fn hard_swish(x: f64) -> f64 {
    x * (x + 3.0).clamp(0.0, 6.0) / 6.0
}

/// MSE of hard-swish against exact SiLU over `[test_min, test_max]`
pub fn hard_swish_mse(test_min: f64, test_max: f64, step: f64) -> Result<f64> {
    let samples = sample_count(test_min, test_max, step)?;
    let sum: f64 = (0..samples)
        .map(|k| {
            let x = test_min + k as f64 * step;
            let diff = TargetFunction::Silu.evaluate(x) - hard_swish(x);
            diff * diff
        })
        .sum();
    Ok(sum / samples as f64)
}

/// [`piecewise_mse`] for every (function, shape) pair.
///
/// Pairs are independent and run in parallel; the result keeps the
/// function-major input order.
pub fn sweep(
    functions: &[TargetFunction],
    shapes: &[(u8, u8)],
    test_min: f64,
    test_max: f64,
) -> Result<Vec<MseReport>> {
    let pairs: Vec<(TargetFunction, (u8, u8))> = functions
        .iter()
        .flat_map(|&f| shapes.iter().map(move |&shape| (f, shape)))
        .collect();

    let reports = pairs
        .par_iter()
        .map(|&(function, (int_bits, frac_bits))| -> Result<MseReport> {
            let domain = FixedPointDomain::new(int_bits, frac_bits)?;
            piecewise_mse(function, domain, test_min, test_max)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        pairs = reports.len(),
        test_min, test_max, "mse sweep complete"
    );
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(i: u8, f: u8) -> FixedPointDomain {
        FixedPointDomain::new(i, f).unwrap()
    }

    #[test]
    fn test_silu_default_domain() {
        let report = piecewise_mse(TargetFunction::Silu, domain(2, 4), -6.0, 6.0).unwrap();
        assert_eq!(report.samples, 193);
        assert!(
            report.mse > 5.0e-4 && report.mse < 6.5e-4,
            "mse = {}",
            report.mse
        );
    }

    #[test]
    fn test_wider_domain_reduces_tail_error() {
        let narrow = piecewise_mse(TargetFunction::Silu, domain(2, 4), -6.0, 6.0).unwrap();
        let wide = piecewise_mse(TargetFunction::Silu, domain(3, 4), -6.0, 6.0).unwrap();
        assert!(wide.mse < narrow.mse / 10.0, "{} vs {}", wide, narrow);
    }

    #[test]
    fn test_tanh_tails_saturate() {
        let report = piecewise_mse(TargetFunction::Tanh, domain(2, 4), -6.0, 6.0).unwrap();
        assert!(report.mse < 1e-5, "mse = {}", report.mse);
    }

    #[test]
    fn test_hard_swish_baseline() {
        assert_eq!(hard_swish(-4.0), 0.0);
        assert_eq!(hard_swish(0.0), 0.0);
        assert_eq!(hard_swish(4.0), 4.0);

        let mse = hard_swish_mse(-6.0, 6.0, 0.0625).unwrap();
        assert!(mse > 0.0048 && mse < 0.0049, "mse = {}", mse);

        let lut = piecewise_mse(TargetFunction::Silu, domain(2, 4), -6.0, 6.0).unwrap();
        assert!(lut.mse < mse);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let d = domain(2, 4);
        assert!(piecewise_mse(TargetFunction::Silu, d, 6.0, -6.0).is_err());
        assert!(piecewise_mse(TargetFunction::Silu, d, -6.01, 6.0).is_err());
        assert!(piecewise_mse(TargetFunction::Silu, d, -6.0, 6.01).is_err());
        assert!(matches!(
            piecewise_mse(TargetFunction::InverseSigmoid, d, -6.0, 6.0),
            Err(LutError::InvalidConfig(_))
        ));
        assert!(hard_swish_mse(-6.0, 6.0, 0.0).is_err());
    }

    #[test]
    fn test_sweep_keeps_order() {
        let functions = [TargetFunction::Silu, TargetFunction::Gelu];
        let reports = sweep(&functions, &STANDARD_SHAPES, -6.0, 6.0).unwrap();

        assert_eq!(reports.len(), 8);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.function, functions[i / 4]);
            assert_eq!((report.int_bits, report.frac_bits), STANDARD_SHAPES[i % 4]);
            assert!(report.mse >= 0.0);
        }
        assert_eq!(reports[1].samples, 385);
    }
}
