//! Table generation configuration

use actlut_fixed_point::FixedPointDomain;
use serde::{Deserialize, Serialize};

use crate::error::{LutError, Result};
use crate::function::TargetFunction;

/// Default number of output buckets for the inverse-sigmoid table
pub const DEFAULT_SIGMOID_INV_ENTRIES: u32 = 32;

/// Decimal digits kept for inverse-sigmoid values (3 integer + 4 fraction digits)
pub const INVERSE_SIGMOID_DIGITS: usize = 7;

/// Tolerance for the inverse-sigmoid table, whose values span (0, 8)
pub const INVERSE_SIGMOID_TOLERANCE: f64 = 0.0312;

/// Tolerance for shapes without a dedicated entry
pub const FALLBACK_TOLERANCE: f64 = 0.032;

/// Tolerance for a table shape. Wider tables get tighter bounds.
pub fn default_tolerance(function: TargetFunction, domain: &FixedPointDomain) -> f64 {
    if function == TargetFunction::InverseSigmoid {
        return INVERSE_SIGMOID_TOLERANCE;
    }
    match (domain.int_bits(), domain.frac_bits()) {
        (2, 4) | (2, 5) => 0.016,
        (3, 4) => 0.032,
        (3, 5) => 0.0312,
        _ => FALLBACK_TOLERANCE,
    }
}

/// Parameters of one table-generation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LutConfig {
    pub function: TargetFunction,
    pub domain: FixedPointDomain,
    /// Explicit bound on |rounded - decoded|; `None` uses [`default_tolerance`]
    pub error_tolerance: Option<f64>,
    /// Output buckets over (0.5, 1.0); only used by `InverseSigmoid`
    pub sigmoid_inv_entries: u32,
}

impl Default for LutConfig {
    fn default() -> Self {
        Self {
            function: TargetFunction::Silu,
            domain: FixedPointDomain::default(),
            error_tolerance: None,
            sigmoid_inv_entries: DEFAULT_SIGMOID_INV_ENTRIES,
        }
    }
}

impl LutConfig {
    pub fn new(function: TargetFunction, domain: FixedPointDomain) -> Self {
        Self {
            function,
            domain,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.error_tolerance = Some(tolerance);
        self
    }

    pub fn with_sigmoid_inv_entries(mut self, entries: u32) -> Self {
        self.sigmoid_inv_entries = entries;
        self
    }

    /// Effective tolerance
    pub fn tolerance(&self) -> f64 {
        self.error_tolerance
            .unwrap_or_else(|| default_tolerance(self.function, &self.domain))
    }

    /// Decimal digits the evaluated value is rounded to before quantizing
    pub fn rounding_digits(&self) -> usize {
        match self.function {
            TargetFunction::InverseSigmoid => INVERSE_SIGMOID_DIGITS,
            _ => self.domain.total_bits() as usize,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(tolerance) = self.error_tolerance {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(LutError::InvalidConfig(format!(
                    "error tolerance must be finite and positive, got {}",
                    tolerance
                )));
            }
        }
        if self.function == TargetFunction::InverseSigmoid && self.sigmoid_inv_entries < 2 {
            return Err(LutError::InvalidConfig(format!(
                "sigmoid_inv_entries must be at least 2, got {}",
                self.sigmoid_inv_entries
            )));
        }
        Ok(())
    }
}
