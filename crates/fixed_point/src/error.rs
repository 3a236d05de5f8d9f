//! Fixed-point error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixedPointError {
    #[error("Overflow during fixed-point conversion: value {value} exceeds i32 range")]
    Overflow { value: f64 },

    #[error("Underflow during fixed-point conversion: value {value} too small")]
    Underflow { value: f64 },

    #[error("Invalid scale: {0} (must be 0-30)")]
    InvalidScale(u8),

    #[error("Invalid domain {int_bits}.{frac_bits}: {reason}")]
    InvalidDomain {
        int_bits: u8,
        frac_bits: u8,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
