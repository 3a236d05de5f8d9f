//! LUT generation error types

use actlut_fixed_point::FixedPointError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LutError {
    #[error(
        "Quantization error {error:.6} at {domain_value} exceeds tolerance {tolerance} \
         (exact {exact_value}, decoded {decoded_value})"
    )]
    ToleranceExceeded {
        domain_value: f64,
        exact_value: f64,
        decoded_value: f64,
        error: f64,
        tolerance: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown target function: {0}")]
    UnknownFunction(String),

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] FixedPointError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LutError>;
