//! actlut Activation Lookup Tables
//!
//! Generates BF16 lookup tables for activation functions (SiLU, tanh, GELU)
//! indexed by a signed fixed-point input grid, plus an inverse-sigmoid table
//! sampled over sigmoid outputs. Every entry is checked against a quantization
//! error tolerance; a single violation aborts the table.
//!
//! Renderers live in [`emit`], error analysis of the tables in [`mse`] and
//! piecewise-linear sigmoid coefficients in [`pwl`].

mod config;
mod error;
mod function;
mod table;

pub mod emit;
pub mod mse;
pub mod pwl;

pub use config::{
    default_tolerance, LutConfig, DEFAULT_SIGMOID_INV_ENTRIES, FALLBACK_TOLERANCE,
    INVERSE_SIGMOID_DIGITS, INVERSE_SIGMOID_TOLERANCE,
};
pub use error::{LutError, Result};
pub use function::{round_decimal, TargetFunction};
pub use mse::{MseReport, STANDARD_SHAPES};
pub use pwl::{CoefficientRendering, PwlSegment};
pub use table::{generate_sign_split, generate_table, LutTable, Sample, TableEntry, TableOrder};
