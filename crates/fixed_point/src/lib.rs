//! actlut Fixed-Point Encoding
//!
//! Signed fixed-point values (`intBits.fracBits`) and the uniform sampling
//! domains that index activation lookup tables.
//! Values are i32 with an implicit scaling factor 2^S, where S is the number
//! of fractional bits.

mod domain;
mod error;
mod fixed;

pub use domain::{
    FixedPointDomain, GridSample, DEFAULT_FRAC_BITS, DEFAULT_INT_BITS, MAX_TOTAL_BITS,
};
pub use error::{FixedPointError, Result};
pub use fixed::{Fixed, MAX_SCALE};
