//! actlut BF16 Codec
//!
//! Narrowing of IEEE-754 binary32 values to the 16-bit brain-float format
//! (1 sign, 8 exponent, 7 mantissa bits) with round-to-nearest-even, and
//! lossless widening back to f32.

mod codec;
mod ulp;

pub use codec::{Bf16, HALF_TAIL};
pub use ulp::{average_ulp, segment_ulps, UlpSegment, MANTISSA_BITS};
