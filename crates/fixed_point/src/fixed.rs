//! Fixed-point scalar type

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};

/// Maximum scale (to prevent overflow of the i32 raw value)
pub const MAX_SCALE: u8 = 30;

/// A fixed-point number represented as i32 with implicit scaling factor 2^S
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixed {
    /// The raw integer value
    pub raw: i32,
    /// Scale factor exponent (value represents raw / 2^scale)
    pub scale: u8,
}

impl Fixed {
    /// Create a new fixed-point value from raw integer and scale
    pub fn from_raw(raw: i32, scale: u8) -> Result<Self> {
        if scale > MAX_SCALE {
            return Err(FixedPointError::InvalidScale(scale));
        }
        Ok(Self { raw, scale })
    }

    /// Create a fixed-point value from a floating-point number, rounding to
    /// the nearest representable value
    pub fn from_f64(value: f64, scale: u8) -> Result<Self> {
        let scaled = Self::checked_scaled(value, scale)?;
        Ok(Self {
            raw: scaled.round() as i32,
            scale,
        })
    }

    /// Create a fixed-point value from a floating-point number, truncating
    /// toward zero. Hardware tables render their 3.7 columns this way.
    pub fn from_f64_trunc(value: f64, scale: u8) -> Result<Self> {
        let scaled = Self::checked_scaled(value, scale)?;
        Ok(Self {
            raw: scaled.trunc() as i32,
            scale,
        })
    }

    fn checked_scaled(value: f64, scale: u8) -> Result<f64> {
        if scale > MAX_SCALE {
            return Err(FixedPointError::InvalidScale(scale));
        }

        let scale_factor = (1u64 << scale) as f64;
        let scaled = value * scale_factor;

        if scaled.is_nan() || scaled > i32::MAX as f64 {
            return Err(FixedPointError::Overflow { value });
        }
        if scaled < i32::MIN as f64 {
            return Err(FixedPointError::Underflow { value });
        }
        Ok(scaled)
    }

    /// Convert back to floating-point
    pub fn to_f64(self) -> f64 {
        let scale_factor = (1u64 << self.scale) as f64;
        self.raw as f64 / scale_factor
    }

    pub fn is_negative(self) -> bool {
        self.raw < 0
    }

    /// Integer bits of the magnitude
    pub fn integer_part(self) -> u32 {
        self.raw.unsigned_abs() >> self.scale
    }

    /// Fractional bits of the magnitude
    pub fn fraction_part(self) -> u32 {
        self.raw.unsigned_abs() & ((1u32 << self.scale) - 1)
    }

    /// Signed-magnitude index, e.g. `1_10.1111` for -2.9375 with 2 integer bits
    pub fn sign_magnitude_bits(self, int_bits: u8) -> String {
        format!(
            "{}_{:0iw$b}.{:0fw$b}",
            self.is_negative() as u8,
            self.integer_part(),
            self.fraction_part(),
            iw = int_bits as usize,
            fw = self.scale as usize,
        )
    }

    /// Signed-magnitude index without separators, e.g. `1101111`
    pub fn sign_magnitude_compact(self, int_bits: u8) -> String {
        format!(
            "{}{:0iw$b}{:0fw$b}",
            self.is_negative() as u8,
            self.integer_part(),
            self.fraction_part(),
            iw = int_bits as usize,
            fw = self.scale as usize,
        )
    }

    /// Signed-magnitude index as an integer: the sign bit sits above
    /// `int_bits + scale` magnitude bits.
    ///
    /// The magnitude must fit in `int_bits` integer bits.
    pub fn sign_magnitude_address(self, int_bits: u8) -> u32 {
        let width = int_bits as u32 + self.scale as u32;
        let magnitude = self.raw.unsigned_abs();
        debug_assert!(magnitude < (1u32 << width));
        ((self.is_negative() as u32) << width) | magnitude
    }

    /// Unsigned `int.frac` rendering, e.g. `100_0010010` for 4.143 at scale 7.
    /// Negative values are rendered as `-` followed by the magnitude.
    pub fn unsigned_bits(self, int_bits: u8) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{:0iw$b}_{:0fw$b}",
            sign,
            self.integer_part(),
            self.fraction_part(),
            iw = int_bits as usize,
            fw = self.scale as usize,
        )
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_f64() {
        let values = [0.0, 1.0, -1.0, 0.5, -0.5, 3.9375, -3.9375, 0.0625];

        for &v in &values {
            let fixed = Fixed::from_f64(v, 4).unwrap();
            assert_eq!(fixed.to_f64(), v, "grid value {} should be exact", v);
        }
    }

    #[test]
    fn test_trunc_vs_round() {
        let rounded = Fixed::from_f64(0.99, 4).unwrap();
        let truncated = Fixed::from_f64_trunc(0.99, 4).unwrap();
        assert_eq!(rounded.raw, 16);
        assert_eq!(truncated.raw, 15);

        let neg = Fixed::from_f64_trunc(-0.99, 4).unwrap();
        assert_eq!(neg.raw, -15);
    }

    #[test]
    fn test_invalid_scale() {
        assert!(matches!(
            Fixed::from_raw(1, 31),
            Err(FixedPointError::InvalidScale(31))
        ));
    }

    #[test]
    fn test_overflow() {
        let result = Fixed::from_f64(100000.0, 16);
        assert!(matches!(result, Err(FixedPointError::Overflow { .. })));

        let result = Fixed::from_f64(-100000.0, 16);
        assert!(matches!(result, Err(FixedPointError::Underflow { .. })));

        let result = Fixed::from_f64(f64::NAN, 4);
        assert!(matches!(result, Err(FixedPointError::Overflow { .. })));
    }

    #[test]
    fn test_parts() {
        let v = Fixed::from_f64(-2.9375, 4).unwrap();
        assert!(v.is_negative());
        assert_eq!(v.integer_part(), 2);
        assert_eq!(v.fraction_part(), 15);
    }

    #[test]
    fn test_sign_magnitude_bits() {
        let v = Fixed::from_f64(-3.9375, 4).unwrap();
        assert_eq!(v.sign_magnitude_bits(2), "1_11.1111");
        assert_eq!(v.sign_magnitude_compact(2), "1111111");

        let v = Fixed::from_f64(1.5, 4).unwrap();
        assert_eq!(v.sign_magnitude_bits(2), "0_01.1000");
        assert_eq!(v.sign_magnitude_compact(2), "0011000");

        let zero = Fixed::from_raw(0, 4).unwrap();
        assert_eq!(zero.sign_magnitude_bits(2), "0_00.0000");
    }

    #[test]
    fn test_sign_magnitude_address() {
        let pos = Fixed::from_f64(0.0625, 4).unwrap();
        assert_eq!(pos.sign_magnitude_address(2), 1);

        let neg = Fixed::from_f64(-0.0625, 4).unwrap();
        assert_eq!(neg.sign_magnitude_address(2), 0b1000001);

        let top = Fixed::from_f64(3.9375, 4).unwrap();
        assert_eq!(top.sign_magnitude_address(2), 0b0111111);
    }

    #[test]
    fn test_unsigned_bits() {
        let v = Fixed::from_f64_trunc(4.1431347, 7).unwrap();
        assert_eq!(v.unsigned_bits(3), "100_0010010");

        let v = Fixed::from_f64_trunc(0.5, 7).unwrap();
        assert_eq!(v.unsigned_bits(3), "000_1000000");

        let v = Fixed::from_f64_trunc(-0.5, 7).unwrap();
        assert_eq!(v.unsigned_bits(3), "-000_1000000");
    }

    #[test]
    fn test_display() {
        let v = Fixed::from_f64(-0.0625, 4).unwrap();
        assert_eq!(v.to_string(), "-0.062500");
    }
}
