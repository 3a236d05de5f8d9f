//! Uniform fixed-point sampling domains

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};
use crate::fixed::Fixed;

/// Default integer bits of a grid
pub const DEFAULT_INT_BITS: u8 = 2;

/// Default fractional bits of a grid
pub const DEFAULT_FRAC_BITS: u8 = 4;

/// Upper bound on `int_bits + frac_bits` (keeps the grid in i32 and tables
/// at a sane size)
pub const MAX_TOTAL_BITS: u8 = 24;

/// A signed `int_bits.frac_bits` domain.
///
/// The grid runs from `-2^int_bits + 2^-frac_bits` up to (but excluding)
/// `2^int_bits` in steps of `2^-frac_bits`. Every grid point is exactly
/// representable as sign, `int_bits` magnitude bits and `frac_bits` fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPointDomain {
    int_bits: u8,
    frac_bits: u8,
}

/// A grid point with its position in ascending enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSample {
    pub index: usize,
    pub value: Fixed,
}

impl FixedPointDomain {
    pub fn new(int_bits: u8, frac_bits: u8) -> Result<Self> {
        let invalid = |reason| FixedPointError::InvalidDomain {
            int_bits,
            frac_bits,
            reason,
        };
        if int_bits == 0 {
            return Err(invalid("int_bits must be at least 1"));
        }
        if frac_bits == 0 {
            return Err(invalid("frac_bits must be at least 1"));
        }
        if int_bits as u32 + frac_bits as u32 > MAX_TOTAL_BITS as u32 {
            return Err(invalid("int_bits + frac_bits exceeds 24"));
        }
        Ok(Self {
            int_bits,
            frac_bits,
        })
    }

    pub fn int_bits(&self) -> u8 {
        self.int_bits
    }

    pub fn frac_bits(&self) -> u8 {
        self.frac_bits
    }

    pub fn total_bits(&self) -> u8 {
        self.int_bits + self.frac_bits
    }

    /// Grid spacing, 2^-frac_bits
    pub fn step(&self) -> f64 {
        1.0 / (1u64 << self.frac_bits) as f64
    }

    /// Exclusive upper bound, 2^int_bits
    pub fn max(&self) -> f64 {
        (1u64 << self.int_bits) as f64
    }

    /// Smallest grid value, -max + step
    pub fn min(&self) -> f64 {
        -self.max() + self.step()
    }

    /// Raw magnitude bound (exclusive): 2^(int_bits + frac_bits)
    fn raw_bound(&self) -> i32 {
        1i32 << self.total_bits()
    }

    /// Number of points on the ascending grid
    pub fn point_count(&self) -> usize {
        2 * self.raw_bound() as usize - 1
    }

    /// Number of hardware table slots (the grid plus a negative-zero slot)
    pub fn slot_count(&self) -> usize {
        2 * self.raw_bound() as usize
    }

    fn point(&self, raw: i32) -> Fixed {
        Fixed {
            raw,
            scale: self.frac_bits,
        }
    }

    /// All grid values, ascending from `min()` to `max() - step()`
    pub fn grid(&self) -> impl Iterator<Item = Fixed> + '_ {
        let bound = self.raw_bound();
        (-bound + 1..bound).map(move |raw| self.point(raw))
    }

    /// Grid values paired with their 0-based ascending position
    pub fn samples(&self) -> impl Iterator<Item = GridSample> + '_ {
        self.grid()
            .enumerate()
            .map(|(index, value)| GridSample { index, value })
    }

    /// Non-negative grid values, ascending from zero
    pub fn non_negative(&self) -> impl Iterator<Item = Fixed> + '_ {
        (0..self.raw_bound()).map(move |raw| self.point(raw))
    }

    /// Negative grid values in ascending magnitude (`-step`, `-2*step`, ...)
    pub fn negative_by_magnitude(&self) -> impl Iterator<Item = Fixed> + '_ {
        (1..self.raw_bound()).map(move |m| self.point(-m))
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min() && value < self.max()
    }

    /// Ascending position of `value` if it lies exactly on the grid
    pub fn position_of(&self, value: f64) -> Option<usize> {
        if !self.contains(value) {
            return None;
        }
        let scaled = value * (1u64 << self.frac_bits) as f64;
        if scaled.fract() != 0.0 {
            return None;
        }
        Some((scaled as i64 + self.raw_bound() as i64 - 1) as usize)
    }
}

impl Default for FixedPointDomain {
    /// The 2.4 grid: -3.9375 to 3.9375 in steps of 0.0625
    fn default() -> Self {
        Self {
            int_bits: DEFAULT_INT_BITS,
            frac_bits: DEFAULT_FRAC_BITS,
        }
    }
}

impl std::fmt::Display for FixedPointDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.int_bits, self.frac_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_bits() {
        assert!(matches!(
            FixedPointDomain::new(0, 4),
            Err(FixedPointError::InvalidDomain { int_bits: 0, .. })
        ));
        assert!(matches!(
            FixedPointDomain::new(2, 0),
            Err(FixedPointError::InvalidDomain { frac_bits: 0, .. })
        ));
        assert!(FixedPointDomain::new(12, 13).is_err());
        assert!(FixedPointDomain::new(12, 12).is_ok());
    }

    #[test]
    fn test_bounds() {
        let d = FixedPointDomain::new(2, 4).unwrap();
        assert_eq!(d.step(), 0.0625);
        assert_eq!(d.max(), 4.0);
        assert_eq!(d.min(), -3.9375);
        assert_eq!(d.point_count(), 127);
        assert_eq!(d.slot_count(), 128);
        assert_eq!(d.to_string(), "2.4");
        assert_eq!(FixedPointDomain::default(), d);
    }

    #[test]
    fn test_grid_ascending_and_evenly_spaced() {
        let d = FixedPointDomain::new(2, 4).unwrap();
        let values: Vec<f64> = d.grid().map(Fixed::to_f64).collect();

        assert_eq!(values.len(), d.point_count());
        assert_eq!(values[0], -3.9375);
        assert_eq!(*values.last().unwrap(), 3.9375);
        for pair in values.windows(2) {
            assert_eq!(pair[1] - pair[0], 0.0625);
        }
    }

    #[test]
    fn test_samples_index_positionally() {
        let d = FixedPointDomain::new(2, 4).unwrap();
        let first = d.samples().next().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.value.to_f64(), -3.9375);

        let zero = d.samples().find(|s| s.value.raw == 0).unwrap();
        assert_eq!(zero.index, 63);
    }

    #[test]
    fn test_sign_split_halves() {
        let d = FixedPointDomain::new(2, 4).unwrap();
        let pos: Vec<f64> = d.non_negative().map(Fixed::to_f64).collect();
        let neg: Vec<f64> = d.negative_by_magnitude().map(Fixed::to_f64).collect();

        assert_eq!(pos.len(), 64);
        assert_eq!(pos[0], 0.0);
        assert_eq!(neg.len(), 63);
        assert_eq!(neg[0], -0.0625);
        assert_eq!(*neg.last().unwrap(), -3.9375);
        assert_eq!(pos.len() + 1 + neg.len(), d.slot_count());
    }

    #[test]
    fn test_position_of() {
        let d = FixedPointDomain::new(2, 4).unwrap();
        assert_eq!(d.position_of(-3.9375), Some(0));
        assert_eq!(d.position_of(0.0), Some(63));
        assert_eq!(d.position_of(3.9375), Some(126));
        assert_eq!(d.position_of(4.0), None);
        assert_eq!(d.position_of(-4.0), None);
        assert_eq!(d.position_of(0.03), None);
    }
}
