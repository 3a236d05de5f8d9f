//! BF16 encode/decode

use serde::{Deserialize, Serialize};

/// Discarded-tail value that represents exactly half a unit in the last
/// retained place
pub const HALF_TAIL: u16 = 0x8000;

/// A 16-bit brain-float bit pattern: the (rounded) upper half of an f32.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Bf16(pub u16);

impl Bf16 {
    pub const ZERO: Self = Self(0x0000);
    pub const ONE: Self = Self(0x3F80);
    pub const NEG_ONE: Self = Self(0xBF80);

    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Narrow an f32, rounding the dropped 16 mantissa bits to nearest, ties
    /// to even.
    ///
    /// Rounding up is a plain add on the 16-bit pattern, so a full mantissa
    /// carries into the exponent. NaN and infinity are not special-cased.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        let bits = value.to_bits();
        let upper = (bits >> 16) as u16;
        let tail = bits as u16;

        let round_up = tail > HALF_TAIL || (tail == HALF_TAIL && upper & 1 == 1);
        if round_up {
            Self(upper.wrapping_add(1))
        } else {
            Self(upper)
        }
    }

    /// Widen to f32 by zero-filling the low 16 bits
    #[inline]
    pub fn to_f32(self) -> f32 {
        f32::from_bits((self.0 as u32) << 16)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.to_f32() as f64
    }

    pub fn sign(self) -> u16 {
        self.0 >> 15
    }

    /// Biased 8-bit exponent field
    pub fn exponent(self) -> u16 {
        (self.0 >> 7) & 0xFF
    }

    /// 7-bit mantissa field
    pub fn mantissa(self) -> u16 {
        self.0 & 0x7F
    }

    /// The 16-character binary rendering, most significant bit first
    pub fn to_bit_string(self) -> String {
        format!("{:016b}", self.0)
    }

    /// Parse exactly 16 `0`/`1` characters
    pub fn from_bit_string(bits: &str) -> Option<Self> {
        if bits.len() != 16 || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return None;
        }
        u16::from_str_radix(bits, 2).ok().map(Self)
    }
}

impl From<f32> for Bf16 {
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl From<Bf16> for f32 {
    fn from(value: Bf16) -> Self {
        value.to_f32()
    }
}

impl std::fmt::Debug for Bf16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bf16({:#06x} = {})", self.0, self.to_f32())
    }
}

impl std::fmt::Display for Bf16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_bit_string())
    }
}
