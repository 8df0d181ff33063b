//! Fixed binary-point value formats.
//!
//! Four signed formats cover everything the synthesizer core touches:
//!
//! | Type          | Width | Frac bits | Range            | Used for                      |
//! |---------------|-------|-----------|------------------|-------------------------------|
//! | [`LutSample`] | 16    | 15        | [-1.0, 1.0)      | lookup-table entries          |
//! | [`Phasor`]    | 32    | 31        | [-1.0, 1.0)      | oscillator phase / increment  |
//! | [`Sample`]    | 32    | 23        | [-256.0, 256.0)  | audio samples, general values |
//! | [`GenFixed`]  | 32    | 15        | [-65536, 65536)  | coarse control (e.g. Hz)      |
//!
//! Arithmetic never range-checks. A value that escapes its format wraps with
//! two's-complement semantics in both debug and release builds.
//!
//! The float conversions (`from_f32`, `to_f64`, ...) are reference
//! conversions for configuration, tests and debugging. The real-time path is
//! integer-only.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use fixed::types::{I17F15, I1F15, I1F31, I9F23};

/// Fractional bits in a [`LutSample`].
pub const LUT_FRAC_BITS: u32 = 15;

/// Fractional bits in a [`Phasor`].
pub const PHASOR_FRAC_BITS: u32 = 31;

/// Fractional bits in a [`Sample`].
pub const SAMPLE_FRAC_BITS: u32 = 23;

/// Fractional bits in a [`GenFixed`].
pub const GEN_FRAC_BITS: u32 = 15;

const PHASOR_TO_SAMPLE_SHIFT: u32 = PHASOR_FRAC_BITS - SAMPLE_FRAC_BITS;
const LUT_TO_SAMPLE_SHIFT: u32 = SAMPLE_FRAC_BITS - LUT_FRAC_BITS;

macro_rules! fixed_format {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $raw:ty, $frac:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Number of fractional bits.
            pub const FRAC_BITS: u32 = $frac;

            /// Zero.
            pub const ZERO: Self = Self::from_bits(0);

            /// Most negative representable value.
            pub const MIN: Self = Self::from_bits(<$raw>::MIN);

            /// Most positive representable value.
            pub const MAX: Self = Self::from_bits(<$raw>::MAX);

            /// One unit in the last place.
            pub const DELTA: Self = Self::from_bits(1);

            /// Reinterpret raw integer bits.
            #[inline]
            pub const fn from_bits(bits: $raw) -> Self {
                Self(<$inner>::from_bits(bits))
            }

            /// Raw integer bits.
            #[inline]
            pub const fn to_bits(self) -> $raw {
                self.0.to_bits()
            }

            /// Wrap a `fixed` crate value.
            #[inline]
            pub const fn from_fixed(value: $inner) -> Self {
                Self(value)
            }

            /// Underlying `fixed` crate value.
            #[inline]
            pub const fn to_fixed(self) -> $inner {
                self.0
            }

            /// Reference conversion from `f64`, rounding to nearest.
            ///
            /// Out-of-range input wraps; non-finite input maps to zero.
            pub fn from_f64(value: f64) -> Self {
                if value.is_finite() {
                    Self(<$inner>::wrapping_from_num(value))
                } else {
                    Self::ZERO
                }
            }

            /// Exact reference conversion to `f64`.
            pub fn to_f64(self) -> f64 {
                self.0.to_num::<f64>()
            }

            /// Reference conversion from `f32`, rounding to nearest.
            ///
            /// Out-of-range input wraps; non-finite input maps to zero.
            pub fn from_f32(value: f32) -> Self {
                if value.is_finite() {
                    Self(<$inner>::wrapping_from_num(value))
                } else {
                    Self::ZERO
                }
            }

            /// Reference conversion to `f32`.
            pub fn to_f32(self) -> f32 {
                self.0.to_num::<f32>()
            }

            /// Two's-complement absolute value (`MIN` maps to itself).
            #[inline]
            pub const fn wrapping_abs(self) -> Self {
                Self::from_bits(self.to_bits().wrapping_abs())
            }

            /// True if the value is below zero.
            #[inline]
            pub const fn is_negative(self) -> bool {
                self.to_bits() < 0
            }
        }

        impl Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::from_bits(self.to_bits().wrapping_add(rhs.to_bits()))
            }
        }

        impl Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::from_bits(self.to_bits().wrapping_sub(rhs.to_bits()))
            }
        }

        impl Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self::from_bits(self.to_bits().wrapping_neg())
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

fixed_format!(
    /// Lookup-table entry, s.15: one sign bit, 15 fractional bits.
    LutSample,
    I1F15,
    i16,
    LUT_FRAC_BITS
);

fixed_format!(
    /// Oscillator phase or phase increment, s.31.
    ///
    /// One full cycle spans the whole 32-bit range, so phase arithmetic
    /// wraps naturally at the ±1.0 boundary.
    Phasor,
    I1F31,
    i32,
    PHASOR_FRAC_BITS
);

fixed_format!(
    /// Audio sample or general argument, s8.23.
    ///
    /// Eight integer bits give headroom up to ±256.0 for intermediate sums.
    Sample,
    I9F23,
    i32,
    SAMPLE_FRAC_BITS
);

fixed_format!(
    /// Coarse control parameter, s16.15 (e.g. frequency in Hz).
    GenFixed,
    I17F15,
    i32,
    GEN_FRAC_BITS
);

impl LutSample {
    /// Widen to a [`Sample`].
    #[inline]
    pub const fn to_sample(self) -> Sample {
        Sample::from_bits((self.to_bits() as i32) << LUT_TO_SAMPLE_SHIFT)
    }
}

impl Sample {
    /// 1.0
    pub const ONE: Sample = Sample::from_bits(1 << SAMPLE_FRAC_BITS);

    /// 0.5
    pub const HALF: Sample = Sample::from_bits(1 << (SAMPLE_FRAC_BITS - 1));

    /// Compile-time constant from a float literal (truncates toward zero).
    ///
    /// Intended for `const` items; runtime conversions should use
    /// [`Sample::from_f64`].
    pub const fn constant(value: f64) -> Sample {
        Sample::from_bits((value * (1u32 << SAMPLE_FRAC_BITS) as f64) as i32)
    }

    /// `numerator / 2^bits` as a Sample. `bits` must not exceed 23.
    #[inline]
    pub const fn from_ratio(numerator: i32, bits: u32) -> Sample {
        Sample::from_bits(numerator.wrapping_shl(SAMPLE_FRAC_BITS - bits))
    }

    /// Narrow to a [`Phasor`]. Only meaningful for values in [-1.0, 1.0).
    #[inline]
    pub const fn to_phasor(self) -> Phasor {
        Phasor::from_bits(self.to_bits().wrapping_shl(PHASOR_TO_SAMPLE_SHIFT))
    }

    /// Narrow to a [`LutSample`], discarding the low 8 bits.
    #[inline]
    pub const fn to_lut_sample(self) -> LutSample {
        LutSample::from_bits((self.to_bits() >> LUT_TO_SAMPLE_SHIFT) as i16)
    }

    /// Floor index of this value into a table of `2^bits` entries per unit.
    ///
    /// Arithmetic shift, so negative values give negative indices. `bits`
    /// above 23 is treated as 23 (one entry per ulp).
    #[inline]
    pub const fn int_part(self, bits: u32) -> i32 {
        self.to_bits() >> SAMPLE_FRAC_BITS.saturating_sub(bits)
    }

    /// Fractional position within a `bits`-bit table cell, as a Sample in
    /// [0.0, 1.0). `bits` above 23 is treated as 23, which leaves no
    /// fraction.
    #[inline]
    pub const fn frac_within(self, bits: u32) -> Sample {
        let bits = if bits > SAMPLE_FRAC_BITS {
            SAMPLE_FRAC_BITS
        } else {
            bits
        };
        let mask = (1i32 << (SAMPLE_FRAC_BITS - bits)) - 1;
        Sample::from_bits((self.to_bits() & mask) << bits)
    }

    /// Arithmetic right shift (divide by `2^bits`, rounding toward -inf).
    #[inline]
    pub const fn shr(self, bits: u32) -> Sample {
        Sample::from_bits(self.to_bits() >> bits)
    }

    /// Left shift (multiply by `2^bits`), wrapping on overflow.
    #[inline]
    pub const fn shl(self, bits: u32) -> Sample {
        Sample::from_bits(self.to_bits().wrapping_shl(bits))
    }
}

impl Phasor {
    /// Widen to a [`Sample`], discarding the low 8 bits.
    #[inline]
    pub const fn to_sample(self) -> Sample {
        Sample::from_bits(self.to_bits() >> PHASOR_TO_SAMPLE_SHIFT)
    }

    /// Index into a table of `2^bits` entries spanning one cycle.
    ///
    /// The sign bit is shifted out before the unsigned shift down, so a
    /// negative phase -x indexes the same entry as 1.0 - x. `bits` must be
    /// in 1..=31; `bits == 0` yields 0.
    #[inline]
    pub const fn table_index(self, bits: u32) -> usize {
        let unsigned = (self.to_bits() as u32) << 1;
        match unsigned.checked_shr(32 - bits) {
            Some(index) => index as usize,
            None => 0,
        }
    }

    /// Fractional position within a `bits`-bit table cell, as a Sample in
    /// [0.0, 1.0). `bits` must be at most 30.
    #[inline]
    pub const fn frac_within(self, bits: u32) -> Sample {
        let unsigned = (self.to_bits() as u32).wrapping_shl(bits + 1);
        Sample::from_bits((unsigned >> (1 + PHASOR_TO_SAMPLE_SHIFT)) as i32)
    }

    /// Phase of entry `index` in a table of `2^bits` entries.
    #[inline]
    pub const fn from_index(index: i32, bits: u32) -> Phasor {
        Phasor::from_bits(index.wrapping_shl(PHASOR_FRAC_BITS - bits))
    }

    /// Advance the phase by `increment`, wrapping into [0.0, 1.0).
    ///
    /// The sum is taken as unsigned and the sign bit cleared, so any carry
    /// past 1.0 is dropped.
    #[inline]
    pub const fn wrapping_sum(self, increment: Phasor) -> Phasor {
        let sum = (self.to_bits() as u32).wrapping_add(increment.to_bits() as u32);
        Phasor::from_bits(((sum << 1) >> 1) as i32)
    }
}

impl GenFixed {
    /// 1.0
    pub const ONE: GenFixed = GenFixed::from_bits(1 << GEN_FRAC_BITS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_constants() {
        assert_eq!(Sample::ONE.to_f64(), 1.0);
        assert_eq!(Sample::HALF.to_f64(), 0.5);
        assert_eq!(GenFixed::ONE.to_f64(), 1.0);
        assert_eq!(Sample::MIN.to_f64(), -256.0);
        assert_eq!(Phasor::MIN.to_f64(), -1.0);
        assert_eq!(LutSample::MIN.to_f64(), -1.0);
    }

    #[test]
    fn test_constant_matches_reference_conversion() {
        assert_eq!(Sample::constant(0.25), Sample::from_f64(0.25));
        assert_eq!(Sample::constant(-3.5), Sample::from_f64(-3.5));
    }

    #[test]
    fn test_sample_phasor_conversion() {
        let s = Sample::from_f64(0.375);
        assert_eq!(s.to_phasor().to_f64(), 0.375);
        assert_eq!(s.to_phasor().to_sample(), s);
    }

    #[test]
    fn test_lut_sample_conversion() {
        let l = LutSample::from_f64(-0.5);
        assert_eq!(l.to_sample().to_f64(), -0.5);
        assert_eq!(l.to_sample().to_lut_sample(), l);
    }

    #[test]
    fn test_from_ratio() {
        assert_eq!(Sample::from_ratio(3, 2).to_f64(), 0.75);
        assert_eq!(Sample::from_ratio(-1, 4).to_f64(), -0.0625);
    }

    #[test]
    fn test_int_and_frac_of_sample() {
        // 0.625 in an 8-entry table is entry 5 with no remainder
        let s = Sample::from_f64(0.625);
        assert_eq!(s.int_part(3), 5);
        assert_eq!(s.frac_within(3), Sample::ZERO);

        // 0.6875 sits halfway between entries 5 and 6
        let s = Sample::from_f64(0.6875);
        assert_eq!(s.int_part(3), 5);
        assert_eq!(s.frac_within(3).to_f64(), 0.5);

        // floor, not truncation
        assert_eq!(Sample::from_f64(-0.5).int_part(0), -1);
    }

    #[test]
    fn test_int_and_frac_saturate_past_sample_precision() {
        let s = Sample::from_bits(0x0123_4567);
        assert_eq!(s.int_part(23), 0x0123_4567);
        assert_eq!(s.int_part(30), 0x0123_4567);
        assert_eq!(s.frac_within(23), Sample::ZERO);
        assert_eq!(s.frac_within(40), Sample::ZERO);
    }

    #[test]
    fn test_phasor_table_index_strips_sign() {
        assert_eq!(Phasor::from_f64(0.25).table_index(2), 1);
        // -0.25 is the same point on the cycle as 0.75
        assert_eq!(Phasor::from_f64(-0.25).table_index(2), 3);
        assert_eq!(Phasor::MIN.table_index(8), 0);
        assert_eq!(Phasor::MAX.table_index(8), 255);
        assert_eq!(Phasor::from_f64(0.5).table_index(0), 0);
    }

    #[test]
    fn test_phasor_frac_within() {
        // 0.375 in a 4-entry table: entry 1, halfway to entry 2
        let p = Phasor::from_f64(0.375);
        assert_eq!(p.table_index(2), 1);
        assert_eq!(p.frac_within(2).to_f64(), 0.5);
    }

    #[test]
    fn test_phasor_from_index() {
        assert_eq!(Phasor::from_index(3, 3).to_f64(), 0.375);
        assert_eq!(Phasor::from_index(3, 3).table_index(3), 3);
    }

    #[test]
    fn test_wrapping_sum() {
        let p = Phasor::from_f64(0.75);
        let inc = Phasor::from_f64(0.5);
        assert_eq!(p.wrapping_sum(inc).to_f64(), 0.25);

        let p = Phasor::from_f64(0.125);
        assert_eq!(p.wrapping_sum(inc).to_f64(), 0.625);
    }

    #[test]
    fn test_phasor_from_float_wraps() {
        assert_eq!(Phasor::from_f64(1.0), Phasor::MIN);
        assert_eq!(Phasor::from_f64(1.25).to_f64(), -0.75);
    }

    #[test]
    fn test_arithmetic_wraps() {
        assert_eq!(Sample::MAX + Sample::DELTA, Sample::MIN);
        assert_eq!(Sample::MIN - Sample::DELTA, Sample::MAX);
        assert_eq!(-Sample::MIN, Sample::MIN);
    }

    #[test]
    fn test_non_finite_maps_to_zero() {
        assert_eq!(Sample::from_f32(f32::NAN), Sample::ZERO);
        assert_eq!(Phasor::from_f64(f64::INFINITY), Phasor::ZERO);
    }

    #[test]
    fn test_shifts() {
        let s = Sample::from_f64(3.0);
        assert_eq!(s.shr(1).to_f64(), 1.5);
        assert_eq!(s.shl(2).to_f64(), 12.0);
        assert_eq!(Sample::from_f64(-1.0).shr(23), Sample::from_bits(-1));
    }
}
