//! Shift-based fixed-point multiplies.
//!
//! A 32x32 -> 32 integer multiply has no room for the full product of two
//! s8.23 values, so every multiply discards bits somewhere. Shifting an
//! operand down before the multiply costs input resolution; shifting the
//! product down afterwards costs output headroom. The templates take the
//! three shift amounts as const parameters:
//!
//! ```text
//! fxmul::<A, B, REQ>(a, b) = ((a >> A) * (b >> B)) >> (REQ - A - B)
//! ```
//!
//! where `REQ` is the total number of fractional bits the product carries in
//! excess (23 for Sample x Sample, 31 for Sample x Phasor).
//!
//! Each named variant on [`Sample`] encodes a bound on the magnitude of the
//! *result*. The caller picks the variant matching what it knows about its
//! operands. Nothing is checked at runtime: a result outside the variant's
//! bound wraps silently.
//!
//! | Variant                        | Shifts (A, B, out) | Result bound |
//! |--------------------------------|--------------------|--------------|
//! | [`Sample::mul_r1`]             | 8, 7, 8            | ±1.0         |
//! | [`Sample::mul_r16`]            | 10, 9, 4           | ±16.0        |
//! | [`Sample::mul_r256`]           | 12, 11, 0          | ±256.0       |
//! | [`Sample::mul_coef`]           | 13, 10, 0 rounded  | ±256.0       |
//! | [`Sample::mul_small`]          | 9, 10, 4 rounded   | ±16.0        |
//! | [`Sample::mul_phasor`]         | 11, 16, 4          | ±16.0        |
//! | [`Sample::mul_rounded_r32`]    | 10, 10, 3 rounded  | ±32.0        |

use crate::fixed::{Phasor, Sample, PHASOR_FRAC_BITS, SAMPLE_FRAC_BITS};

/// Generic shift-multiply-shift.
///
/// `A + B <= REQ` is checked at compile time.
#[inline(always)]
pub const fn fxmul<const A: u32, const B: u32, const REQ: u32>(a: i32, b: i32) -> i32 {
    const { assert!(A + B <= REQ, "operand shifts exceed the product realignment") };
    ((a >> A).wrapping_mul(b >> B)) >> (REQ - A - B)
}

/// Shift-multiply-shift keeping one extra bit of `a`, then rounding that
/// bit away with a sign-aware carry.
///
/// An odd intermediate is pushed one step away from zero before the final
/// 1-bit shift, which halves the truncation bias of plain [`fxmul`].
#[inline(always)]
pub const fn fxmul_carry<const A: u32, const B: u32, const REQ: u32>(a: i32, b: i32) -> i32 {
    const { assert!(A >= 1 && A + B <= REQ, "operand shifts exceed the product realignment") };
    let mut result = ((a >> (A - 1)).wrapping_mul(b >> B)) >> (REQ - A - B);
    if result & 1 != 0 {
        result = if result > 0 {
            result.wrapping_add(1)
        } else {
            result.wrapping_sub(1)
        };
    }
    result >> 1
}

impl Sample {
    /// Product bounded by ±1.0.
    #[inline]
    pub const fn mul_r1(self, rhs: Sample) -> Sample {
        Sample::from_bits(fxmul::<8, 7, { SAMPLE_FRAC_BITS }>(
            self.to_bits(),
            rhs.to_bits(),
        ))
    }

    /// Product bounded by ±16.0.
    #[inline]
    pub const fn mul_r16(self, rhs: Sample) -> Sample {
        Sample::from_bits(fxmul::<10, 9, { SAMPLE_FRAC_BITS }>(
            self.to_bits(),
            rhs.to_bits(),
        ))
    }

    /// Product may use the full ±256.0 range.
    #[inline]
    pub const fn mul_r256(self, rhs: Sample) -> Sample {
        Sample::from_bits(fxmul::<12, 11, { SAMPLE_FRAC_BITS }>(
            self.to_bits(),
            rhs.to_bits(),
        ))
    }

    /// Full-range rounded product where `self` is a filter coefficient with
    /// magnitude below 2.0.
    #[inline]
    pub const fn mul_coef(self, rhs: Sample) -> Sample {
        Sample::from_bits(fxmul_carry::<13, 10, { SAMPLE_FRAC_BITS }>(
            self.to_bits(),
            rhs.to_bits(),
        ))
    }

    /// Rounded product bounded by ±16.0 where `self` is in [0, 1/16).
    #[inline]
    pub const fn mul_small(self, rhs: Sample) -> Sample {
        Sample::from_bits(fxmul_carry::<9, 10, { SAMPLE_FRAC_BITS }>(
            self.to_bits(),
            rhs.to_bits(),
        ))
    }

    /// Sample times Phasor, bounded by ±16.0.
    #[inline]
    pub const fn mul_phasor(self, rhs: Phasor) -> Sample {
        Sample::from_bits(fxmul::<11, 16, { PHASOR_FRAC_BITS }>(
            self.to_bits(),
            rhs.to_bits(),
        ))
    }

    /// Both operands rounded to 13 fractional bits, product rounded back to
    /// 23. Bounded by ±32.0.
    #[inline]
    pub const fn mul_rounded_r32(self, rhs: Sample) -> Sample {
        let a = self.to_bits().wrapping_add(1 << 9) >> 10;
        let b = rhs.to_bits().wrapping_add(1 << 9) >> 10;
        Sample::from_bits(a.wrapping_mul(b).wrapping_add(4) >> 3)
    }
}
