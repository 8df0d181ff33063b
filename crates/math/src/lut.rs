//! Lookup-table descriptors and table-driven log2 / exp2.
//!
//! Tables hold s.15 [`LutSample`] entries plus one guard entry past the end,
//! so linear interpolation never reads outside the slice.
//!
//! The log2 and exp2 tables are generated at compile time by `const fn`
//! series expansions and live in read-only statics. Each covers one octave
//! with 256 cells; the integer part of the argument is handled with shifts.
//!
//! # Example
//!
//! ```rust
//! use fxsynth_math::{exp2_lut, log2_lut, Sample};
//!
//! let half = exp2_lut(Sample::from_f64(-1.0));
//! assert_eq!(half, Sample::HALF);
//!
//! let minus_three = log2_lut(Sample::from_f64(0.125));
//! assert_eq!(minus_three, Sample::from_f64(-3.0));
//! ```

use core::f64::consts::LN_2;

use crate::fixed::{LutSample, Phasor, Sample, SAMPLE_FRAC_BITS};
use crate::mul::fxmul;

/// Index bits of the built-in log2 / exp2 tables.
pub const LUT_BITS: u32 = 8;

/// Number of interpolation cells in the built-in tables.
pub const LUT_CELLS: usize = 1 << LUT_BITS;

/// log2 of non-positive input: the log2 of one Sample ulp.
pub const LOG2_FLOOR: Sample = Sample::from_bits(-(SAMPLE_FRAC_BITS as i32) << SAMPLE_FRAC_BITS);

/// Highest shift `exp2` can apply before leaving the Sample range.
const EXP2_MAX_SHIFT: i32 = 8;

/// Descriptor for a fixed-point lookup table.
///
/// `table` must hold at least `table_size + 1` entries; the extra entry is
/// the interpolation guard (a copy of entry 0 for periodic tables).
#[derive(Debug, Clone, Copy)]
pub struct LutEntry<'a> {
    /// Table entries, including the guard.
    pub table: &'a [LutSample],
    /// Number of cells (a power of two).
    pub table_size: usize,
    /// `log2(table_size)`.
    pub log2_table_size: u32,
    /// Highest harmonic represented, for band-limited wavetables (0 otherwise).
    pub highest_harmonic: u32,
    /// Amplitude scale the table was normalised by.
    pub scale_factor: f32,
}

impl<'a> LutEntry<'a> {
    /// Describe `table` as `2^log2_table_size` cells plus a guard entry.
    ///
    /// # Panics
    ///
    /// Panics if the table is shorter than `2^log2_table_size + 1` entries.
    /// Descriptors are normally built in `const`/`static` items, where this
    /// becomes a compile error.
    pub const fn new(
        table: &'a [LutSample],
        log2_table_size: u32,
        highest_harmonic: u32,
        scale_factor: f32,
    ) -> Self {
        let table_size = 1usize << log2_table_size;
        assert!(table.len() > table_size, "lookup table is missing its guard entry");
        Self {
            table,
            table_size,
            log2_table_size,
            highest_harmonic,
            scale_factor,
        }
    }

    /// Periodic lookup: one cycle of `phase` spans the whole table.
    #[inline]
    pub fn lookup_phasor(&self, phase: Phasor) -> Sample {
        let index = phase.table_index(self.log2_table_size) & (self.table_size - 1);
        let frac = phase.frac_within(self.log2_table_size);
        self.interpolate(index, frac)
    }

    /// Lookup for `x` in [0.0, 1.0). Out-of-range input is clamped to the
    /// first or last cell.
    #[inline]
    pub fn lookup_unit(&self, x: Sample) -> Sample {
        let last = self.table_size as i32 - 1;
        let index = x.int_part(self.log2_table_size).clamp(0, last) as usize;
        let frac = x.frac_within(self.log2_table_size);
        self.interpolate(index, frac)
    }

    /// Adjacent entries may differ by up to 2.0 (a saw or pulse wrapping
    /// into its guard), past the bound of [`Sample::mul_r1`]. The step keeps
    /// all 15 fraction bits of the table and the position keeps 15, so the
    /// raw product stays below 2^31.
    #[inline]
    fn interpolate(&self, index: usize, frac: Sample) -> Sample {
        let lo = self.table[index].to_sample();
        let hi = self.table[index + 1].to_sample();
        let step = fxmul::<8, 8, { SAMPLE_FRAC_BITS }>((hi - lo).to_bits(), frac.to_bits());
        lo + Sample::from_bits(step)
    }
}

/// The transcendental helpers the envelope evaluator depends on.
///
/// Implementations must be deterministic: the same input always yields the
/// same output.
pub trait Transcendental {
    /// Base-2 logarithm.
    fn log2(&self, x: Sample) -> Sample;

    /// Base-2 exponential.
    fn exp2(&self, x: Sample) -> Sample;
}

/// [`Transcendental`] backed by the built-in tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LutMath;

impl Transcendental for LutMath {
    #[inline]
    fn log2(&self, x: Sample) -> Sample {
        log2_lut(x)
    }

    #[inline]
    fn exp2(&self, x: Sample) -> Sample {
        exp2_lut(x)
    }
}

/// `2^(f - 1)` for f in [0, 1], so every entry lies in [0.5, 1.0].
static EXP2_TABLE: [LutSample; LUT_CELLS + 1] = {
    let mut table = [LutSample::ZERO; LUT_CELLS + 1];
    let mut i = 0;
    while i <= LUT_CELLS {
        let f = i as f64 / LUT_CELLS as f64;
        table[i] = LutSample::from_bits(to_s15(0.5 * const_exp2_unit(f)));
        i += 1;
    }
    table
};

/// `log2(1 + f)` for f in [0, 1].
static LOG2_TABLE: [LutSample; LUT_CELLS + 1] = {
    let mut table = [LutSample::ZERO; LUT_CELLS + 1];
    let mut i = 0;
    while i <= LUT_CELLS {
        let f = i as f64 / LUT_CELLS as f64;
        table[i] = LutSample::from_bits(to_s15(const_log2(1.0 + f)));
        i += 1;
    }
    table
};

/// Descriptor for the exp2 mantissa table.
pub static EXP2_LUT: LutEntry<'static> = LutEntry::new(&EXP2_TABLE, LUT_BITS, 0, 1.0);

/// Descriptor for the log2 mantissa table.
pub static LOG2_LUT: LutEntry<'static> = LutEntry::new(&LOG2_TABLE, LUT_BITS, 0, 1.0);

/// `2^x` by table lookup.
///
/// Results above the Sample range saturate to [`Sample::MAX`]; results
/// below one ulp flush to zero.
#[inline]
pub fn exp2_lut(x: Sample) -> Sample {
    let octave = x.int_part(0);
    let mantissa = EXP2_LUT.lookup_unit(x.frac_within(0));
    let shift = octave.saturating_add(1);
    if shift > EXP2_MAX_SHIFT {
        Sample::MAX
    } else if shift >= 0 {
        mantissa.shl(shift as u32)
    } else {
        mantissa.shr(shift.unsigned_abs().min(31))
    }
}

/// `log2(x)` by table lookup. Non-positive input returns [`LOG2_FLOOR`].
#[inline]
pub fn log2_lut(x: Sample) -> Sample {
    let bits = x.to_bits();
    if bits <= 0 {
        return LOG2_FLOOR;
    }
    let msb = 31 - bits.leading_zeros() as i32;
    let octave = msb - SAMPLE_FRAC_BITS as i32;
    let normalized = if octave >= 0 {
        bits >> octave
    } else {
        bits << -octave
    };
    let frac = Sample::from_bits(normalized) - Sample::ONE;
    Sample::from_bits(octave << SAMPLE_FRAC_BITS) + LOG2_LUT.lookup_unit(frac)
}

/// Round a value in [0, 1] to s.15, clamping 1.0 to the largest entry.
const fn to_s15(value: f64) -> i16 {
    let scaled = value * 32768.0 + 0.5;
    if scaled >= 32767.0 {
        i16::MAX
    } else if scaled <= 0.0 {
        0
    } else {
        scaled as i16
    }
}

/// `2^x` by Taylor series of `e^(x ln 2)`; accurate to f64 for x in [0, 1].
const fn const_exp2_unit(x: f64) -> f64 {
    let y = x * LN_2;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1;
    while k < 24 {
        term = term * y / k as f64;
        sum += term;
        k += 1;
    }
    sum
}

/// `log2(y)` via the atanh series of `ln`; converges fast for y in [1, 2].
const fn const_log2(y: f64) -> f64 {
    let z = (y - 1.0) / (y + 1.0);
    let z2 = z * z;
    let mut term = z;
    let mut sum = 0.0;
    let mut k = 0;
    while k < 40 {
        sum += term / (2 * k + 1) as f64;
        term *= z2;
        k += 1;
    }
    2.0 * sum / LN_2
}
