//! Segment curve shapes.
//!
//! Each shape maps a position inside a segment to a value between the
//! segment's endpoints. The shape functions here assume both endpoints are
//! non-negative; sign handling and the exact-boundary rule live in
//! [`Segment::evaluate`](super::Segment::evaluate).
//!
//! `elapsed` is measured from the segment start and lies strictly inside
//! `(0, span)`.

use fxsynth_math::{Sample, Transcendental, SAMPLE_FRAC_BITS};

/// Interpolation shape between consecutive breakpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    /// Straight line.
    Linear,
    /// Constant ratio per unit time, as in an analog RC stage.
    TrueExponential,
    /// DX7-style: attacks approach the target in the operator level domain,
    /// decays are true exponentials.
    HardwareExponential,
    /// Exponential approach scaled up so it lands on the target exactly at
    /// the segment end.
    #[default]
    FalseExponential,
}

/// Design rate of the false exponential: `2^-4.328085 = e^-3`, so the raw
/// approach covers 95% of the gap by the segment end.
pub const EXP_RATE: Sample = Sample::constant(-4.328085);

/// `1 / (1 - 2^EXP_RATE)`, stretching the 95% approach to 100%.
pub const OVERSHOOT: Sample = Sample::constant(1.052_395_696);

/// Floor applied to endpoints before taking their log2.
pub const BREAKPOINT_EPS: Sample = Sample::constant(0.0002);

/// Operator level of full scale (DX7 output level 99, divided by 8).
const LEVEL_TOP: Sample = Sample::constant(12.375);

/// Operator level below which attacks start from the bottom of the curve.
const ATTACK_FLOOR: Sample = Sample::constant(4.25);

/// Operator level span of the attack curve.
const ATTACK_RANGE: Sample = Sample::constant(9.375);

const INV_ATTACK_RANGE: Sample = Sample::constant(1.0 / 9.375);

/// Largest magnitude routed through the ±16 multiply.
const R16_LIMIT: Sample = Sample::constant(15.0);

/// `elapsed / span` as a Sample in [0, 1).
#[inline]
pub(crate) fn ratio(elapsed: u64, span: u64) -> Sample {
    Sample::from_bits((((elapsed as u128) << SAMPLE_FRAC_BITS) / span as u128) as i32)
}

/// `amount * num / den` without intermediate rounding, for `num <= den`.
///
/// Widened to 128 bits so any `u64` span fits.
#[inline]
fn proportion(amount: Sample, num: u64, den: u64) -> Sample {
    Sample::from_bits((amount.to_bits() as i128 * num as i128 / den as i128) as i32)
}

/// `value * fraction` for a fraction of at most 1.0, picking the multiply
/// with the most precision the magnitude of `value` allows.
#[inline]
fn scale_by(value: Sample, fraction: Sample) -> Sample {
    if value.wrapping_abs() < R16_LIMIT {
        value.mul_r16(fraction)
    } else {
        value.mul_r256(fraction)
    }
}

#[inline]
pub(crate) fn linear(v0: Sample, v1: Sample, elapsed: u64, span: u64) -> Sample {
    v0 + scale_by(v1 - v0, ratio(elapsed, span))
}

/// `v0 * 2^(log2(v1 / v0) * elapsed / span)`.
///
/// Evaluated from the larger endpoint so the exp2 argument is never
/// positive and the intermediate stays within [0, 1].
pub(crate) fn true_exponential<T: Transcendental>(
    v0: Sample,
    v1: Sample,
    elapsed: u64,
    span: u64,
    math: &T,
) -> Sample {
    let v0 = v0.max(BREAKPOINT_EPS);
    let v1 = v1.max(BREAKPOINT_EPS);
    let l0 = math.log2(v0);
    let l1 = math.log2(v1);
    if v1 >= v0 {
        let exponent = proportion(l0 - l1, span - elapsed, span);
        scale_by(v1, math.exp2(exponent))
    } else {
        let exponent = proportion(l1 - l0, elapsed, span);
        scale_by(v0, math.exp2(exponent))
    }
}

/// Attacks follow the DX7 envelope generator: the level rises in the
/// operator level domain along `1 - 2^-t`, which reads as a fast initial
/// jump that eases into the target. Decays are true exponentials.
pub(crate) fn hardware_exponential<T: Transcendental>(
    v0: Sample,
    v1: Sample,
    elapsed: u64,
    span: u64,
    math: &T,
) -> Sample {
    if v1 <= v0 {
        return true_exponential(v0, v1, elapsed, span, math);
    }
    let current = attack_progress(v0, math);
    let target = attack_progress(v1, math);
    if current == target {
        // Both ends sit below the attack floor (or above full scale)
        return true_exponential(v0, v1, elapsed, span, math);
    }

    let lc = math.log2(current);
    let lt = math.log2(target);
    let remaining = math.exp2(lc + (lt - lc).mul_r16(ratio(elapsed, span)));
    let level = ATTACK_FLOOR + ATTACK_RANGE.mul_r16(Sample::ONE - remaining);
    math.exp2(level - LEVEL_TOP)
}

/// Linear value to the normalized attack distance still to cover:
/// 1.0 at or below the attack floor, down to about 0.13 at full scale.
fn attack_progress<T: Transcendental>(value: Sample, math: &T) -> Sample {
    let level = (math.log2(value.max(BREAKPOINT_EPS)) + LEVEL_TOP).min(LEVEL_TOP);
    let above_floor = (level - ATTACK_FLOOR).max(Sample::ZERO);
    Sample::ONE - above_floor.mul_r16(INV_ATTACK_RANGE)
}

/// `v0 + (v1 - v0) * OVERSHOOT * (1 - 2^(EXP_RATE * elapsed / span))`.
pub(crate) fn false_exponential<T: Transcendental>(
    v0: Sample,
    v1: Sample,
    elapsed: u64,
    span: u64,
    math: &T,
) -> Sample {
    let decay = math.exp2(EXP_RATE.mul_r16(ratio(elapsed, span)));
    let approach = OVERSHOOT.mul_r16(Sample::ONE - decay);
    v0 + scale_by(v1 - v0, approach)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use fxsynth_math::LutMath;

    fn s(x: f64) -> Sample {
        Sample::from_f64(x)
    }

    #[test]
    fn test_constants() {
        assert!((EXP_RATE.to_f64() + 4.328085).abs() < 1e-6);
        assert!((OVERSHOOT.to_f64() - 1.0 / (1.0 - (-3.0f64).exp())).abs() < 1e-6);
        assert!((BREAKPOINT_EPS.to_f64() - 0.0002).abs() < 1e-6);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(0, 1000), Sample::ZERO);
        assert_eq!(ratio(500, 1000), Sample::HALF);
        assert!(ratio(999, 1000) < Sample::ONE);
        assert_eq!(ratio(u32::MAX as u64 - 1, u32::MAX as u64), Sample::from_bits((1 << 23) - 1));
        assert_eq!(ratio(1 << 50, 1 << 51), Sample::HALF);
        assert_eq!(ratio(u64::MAX / 4, u64::MAX / 2), Sample::HALF - Sample::DELTA);
    }

    #[test]
    fn test_proportion_over_full_u64_span() {
        let amount = s(-13.0);
        assert_eq!(proportion(amount, u64::MAX, u64::MAX), amount);
        assert_eq!(proportion(amount, 1 << 62, 1 << 63), s(-6.5));
    }

    #[test]
    fn test_linear_midpoint_is_exact() {
        assert_eq!(linear(s(0.0), s(1.0), 500, 1000), s(0.5));
        assert_eq!(linear(s(1.0), s(0.0), 250, 1000), s(0.75));
    }

    #[test]
    fn test_large_spans_use_full_range_multiply() {
        let v = linear(s(0.0), s(200.0), 1, 2);
        assert!((v.to_f64() - 100.0).abs() < 0.05, "{}", v);
    }

    #[test]
    fn test_false_exponential_shape() {
        let math = LutMath;
        let start = false_exponential(s(0.0), s(1.0), 0, 1000, &math);
        assert!(start.to_f64().abs() < 1e-3, "{}", start);

        // Concave rise: well past halfway at the midpoint
        let mid = false_exponential(s(0.0), s(1.0), 500, 1000, &math).to_f64();
        let expected = 1.052_395_696 * (1.0 - (-1.5f64).exp());
        assert!((mid - expected).abs() < 2e-3, "{} vs {}", mid, expected);

        let end = false_exponential(s(0.0), s(1.0), 999, 1000, &math).to_f64();
        assert!((end - 1.0).abs() < 5e-3, "{}", end);
    }

    #[test]
    fn test_true_exponential_decay_halves_per_octave() {
        let math = LutMath;
        // 1.0 -> 0.25 is two halvings; halfway through is one
        let mid = true_exponential(s(1.0), s(0.25), 500, 1000, &math).to_f64();
        assert!((mid - 0.5).abs() < 1e-3, "{}", mid);
    }

    #[test]
    fn test_true_exponential_attack_from_zero_stays_in_range() {
        let math = LutMath;
        // 0.0002 -> 200 spans ~20 octaves; anchoring at the top keeps exp2 <= 1
        let mut last = Sample::ZERO;
        for e in (0..1000).step_by(50) {
            let v = true_exponential(s(0.0), s(200.0), e, 1000, &math);
            assert!(v >= last && v.to_f64() <= 200.0, "{} at {}", v, e);
            last = v;
        }
    }

    #[test]
    fn test_hardware_attack_meets_start_and_rises_fast() {
        let math = LutMath;
        let start = hardware_exponential(s(0.0), s(1.0), 0, 1000, &math).to_f64();
        let quarter = hardware_exponential(s(0.0), s(1.0), 250, 1000, &math).to_f64();
        let late = hardware_exponential(s(0.0), s(1.0), 990, 1000, &math).to_f64();

        // Bottom of the attack curve is the floor level, 2^(4.25 - 12.375)
        assert!((start - libm_exp2(4.25 - 12.375)).abs() < 1e-3, "{}", start);
        assert!(quarter > start && late > quarter);
        assert!((late - 1.0).abs() < 0.05, "{}", late);
    }

    #[test]
    fn test_hardware_decay_is_true_exponential() {
        let math = LutMath;
        assert_eq!(
            hardware_exponential(s(1.0), s(0.25), 300, 1000, &math),
            true_exponential(s(1.0), s(0.25), 300, 1000, &math)
        );
    }

    #[test]
    fn test_hardware_attack_below_floor_falls_back() {
        let math = LutMath;
        assert_eq!(
            hardware_exponential(s(0.0001), s(0.001), 300, 1000, &math),
            true_exponential(s(0.0001), s(0.001), 300, 1000, &math)
        );
    }

    fn libm_exp2(x: f64) -> f64 {
        (x * core::f64::consts::LN_2).exp()
    }
}
