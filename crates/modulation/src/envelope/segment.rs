//! Envelope segment evaluation.
//!
//! A segment runs from `(start, from)` to `(end, to)` on the clock of the
//! gate transition that opened it: note-on for key-on segments, note-off for
//! the release segment.

use fxsynth_math::{Sample, Transcendental};

use super::curve::{self, Curve};

/// One leg of the envelope between two breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Ticks at which the segment starts.
    pub start: u64,
    /// Value at `start`.
    pub from: Sample,
    /// Ticks at which the segment reaches `to`.
    pub end: u64,
    /// Value at `end`.
    pub to: Sample,
}

impl Segment {
    /// Create a segment.
    #[inline]
    pub const fn new(start: u64, from: Sample, end: u64, to: Sample) -> Self {
        Self {
            start,
            from,
            end,
            to,
        }
    }

    /// Value of the segment `elapsed` ticks after its gate transition.
    ///
    /// Returns `to` exactly at (or past) `end`, and for zero-length
    /// segments, so no ratio is ever taken over an empty span. Likewise
    /// returns `from` exactly at (or before) `start`.
    ///
    /// If either endpoint is negative the curve runs on the negated
    /// endpoints and the result is negated back. For the linear curve this
    /// is plain interpolation; the exponential curves assume both endpoints
    /// share a sign.
    pub fn evaluate<T: Transcendental>(&self, curve: Curve, elapsed: u64, math: &T) -> Sample {
        if self.end <= self.start || elapsed >= self.end {
            return self.to;
        }
        if elapsed <= self.start {
            return self.from;
        }

        let negate = self.from.is_negative() || self.to.is_negative();
        let (from, to) = if negate {
            (-self.from, -self.to)
        } else {
            (self.from, self.to)
        };

        let span = self.end - self.start;
        let into = elapsed.saturating_sub(self.start);
        let value = match curve {
            Curve::Linear => curve::linear(from, to, into, span),
            Curve::TrueExponential => curve::true_exponential(from, to, into, span, math),
            Curve::HardwareExponential => curve::hardware_exponential(from, to, into, span, math),
            Curve::FalseExponential => curve::false_exponential(from, to, into, span, math),
        };

        if negate {
            -value
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use fxsynth_math::LutMath;

    fn s(x: f64) -> Sample {
        Sample::from_f64(x)
    }

    const ALL_CURVES: [Curve; 4] = [
        Curve::Linear,
        Curve::TrueExponential,
        Curve::HardwareExponential,
        Curve::FalseExponential,
    ];

    #[test]
    fn test_end_is_exact_for_every_curve() {
        let seg = Segment::new(100, s(0.0), 300, s(0.0001));
        for curve in ALL_CURVES {
            assert_eq!(seg.evaluate(curve, 300, &LutMath), s(0.0001), "{:?}", curve);
        }
    }

    #[test]
    fn test_zero_length_segment_jumps() {
        let seg = Segment::new(50, s(1.0), 50, s(0.25));
        for curve in ALL_CURVES {
            assert_eq!(seg.evaluate(curve, 50, &LutMath), s(0.25));
            assert_eq!(seg.evaluate(curve, 10, &LutMath), s(0.25));
        }
    }

    #[test]
    fn test_start_of_segment_is_from_value() {
        let seg = Segment::new(100, s(0.5), 200, s(1.0));
        assert_eq!(seg.evaluate(Curve::Linear, 100, &LutMath), s(0.5));
        let fe = seg.evaluate(Curve::FalseExponential, 100, &LutMath).to_f64();
        assert!((fe - 0.5).abs() < 1e-3, "{}", fe);
    }

    #[test]
    fn test_negative_endpoints_mirror_positive() {
        let pos = Segment::new(0, s(0.8), 1000, s(0.1));
        let neg = Segment::new(0, s(-0.8), 1000, s(-0.1));
        for curve in ALL_CURVES {
            assert_eq!(
                neg.evaluate(curve, 400, &LutMath),
                -pos.evaluate(curve, 400, &LutMath),
                "{:?}",
                curve
            );
        }
    }

    #[test]
    fn test_spans_beyond_u32_stay_in_range() {
        let seg = Segment::new(0, s(1.0), 1 << 40, s(0.01));
        let half = 1u64 << 39;

        let geometric = seg.evaluate(Curve::TrueExponential, half, &LutMath).to_f64();
        assert!((geometric - 0.1).abs() < 1e-3, "{}", geometric);

        let linear = seg.evaluate(Curve::Linear, half, &LutMath).to_f64();
        assert!((linear - 0.505).abs() < 1e-3, "{}", linear);

        for curve in ALL_CURVES {
            let value = seg.evaluate(curve, (1 << 40) - 1, &LutMath);
            assert!(value >= s(0.0) && value <= s(1.0), "{:?}: {}", curve, value);
        }
    }

    #[test]
    fn test_mixed_sign_linear_is_plain_interpolation() {
        let seg = Segment::new(0, s(-0.5), 1000, s(0.5));
        assert_eq!(seg.evaluate(Curve::Linear, 500, &LutMath), s(0.0));
        assert_eq!(seg.evaluate(Curve::Linear, 750, &LutMath), s(0.25));
    }
}
