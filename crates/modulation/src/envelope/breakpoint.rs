//! Breakpoints and breakpoint sets.
//!
//! A breakpoint set is an ordered list of (time, value) pairs. Every entry
//! but the last is a key-on breakpoint, timed from note-on. The last entry
//! is the release point, timed from note-off; it is never a sustain level.

use fxsynth_math::Sample;
use fxsynth_timing::SampleClock;

use super::Curve;
use crate::BreakpointError;

/// Largest breakpoint magnitude a [`Sample`] can hold.
const VALUE_LIMIT: f32 = 256.0;

/// One envelope control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoint {
    /// Clock ticks from the gate transition that starts this segment.
    pub time: u32,
    /// Value reached at `time`.
    pub value: Sample,
}

impl Breakpoint {
    /// Create a breakpoint.
    #[inline]
    pub const fn new(time: u32, value: Sample) -> Self {
        Self { time, value }
    }
}

/// Up to `N` breakpoints plus the curve shape used between them.
///
/// Slots are filled front to back. The set's length is the number of
/// filled slots before the first empty one; anything after an empty slot
/// is never read.
///
/// # Example
///
/// ```rust
/// use fxsynth_modulation::{BreakpointSet, Curve};
///
/// // Attack to 1.0 over 100 ticks, decay to 0.5 by tick 300, release to 0 in 200
/// let set = BreakpointSet::<8>::from_pairs(
///     &[(100, 1.0), (300, 0.5), (200, 0.0)],
///     Curve::Linear,
/// )
/// .unwrap();
///
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.release_point().map(|bp| bp.time), Some(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakpointSet<const N: usize> {
    points: [Option<Breakpoint>; N],
    curve: Curve,
}

impl<const N: usize> Default for BreakpointSet<N> {
    fn default() -> Self {
        Self::new(Curve::default())
    }
}

impl<const N: usize> BreakpointSet<N> {
    /// Create an empty set.
    pub const fn new(curve: Curve) -> Self {
        Self {
            points: [None; N],
            curve,
        }
    }

    /// Build a set from `(ticks, value)` pairs.
    pub fn from_pairs(pairs: &[(u32, f32)], curve: Curve) -> Result<Self, BreakpointError> {
        let mut set = Self::new(curve);
        for &(time, value) in pairs {
            let index = set.len();
            set.push(time, value).inspect_err(|err| {
                log::warn!("rejected breakpoint {} of {}: {}", index, pairs.len(), err);
            })?;
        }
        log::debug!("configured {} breakpoints ({:?})", set.len(), curve);
        Ok(set)
    }

    /// Build a set from `(milliseconds, value)` pairs, converting times to
    /// clock ticks at the clock's sample rate.
    pub fn from_ms_pairs(
        pairs: &[(f32, f32)],
        curve: Curve,
        clock: &SampleClock,
    ) -> Result<Self, BreakpointError> {
        let mut set = Self::new(curve);
        for &(ms, value) in pairs {
            let index = set.len();
            set.push(clock.ms_to_samples(ms), value).inspect_err(|err| {
                log::warn!("rejected breakpoint {} ({} ms): {}", index, ms, err);
            })?;
        }
        log::debug!(
            "configured {} breakpoints at {} Hz ({:?})",
            set.len(),
            clock.sample_rate(),
            curve
        );
        Ok(set)
    }

    /// Append a breakpoint.
    ///
    /// The new entry becomes the release point, and the previous release
    /// point becomes a key-on breakpoint, so that entry is the one checked
    /// for time order.
    pub fn push(&mut self, time: u32, value: f32) -> Result<(), BreakpointError> {
        let len = self.len();
        if len >= N {
            return Err(BreakpointError::TooManyBreakpoints { capacity: N });
        }
        if !value.is_finite() || value.abs() >= VALUE_LIMIT {
            return Err(BreakpointError::ValueOutOfRange { index: len, value });
        }
        if len >= 2 {
            if let (Some(prev), Some(last)) = (self.points[len - 2], self.points[len - 1]) {
                if last.time < prev.time {
                    return Err(BreakpointError::NonMonotonicTime {
                        index: len - 1,
                        time: last.time,
                        previous: prev.time,
                    });
                }
            }
        }
        self.points[len] = Some(Breakpoint::new(time, Sample::from_f32(value)));
        Ok(())
    }

    /// Remove every breakpoint, keeping the curve.
    pub fn clear(&mut self) {
        self.points = [None; N];
    }

    /// Number of breakpoints, counted up to the first empty slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.points
            .iter()
            .position(Option::is_none)
            .unwrap_or(N)
    }

    /// True if the set has no breakpoints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.first().map_or(true, Option::is_none)
    }

    /// Breakpoint at `index`, if it is within the set.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Breakpoint> {
        if index < self.len() {
            self.points[index]
        } else {
            None
        }
    }

    /// Breakpoint at `index`, for indices already known to be below `len()`.
    #[inline]
    pub(crate) fn at(&self, index: usize) -> Breakpoint {
        self.points.get(index).copied().flatten().unwrap_or_default()
    }

    /// The last breakpoint, reached at the end of release.
    #[inline]
    pub fn release_point(&self) -> Option<Breakpoint> {
        self.len().checked_sub(1).and_then(|last| self.points[last])
    }

    /// Interpolation curve between breakpoints.
    #[inline]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Change the interpolation curve.
    #[inline]
    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }

    /// Iterate over the breakpoints in order.
    pub fn iter(&self) -> impl Iterator<Item = Breakpoint> + '_ {
        self.points.iter().map_while(|slot| *slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let set = BreakpointSet::<4>::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.release_point(), None);
        assert_eq!(set.curve(), Curve::FalseExponential);
    }

    #[test]
    fn test_len_stops_at_first_gap() {
        let mut set = BreakpointSet::<4>::new(Curve::Linear);
        set.points[0] = Some(Breakpoint::new(10, Sample::ONE));
        set.points[2] = Some(Breakpoint::new(30, Sample::ZERO));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(2), None);
        assert_eq!(set.release_point().map(|bp| bp.time), Some(10));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn test_push_rejects_overflow() {
        let mut set = BreakpointSet::<2>::new(Curve::Linear);
        set.push(0, 0.0).unwrap();
        set.push(10, 1.0).unwrap();
        assert_eq!(
            set.push(20, 0.0),
            Err(BreakpointError::TooManyBreakpoints { capacity: 2 })
        );
    }

    #[test]
    fn test_release_time_is_unconstrained() {
        // Release is timed from note-off, so it may be shorter than attack
        let set = BreakpointSet::<4>::from_pairs(&[(100, 1.0), (500, 0.5), (50, 0.0)], Curve::Linear);
        assert!(set.is_ok());
    }

    #[test]
    fn test_key_on_times_must_not_decrease() {
        let err = BreakpointSet::<4>::from_pairs(&[(100, 1.0), (50, 0.5), (10, 0.0)], Curve::Linear)
            .unwrap_err();
        assert_eq!(
            err,
            BreakpointError::NonMonotonicTime {
                index: 1,
                time: 50,
                previous: 100
            }
        );
    }

    #[test]
    fn test_value_range() {
        let mut set = BreakpointSet::<4>::new(Curve::Linear);
        assert!(set.push(0, 255.9).is_ok());
        assert!(matches!(
            set.push(0, 256.0),
            Err(BreakpointError::ValueOutOfRange { index: 1, .. })
        ));
        assert!(set.push(0, f32::INFINITY).is_err());
        assert!(set.push(0, f32::NAN).is_err());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear_keeps_curve() {
        let mut set =
            BreakpointSet::<4>::from_pairs(&[(0, 1.0), (10, 0.0)], Curve::TrueExponential).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.curve(), Curve::TrueExponential);
    }

    #[test]
    fn test_ms_pairs_use_clock_rate() {
        let clock = SampleClock::new(48000.0);
        let set =
            BreakpointSet::<4>::from_ms_pairs(&[(10.0, 1.0), (250.0, 0.0)], Curve::Linear, &clock)
                .unwrap();
        assert_eq!(set.get(0).map(|bp| bp.time), Some(480));
        assert_eq!(set.get(1).map(|bp| bp.time), Some(12000));
    }
}
