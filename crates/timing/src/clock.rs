//! Sample-accurate global clock.

use crate::DEFAULT_SAMPLE_RATE;

/// Global sample clock for the synthesizer.
///
/// Counts elapsed output frames from 0. The count only moves forward
/// (except through [`reset`](Self::reset)), which is what lets the
/// modulation cache use it as a per-frame memoization key.
///
/// # Example
///
/// ```rust
/// use fxsynth_timing::SampleClock;
///
/// let mut clock = SampleClock::default();
///
/// for _ in 0..64 {
///     let now = clock.now();
///     // evaluate envelopes and modulation for frame `now`...
///     # let _ = now;
///     clock.advance();
/// }
/// assert_eq!(clock.now(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleClock {
    /// Frames elapsed since start (or the last reset)
    position: u64,
    /// Current sample rate in Hz
    sample_rate: f32,
}

impl Default for SampleClock {
    fn default() -> Self {
        Self {
            position: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl SampleClock {
    /// Create a clock at position 0 with the specified sample rate.
    ///
    /// # Panics
    /// Panics if `sample_rate <= 0.0` or is not finite
    pub fn new(sample_rate: f32) -> Self {
        assert!(
            sample_rate > 0.0 && sample_rate.is_finite(),
            "Sample rate must be positive"
        );
        Self {
            position: 0,
            sample_rate,
        }
    }

    /// Current clock value in frames.
    #[inline]
    pub fn now(&self) -> u64 {
        self.position
    }

    /// Get the current sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Advance by one frame.
    #[inline]
    pub fn advance(&mut self) {
        self.position = self.position.wrapping_add(1);
    }

    /// Advance by a whole block of frames.
    #[inline]
    pub fn advance_block(&mut self, frames: u32) {
        self.position = self.position.wrapping_add(frames as u64);
    }

    /// Convert milliseconds to clock ticks (rounded to nearest).
    ///
    /// Negative or NaN input gives 0; durations beyond `u32::MAX` ticks
    /// saturate.
    #[inline]
    pub fn ms_to_samples(&self, ms: f32) -> u32 {
        libm::roundf((ms / 1000.0) * self.sample_rate) as u32
    }

    /// Convert a tick count to seconds.
    #[inline]
    pub fn samples_to_seconds(&self, samples: u64) -> f64 {
        samples as f64 / self.sample_rate as f64
    }

    /// Update the sample rate. The position is preserved.
    ///
    /// # Panics
    /// Panics if `new_rate <= 0.0` or is not finite
    pub fn set_sample_rate(&mut self, new_rate: f32) {
        assert!(
            new_rate > 0.0 && new_rate.is_finite(),
            "Sample rate must be positive"
        );
        log::debug!("sample clock rate {} -> {} Hz", self.sample_rate, new_rate);
        self.sample_rate = new_rate;
    }

    /// Reset to frame 0.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
