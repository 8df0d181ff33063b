//! Trait interfaces for the oscillator side of modulation.
//!
//! This module defines:
//! - [`ModulationRates`] - Per-waveform modulation-rate functions supplied by
//!   the oscillator bank

use fxsynth_math::Sample;

/// Per-waveform modulation-rate functions.
///
/// Implemented by whatever owns the oscillators. Each function computes the
/// modulation output of oscillator `osc` for the current frame.
///
/// # Implementation Requirements
///
/// - Rate functions may advance the oscillator's phase as a side effect, so
///   each must be called at most once per oscillator per frame. The
///   modulation cache guarantees this for its callers.
/// - All methods must complete in constant time (O(1))
/// - No heap allocations permitted
pub trait ModulationRates {
    /// White-noise modulation.
    fn noise(&mut self, osc: usize) -> Sample;

    /// Falling-sawtooth modulation.
    fn saw_down(&mut self, osc: usize) -> Sample;

    /// Rising-sawtooth modulation.
    fn saw_up(&mut self, osc: usize) -> Sample;

    /// Pulse modulation.
    fn pulse(&mut self, osc: usize) -> Sample;

    /// Triangle modulation.
    fn triangle(&mut self, osc: usize) -> Sample;

    /// Sine modulation.
    fn sine(&mut self, osc: usize) -> Sample;

    /// PCM sample-playback modulation. Only called when
    /// [`pcm_loaded`](Self::pcm_loaded) is true.
    fn pcm(&mut self, osc: usize) -> Sample;

    /// True if a PCM sample bank is available.
    fn pcm_loaded(&self) -> bool;

    /// Bring the envelope and parameter bookkeeping of oscillator `source`
    /// up to date before its modulation output is read.
    fn refresh_envelope(&mut self, source: usize);
}
