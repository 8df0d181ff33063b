#![no_std]

//! # fxsynth Modulation
//!
//! No-std envelope and modulation core for an integer-only synthesizer.
//!
//! This crate provides:
//!
//! - [`VoiceEnvelope`] - Per-voice breakpoint envelopes with gate handling,
//!   sustain, release and cross-set release coupling
//! - [`BreakpointSet`] - Validated (time, value) lists with a [`Curve`] shape
//! - [`compute_mod_value`] / [`compute_mod_scale`] - Once-per-frame
//!   modulation outputs, memoized on the global sample clock
//! - [`ModulationRates`] - Trait for the per-waveform rate functions the
//!   oscillator bank supplies
//!
//! All values are [`Sample`](fxsynth_math::Sample) fixed-point. Evaluation
//! takes the clock value explicitly and never allocates, logs or panics;
//! only configuration paths log.
//!
//! # Example
//!
//! ```rust
//! use fxsynth_math::{LutMath, Sample};
//! use fxsynth_modulation::{BreakpointSet, Curve, Voice};
//! use fxsynth_timing::SampleClock;
//!
//! let mut clock = SampleClock::new(48000.0);
//! let mut voice = Voice::new();
//!
//! // 10 ms attack, 90 ms decay to 0.6, 200 ms release
//! let amp = BreakpointSet::from_ms_pairs(
//!     &[(10.0, 1.0), (100.0, 0.6), (200.0, 0.0)],
//!     Curve::FalseExponential,
//!     &clock,
//! )
//! .unwrap();
//! voice.set_breakpoints(0, amp);
//!
//! voice.note_on(clock.now());
//! let mut level = Sample::ZERO;
//! for _ in 0..4800 {
//!     level = voice.breakpoint_scale(0, clock.now(), &LutMath);
//!     clock.advance();
//! }
//! // Past the decay: sustaining at 0.6
//! assert_eq!(level, Sample::from_f32(0.6));
//! ```

mod envelope;
mod error;
mod mod_cache;
mod traits;
mod waveform;

// Re-export all public types
pub use envelope::{
    Breakpoint, BreakpointSet, Curve, EnvelopePhase, Segment, Voice, VoiceEnvelope,
    BREAKPOINT_EPS, EXP_RATE, MAX_BREAKPOINTS, MAX_BREAKPOINT_SETS, OVERSHOOT,
};
pub use error::BreakpointError;
pub use mod_cache::{assign_mod_source, compute_mod_scale, compute_mod_value, ModValueCache};
pub use traits::ModulationRates;
pub use waveform::Waveform;
