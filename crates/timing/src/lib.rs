#![no_std]

//! # fxsynth Timing
//!
//! The global sample clock the envelope evaluator and modulation cache are
//! keyed on.
//!
//! - [`SampleClock`] - Monotonic frame counter plus the sample rate used to
//!   convert millisecond configuration into clock ticks
//!
//! The clock is owned by the audio driver and advanced exactly once per
//! output frame, after every evaluator and cache call for that frame has
//! completed. Everything downstream takes the clock *value* (`u64`), so tests
//! can hand in synthetic times without constructing a clock.
//!
//! # Example
//!
//! ```rust
//! use fxsynth_timing::SampleClock;
//!
//! let mut clock = SampleClock::new(48000.0);
//! assert_eq!(clock.ms_to_samples(10.0), 480);
//!
//! clock.advance_block(64);
//! assert_eq!(clock.now(), 64);
//! ```

mod clock;

pub use clock::SampleClock;

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;
