#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! # Quick Start
//!
//! ```rust
//! use fxsynth_math::{Phasor, Sample};
//!
//! // Gain stage: both operands below 1.0, so the ±1.0 multiply is safe
//! let sample = Sample::from_f64(0.8);
//! let gain = Sample::from_f64(0.5);
//! let out = sample.mul_r1(gain);
//! assert!((out.to_f64() - 0.4).abs() < 1e-4);
//!
//! // Oscillator phase: advance and read the table position
//! let phase = Phasor::from_f64(0.9).wrapping_sum(Phasor::from_f64(0.2));
//! assert_eq!(phase.table_index(8), 25);
//! ```

// Fixed-point formats and conversions
pub mod fixed;

// Multiply family
pub mod mul;

// Lookup tables and transcendental helpers
pub mod lut;

pub use fixed::{
    GenFixed, LutSample, Phasor, Sample, GEN_FRAC_BITS, LUT_FRAC_BITS, PHASOR_FRAC_BITS,
    SAMPLE_FRAC_BITS,
};
pub use lut::{
    exp2_lut, log2_lut, LutEntry, LutMath, Transcendental, EXP2_LUT, LOG2_FLOOR, LOG2_LUT,
};
pub use mul::{fxmul, fxmul_carry};
