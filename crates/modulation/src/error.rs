//! Breakpoint configuration errors.
//!
//! Raised only while building a [`BreakpointSet`](crate::BreakpointSet).
//! The per-frame evaluator never fails: a missing or empty configuration
//! degrades to the key-gate fallback instead.
//!
//! # Error Codes
//!
//! | Code | Description |
//! |------|-------------|
//! | B001 | More breakpoints than the set can hold |
//! | B002 | Key-on breakpoint times go backwards |
//! | B003 | Breakpoint value is non-finite or outside ±256 |

use core::fmt;

/// Error type for breakpoint validation failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakpointError {
    /// B001: The set already holds `capacity` breakpoints.
    TooManyBreakpoints {
        /// Maximum number of breakpoints in the set.
        capacity: usize,
    },
    /// B002: Breakpoint `index` ends before the key-on breakpoint ahead of it.
    NonMonotonicTime {
        /// Position of the offending breakpoint.
        index: usize,
        /// Its time, in clock ticks.
        time: u32,
        /// Time of the preceding breakpoint.
        previous: u32,
    },
    /// B003: Breakpoint `index` has a value no `Sample` can hold.
    ValueOutOfRange {
        /// Position of the offending breakpoint.
        index: usize,
        /// The rejected value.
        value: f32,
    },
}

impl BreakpointError {
    /// Get the error code string (e.g., "B001").
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooManyBreakpoints { .. } => "B001",
            Self::NonMonotonicTime { .. } => "B002",
            Self::ValueOutOfRange { .. } => "B003",
        }
    }

    /// Get guidance on how to fix this error.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::TooManyBreakpoints { .. } => {
                "Drop intermediate breakpoints; the last one is always the release point."
            }
            Self::NonMonotonicTime { .. } => {
                "Key-on breakpoint times are measured from note-on and must not decrease."
            }
            Self::ValueOutOfRange { .. } => {
                "Breakpoint values must be finite and within (-256.0, 256.0)."
            }
        }
    }
}

impl fmt::Display for BreakpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyBreakpoints { capacity } => {
                write!(f, "[{}] breakpoint set is full ({} entries)", self.code(), capacity)
            }
            Self::NonMonotonicTime {
                index,
                time,
                previous,
            } => write!(
                f,
                "[{}] breakpoint {} at t={} precedes breakpoint {} at t={}",
                self.code(),
                index,
                time,
                index.saturating_sub(1),
                previous
            ),
            Self::ValueOutOfRange { index, value } => {
                write!(f, "[{}] breakpoint {} value {} is out of range", self.code(), index, value)
            }
        }?;
        write!(f, ". {}", self.guidance())
    }
}

impl core::error::Error for BreakpointError {}
