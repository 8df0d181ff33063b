//! Envelope phase definitions.

/// Where a breakpoint set stands at a given clock value.
///
/// Derived on demand from the gate timestamps and the breakpoint times;
/// nothing is stored, so the phase always agrees with what
/// [`VoiceEnvelope::breakpoint_scale`](super::VoiceEnvelope::breakpoint_scale)
/// would compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopePhase {
    /// Neither note-on nor note-off has been seen.
    #[default]
    Idle,
    /// The set has no breakpoints; the output follows the gate.
    KeyGate,
    /// Progressing through the key-on segments.
    KeyOn {
        /// Index of the breakpoint the current segment ends on.
        segment: usize,
    },
    /// Past every key-on segment, holding the last key-on value.
    Sustain,
    /// Moving from the last key-on value towards the release point.
    Release,
    /// Past the release point.
    Complete,
}

impl EnvelopePhase {
    /// True while the gate is on.
    #[inline]
    pub const fn is_key_on(self) -> bool {
        matches!(self, EnvelopePhase::KeyOn { .. } | EnvelopePhase::Sustain)
    }

    /// True once nothing more will change for this set.
    #[inline]
    pub const fn is_finished(self) -> bool {
        matches!(self, EnvelopePhase::Idle | EnvelopePhase::Complete)
    }
}
