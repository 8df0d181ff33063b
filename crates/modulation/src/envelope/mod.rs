//! Breakpoint Envelope Evaluator
//!
//! Each voice owns a few independent breakpoint sets, one per modulated
//! parameter. Evaluating a set at a clock value gives that parameter's
//! scale for the frame.
//!
//! # Phases
//!
//! - **Key gate**: a set without breakpoints passes the gate through
//!   (1.0 while the note is held, 0.0 after note-off).
//! - **Key-on**: every breakpoint but the last is timed from note-on. The
//!   evaluator finds the first one still ahead and interpolates towards it.
//! - **Sustain**: once past every key-on breakpoint, the value of the last
//!   key-on breakpoint holds until note-off.
//! - **Release**: the last breakpoint is timed from note-off. Release starts
//!   from whatever value the set last produced before note-off, so a note
//!   released mid-attack does not jump.
//!
//! Breakpoints are exact: at a key-on breakpoint's time, and at the end of
//! release, the output is that breakpoint's value whatever the curve.
//!
//! # Release Coupling
//!
//! A voice counts as released only when all of its sets have finished. A set
//! that reaches its release point while another set on the same voice is
//! still releasing (towards a later release time) outputs 1.0 until that
//! set finishes too, so it never cuts the voice short.
//!
//! # Example
//!
//! ```rust
//! use fxsynth_math::{LutMath, Sample};
//! use fxsynth_modulation::{BreakpointSet, Curve, Voice};
//!
//! let mut voice = Voice::new();
//! let amp = BreakpointSet::from_pairs(&[(0, 0.0), (1000, 1.0), (500, 0.0)], Curve::Linear).unwrap();
//! voice.set_breakpoints(0, amp);
//!
//! voice.note_on(0);
//! // elapsed counts from 1, so clock 499 is 500 ticks into the attack
//! assert_eq!(voice.breakpoint_scale(0, 499, &LutMath), Sample::HALF);
//! assert_eq!(voice.breakpoint_scale(0, 999, &LutMath), Sample::ONE);
//! ```

mod breakpoint;
mod curve;
mod segment;
mod state;

// Re-export public types
pub use breakpoint::{Breakpoint, BreakpointSet};
pub use curve::{Curve, BREAKPOINT_EPS, EXP_RATE, OVERSHOOT};
pub use segment::Segment;
pub use state::EnvelopePhase;

use fxsynth_math::{Sample, Transcendental};

use crate::{ModValueCache, Waveform};

/// Breakpoint sets per voice.
pub const MAX_BREAKPOINT_SETS: usize = 2;

/// Breakpoints per set.
pub const MAX_BREAKPOINTS: usize = 8;

/// Envelope and modulation state of one voice.
///
/// # Type Parameters
///
/// * `SETS` - Number of independent breakpoint sets
/// * `N` - Breakpoints per set
///
/// # Real-Time Safety
///
/// [`breakpoint_scale`](Self::breakpoint_scale) is allocation-free, never
/// panics and does not log.
#[derive(Debug, Clone, Copy)]
pub struct VoiceEnvelope<const SETS: usize, const N: usize> {
    /// Waveform the voice's oscillator runs
    waveform: Waveform,

    /// Clock value of the last note-on, cleared by note-off
    note_on_at: Option<u64>,

    /// Clock value of the last note-off, cleared by note-on
    note_off_at: Option<u64>,

    /// One breakpoint set per modulated parameter
    breakpoints: [BreakpointSet<N>; SETS],

    /// Last value produced outside release, per set
    last_scale: [Sample; SETS],

    /// Voice whose modulation output feeds this one
    mod_source: Option<usize>,

    /// Per-frame memo of this voice's own modulation output
    pub(crate) mod_cache: ModValueCache,
}

/// Voice record with the standard capacities.
pub type Voice = VoiceEnvelope<MAX_BREAKPOINT_SETS, MAX_BREAKPOINTS>;

impl<const SETS: usize, const N: usize> Default for VoiceEnvelope<SETS, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a set is at a given clock value, with whatever is needed to finish
/// the evaluation.
enum Locus {
    Idle,
    Gate(Sample),
    KeyOn {
        index: usize,
        segment: Segment,
        elapsed: u64,
    },
    Sustain(Sample),
    Release {
        segment: Segment,
        elapsed: u64,
    },
    Complete(Sample),
}

impl<const SETS: usize, const N: usize> VoiceEnvelope<SETS, N> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create an idle voice with empty breakpoint sets.
    pub const fn new() -> Self {
        Self {
            waveform: Waveform::Sine,
            note_on_at: None,
            note_off_at: None,
            breakpoints: [BreakpointSet::new(Curve::FalseExponential); SETS],
            last_scale: [Sample::ZERO; SETS],
            mod_source: None,
            mod_cache: ModValueCache::new(),
        }
    }

    /// Return the record to its freshly created state.
    pub fn reset(&mut self) {
        log::trace!("voice reset");
        *self = Self::new();
    }

    // =========================================================================
    // Gate Events
    // =========================================================================

    /// Open the gate at clock value `now`.
    pub fn note_on(&mut self, now: u64) {
        log::trace!("note on at {}", now);
        self.note_on_at = Some(now);
        self.note_off_at = None;
    }

    /// Close the gate at clock value `now`.
    pub fn note_off(&mut self, now: u64) {
        log::trace!("note off at {}", now);
        self.note_off_at = Some(now);
        self.note_on_at = None;
    }

    /// Clock value of the last note-on, if the gate is open.
    #[inline]
    pub fn note_on_at(&self) -> Option<u64> {
        self.note_on_at
    }

    /// Clock value of the last note-off, if the gate is closed.
    #[inline]
    pub fn note_off_at(&self) -> Option<u64> {
        self.note_off_at
    }

    /// True while the gate is open.
    #[inline]
    pub fn is_gated(&self) -> bool {
        self.note_on_at.is_some()
    }

    /// True once note-off has been seen.
    #[inline]
    pub fn is_releasing(&self) -> bool {
        self.note_on_at.is_none() && self.note_off_at.is_some()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Waveform of the voice's oscillator.
    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Change the voice's waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        log::debug!("waveform {:?} -> {:?}", self.waveform, waveform);
        self.waveform = waveform;
    }

    /// Breakpoint set `set`, if the voice has one at that index.
    #[inline]
    pub fn breakpoints(&self, set: usize) -> Option<&BreakpointSet<N>> {
        self.breakpoints.get(set)
    }

    /// Mutable breakpoint set `set`, if the voice has one at that index.
    #[inline]
    pub fn breakpoints_mut(&mut self, set: usize) -> Option<&mut BreakpointSet<N>> {
        self.breakpoints.get_mut(set)
    }

    /// Replace breakpoint set `set`. Out-of-range indices are ignored.
    pub fn set_breakpoints(&mut self, set: usize, breakpoints: BreakpointSet<N>) {
        match self.breakpoints.get_mut(set) {
            Some(slot) => {
                log::debug!(
                    "breakpoint set {}: {} points, {:?}",
                    set,
                    breakpoints.len(),
                    breakpoints.curve()
                );
                *slot = breakpoints;
            }
            None => log::warn!("ignoring breakpoint set {} (voice has {})", set, SETS),
        }
    }

    /// Last value set `set` produced outside release.
    #[inline]
    pub fn last_scale(&self, set: usize) -> Option<Sample> {
        self.last_scale.get(set).copied()
    }

    /// Voice whose modulation output feeds this one.
    #[inline]
    pub fn mod_source(&self) -> Option<usize> {
        self.mod_source
    }

    /// Set the modulation source without validation.
    ///
    /// Prefer [`assign_mod_source`](crate::assign_mod_source), which knows
    /// the voice's own index and the size of the voice array.
    #[inline]
    pub fn set_mod_source(&mut self, source: Option<usize>) {
        self.mod_source = source;
    }

    /// Per-frame memo of this voice's modulation output.
    #[inline]
    pub fn mod_cache(&self) -> &ModValueCache {
        &self.mod_cache
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Scale of breakpoint set `set` at clock value `now`.
    ///
    /// Outside release the result is remembered as the set's
    /// [`last_scale`](Self::last_scale), the starting point of a later
    /// release. An out-of-range `set` yields 0.0.
    pub fn breakpoint_scale<T: Transcendental>(&mut self, set: usize, now: u64, math: &T) -> Sample {
        let curve = match self.breakpoints.get(set) {
            Some(points) => points.curve(),
            None => return Sample::ZERO,
        };
        match self.locate(set, now) {
            Locus::Idle => Sample::ZERO,
            Locus::Gate(value) | Locus::Complete(value) => value,
            Locus::KeyOn {
                segment, elapsed, ..
            } => {
                let value = segment.evaluate(curve, elapsed, math);
                self.last_scale[set] = value;
                value
            }
            Locus::Sustain(value) => {
                self.last_scale[set] = value;
                value
            }
            Locus::Release { segment, elapsed } => segment.evaluate(curve, elapsed, math),
        }
    }

    /// Phase of breakpoint set `set` at clock value `now`.
    pub fn phase(&self, set: usize, now: u64) -> EnvelopePhase {
        match self.locate(set, now) {
            Locus::Idle => EnvelopePhase::Idle,
            Locus::Gate(_) => EnvelopePhase::KeyGate,
            Locus::KeyOn { index, .. } => EnvelopePhase::KeyOn { segment: index },
            Locus::Sustain(_) => EnvelopePhase::Sustain,
            Locus::Release { .. } => EnvelopePhase::Release,
            Locus::Complete(_) => EnvelopePhase::Complete,
        }
    }

    /// True once the gate is closed and every set has finished its release.
    ///
    /// Sets without breakpoints finish at note-off.
    pub fn is_released(&self, now: u64) -> bool {
        self.is_releasing()
            && (0..SETS).all(|set| {
                matches!(
                    self.phase(set, now),
                    EnvelopePhase::Complete | EnvelopePhase::KeyGate
                )
            })
    }

    fn locate(&self, set: usize, now: u64) -> Locus {
        let Some(points) = self.breakpoints.get(set) else {
            return Locus::Idle;
        };

        if let Some(on) = self.note_on_at {
            // Counted from 1 so no segment is ever entered at zero elapsed time
            let elapsed = now.saturating_sub(on).saturating_add(1);
            let count = points.len();
            if count == 0 {
                return Locus::Gate(Sample::ONE);
            }

            let key_on = count - 1;
            for index in 0..key_on {
                let end = points.at(index);
                if elapsed < end.time as u64 {
                    let (start, from) = match index.checked_sub(1) {
                        Some(prev) => {
                            let bp = points.at(prev);
                            (bp.time as u64, bp.value)
                        }
                        None => (0, Sample::ZERO),
                    };
                    return Locus::KeyOn {
                        index,
                        segment: Segment::new(start, from, end.time as u64, end.value),
                        elapsed,
                    };
                }
            }

            // Past every key-on breakpoint. A lone release point sustains at full scale.
            let sustain = key_on
                .checked_sub(1)
                .map_or(Sample::ONE, |last| points.at(last).value);
            return Locus::Sustain(sustain);
        }

        if let Some(off) = self.note_off_at {
            let Some(release) = points.release_point() else {
                return Locus::Gate(Sample::ZERO);
            };
            let elapsed = now.saturating_sub(off).saturating_add(1);
            let end = release.time as u64;

            if elapsed > end {
                let value = if self.release_held(set, release.time, elapsed)
                    || self.waveform.holds_release_frame()
                {
                    Sample::ONE
                } else {
                    release.value
                };
                return Locus::Complete(value);
            }

            return Locus::Release {
                segment: Segment::new(0, self.last_scale[set], end, release.value),
                elapsed,
            };
        }

        Locus::Idle
    }

    /// True if another set on this voice releases later and is still
    /// releasing.
    fn release_held(&self, set: usize, release_time: u32, elapsed: u64) -> bool {
        self.breakpoints
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != set)
            .filter_map(|(_, points)| points.release_point())
            .any(|bp| bp.time > release_time && elapsed <= bp.time as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxsynth_math::LutMath;

    fn linear_set(pairs: &[(u32, f32)]) -> BreakpointSet<MAX_BREAKPOINTS> {
        BreakpointSet::from_pairs(pairs, Curve::Linear).unwrap()
    }

    #[test]
    fn test_gate_events_are_exclusive() {
        let mut voice = Voice::new();
        voice.note_on(10);
        assert!(voice.is_gated());
        assert!(!voice.is_releasing());

        voice.note_off(20);
        assert!(!voice.is_gated());
        assert!(voice.is_releasing());
        assert_eq!(voice.note_on_at(), None);
        assert_eq!(voice.note_off_at(), Some(20));

        voice.note_on(30);
        assert_eq!(voice.note_off_at(), None);
    }

    #[test]
    fn test_idle_voice_is_silent_and_stateless() {
        let mut voice = Voice::new();
        voice.set_breakpoints(0, linear_set(&[(10, 1.0), (10, 0.0)]));
        voice.last_scale[0] = Sample::HALF;

        assert_eq!(voice.breakpoint_scale(0, 5, &LutMath), Sample::ZERO);
        assert_eq!(voice.last_scale(0), Some(Sample::HALF));
        assert_eq!(voice.phase(0, 5), EnvelopePhase::Idle);
    }

    #[test]
    fn test_out_of_range_set() {
        let mut voice = Voice::new();
        voice.note_on(0);
        assert_eq!(voice.breakpoint_scale(7, 5, &LutMath), Sample::ZERO);
        assert_eq!(voice.last_scale(7), None);
        assert_eq!(voice.phase(7, 5), EnvelopePhase::Idle);
    }

    #[test]
    fn test_lone_release_point_sustains_at_full_scale() {
        let mut voice = Voice::new();
        voice.set_breakpoints(0, linear_set(&[(100, 0.0)]));
        voice.note_on(0);
        assert_eq!(voice.breakpoint_scale(0, 50, &LutMath), Sample::ONE);
        assert_eq!(voice.phase(0, 50), EnvelopePhase::Sustain);
    }

    #[test]
    fn test_key_on_segment_index() {
        let mut voice = Voice::new();
        voice.set_breakpoints(0, linear_set(&[(100, 1.0), (300, 0.5), (50, 0.0)]));
        voice.note_on(0);
        assert_eq!(voice.phase(0, 0), EnvelopePhase::KeyOn { segment: 0 });
        assert_eq!(voice.phase(0, 150), EnvelopePhase::KeyOn { segment: 1 });
        assert_eq!(voice.phase(0, 400), EnvelopePhase::Sustain);
    }

    #[test]
    fn test_second_segment_starts_from_first_breakpoint() {
        let mut voice = Voice::new();
        voice.set_breakpoints(0, linear_set(&[(100, 1.0), (300, 0.5), (50, 0.0)]));
        voice.note_on(0);
        // elapsed 200 is halfway between (100, 1.0) and (300, 0.5)
        assert_eq!(voice.breakpoint_scale(0, 199, &LutMath), Sample::from_f64(0.75));
    }

    #[test]
    fn test_release_starts_from_last_scale() {
        let mut voice = Voice::new();
        voice.set_breakpoints(0, linear_set(&[(1000, 1.0), (100, 0.0)]));
        voice.note_on(0);
        let held = voice.breakpoint_scale(0, 499, &LutMath);
        assert_eq!(held, Sample::HALF);

        voice.note_off(500);
        // Halfway through release: halfway from 0.5 to 0.0
        let mid = voice.breakpoint_scale(0, 549, &LutMath);
        assert_eq!(mid, Sample::from_f64(0.25));
        // Release never overwrites its starting point
        assert_eq!(voice.last_scale(0), Some(Sample::HALF));
    }

    #[test]
    fn test_partial_holds_past_release() {
        let mut voice = Voice::new();
        voice.set_waveform(Waveform::Partial);
        voice.set_breakpoints(0, linear_set(&[(10, 1.0), (20, 0.0)]));
        voice.note_on(0);
        voice.note_off(100);
        assert_eq!(voice.breakpoint_scale(0, 119, &LutMath), Sample::ZERO);
        assert_eq!(voice.breakpoint_scale(0, 120, &LutMath), Sample::ONE);
        assert_eq!(voice.phase(0, 120), EnvelopePhase::Complete);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut voice = Voice::new();
        voice.set_breakpoints(1, linear_set(&[(10, 1.0), (20, 0.0)]));
        voice.set_mod_source(Some(3));
        voice.note_on(5);
        voice.breakpoint_scale(1, 7, &LutMath);

        voice.reset();

        assert!(!voice.is_gated() && !voice.is_releasing());
        assert!(voice.breakpoints(1).is_some_and(|set| set.is_empty()));
        assert_eq!(voice.last_scale(1), Some(Sample::ZERO));
        assert_eq!(voice.mod_source(), None);
    }
}
