//! Oscillator waveform kinds.

/// Waveform kinds an oscillator can run.
///
/// The generators themselves live outside this crate. The envelope
/// evaluator only needs the kind to decide on the partial release hold, and
/// the modulation cache uses it to pick the matching modulation-rate
/// function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Waveform {
    /// Band-limited sine.
    #[default]
    Sine,
    /// Variable duty-cycle pulse.
    Pulse,
    /// Falling sawtooth.
    SawDown,
    /// Rising sawtooth.
    SawUp,
    /// Triangle.
    Triangle,
    /// White noise.
    Noise,
    /// Plucked-string physical model.
    KarplusStrong,
    /// Sample playback from the PCM bank.
    Pcm,
    /// FM algorithm (a group of operator oscillators).
    Algo,
    /// A single sinusoidal partial of an additive voice.
    Partial,
    /// Additive voice driving a set of partials.
    Partials,
    /// Oscillator silenced.
    Off,
}

impl Waveform {
    /// True if the generator needs one more frame at full scale after its
    /// envelope completes release, so it can fade itself out without a click.
    #[inline]
    pub const fn holds_release_frame(self) -> bool {
        matches!(self, Waveform::Partial)
    }
}
