//! Per-frame memoization of modulation outputs.
//!
//! An oscillator used as a modulation source may feed several parameters,
//! and several voices, in the same frame. Its rate function can advance the
//! oscillator's phase, so calling it twice in one frame would run the
//! modulator at double speed. The cache keys each oscillator's last output
//! on the global sample clock and hands back the stored value for every
//! further request in the same frame.

use fxsynth_math::Sample;

use crate::{ModulationRates, VoiceEnvelope, Waveform};

/// The modulation output of one oscillator and the frame it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModValueCache {
    /// Last computed modulation output.
    pub value: Sample,
    /// Clock value `value` was computed at, `None` before the first.
    pub clock: Option<u64>,
}

impl ModValueCache {
    /// An empty cache.
    pub const fn new() -> Self {
        Self {
            value: Sample::ZERO,
            clock: None,
        }
    }

    /// Cached value for frame `now`, if there is one.
    #[inline]
    pub fn get(&self, now: u64) -> Option<Sample> {
        (self.clock == Some(now)).then_some(self.value)
    }

    /// Store `value` as the output for frame `now`.
    #[inline]
    pub fn store(&mut self, now: u64, value: Sample) {
        self.value = value;
        self.clock = Some(now);
    }
}

/// Modulation output of oscillator `osc` for frame `now`.
///
/// The first call in a frame dispatches to the rate function matching the
/// oscillator's waveform and caches the result; later calls in the same
/// frame return the cached value. Waveforms without a rate function (and
/// PCM while no bank is loaded) yield 0.0, as does an out-of-range `osc`.
pub fn compute_mod_value<const SETS: usize, const N: usize, R: ModulationRates>(
    voices: &mut [VoiceEnvelope<SETS, N>],
    osc: usize,
    now: u64,
    rates: &mut R,
) -> Sample {
    let Some(voice) = voices.get_mut(osc) else {
        return Sample::ZERO;
    };
    if let Some(value) = voice.mod_cache.get(now) {
        return value;
    }

    let value = match voice.waveform() {
        Waveform::Noise => rates.noise(osc),
        Waveform::SawDown => rates.saw_down(osc),
        Waveform::SawUp => rates.saw_up(osc),
        Waveform::Pulse => rates.pulse(osc),
        Waveform::Triangle => rates.triangle(osc),
        Waveform::Sine => rates.sine(osc),
        Waveform::Pcm if rates.pcm_loaded() => rates.pcm(osc),
        _ => Sample::ZERO,
    };
    voice.mod_cache.store(now, value);
    value
}

/// Additive modulation input of oscillator `osc` for frame `now`.
///
/// If `osc` has a modulation source other than itself, refreshes that
/// source's envelope and returns its (cached) modulation output. Otherwise
/// returns 0.0, the neutral value for additive modulation.
pub fn compute_mod_scale<const SETS: usize, const N: usize, R: ModulationRates>(
    voices: &mut [VoiceEnvelope<SETS, N>],
    osc: usize,
    now: u64,
    rates: &mut R,
) -> Sample {
    match voices.get(osc).and_then(VoiceEnvelope::mod_source) {
        Some(source) if source != osc => {
            rates.refresh_envelope(source);
            compute_mod_value(voices, source, now, rates)
        }
        _ => Sample::ZERO,
    }
}

/// Route the modulation output of `source` into oscillator `osc`.
///
/// Self-modulation and sources outside the voice array are rejected with a
/// warning and leave `osc` unmodulated. Returns whether the source was
/// accepted.
pub fn assign_mod_source<const SETS: usize, const N: usize>(
    voices: &mut [VoiceEnvelope<SETS, N>],
    osc: usize,
    source: Option<usize>,
) -> bool {
    let count = voices.len();
    let Some(voice) = voices.get_mut(osc) else {
        log::warn!("mod source for oscillator {} ignored: only {} voices", osc, count);
        return false;
    };

    let accepted = match source {
        Some(src) if src == osc => {
            log::warn!("oscillator {} cannot modulate itself", osc);
            false
        }
        Some(src) if src >= count => {
            log::warn!("mod source {} for oscillator {} is out of range ({} voices)", src, osc, count);
            false
        }
        _ => true,
    };

    let source = if accepted { source } else { None };
    log::debug!("oscillator {} mod source {:?}", osc, source);
    voice.set_mod_source(source);
    accepted
}
