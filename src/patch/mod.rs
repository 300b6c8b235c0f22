//! Instrument configuration structures.
//!
//! These are plain mutable structs with no validation layer: the render
//! path reads them on every sample and out-of-domain values (negative
//! durations, cutoff outside [0, 1)) are a caller contract violation,
//! not a runtime-detected error. Apply edits only between render blocks,
//! matching the control-queue discipline.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Oscillators per voice.
pub const OSCILLATOR_COUNT: usize = 2;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveShape {
    Square,
    Saw,
    Triangle,
    Sine,
    Random,
}

/// How an oscillator folds its output into the voice's running signal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineLaw {
    /// Add to the running signal.
    Mix,
    /// Multiply the running signal by a blend between 1.0 and this
    /// oscillator's value, weighted by its Volume-LFO base value.
    Mul,
    /// Multiply by `1 - 0.5 * (value + volume)`. An approximation of
    /// ring modulation, kept exactly as the shipped behavior.
    Ring,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyphonyMode {
    /// All six voices sound independently.
    Poly,
    /// Held notes cycle at block rate; only voice slot 0 is rendered.
    Arpeggio,
    /// Monophonic glide between successive notes; only voice 0 is used.
    Portamento,
}

/// Modulation destination for one of an oscillator's six LFOs.
///
/// Tune is the only zero-centered destination: its static value is 0
/// rather than the LFO's base value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoDestination {
    Tune,
    Morph,
    Squish,
    Distort,
    Volume,
    Decat,
}

impl LfoDestination {
    pub const COUNT: usize = 6;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoConfig {
    /// Seconds before the LFO output fades in after note-on.
    pub delay: f32,
    /// Seconds to ramp the waveform contribution in after `delay`.
    pub attack: f32,
    /// Waveform amplitude applied on top of `base_value`.
    pub magnitude: f32,
    /// Nominal rate parameter. Not currently applied to the phase
    /// advance; the cursor always moves one sample per sample.
    pub rate: f32,
    /// Static value of this destination (DC offset for non-centered
    /// destinations, scale for the waveform term).
    pub base_value: f32,
    pub shape: WaveShape,
    /// Reset the phase cursor on note-on.
    pub note_sync: bool,
}

impl Default for LfoConfig {
    fn default() -> Self {
        Self {
            delay: 0.0,
            attack: 0.1,
            magnitude: 0.0,
            rate: 0.0,
            base_value: 1.0,
            shape: WaveShape::Sine,
            note_sync: false,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeConfig {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorConfig {
    /// One LFO per destination, indexed by `LfoDestination`.
    pub lfo: [LfoConfig; LfoDestination::COUNT],
    /// Octave shift: frequency doubles (or halves) per step.
    pub octave_offset: i8,
    /// Semitone shift added to the sounding note.
    pub semitone_offset: i8,
    pub combine: CombineLaw,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            lfo: [LfoConfig::default(); LfoDestination::COUNT],
            octave_offset: 0,
            semitone_offset: 0,
            combine: CombineLaw::Mul,
        }
    }
}

/// Shared instrument configuration, read on every render step.
///
/// Concurrent mutation during render is the caller's responsibility to
/// avoid; apply changes only at block boundaries.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentConfig {
    pub oscillators: [OscillatorConfig; OSCILLATOR_COUNT],
    pub amp_env: EnvelopeConfig,
    pub filter_env: EnvelopeConfig,
    /// Dry/wet weight of the filtered signal, scaled by the filter
    /// envelope at blend time.
    pub filter_drive: f32,
    /// Normalized cutoff in [0, 1) as a fraction of Nyquist.
    pub filter_cutoff: f32,
    /// Resonance in [0, 1].
    pub filter_resonance: f32,
    pub left_gain: f32,
    pub right_gain: f32,
    /// Glide duration used by `PolyphonyMode::Portamento`, in seconds.
    pub portamento_time: f32,
    pub polyphony: PolyphonyMode,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            oscillators: [OscillatorConfig::default(); OSCILLATOR_COUNT],
            amp_env: EnvelopeConfig::default(),
            filter_env: EnvelopeConfig::default(),
            filter_drive: 0.0,
            filter_cutoff: 0.0,
            filter_resonance: 0.0,
            left_gain: 0.0,
            right_gain: 0.0,
            portamento_time: 0.5,
            polyphony: PolyphonyMode::Poly,
        }
    }
}
