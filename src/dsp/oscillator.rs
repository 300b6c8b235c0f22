use crate::dsp::distortion::soft_saturate;
use crate::dsp::lfo::{LfoState, RandState};
use crate::patch::{CombineLaw, LfoDestination, OscillatorConfig};

/*
Oscillator Core
===============

One oscillator produces a continuously morphable waveform from a phase
cursor in [0, 1), driven entirely by its six LFO destinations:

  Volume   output level, floored at 0
  Morph    pulse/sine/saw morph exponent (clamped to [0, 1])
  Squish   flatness of the transfer curve
  Distort  soft-saturation drive
  Tune     additive frequency offset in Hz (zero-centered)
  Decat    phase decimation amount

The waveform is a symmetric nested power curve: the cursor is raised to
a morph-derived exponent, pushed through a flatness transfer, and the
upper half-cycle mirrors the lower with inverted sign. Decimation
quantizes the cursor to a small number of steps per cycle before
shaping, which aliases on purpose; a fixed one-pole smoothing pass at
mix 0.4 keeps the stepped output from spraying energy everywhere.
*/

/// Step counts above this disable phase decimation entirely.
const DECIMATION_OFF: f32 = 1000.0;

/// One-pole smoothing weight given to the freshly shaped sample.
const SMOOTHING: f32 = 0.4;

/// Equal-temperament conversion, A4 = 440 Hz at note 69.
#[inline]
pub fn note_to_freq(note: f32) -> f32 {
    440.0 * 1.059463_f32.powf(note - 69.0)
}

/// Waveform-shape inputs derived from the Morph/Squish/Decat values.
#[derive(Debug, Clone, Copy)]
pub struct ShapeParams {
    exponent: f32,
    flatness: f32,
    steps: f32,
}

impl ShapeParams {
    pub fn from_modulation(morph: f32, squish: f32, decat: f32) -> Self {
        let alpha = 0.4 + 0.6 * morph.clamp(0.0, 1.0);
        Self {
            exponent: alpha.powi(10) * 30.0,
            flatness: squish * squish * squish * 8.0,
            steps: (1.0 + 1.0 / (decat * decat * decat + 0.001)).ceil(),
        }
    }
}

fn transfer(x: f32, flatness: f32) -> f32 {
    if x < 0.5 {
        0.5 - 0.5 * (1.0 - 2.0 * x).powf(flatness)
    } else {
        0.5 + 0.5 * (2.0 * x - 1.0).powf(flatness)
    }
}

/// Evaluate the morphable waveform at a (possibly quantized) cursor.
pub fn shape_sample(cursor: f32, params: &ShapeParams) -> f32 {
    let cursor = if params.steps > DECIMATION_OFF {
        cursor
    } else {
        (cursor * params.steps).floor() / params.steps + 0.5 / params.steps
    };

    if cursor < 0.5 {
        1.0 - transfer(cursor.powf(params.exponent) * 2.0, params.flatness)
    } else {
        let mirrored = 1.0 - cursor;
        -(1.0 - transfer(mirrored.powf(params.exponent) * 2.0, params.flatness))
    }
}

/// Per-(voice, oscillator) transient state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorState {
    /// Phase cursor in [0, 1), advanced by wraparound.
    pub cursor: f32,
    /// Previous smoothed output sample.
    pub prev: f32,
    /// One phase cursor per modulation destination.
    pub lfo: [LfoState; LfoDestination::COUNT],
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self {
            cursor: 0.0,
            prev: 0.0,
            lfo: [LfoState::default(); LfoDestination::COUNT],
        }
    }
}

impl OscillatorState {
    /// Forward the trigger to every note-synced LFO.
    pub fn note_on(&mut self, config: &OscillatorConfig) {
        for (state, lfo_config) in self.lfo.iter_mut().zip(&config.lfo) {
            state.note_on(lfo_config);
        }
    }

    #[inline]
    fn modulation(
        &mut self,
        config: &OscillatorConfig,
        dest: LfoDestination,
        note_time: f32,
        sample_rate: f32,
        rng: &mut RandState,
    ) -> f32 {
        let idx = dest.index();
        self.lfo[idx].update(
            &config.lfo[idx],
            note_time,
            dest == LfoDestination::Tune,
            sample_rate,
            rng,
        )
    }

    /// Synthesize one sample and fold it into the voice's running
    /// signal per the configured combine law. Returns the smoothed
    /// sample for inspection.
    pub fn tick(
        &mut self,
        config: &OscillatorConfig,
        note_time: f32,
        base_note: f32,
        sample_rate: f32,
        rng: &mut RandState,
        running: &mut f32,
    ) -> f32 {
        let volume = self
            .modulation(config, LfoDestination::Volume, note_time, sample_rate, rng)
            .max(0.0);
        let morph = self.modulation(config, LfoDestination::Morph, note_time, sample_rate, rng);
        let squish = self.modulation(config, LfoDestination::Squish, note_time, sample_rate, rng);
        let distort =
            self.modulation(config, LfoDestination::Distort, note_time, sample_rate, rng);
        let tune = self.modulation(config, LfoDestination::Tune, note_time, sample_rate, rng);
        let decat = self.modulation(config, LfoDestination::Decat, note_time, sample_rate, rng);

        let mut frequency = note_to_freq(base_note + config.semitone_offset as f32);
        let mut octave = config.octave_offset;
        while octave > 0 {
            frequency *= 2.0;
            octave -= 1;
        }
        while octave < 0 {
            frequency *= 0.5;
            octave += 1;
        }

        let params = ShapeParams::from_modulation(morph, squish, decat);
        let mut value = shape_sample(self.cursor, &params);
        value = soft_saturate(value, distort);
        value *= volume;

        // One-pole low-pass toward the previous sample.
        value = value * SMOOTHING + self.prev * (1.0 - SMOOTHING);
        self.prev = value;

        match config.combine {
            CombineLaw::Mix => *running += value,
            CombineLaw::Mul => {
                let blend = config.lfo[LfoDestination::Volume.index()].base_value;
                *running *= (1.0 - blend) + blend * value;
            }
            CombineLaw::Ring => *running *= 1.0 - 0.5 * (value + volume),
        }

        self.cursor += (frequency + tune).max(0.0) / sample_rate;
        self.cursor -= self.cursor.floor();

        value
    }
}
