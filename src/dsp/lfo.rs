use std::f32::consts::TAU;

use crate::patch::{LfoConfig, WaveShape};

/*
LFO Modulator
=============

Each (oscillator, destination) pair owns one LfoState: a bare phase
cursor in [0, 1). The cursor advances by one sample per call and wraps
by subtract-floor, never by modulo on an elapsed-time float.

Output law, given the time since note-on:

  past delay     waveform(cursor) * magnitude, faded in linearly over
                 the attack window, then scaled by base_value; the base
                 value is additionally applied as a DC offset unless the
                 destination is zero-centered (Tune).

  within delay   a linear ramp from 0 toward base_value (or from
                 base_value down toward 0 when zero-centered).

  delay == 0 and note_time == 0: exactly 0.

The configured `rate` field does not scale the phase advance.
*/

/// XOR/add integer pair behind `WaveShape::Random`.
///
/// Owned by the instrument and threaded through calls so rendering is
/// deterministic and reproducible in tests. Yields the raw integer
/// reinterpreted as f32 magnitude, matching the shipped generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandState {
    x1: i32,
    x2: i32,
}

impl Default for RandState {
    fn default() -> Self {
        Self {
            x1: 0x6745_2301,
            x2: 0xefcd_ab89_u32 as i32,
        }
    }
}

impl RandState {
    pub fn next(&mut self) -> f32 {
        self.x1 ^= self.x2;
        let out = self.x2 as f32;
        self.x2 = self.x2.wrapping_add(self.x1);
        out
    }
}

/// Base waveform value at a phase cursor in [0, 1).
pub fn waveform_value(shape: WaveShape, cursor: f32, rng: &mut RandState) -> f32 {
    match shape {
        WaveShape::Square => {
            if cursor >= 0.5 {
                -1.0
            } else {
                1.0
            }
        }
        WaveShape::Saw => 1.0 - 2.0 * cursor,
        WaveShape::Triangle => {
            if cursor < 0.5 {
                1.0 - 4.0 * cursor
            } else {
                -1.0 + 4.0 * (cursor - 0.5)
            }
        }
        WaveShape::Sine => (cursor * TAU).sin(),
        WaveShape::Random => rng.next(),
    }
}

/// Per-(oscillator, destination) transient: the phase cursor alone.
/// Configuration is passed in at the point of use rather than aliased.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LfoState {
    cursor: f32,
}

impl LfoState {
    /// Reset the phase on trigger when the patch asks for note sync.
    pub fn note_on(&mut self, config: &LfoConfig) {
        if config.note_sync {
            self.cursor = 0.0;
        }
    }

    /// Advance one sample and return the modulation value at `note_time`
    /// seconds after the trigger.
    pub fn update(
        &mut self,
        config: &LfoConfig,
        note_time: f32,
        zero_centered: bool,
        sample_rate: f32,
        rng: &mut RandState,
    ) -> f32 {
        self.cursor += 1.0 / sample_rate;
        self.cursor -= self.cursor.floor();

        if note_time > config.delay {
            let mut value = waveform_value(config.shape, self.cursor, rng) * config.magnitude;
            let since_delay = note_time - config.delay;
            if since_delay < config.attack {
                value *= since_delay / config.attack;
            }
            return value * config.base_value
                + if zero_centered { 0.0 } else { config.base_value };
        }

        if config.delay > 0.0 {
            let ramp = config.base_value * note_time / config.delay;
            return if zero_centered {
                config.base_value - ramp
            } else {
                ramp
            };
        }

        0.0
    }
}
