/*
Nonlinear Ladder Filter
=======================

A 4-pole resonant low-pass modeled after Huovilainen's analysis of the
transistor ladder. Each stage is a one-pole low-pass whose input and
state pass through tanh saturation, scaled by the transistor thermal
voltage; the resonance feedback path taps the running output.

Two fixed-coefficient polynomials in the normalized cutoff compensate
the model's frequency warping and resonance loss:

    fcr  tuning correction applied inside the exponential gain
    acr  amplitude correction applied to the feedback term

The stage gain is `tune = (1 - exp(-TAU * f * fcr)) / THERMAL` with `f`
the per-pass normalized frequency. The filter runs two passes per input
sample (2x oversampling for stability at high resonance), and the output
is the average of the last two stage-4 values, compensating the
half-sample delay the oversampling introduces.

State lives per voice: four stage values, the delayed stage-4 value, and
the running output used by the feedback path.
*/

use std::f32::consts::TAU;

/// Transistor thermal-voltage scale (2 * 25 mV, inverted into `tune`).
const THERMAL: f32 = 0.000025;

/// Oversampling passes per input sample.
const OVERSAMPLE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LadderFilter {
    stage: [f32; 4],
    /// Previous stage-4 value, for the half-sample delay compensation.
    delay: f32,
    /// Running output, tapped by the resonance feedback.
    output: f32,
}

impl LadderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Filter one sample.
    ///
    /// `cutoff` is normalized to [0, 1) as a fraction of Nyquist;
    /// `resonance` to [0, 1]. Values outside those domains are a caller
    /// contract violation.
    pub fn process(&mut self, input: f32, cutoff: f32, resonance: f32) -> f32 {
        // Normalized cutoff relative to the sample rate, then halved
        // again for the oversampled passes.
        let fc = 0.5 * cutoff;
        let f = 0.5 * fc;
        let fc2 = fc * fc;
        let fc3 = fc2 * fc;

        let fcr = 1.8730 * fc3 + 0.4955 * fc2 - 0.6490 * fc + 0.9988;
        let acr = -3.9364 * fc2 + 1.8409 * fc + 0.9968;
        let tune = (1.0 - (-TAU * f * fcr).exp()) / THERMAL;

        for _ in 0..OVERSAMPLE {
            let fed_back = input - 4.0 * resonance * self.output * acr;
            let mut carry = (fed_back * THERMAL).tanh();
            for stage in self.stage.iter_mut() {
                *stage += tune * (carry - (*stage * THERMAL).tanh());
                carry = (*stage * THERMAL).tanh();
            }
            self.output = 0.5 * (self.stage[3] + self.delay);
            self.delay = self.stage[3];
        }

        self.output
    }
}
