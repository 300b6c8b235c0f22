use crate::dsp::distortion::soft_saturate;
use crate::dsp::lfo::RandState;
use crate::dsp::oscillator::{shape_sample, ShapeParams};
use crate::engine::buffer::StereoRing;
use crate::engine::SoundSource;
use crate::patch::{InstrumentConfig, LfoDestination, PolyphonyMode};
use crate::synth::voice::Voice;
use crate::synth::VOICE_COUNT;
use crate::SAMPLE_RATE;

/*
Instrument
==========

The per-sample driver tying voices, oscillators, envelopes, filter and
pitch logic together. One instrument owns a fixed pool of six voices and
renders into the shared stereo ring at the engine's write position.

Voice allocation (note-on), in priority order:

  1. a voice already holding this key (retrigger in place)
  2. a voice whose envelope tail has expired (died)
  3. any voice no longer held (idle or releasing)

If none match, the note is silently dropped: there is no forced-steal
policy, a sounding voice is never interrupted.

Polyphony modes:

  Poly         all six slots render independently.
  Arpeggio     one slot renders; the sounding pitch cycles through the
               pool at block rate, two blocks per active note.
  Portamento   only voice 0 renders; pitch glides between successive
               keys in semitones per second and clamps at arrival.

The idle slots in Arpeggio/Portamento are a deliberate simplification of
the shipped instrument, kept to preserve audible behavior.
*/

/// Pitch-bend scale: semitones per unit of bend.
const BEND_SEMITONES: f32 = 2.0;

/// Post-clamp gain headroom applied to every voice.
const HEADROOM: f32 = 0.5;

pub struct Instrument {
    config: InstrumentConfig,
    voices: [Voice; VOICE_COUNT],
    channel: u8,
    rng: RandState,
    arpeggio_index: usize,
    /// Current (possibly mid-glide) pitch in Portamento mode, as a
    /// fractional MIDI key.
    portamento_note: f32,
    /// Glide rate in semitones per second.
    portamento_step: f32,
}

impl Instrument {
    pub fn new(channel: u8, config: InstrumentConfig) -> Self {
        Self {
            config,
            voices: [Voice::default(); VOICE_COUNT],
            channel,
            rng: RandState::default(),
            arpeggio_index: 0,
            portamento_note: 0.0,
            portamento_step: 0.0,
        }
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    /// Mutable access to the shared configuration. Apply edits only
    /// between render calls.
    pub fn config_mut(&mut self) -> &mut InstrumentConfig {
        &mut self.config
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn arpeggio_index(&self) -> usize {
        self.arpeggio_index
    }

    pub fn portamento_note(&self) -> f32 {
        self.portamento_note
    }

    /// Voice-reuse priority: same key, then died, then unheld.
    fn find_slot(&self, key: u8) -> Option<usize> {
        if let Some(idx) = self.voices.iter().position(|v| v.gate && v.key == key) {
            return Some(idx);
        }
        if let Some(idx) = self.voices.iter().position(|v| v.died) {
            return Some(idx);
        }
        self.voices.iter().position(|v| !v.gate)
    }

    pub fn note_on(&mut self, key: u8, velocity: f32) {
        match self.config.polyphony {
            PolyphonyMode::Portamento => {
                if self.voices[0].gate {
                    // Glide from wherever the pitch currently sits.
                    let start = self.portamento_note;
                    self.portamento_step = if self.config.portamento_time > 0.0 {
                        (key as f32 - start) / self.config.portamento_time
                    } else {
                        self.portamento_note = key as f32;
                        0.0
                    };
                } else {
                    self.portamento_note = key as f32;
                    self.portamento_step = 0.0;
                }
                self.voices[0].trigger(key, velocity, &self.config);
            }
            _ => {
                if let Some(idx) = self.find_slot(key) {
                    self.voices[idx].trigger(key, velocity, &self.config);
                }
                // Pool exhausted: the note is dropped.
            }
        }
    }

    /// Release the voice holding `key`. A key with no matching sounding
    /// voice is a no-op.
    pub fn note_off(&mut self, key: u8) {
        let config = self.config;
        if let Some(voice) = self.voices.iter_mut().find(|v| v.gate && v.key == key) {
            voice.release(&config);
        }
    }

    pub fn all_notes_off(&mut self) {
        let config = self.config;
        for voice in self.voices.iter_mut() {
            if voice.gate {
                voice.release(&config);
            }
        }
    }

    /// Render `frames` samples, accumulating into the ring ahead of its
    /// write cursor. `pitch_bend` is applied as an instantaneous offset
    /// of `bend * 2` semitones on every voice, every sample.
    // TODO: ramp the bend toward its target across the block instead of
    // stepping; needs an agreed ramp shape first.
    pub fn render_into(&mut self, ring: &mut StereoRing, frames: usize, pitch_bend: f32) {
        let active = self.voices.iter().filter(|v| v.gate).count();

        let dt = 1.0 / SAMPLE_RATE;
        let pool = match self.config.polyphony {
            PolyphonyMode::Poly => VOICE_COUNT,
            _ => 1,
        };
        let bend_offset = pitch_bend * BEND_SEMITONES;
        let arp_key = self.voices[self.arpeggio_index >> 1].key as f32;

        for frame in 0..frames {
            let mut mixed = 0.0f32;
            for k in 0..pool {
                self.voices[k].time += dt;
                let amp = self.voices[k].amp_level(&self.config.amp_env);
                let gain = amp * self.voices[k].velocity;
                if gain == 0.0 {
                    // Nothing sounds and no per-voice state may advance:
                    // the filter and glide stay frozen while silent.
                    continue;
                }

                let base_note = match self.config.polyphony {
                    PolyphonyMode::Poly => self.voices[k].key as f32,
                    PolyphonyMode::Arpeggio => arp_key,
                    PolyphonyMode::Portamento => {
                        let target = self.voices[0].key as f32;
                        let next = self.portamento_note + self.portamento_step * dt;
                        if self.portamento_note > target {
                            self.portamento_note = next.max(target);
                        } else if self.portamento_note < target {
                            self.portamento_note = next.min(target);
                        }
                        self.portamento_note
                    }
                } + bend_offset;

                let note_time = self.voices[k].time;
                let voice = &mut self.voices[k];
                let mut signal = 0.0f32;
                for (osc, osc_config) in
                    voice.oscillators.iter_mut().zip(&self.config.oscillators)
                {
                    osc.tick(
                        osc_config,
                        note_time,
                        base_note,
                        SAMPLE_RATE,
                        &mut self.rng,
                        &mut signal,
                    );
                }

                let filter_env = voice.filter_level(&self.config.filter_env);
                let filtered = voice.filter.process(
                    signal,
                    self.config.filter_cutoff,
                    self.config.filter_resonance,
                );
                let blend = filter_env * self.config.filter_drive;
                let shaped = signal + (filtered - signal) * blend;

                mixed += shaped * gain * HEADROOM;
            }

            let clamped = mixed.clamp(-1.0, 1.0);
            ring.accumulate(
                frame,
                clamped * self.config.left_gain,
                clamped * self.config.right_gain,
            );
        }

        // Advance the note cycle once per block so block i sounds slot
        // (i mod 2N) >> 1: two consecutive blocks per active note.
        if active > 0 {
            self.arpeggio_index = (self.arpeggio_index + 1) % (active * 2);
        }
    }

    /// Non-destructive preview of one oscillator's current waveform
    /// shape: one full cycle over `frames` samples, using only the
    /// static base values of its modulation destinations. No live voice
    /// advances; finite and deterministic for a fixed configuration.
    pub fn render_scope(&self, osc_index: usize, frames: usize) -> Vec<f32> {
        let config = &self.config.oscillators[osc_index];
        let base = |dest: LfoDestination| config.lfo[dest.index()].base_value;

        let volume = base(LfoDestination::Volume).max(0.0);
        let distort = base(LfoDestination::Distort);
        // Tune is zero-centered: its static value is 0.
        let params = ShapeParams::from_modulation(
            base(LfoDestination::Morph),
            base(LfoDestination::Squish),
            base(LfoDestination::Decat),
        );

        (0..frames)
            .map(|i| {
                let cursor = i as f32 / frames as f32;
                soft_saturate(shape_sample(cursor, &params), distort) * volume
            })
            .collect()
    }
}

impl SoundSource for Instrument {
    fn channel(&self) -> u8 {
        self.channel
    }

    fn note_on(&mut self, key: u8, velocity: f32) {
        Instrument::note_on(self, key, velocity);
    }

    fn note_off(&mut self, key: u8) {
        Instrument::note_off(self, key);
    }

    fn all_notes_off(&mut self) {
        Instrument::all_notes_off(self);
    }

    fn render(&mut self, ring: &mut StereoRing, frames: usize, pitch_bend: f32) {
        self.render_into(ring, frames, pitch_bend);
    }
}
