use crate::dsp::envelope::{self, EnvelopeSample};
use crate::dsp::filter::LadderFilter;
use crate::dsp::oscillator::OscillatorState;
use crate::patch::{EnvelopeConfig, InstrumentConfig, OSCILLATOR_COUNT};

/// Per-note synthesis state: oscillator transients, envelope continuity
/// values, and the filter memory.
///
/// A voice is "born" when a note-on assigns it, releases at note-off,
/// and dies when its amplitude envelope's stretched release window
/// elapses. Died voices keep their state until recycled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    /// MIDI key code last assigned to this voice.
    pub key: u8,
    /// Note-on velocity in [0, 1].
    pub velocity: f32,
    /// Seconds since the last trigger.
    pub time: f32,
    /// Value of `time` at the moment of release.
    pub release_start: f32,
    /// True while the note is held.
    pub gate: bool,
    /// True once the release tail has fully expired.
    pub died: bool,
    /// Amplitude-envelope value captured at the last gate transition.
    pub saved_amp: f32,
    /// Filter-envelope value captured at the last gate transition.
    pub saved_filter: f32,
    pub oscillators: [OscillatorState; OSCILLATOR_COUNT],
    pub filter: LadderFilter,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            key: 0,
            velocity: 0.0,
            time: 0.0,
            release_start: 0.0,
            gate: false,
            died: true,
            saved_amp: 0.0,
            saved_filter: 0.0,
            oscillators: [OscillatorState::default(); OSCILLATOR_COUNT],
            filter: LadderFilter::new(),
        }
    }
}

impl Voice {
    /// Snapshot both envelopes so the next segment starts where this
    /// one currently sits. Called before every gate transition.
    fn capture_envelopes(&mut self, config: &InstrumentConfig) {
        self.saved_amp = self.sample_envelope(&config.amp_env).level;
        self.saved_filter = envelope::evaluate(
            &config.filter_env,
            self.time,
            self.release_start,
            self.gate,
            self.saved_filter,
        )
        .level;
    }

    /// Assign a note to this voice, preserving envelope continuity
    /// across the retrigger.
    pub fn trigger(&mut self, key: u8, velocity: f32, config: &InstrumentConfig) {
        self.capture_envelopes(config);
        self.key = key;
        self.velocity = velocity;
        self.time = 0.0;
        self.release_start = 0.0;
        self.gate = true;
        self.died = false;
        for (osc, osc_config) in self.oscillators.iter_mut().zip(&config.oscillators) {
            osc.note_on(osc_config);
        }
    }

    /// Release the held note; the envelopes decay from their captured
    /// values.
    pub fn release(&mut self, config: &InstrumentConfig) {
        self.capture_envelopes(config);
        self.gate = false;
        self.release_start = self.time;
    }

    fn sample_envelope(&self, config: &EnvelopeConfig) -> EnvelopeSample {
        envelope::evaluate(config, self.time, self.release_start, self.gate, self.saved_amp)
    }

    /// Current amplitude-envelope level. Marks the voice died when the
    /// release window has run out.
    pub fn amp_level(&mut self, config: &EnvelopeConfig) -> f32 {
        let sample = self.sample_envelope(config);
        if sample.expired {
            self.died = true;
        }
        sample.level
    }

    /// Current filter-envelope level. Never affects the died flag: only
    /// the amplitude envelope ends a voice's life.
    pub fn filter_level(&self, config: &EnvelopeConfig) -> f32 {
        envelope::evaluate(
            config,
            self.time,
            self.release_start,
            self.gate,
            self.saved_filter,
        )
        .level
    }
}
