//! Block renderer: owns the sound sources, the output ring, and the
//! control-event queue.
//!
//! Rendering proceeds in blocks. Before each block the engine drains
//! every queued control event tagged at or before the current block
//! index, in arrival order, then zeroes the next region of the ring,
//! lets each source accumulate its voices into it, and commits it.
//! Nothing in the render path allocates or locks.

pub mod buffer;

use crate::synth::message::SynthMessage;
use buffer::StereoRing;

#[cfg(feature = "rtrb")]
use crate::synth::message::ControlEvent;

/// A polyphonic generator the engine can mix. Implemented by
/// [`Instrument`](crate::synth::source::Instrument); the seam exists so
/// hosts can mix non-instrument sources (samplers, test tones) into the
/// same ring.
pub trait SoundSource: Send {
    /// Channel this source listens on for note events.
    fn channel(&self) -> u8;

    fn note_on(&mut self, key: u8, velocity: f32);

    fn note_off(&mut self, key: u8);

    fn all_notes_off(&mut self);

    /// Accumulate `frames` samples ahead of the ring's write cursor.
    /// The region is already zeroed or holds other sources' output;
    /// sources add, never overwrite.
    fn render(&mut self, ring: &mut StereoRing, frames: usize, pitch_bend: f32);
}

pub struct Synth {
    sources: Vec<Box<dyn SoundSource>>,
    out: StereoRing,
    pitch_bend: f32,
    block_index: u64,
    #[cfg(feature = "rtrb")]
    controls: Option<rtrb::Consumer<ControlEvent>>,
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}

impl Synth {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            out: StereoRing::new(crate::OUTPUT_CAPACITY),
            pitch_bend: 0.0,
            block_index: 0,
            #[cfg(feature = "rtrb")]
            controls: None,
        }
    }

    /// Register a source. Call during setup, before rendering starts.
    pub fn add_source(&mut self, source: Box<dyn SoundSource>) {
        self.sources.push(source);
    }

    /// Hand the engine the consumer half of the control queue built by
    /// [`control_queue`](crate::synth::message::control_queue).
    #[cfg(feature = "rtrb")]
    pub fn attach_controls(&mut self, consumer: rtrb::Consumer<ControlEvent>) {
        self.controls = Some(consumer);
    }

    /// Index of the next block `render` will produce. Tag control
    /// events with this (or a later block) to schedule them.
    pub fn block_index(&self) -> u64 {
        self.block_index
    }

    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    /// Set the global bend, in [-1, 1]. Scaled to +/-2 semitones by the
    /// sources.
    pub fn set_pitch_bend(&mut self, amount: f32) {
        self.pitch_bend = amount;
    }

    /// Route a note-on to every source listening on `channel`.
    pub fn note_on(&mut self, channel: u8, key: u8, velocity: f32) {
        for source in self.sources.iter_mut() {
            if source.channel() == channel {
                source.note_on(key, velocity);
            }
        }
    }

    pub fn note_off(&mut self, channel: u8, key: u8) {
        for source in self.sources.iter_mut() {
            if source.channel() == channel {
                source.note_off(key);
            }
        }
    }

    /// Release every held note on every source. Tails still ring out.
    pub fn all_notes_off(&mut self) {
        for source in self.sources.iter_mut() {
            source.all_notes_off();
        }
    }

    fn dispatch(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                channel,
                key,
                velocity,
            } => self.note_on(channel, key, velocity),
            SynthMessage::NoteOff { channel, key } => self.note_off(channel, key),
            SynthMessage::PitchBend { amount } => self.pitch_bend = amount,
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Drain every event due at or before the upcoming block. Events
    /// tagged for a later block stay queued; an event's effect is never
    /// split within a block.
    #[cfg(feature = "rtrb")]
    fn apply_due_events(&mut self) {
        loop {
            let message = match self.controls.as_mut() {
                Some(controls) => match controls.peek() {
                    Ok(event) if event.block <= self.block_index => {
                        let message = event.message;
                        let _ = controls.pop();
                        message
                    }
                    _ => break,
                },
                None => break,
            };
            self.dispatch(message);
        }
    }

    /// Produce one block of `frames` stereo samples into the output
    /// ring. `frames` must not exceed the ring capacity.
    pub fn render(&mut self, frames: usize) {
        #[cfg(feature = "rtrb")]
        self.apply_due_events();

        self.out.clear_ahead(frames);
        for source in self.sources.iter_mut() {
            source.render(&mut self.out, frames, self.pitch_bend);
        }
        self.out.advance(frames);
        self.block_index += 1;
    }

    /// Consume one rendered frame, clamped per channel to [0, 1].
    pub fn pop(&mut self) -> (f32, f32) {
        self.out.pop()
    }

    /// Rendered frames not yet popped.
    pub fn available(&self) -> usize {
        self.out.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::InstrumentConfig;
    use crate::synth::source::Instrument;

    fn audible_config() -> InstrumentConfig {
        use crate::patch::{CombineLaw, EnvelopeConfig, LfoDestination};
        let mut config = InstrumentConfig {
            amp_env: EnvelopeConfig::adsr(0.0, 0.0, 1.0, 0.01),
            left_gain: 1.0,
            right_gain: 1.0,
            ..InstrumentConfig::default()
        };
        for osc in config.oscillators.iter_mut() {
            osc.combine = CombineLaw::Mix;
            osc.lfo[LfoDestination::Distort.index()].base_value = 0.0;
            osc.lfo[LfoDestination::Decat.index()].base_value = 0.0;
            osc.lfo[LfoDestination::Squish.index()].base_value = 0.5;
        }
        config
    }

    #[test]
    fn idle_engine_renders_exact_silence() {
        let mut synth = Synth::new();
        synth.add_source(Box::new(Instrument::new(0, audible_config())));
        synth.render(256);
        for _ in 0..256 {
            assert_eq!(synth.pop(), (0.0, 0.0));
        }
    }

    #[test]
    fn note_events_route_by_channel() {
        let mut synth = Synth::new();
        synth.add_source(Box::new(Instrument::new(0, audible_config())));
        synth.add_source(Box::new(Instrument::new(1, audible_config())));

        synth.note_on(1, 60, 1.0);
        synth.render(512);

        let mut peak = 0.0f32;
        for _ in 0..512 {
            peak = peak.max(synth.pop().0);
        }
        assert!(peak > 0.0, "channel-1 source must sound");
    }

    #[test]
    fn popped_samples_stay_in_the_unit_interval() {
        let mut synth = Synth::new();
        synth.add_source(Box::new(Instrument::new(0, audible_config())));
        for key in [48u8, 52, 55, 60, 64, 67] {
            synth.note_on(0, key, 1.0);
        }
        for _ in 0..20 {
            synth.render(512);
            for _ in 0..512 {
                let (left, right) = synth.pop();
                assert!((0.0..=1.0).contains(&left));
                assert!((0.0..=1.0).contains(&right));
            }
        }
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn events_apply_at_their_tagged_block() {
        use crate::synth::message::{control_queue, ControlEvent, SynthMessage};

        let (mut tx, rx) = control_queue(8);
        let mut synth = Synth::new();
        synth.add_source(Box::new(Instrument::new(0, audible_config())));
        synth.attach_controls(rx);

        tx.push(ControlEvent {
            block: 1,
            message: SynthMessage::NoteOn {
                channel: 0,
                key: 69,
                velocity: 1.0,
            },
        })
        .unwrap();

        // Block 0: the event is not yet due.
        synth.render(256);
        for _ in 0..256 {
            assert_eq!(synth.pop(), (0.0, 0.0));
        }

        // Block 1: the note starts at the block boundary.
        synth.render(256);
        let mut peak = 0.0f32;
        for _ in 0..256 {
            peak = peak.max(synth.pop().0);
        }
        assert!(peak > 0.0);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn pitch_bend_events_update_the_engine_state() {
        use crate::synth::message::{control_queue, ControlEvent, SynthMessage};

        let (mut tx, rx) = control_queue(4);
        let mut synth = Synth::new();
        synth.attach_controls(rx);

        tx.push(ControlEvent {
            block: 0,
            message: SynthMessage::PitchBend { amount: 0.5 },
        })
        .unwrap();

        synth.render(64);
        assert_eq!(synth.pitch_bend(), 0.5);
    }
}
