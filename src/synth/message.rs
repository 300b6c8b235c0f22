//! Control messages crossing the control/render boundary.
//!
//! Note events may originate on another thread (MIDI input, UI). The
//! boundary is a lock-free, bounded, single-producer single-consumer
//! queue of `ControlEvent`s, each tagged with the first render block it
//! may affect. The engine applies every event tagged at or before the
//! upcoming block, in arrival order, before generating that block's
//! samples. Events are fire-and-forget: there is no cancellation and no
//! sub-block scheduling.

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { channel: u8, key: u8, velocity: f32 },
    NoteOff { channel: u8, key: u8 },
    PitchBend { amount: f32 },
    AllNotesOff,
}

/// A control message tagged with its target render block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControlEvent {
    pub block: u64,
    pub message: SynthMessage,
}

/// Build the bounded SPSC control queue. The producer side lives with
/// the control thread; hand the consumer to `Synth::attach_controls`.
#[cfg(feature = "rtrb")]
pub fn control_queue(capacity: usize) -> (Producer<ControlEvent>, Consumer<ControlEvent>) {
    RingBuffer::new(capacity)
}
