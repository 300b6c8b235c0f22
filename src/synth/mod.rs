// Purpose: per-note state and the instrument voice bank.
// This layer sits between the leaf dsp primitives and the engine mixer.

pub mod message;
pub mod source;
pub mod voice;

/// Fixed polyphony: voices per instrument, allocated once.
pub const VOICE_COUNT: usize = 6;
