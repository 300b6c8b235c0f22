pub mod dsp; // Leaf numerics: envelopes, LFOs, oscillator shaping, ladder filter
pub mod engine; // Top-level mixer, sound-source seam, output ring
pub mod patch; // Plain mutable configuration structures
pub mod synth; // Per-note state, voice bank, control messages

/// Fixed engine sample rate, in Hz. Every per-sample increment in the
/// crate is derived from this value.
pub const SAMPLE_RATE: f32 = 44_100.0;

/// Capacity of the circular output buffer: one second of stereo frames.
pub const OUTPUT_CAPACITY: usize = 44_100;
