// Purpose: leaf DSP primitives with no knowledge of voices or routing.
// Everything here is per-sample math over explicit state structs.

pub mod distortion;
pub mod envelope;
pub mod filter;
pub mod lfo;
pub mod oscillator;
