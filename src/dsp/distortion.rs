//! Soft-saturation waveshaping.
//!
//! A cubic transfer curve applied to each oscillator sample after the
//! morph/decimation stage. The drive comes from the Distort LFO, so it
//! can move over the life of a note.

/// Cubic soft saturation: `y = x * (1 + gain); 1.5y - 0.5y^3`.
///
/// At gain 0 and |x| <= 1 this is the classic smoothstep-like shaper
/// mapping ±1 to ±1; higher gain pushes the signal into (and past) the
/// fold of the cubic.
#[inline]
pub fn soft_saturate(sample: f32, gain: f32) -> f32 {
    let driven = sample * (1.0 + gain);
    1.5 * driven - 0.5 * driven * driven * driven
}
