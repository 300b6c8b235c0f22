use crate::patch::EnvelopeConfig;

/*
ADSR Envelope Evaluator
=======================

Unlike an incremental envelope (level += step each sample), this is a
stateless function of elapsed time. A voice carries only two numbers of
envelope state: the time since its last trigger and the value the
envelope had at its last transition (the "saved" value).

Continuity rule
---------------

Retriggering a voice mid-release must not click. The attack phase
therefore interpolates from the saved value up to 1.0 instead of from
zero:

    level = saved + (t / attack) * (1.0 - saved)

At t = 0 the new attack starts exactly where the old release left off.

Release rule
------------

The release phase decays linearly from the saved value over a window of
`release * RELEASE_STRETCH` seconds. The ×5 stretch is a deliberate
tail-lengthening constant, not a literal "release" duration. When the
window elapses (or release is zero) the envelope reports `expired` and
the owning voice marks itself died.

All divisions are guarded by `> 0` checks on their denominators; the
fallback is 0 or the boundary value, never an error.
*/

/// Stretch factor applied to the configured release time.
pub const RELEASE_STRETCH: f32 = 5.0;

/// Result of sampling an envelope at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSample {
    pub level: f32,
    /// True once a released envelope has run out its stretched window.
    pub expired: bool,
}

/// Evaluate an ADSR envelope.
///
/// `time` is seconds since the voice was triggered, `release_start` the
/// value of `time` at note-off, `gate` whether the note is still held,
/// and `saved` the envelope value captured at the last gate transition.
pub fn evaluate(
    config: &EnvelopeConfig,
    time: f32,
    release_start: f32,
    gate: bool,
    saved: f32,
) -> EnvelopeSample {
    if gate {
        let level = if time > config.attack + config.decay {
            config.sustain
        } else if time > config.attack && config.decay > 0.0 {
            1.0 + ((time - config.attack) / config.decay) * (config.sustain - 1.0)
        } else if config.attack > 0.0 {
            saved + (time / config.attack) * (1.0 - saved)
        } else {
            0.0
        };
        EnvelopeSample {
            level,
            expired: false,
        }
    } else {
        let elapsed = time - release_start;
        let window = config.release * RELEASE_STRETCH;
        if config.release > 0.0 && elapsed < window {
            EnvelopeSample {
                level: saved * (1.0 - elapsed / window),
                expired: false,
            }
        } else {
            EnvelopeSample {
                level: 0.0,
                expired: true,
            }
        }
    }
}
