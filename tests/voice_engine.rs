//! End-to-end tests: real instruments driven through the block
//! renderer and drained from the output ring, the way a host would.

use anavox::engine::Synth;
use anavox::patch::{CombineLaw, EnvelopeConfig, InstrumentConfig, LfoDestination};
use anavox::synth::source::Instrument;
use anavox::SAMPLE_RATE;

/// A plain audible patch: both oscillators mixing square-ish waves,
/// instant attack, full sustain, short release.
fn audible_config() -> InstrumentConfig {
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

fn drain(synth: &mut Synth, frames: usize) -> Vec<(f32, f32)> {
    (0..frames).map(|_| synth.pop()).collect()
}

/// Count silence-to-sound transitions on the left channel. The output
/// stage truncates the negative half-wave to exactly 0.0, so this
/// approximates the fundamental frequency in cycles.
fn rising_transitions(samples: &[(f32, f32)]) -> usize {
    samples
        .windows(2)
        .filter(|pair| pair[0].0 == 0.0 && pair[1].0 > 0.0)
        .count()
}

#[test]
fn held_chord_stays_in_range_and_sounds() {
    let mut synth = Synth::new();
    synth.add_source(Box::new(Instrument::new(0, audible_config())));
    synth.add_source(Box::new(Instrument::new(1, audible_config())));
    for key in [48u8, 55, 60] {
        synth.note_on(0, key, 1.0);
    }
    synth.note_on(1, 64, 0.8);

    let mut peak = 0.0f32;
    for _ in 0..40 {
        synth.render(512);
        for (left, right) in drain(&mut synth, 512) {
            assert!((0.0..=1.0).contains(&left));
            assert!((0.0..=1.0).contains(&right));
            peak = peak.max(left);
        }
    }
    assert!(peak > 0.1, "a held chord must be audible, peak {peak}");
}

#[test]
fn pitch_bend_raises_the_fundamental() {
    // One second of audio, rendered block-wise and drained as we go.
    let count_cycles = |bend: f32| {
        let mut synth = Synth::new();
        synth.add_source(Box::new(Instrument::new(0, audible_config())));
        synth.set_pitch_bend(bend);
        synth.note_on(0, 69, 1.0);
        let block = SAMPLE_RATE as usize / 10;
        let mut samples = Vec::new();
        for _ in 0..10 {
            synth.render(block);
            samples.extend(drain(&mut synth, block));
        }
        rising_transitions(&samples)
    };

    let straight = count_cycles(0.0);
    let bent = count_cycles(1.0);

    // 440 Hz against two semitones up, roughly 494 Hz.
    assert!(
        (400..=480).contains(&straight),
        "unbent cycle count {straight}"
    );
    assert!(
        bent > straight + 30,
        "full bend must raise the pitch: {straight} -> {bent}"
    );
}

#[test]
fn all_notes_off_rings_out_to_exact_silence() {
    let mut synth = Synth::new();
    synth.add_source(Box::new(Instrument::new(0, audible_config())));
    synth.add_source(Box::new(Instrument::new(1, audible_config())));
    synth.note_on(0, 60, 1.0);
    synth.note_on(1, 67, 1.0);

    synth.render(4410);
    let sounding = drain(&mut synth, 4410);
    assert!(sounding.iter().any(|&(l, _)| l > 0.0));

    synth.all_notes_off();

    // Past the stretched release window (0.01 * 5 = 0.05 s).
    synth.render(4410);
    drain(&mut synth, 4410);

    synth.render(512);
    for frame in drain(&mut synth, 512) {
        assert_eq!(frame, (0.0, 0.0));
    }
}

#[cfg(feature = "rtrb")]
#[test]
fn control_thread_schedules_note_lifetimes() {
    use anavox::synth::message::{control_queue, ControlEvent, SynthMessage};

    let (mut tx, rx) = control_queue(16);
    let mut synth = Synth::new();
    synth.add_source(Box::new(Instrument::new(0, audible_config())));
    synth.attach_controls(rx);

    let producer = std::thread::spawn(move || {
        tx.push(ControlEvent {
            block: 2,
            message: SynthMessage::NoteOn {
                channel: 0,
                key: 60,
                velocity: 1.0,
            },
        })
        .ok();
        tx.push(ControlEvent {
            block: 10,
            message: SynthMessage::NoteOff { channel: 0, key: 60 },
        })
        .ok();
    });
    producer.join().ok();

    let mut block_peaks = Vec::new();
    for _ in 0..30 {
        synth.render(512);
        let peak = drain(&mut synth, 512)
            .iter()
            .map(|&(l, _)| l)
            .fold(0.0f32, f32::max);
        block_peaks.push(peak);
    }

    assert_eq!(block_peaks[0], 0.0, "nothing may sound before block 2");
    assert_eq!(block_peaks[1], 0.0);
    assert!(block_peaks[2] > 0.0, "the note starts at its tagged block");
    assert!(block_peaks[9] > 0.0, "the note holds until its note-off");
    // Release window 0.05 s is under five 512-sample blocks.
    assert_eq!(
        block_peaks[29], 0.0,
        "the tail must fully die: {block_peaks:?}"
    );
}
