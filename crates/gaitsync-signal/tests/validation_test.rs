//! End-to-end validation of the DSP chain on synthetic motion signals.
//!
//! Exercises the filter → peaks and welch → dominant paths together the way
//! the cadence estimator uses them, with known ground truth.

use gaitsync_signal::{find_peaks, find_valleys, welch, ButterworthFilter};
use std::f64::consts::TAU;

const SAMPLE_RATE: f64 = 100.0;

/// Gait-like acceleration: slow locomotion component plus high-frequency
/// sensor noise (deterministic, so the test is reproducible).
fn synthetic_gait(step_freq: f64, seconds: f64) -> Vec<f64> {
    let n = (seconds * SAMPLE_RATE) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (TAU * step_freq * t).sin()
                + 0.3 * (TAU * 23.0 * t).sin()
                + 0.2 * (TAU * 31.0 * t + 1.1).sin()
        })
        .collect()
}

#[test]
fn filtered_peak_count_matches_step_frequency() {
    let step_freq = 1.0; // 1 step per second
    let signal = synthetic_gait(step_freq, 8.0);

    let lp = ButterworthFilter::lowpass(3, 3.0, SAMPLE_RATE).expect("filter design");
    let smooth = lp.filtfilt(&signal);

    // Quarter-period minimum spacing, as the cadence estimator uses
    let min_dist = (SAMPLE_RATE / step_freq / 4.0) as usize;
    let peaks = find_peaks(&smooth, min_dist);
    let valleys = find_valleys(&smooth, min_dist);

    println!("peaks: {peaks:?}");
    println!("valleys: {valleys:?}");

    assert_eq!(peaks.len(), 8, "one peak per second over 8 s");
    assert_eq!(valleys.len(), 8);

    // Peak spacing should match the step period within a couple samples
    for pair in peaks.windows(2) {
        let spacing = (pair[1] - pair[0]) as f64 / SAMPLE_RATE;
        assert!(
            (spacing - 1.0).abs() < 0.03,
            "stride interval {spacing} s off from 1.0 s"
        );
    }
}

#[test]
fn unfiltered_noise_confuses_peak_detection() {
    // Sanity check that the low-pass stage is actually load-bearing
    let signal = synthetic_gait(1.0, 8.0);
    let min_dist = (SAMPLE_RATE / 4.0) as usize;
    let raw_peaks = find_peaks(&signal, min_dist);

    let lp = ButterworthFilter::lowpass(3, 3.0, SAMPLE_RATE).expect("filter design");
    let smooth_peaks = find_peaks(&lp.filtfilt(&signal), min_dist);

    println!("raw: {}, smoothed: {}", raw_peaks.len(), smooth_peaks.len());
    assert_eq!(smooth_peaks.len(), 8);
}

#[test]
fn welch_recovers_cadence_from_noisy_signal() {
    for &step_freq in &[0.8, 1.2, 1.6, 2.0] {
        let signal = synthetic_gait(step_freq, 8.0);
        let psd = welch(&signal, SAMPLE_RATE, signal.len()).expect("welch");
        let (dominant, _) = psd.dominant_in_band(0.3, 4.0).expect("band occupied");
        println!("target {step_freq} Hz -> dominant {dominant} Hz");
        assert!(
            (dominant - step_freq).abs() <= psd.resolution_hz + 1e-9,
            "dominant {dominant} Hz vs target {step_freq} Hz"
        );
    }
}

#[test]
fn entropy_separates_walking_from_stillness() {
    let walking = synthetic_gait(1.2, 4.0);
    // Stillness: broadband micro-noise only, no periodic component
    let still: Vec<f64> = (0..400)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (1..=25)
                .map(|k| 0.01 * (TAU * (k as f64 * 1.93) * t + k as f64).sin())
                .sum::<f64>()
        })
        .collect();

    let e_walk = welch(&walking, SAMPLE_RATE, walking.len())
        .expect("welch")
        .spectral_entropy();
    let e_still = welch(&still, SAMPLE_RATE, still.len())
        .expect("welch")
        .spectral_entropy();

    println!("entropy walking={e_walk:.3} still={e_still:.3}");
    assert!(
        e_walk < e_still,
        "periodic walking should concentrate spectral power"
    );
}
