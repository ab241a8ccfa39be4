use approx::assert_relative_eq;
use ncsf_transposer::{
    Interpolation, RateTransposer, Sample, TransposerError, DEFAULT_FILTER_TAPS, MIN_RATE,
};

const VARIANTS: [Interpolation; 2] = [Interpolation::FixedPoint, Interpolation::FloatingPoint];

/// Deterministic pseudo-random sequence (Numerical Recipes LCG).
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0 >> 8
    }

    fn below(&mut self, n: u32) -> usize {
        (self.next() % n) as usize
    }
}

fn noise_i16(len: usize, seed: u32) -> Vec<i16> {
    let mut rng = Lcg(seed);
    (0..len).map(|_| (rng.next() % 40_000) as i16 - 20_000).collect()
}

fn noise_f32(len: usize, seed: u32) -> Vec<f32> {
    let mut rng = Lcg(seed);
    (0..len)
        .map(|_| (rng.next() % 2_001) as f32 / 1_000.0 - 1.0)
        .collect()
}

fn transposer<S: Sample>(kind: Interpolation, rate: f32, channels: usize, filter: bool) -> RateTransposer<S> {
    let mut t = RateTransposer::new(kind);
    t.set_rate(rate).unwrap();
    t.set_channels(channels).unwrap();
    t.enable_aa_filter(filter);
    t
}

fn drain<S: Sample>(t: &mut RateTransposer<S>, out: &mut Vec<S>) {
    let channels = t.channels();
    let mut block = vec![S::EQUILIBRIUM; 37 * channels];
    loop {
        let frames = t.receive_samples(&mut block);
        if frames == 0 {
            break;
        }
        out.extend_from_slice(&block[..frames * channels]);
    }
}

fn feed_whole<S: Sample>(mut t: RateTransposer<S>, input: &[S]) -> Vec<S> {
    let mut out = Vec::new();
    t.put_samples(input);
    drain(&mut t, &mut out);
    out
}

fn feed_split<S: Sample>(mut t: RateTransposer<S>, input: &[S], seed: u32) -> Vec<S> {
    let channels = t.channels();
    let mut rng = Lcg(seed);
    let mut out = Vec::new();
    let mut at = 0;
    while at < input.len() {
        let take = (rng.below(40) * channels).min(input.len() - at);
        t.put_samples(&input[at..at + take]);
        at += take;
        // Interleave consumption with production
        if rng.below(3) == 0 {
            drain(&mut t, &mut out);
        }
    }
    drain(&mut t, &mut out);
    out
}

#[test]
fn unity_rate_without_filter_is_delayed_identity() {
    for kind in VARIANTS {
        for channels in [1, 2] {
            let input = noise_i16(300 * channels, 7);
            let out = feed_split(transposer::<i16>(kind, 1.0, channels, false), &input, 11);

            assert_eq!(out.len(), input.len() + channels);
            assert!(out[..channels].iter().all(|&s| s == 0), "silent lead-in frame");
            assert_eq!(&out[channels..], &input[..]);
        }
    }
}

#[test]
fn half_rate_holds_constant_input() {
    for kind in VARIANTS {
        let mut t = transposer::<i16>(kind, 0.5, 1, false);
        t.put_samples(&[1000; 50]);
        let mut out = Vec::new();
        drain(&mut t, &mut out);

        assert_eq!(out.len(), 101);
        assert_eq!(&out[..2], &[0, 500]);
        assert!(out[2..].iter().all(|&s| s == 1000), "{kind:?}: {out:?}");
    }
}

#[test]
fn half_rate_filtered_settles_to_constant() {
    for kind in VARIANTS {
        let mut t = transposer::<f32>(kind, 0.5, 2, true);
        let mut out = Vec::new();
        for _ in 0..8 {
            t.put_samples(&[0.5; 64]);
            drain(&mut t, &mut out);
        }
        assert!(out.len() > 4 * DEFAULT_FILTER_TAPS);
        for &s in &out[2 * DEFAULT_FILTER_TAPS..] {
            assert_relative_eq!(s, 0.5, max_relative = 0.01);
        }
    }
}

#[test]
fn splitting_input_is_transparent() {
    let rates = [0.5, 0.73, 1.0, 1.37, 2.0];
    for kind in VARIANTS {
        for filter in [false, true] {
            for rate in rates {
                for channels in [1, 2] {
                    let input = noise_i16(1_000 * channels, 3);
                    let whole = feed_whole(transposer::<i16>(kind, rate, channels, filter), &input);
                    let split = feed_split(transposer::<i16>(kind, rate, channels, filter), &input, 5);
                    assert_eq!(
                        whole, split,
                        "i16 {kind:?} rate {rate} filter {filter} channels {channels}"
                    );

                    let input = noise_f32(1_000 * channels, 9);
                    let whole = feed_whole(transposer::<f32>(kind, rate, channels, filter), &input);
                    let split = feed_split(transposer::<f32>(kind, rate, channels, filter), &input, 13);
                    assert_eq!(
                        whole, split,
                        "f32 {kind:?} rate {rate} filter {filter} channels {channels}"
                    );
                }
            }
        }
    }
}

#[test]
fn output_length_tracks_rate() {
    for kind in VARIANTS {
        for rate in [0.5f32, 0.73, 1.37, 2.0] {
            let input = noise_i16(4_000, 21);
            let out = feed_whole(transposer::<i16>(kind, rate, 1, false), &input);
            let expected = 4_000.0 / rate;
            assert!(
                (out.len() as f32 - expected).abs() <= 2.0,
                "{kind:?} rate {rate}: {} frames, expected about {expected}",
                out.len()
            );
        }
    }
}

#[test]
fn fixed_and_float_agree() {
    for rate in [0.5, 0.75, 1.25, 1.5] {
        for channels in [1, 2] {
            let input = noise_i16(800 * channels, 17);
            let fixed = feed_whole(transposer::<i16>(Interpolation::FixedPoint, rate, channels, false), &input);
            let float = feed_whole(transposer::<i16>(Interpolation::FloatingPoint, rate, channels, false), &input);
            assert_eq!(fixed.len(), float.len(), "rate {rate}");
            for (a, b) in fixed.iter().zip(&float) {
                assert!((*a as i32 - *b as i32).abs() <= 1, "rate {rate}: {a} vs {b}");
            }
        }
    }
}

#[test]
fn unity_filter_delays_by_half_its_length() {
    let mut t = transposer::<i16>(Interpolation::FixedPoint, 1.0, 1, true);
    let input: Vec<i16> = (0..100).map(|i| i * 10 + 1).collect();
    t.put_samples(&input);

    let mut out = Vec::new();
    drain(&mut t, &mut out);
    // 100 frames through a 32-tap window: 68 filtered, plus the silent lead-in
    assert_eq!(out.len(), 69);
    assert_eq!(out[0], 0);
    assert_eq!(&out[1..], &input[16..84]);

    assert!(!t.is_empty(), "last window still in the store");
    t.flush_store_buffer();
    out.clear();
    drain(&mut t, &mut out);
    assert_eq!(&out[..], &input[68..]);
    assert!(t.is_empty());
}

#[test]
fn is_empty_only_after_full_drain() {
    for filter in [false, true] {
        let mut t = transposer::<i16>(Interpolation::FixedPoint, 1.37, 2, filter);
        assert!(t.is_empty());
        t.put_samples(&noise_i16(400, 1));
        assert!(!t.is_empty());

        let mut out = Vec::new();
        drain(&mut t, &mut out);
        assert_eq!(t.is_empty(), !filter, "store holds the filter tail");

        t.flush_store_buffer();
        drain(&mut t, &mut out);
        assert!(t.is_empty());
        assert_eq!(t.num_samples(), 0);
    }
}

#[test]
fn clear_keeps_configuration() {
    let mut t = transposer::<f32>(Interpolation::FloatingPoint, 0.8, 1, true);
    t.put_samples(&noise_f32(500, 2));
    t.clear();

    assert!(t.is_empty());
    assert_eq!(t.rate(), 0.8);
    assert_eq!(t.channels(), 1);
    assert!(t.is_aa_filter_enabled());
    assert_relative_eq!(t.aa_filter().cutoff(), 0.4, epsilon = 1e-6);
}

#[test]
fn channel_change_resets_interpolation() {
    let mut t = transposer::<i16>(Interpolation::FixedPoint, 1.0, 1, false);
    t.put_samples(&[100, 100]);
    t.clear();

    t.set_channels(2).unwrap();
    t.put_samples(&[50, 60, 70, 80]);
    let mut out = Vec::new();
    drain(&mut t, &mut out);
    assert_eq!(out, vec![0, 0, 50, 60, 70, 80]);
}

#[test]
fn same_channel_count_keeps_interpolation() {
    let mut t = transposer::<i16>(Interpolation::FixedPoint, 1.0, 2, false);
    t.put_samples(&[1, 1]);
    t.clear();

    t.set_channels(2).unwrap();
    t.put_samples(&[50, 60, 70, 80]);
    let mut out = Vec::new();
    drain(&mut t, &mut out);
    assert_eq!(out, vec![50, 60, 70, 80]);
}

#[test]
fn longer_filter_widens_the_window() {
    let mut t = transposer::<i16>(Interpolation::FixedPoint, 1.0, 1, true);
    t.aa_filter_mut().set_length(64).unwrap();
    t.put_samples(&[0; 64]);
    assert_eq!(t.num_samples(), 0);
    t.put_samples(&[0; 1]);
    assert_eq!(t.num_samples(), 2);
}

#[test]
fn rates_below_one_fixed_point_step_are_rejected() {
    for kind in VARIANTS {
        let mut t = RateTransposer::<f32>::new(kind);
        assert_eq!(t.set_rate(1e-30), Err(TransposerError::InvalidRate(1e-30)));
        assert_eq!(t.set_rate(MIN_RATE / 2.0), Err(TransposerError::InvalidRate(MIN_RATE / 2.0)));
        assert_eq!(t.rate(), 1.0);
    }
}

#[test]
fn slowest_rate_terminates_with_bounded_output() {
    for kind in VARIANTS {
        for filter in [false, true] {
            let mut t = transposer::<f32>(kind, MIN_RATE, 1, filter);
            t.put_samples(&[1.0, 1.0]);
            t.flush_store_buffer();

            let mut out = Vec::new();
            drain(&mut t, &mut out);
            assert!(
                (65_536..=3 * 65_536).contains(&out.len()),
                "{kind:?} filter {filter}: {} frames",
                out.len()
            );
            assert!(out.iter().all(|&s| (-0.01..=1.01).contains(&s)));
            assert!(t.is_empty());
        }
    }
}
