use motorlab_core::velocity::AngleVelocityEstimator;
use proptest::prelude::*;

#[test]
fn first_observation_after_reset_emits_nothing() {
    let mut est = AngleVelocityEstimator::new();
    assert!(est.observe(10.0, 0.0).is_none());
    assert!(est.observe(15.0, 0.05).is_some());

    est.reset();
    assert!(est.observe(100.0, 1.0).is_none());
    assert!(est.observe(105.0, 1.05).is_some());
}

#[test]
fn plain_difference_inside_half_turn() {
    let mut est = AngleVelocityEstimator::new();
    est.observe(10.0, 0.0);
    let v = est.observe(15.0, 0.5).expect("second sample emits");
    assert_eq!(v.t, 0.5);
    assert_eq!(v.value, 10.0); // 5 deg over 0.5 s
}

#[test]
fn unwraps_forward_crossing_of_zero() {
    // 350 -> 10 is +20 deg the short way, not -340.
    let mut est = AngleVelocityEstimator::new();
    est.observe(350.0, 0.0);
    let v = est.observe(10.0, 1.0).expect("emits");
    assert_eq!(v.value, 20.0);
}

#[test]
fn unwraps_backward_crossing_of_zero() {
    // 10 -> 350 is -20 deg the short way.
    let mut est = AngleVelocityEstimator::new();
    est.observe(10.0, 0.0);
    let v = est.observe(350.0, 1.0).expect("emits");
    assert_eq!(v.value, -20.0);
}

#[test]
fn nonpositive_dt_is_swallowed_but_updates_the_reference() {
    let mut est = AngleVelocityEstimator::new();
    est.observe(0.0, 0.0);
    // Duplicate timestamp: no emission, but the sample replaces the reference.
    assert!(est.observe(50.0, 0.0).is_none());
    // Next good sample differences against 50 deg, not 0.
    let v = est.observe(60.0, 1.0).expect("emits");
    assert_eq!(v.value, 10.0);
}

#[test]
fn out_of_order_timestamp_is_swallowed() {
    let mut est = AngleVelocityEstimator::new();
    est.observe(0.0, 1.0);
    assert!(est.observe(10.0, 0.5).is_none());
    let v = est.observe(20.0, 1.5).expect("emits");
    assert_eq!(v.value, 10.0); // 10 deg over the 0.5 -> 1.5 interval
}

proptest! {
    /// Shortest-path unwrap: for any pair of wrapped angles, the implied
    /// per-second delta stays within [-180, 180].
    #[test]
    fn unwrapped_delta_stays_within_half_turn(a in 0.0f64..360.0, b in 0.0f64..360.0) {
        let mut est = AngleVelocityEstimator::new();
        est.observe(a, 0.0);
        let v = est.observe(b, 1.0).expect("dt > 0 emits");
        prop_assert!((-180.0..=180.0).contains(&v.value), "delta {} out of range", v.value);
    }

    /// The estimator always emits on the second sample when time advances.
    #[test]
    fn always_emits_on_second_sample(a in 0.0f64..360.0, b in 0.0f64..360.0, dt in 0.001f64..10.0) {
        let mut est = AngleVelocityEstimator::new();
        prop_assert!(est.observe(a, 0.0).is_none());
        prop_assert!(est.observe(b, dt).is_some());
    }
}
