use motorlab_core::plant::fit_first_order;
use motorlab_core::record::TracePoint;

/// Sample a first-order rise ω(t) = ω_ss·(1 − e^(−t/τ)).
fn first_order_trace(tau_s: f64, steady: f64, dt: f64, n: usize) -> Vec<TracePoint> {
    (1..=n)
        .map(|i| {
            let t = i as f64 * dt;
            TracePoint::new(t, steady * (1.0 - (-t / tau_s).exp()))
        })
        .collect()
}

#[test]
fn recovers_tau_and_gain_from_a_clean_rise() {
    // τ = 0.5 s, K·duty = 300 deg/s at duty 150 -> K = 2.
    let series = first_order_trace(0.5, 300.0, 0.02, 150);
    let est = fit_first_order(&series, 150.0, 25).expect("fit");
    assert!(
        (est.tau_s - 0.5).abs() < 0.06,
        "tau estimate {} too far from 0.5",
        est.tau_s
    );
    assert!(
        (est.gain - 2.0).abs() < 0.05,
        "gain estimate {} too far from 2.0",
        est.gain
    );
    assert!((est.steady_velocity - 300.0).abs() < 5.0);
}

#[test]
fn reverse_rotation_fits_on_magnitude() {
    let mut series = first_order_trace(0.5, 300.0, 0.02, 150);
    for p in &mut series {
        p.value = -p.value;
    }
    let est = fit_first_order(&series, 150.0, 25).expect("fit");
    assert!(est.steady_velocity > 0.0);
    assert!((est.gain - 2.0).abs() < 0.05);
}

#[test]
fn refuses_zero_duty() {
    let series = first_order_trace(0.5, 300.0, 0.02, 150);
    assert!(fit_first_order(&series, 0.0, 25).is_none());
}

#[test]
fn refuses_a_trace_that_never_moved() {
    let series: Vec<TracePoint> = (0..50)
        .map(|i| TracePoint::new(i as f64 * 0.02, 0.1))
        .collect();
    assert!(fit_first_order(&series, 150.0, 25).is_none());
}

#[test]
fn refuses_too_short_series() {
    let series = vec![TracePoint::new(0.0, 10.0)];
    assert!(fit_first_order(&series, 150.0, 25).is_none());
}

#[test]
fn refuses_a_decaying_trace() {
    // Steady tail below the starting speed: not a step-up response.
    let series: Vec<TracePoint> = (0..100)
        .map(|i| {
            let t = i as f64 * 0.02;
            TracePoint::new(t, 300.0 * (-t / 0.5).exp())
        })
        .collect();
    assert!(fit_first_order(&series, 150.0, 25).is_none());
}
