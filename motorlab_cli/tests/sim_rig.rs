//! End-to-end runs of the core drivers against the simulated plant.

use motorlab_core::config::{DetectorCfg, ExperimentCfg, SweepCfg};
use motorlab_core::experiment::Characterization;
use motorlab_core::mocks::CollectingRecorder;
use motorlab_core::sweep::{GainAxis, GainSweep};
use motorlab_transport::{SimMode, SimulatedLink};

#[test]
fn characterization_completes_against_the_simulated_plant() {
    let cfg = ExperimentCfg {
        duty_values: vec![150, 250],
        steady: DetectorCfg {
            window: 25,
            threshold: 2.0,
        },
        stop: DetectorCfg {
            window: 25,
            threshold: 1.0,
        },
        poll_ms: 1,
        settle_ms: 10,
    };
    let link = SimulatedLink::new(SimMode::Velocity, 0.02);
    let mut machine =
        Characterization::new(link, CollectingRecorder::default(), cfg).expect("build");
    let outcome = machine.run(None).expect("run");

    assert!(!outcome.cancelled);
    assert_eq!(outcome.results.len(), 2);
    // The sim plant has K = 2.0: duty 150 settles near 300 deg/s, 250 near 500.
    let plant = outcome.results[&150].plant.expect("fit for duty 150");
    assert!(
        (plant.steady_velocity - 300.0).abs() < 15.0,
        "steady {}",
        plant.steady_velocity
    );
    assert!((plant.gain - 2.0).abs() < 0.1, "gain {}", plant.gain);
    let plant = outcome.results[&250].plant.expect("fit for duty 250");
    assert!((plant.gain - 2.0).abs() < 0.1, "gain {}", plant.gain);
    // After each run the drive was cut and the shaft coasted down.
    let writes = &machine.transport().writes;
    assert_eq!(writes.first().map(String::as_str), Some("150"));
    assert!(writes.contains(&"0".to_string()));
}

#[test]
fn gain_sweep_collects_step_responses_from_the_simulated_loop() {
    let cfg = SweepCfg {
        target: 200.0,
        test_duration_ms: 150,
        poll_ms: 1,
        stop_settle_ms: 1,
        zero_settle_ms: 1,
        gain_settle_ms: 1,
        return_settle_ms: 1,
    };
    let link = SimulatedLink::new(SimMode::Position, 0.05);
    let mut sweep = GainSweep::new(
        link,
        CollectingRecorder::default(),
        vec![10.0, 100.0],
        GainAxis::Kp,
        cfg,
    )
    .expect("build");
    let outcome = sweep.run(None).expect("run");

    assert!(!outcome.cancelled);
    assert_eq!(outcome.records.len(), 2);
    for record in &outcome.records {
        assert!(
            record.series.len() > 50,
            "trial {} captured {} samples",
            record.parameter,
            record.series.len()
        );
        let m = record.metrics.expect("metrics");
        // The loop moves toward the target, so both rise thresholds are
        // crossed well before the window closes.
        assert!(m.rise_time_s.is_some());
    }
    assert_eq!(sweep.recorder().finalize_calls, 1);
}
