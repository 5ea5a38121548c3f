use std::sync::Arc;

use motorlab_core::config::{DetectorCfg, ExperimentCfg};
use motorlab_core::experiment::{Characterization, ExperimentState};
use motorlab_core::mocks::{BrokenTransport, CollectingRecorder, NullRecorder, ScriptedTransport};
use motorlab_traits::ManualClock;

fn test_cfg(duties: Vec<i32>) -> ExperimentCfg {
    ExperimentCfg {
        duty_values: duties,
        steady: DetectorCfg {
            window: 25,
            threshold: 2.0,
        },
        stop: DetectorCfg {
            window: 25,
            threshold: 1.0,
        },
        poll_ms: 50,
        settle_ms: 1_000,
    }
}

/// Script one synthetic run: a batch consumed by the StartRun tick, a short
/// spin-up ramp, then a constant-rate stretch long enough to fill the steady
/// window, then one stalled sample that trips the stop detector's
/// short-buffer fallback.
///
/// With 50 ms polling, per-sample angle deltas of 1..4 deg give spin-up
/// velocities of 20..80 deg/s, and 5 deg gives the steady 100 deg/s.
fn script_run(transport: &mut ScriptedTransport) {
    transport.push_batch(Vec::<String>::new()); // consumed while state == StartRun
    // Start near the wrap boundary so the ramp crosses 360 mid-run.
    let mut angle = 300.0f64;
    transport.push_line(format!("Angle:{angle:.2}"));
    let mut deltas = vec![1.0, 2.0, 3.0, 4.0];
    deltas.extend(std::iter::repeat_n(5.0, 25));
    for d in deltas {
        angle = (angle + d) % 360.0;
        transport.push_line(format!("Angle:{angle:.2}"));
    }
    // Shaft stalled: the angle stops moving.
    transport.push_line(format!("Angle:{angle:.2}"));
}

fn scripted_sweep(duties: &[i32]) -> ScriptedTransport {
    let mut transport = ScriptedTransport::new();
    transport.push_batch(Vec::<String>::new()); // consumed while state == Idle
    for _ in duties {
        script_run(&mut transport);
    }
    transport
}

fn build(
    duties: &[i32],
) -> Characterization<ScriptedTransport, CollectingRecorder> {
    Characterization::with_clock(
        scripted_sweep(duties),
        CollectingRecorder::default(),
        test_cfg(duties.to_vec()),
        Arc::new(ManualClock::new()),
    )
    .expect("build")
}

#[test]
fn five_value_sweep_reaches_finished_with_all_runs_sealed() {
    let duties = [150, 175, 200, 225, 250];
    let mut machine = build(&duties);

    let outcome = machine.run(None).expect("run");
    assert!(!outcome.cancelled);
    assert_eq!(machine.state(), ExperimentState::Finished);
    assert_eq!(outcome.results.len(), 5);
    let keys: Vec<i32> = outcome.results.keys().copied().collect();
    assert_eq!(keys, duties);
    for (duty, record) in &outcome.results {
        assert_eq!(record.parameter, f64::from(*duty));
        assert!(
            record.series.len() >= 25,
            "run {duty} captured only {} samples",
            record.series.len()
        );
    }
}

#[test]
fn final_transport_command_is_neutral() {
    let duties = [150, 175];
    let mut machine = build(&duties);
    machine.run(None).expect("run");

    let writes = &machine.transport().writes;
    assert_eq!(writes.first().map(String::as_str), Some("150"));
    assert_eq!(writes.last().map(String::as_str), Some("0"));
    // Each run applies its duty then cuts the drive; run() re-sends neutral
    // on exit.
    assert_eq!(writes, &["150", "0", "175", "0", "0"]);
}

#[test]
fn captured_velocities_are_wrap_corrected() {
    let duties = [150];
    let mut machine = build(&duties);
    let outcome = machine.run(None).expect("run");
    let record = &outcome.results[&150];
    assert_eq!(record.series.len(), 30);
    // The constant stretch crosses the 360 boundary; every estimated
    // velocity there must still be exactly 100 deg/s.
    for p in &record.series[4..record.series.len() - 1] {
        assert!(
            (p.value - 100.0).abs() < 1e-6,
            "velocity {} at t={}",
            p.value,
            p.t
        );
    }
}

#[test]
fn runs_carry_a_first_order_fit() {
    let duties = [150];
    let mut machine = build(&duties);
    let outcome = machine.run(None).expect("run");
    let plant = outcome.results[&150].plant.expect("fit");
    // The fit sees only the rise: a 20..80 ramp then 25 samples at 100.
    assert!((plant.steady_velocity - 100.0).abs() < 1e-9);
    assert!((plant.gain - 100.0 / 150.0).abs() < 1e-9);
    assert!(plant.tau_s > 0.0);
}

#[test]
fn recorder_sees_each_sealed_run_and_one_finalize() {
    let duties = [150, 175, 200];
    let mut machine = build(&duties);
    machine.run(None).expect("run");
    let recorder = machine.recorder();
    assert_eq!(recorder.runs.len(), 3);
    assert_eq!(recorder.finalize_calls, 1);
    assert_eq!(recorder.finalized_len, Some(3));
}

#[test]
fn cancellation_sends_neutral_and_keeps_sealed_runs() {
    let duties = [150, 175];
    let mut machine = build(&duties);
    let outcome = machine
        .run(Some(Box::new(|| true)))
        .expect("run returns on cancel");
    assert!(outcome.cancelled);
    assert!(outcome.results.is_empty());
    // The only write is the neutral command issued on the way out.
    assert_eq!(machine.transport().writes, vec!["0"]);
}

#[test]
fn transport_write_failure_aborts_the_run() {
    let mut machine = Characterization::with_clock(
        BrokenTransport,
        NullRecorder,
        test_cfg(vec![150]),
        Arc::new(ManualClock::new()),
    )
    .expect("build");
    // Idle -> StartRun transition is fine; the duty write then fails.
    assert!(machine.tick().is_ok());
    let err = machine.tick().expect_err("write failure surfaces");
    assert!(err.to_string().contains("transport"), "got: {err}");
}

#[test]
fn rejects_empty_duty_list() {
    let result = Characterization::with_clock(
        ScriptedTransport::new(),
        NullRecorder,
        test_cfg(Vec::new()),
        Arc::new(ManualClock::new()),
    );
    assert!(result.is_err());
}

#[test]
fn rejects_zero_detector_window() {
    let mut cfg = test_cfg(vec![150]);
    cfg.steady.window = 0;
    let result = Characterization::with_clock(
        ScriptedTransport::new(),
        NullRecorder,
        cfg,
        Arc::new(ManualClock::new()),
    );
    assert!(result.is_err());
}
