use motorlab_core::window::WindowDetector;

#[test]
fn steady_satisfied_by_full_window_of_identical_values() {
    let mut d = WindowDetector::steady(25, 2.0);
    for _ in 0..25 {
        d.push(812.5);
    }
    assert!(d.is_satisfied());
}

#[test]
fn steady_never_satisfied_below_window_size() {
    let mut d = WindowDetector::steady(25, 2.0);
    for _ in 0..24 {
        d.push(0.0); // even a perfectly flat signal is not enough history
    }
    assert!(!d.is_satisfied());
    d.push(0.0);
    assert!(d.is_satisfied());
}

#[test]
fn steady_rejects_noisy_window() {
    let mut d = WindowDetector::steady(25, 2.0);
    for i in 0..25 {
        // Alternating ±5 deg/s around 800: std-dev is 5.
        let v = if i % 2 == 0 { 805.0 } else { 795.0 };
        d.push(v);
    }
    assert!(!d.is_satisfied());
}

#[test]
fn stop_single_low_reading_satisfies_early() {
    let mut d = WindowDetector::stop(25, 1.0);
    d.push(0.5);
    assert!(d.is_satisfied());
}

#[test]
fn stop_single_high_reading_does_not_satisfy() {
    let mut d = WindowDetector::stop(25, 1.0);
    d.push(5.0);
    assert!(!d.is_satisfied());
}

#[test]
fn stop_short_buffer_judges_only_the_last_sample() {
    let mut d = WindowDetector::stop(25, 1.0);
    d.push(50.0);
    d.push(0.2); // still coasting down, but the latest reading is quiet
    assert!(d.is_satisfied());
    d.push(3.0); // a kick makes it unsatisfied again
    assert!(!d.is_satisfied());
}

#[test]
fn stop_full_window_uses_mean_absolute_value() {
    let mut d = WindowDetector::stop(25, 1.0);
    for i in 0..25 {
        // Signed jitter around zero; mean |v| = 0.9.
        let v = if i % 2 == 0 { 0.9 } else { -0.9 };
        d.push(v);
    }
    assert!(d.is_satisfied());

    let mut d = WindowDetector::stop(25, 1.0);
    for _ in 0..25 {
        d.push(1.5);
    }
    assert!(!d.is_satisfied());
}

#[test]
fn clear_resets_history() {
    let mut d = WindowDetector::steady(4, 2.0);
    for _ in 0..4 {
        d.push(100.0);
    }
    assert!(d.is_satisfied());
    d.clear();
    assert!(d.is_empty());
    assert!(!d.is_satisfied());
}

#[test]
fn empty_stop_detector_is_not_satisfied() {
    let d = WindowDetector::stop(25, 1.0);
    assert!(!d.is_satisfied());
}
