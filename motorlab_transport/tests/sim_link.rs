use motorlab_traits::Transport;
use motorlab_transport::{SimMode, SimulatedLink};

fn step_n(link: &mut SimulatedLink, n: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for _ in 0..n {
        lines.extend(link.drain_lines().expect("drain"));
    }
    lines
}

#[test]
fn open_loop_velocity_approaches_k_times_duty() {
    let mut link = SimulatedLink::new(SimMode::Velocity, 0.02);
    link.write_line("150").expect("write");
    // τ = 0.25 s; 200 steps of 20 ms is 4 s, 16 time constants.
    step_n(&mut link, 200);
    assert!(
        (link.velocity() - 300.0).abs() < 1.0,
        "expected ~300 deg/s, got {}",
        link.velocity()
    );

    link.write_line("0").expect("write");
    step_n(&mut link, 200);
    assert!(
        link.velocity().abs() < 1.0,
        "expected decay to rest, got {}",
        link.velocity()
    );
}

#[test]
fn velocity_lines_carry_duty_time_velocity() {
    let mut link = SimulatedLink::new(SimMode::Velocity, 0.02);
    link.write_line("200").expect("write");
    let lines = step_n(&mut link, 3);
    assert_eq!(lines.len(), 3);
    for line in &lines {
        let rest = line.strip_prefix("Data:").expect("Data tag");
        let fields: Vec<&str> = rest.split(',').collect();
        assert_eq!(fields.len(), 3, "line: {line}");
        assert_eq!(fields[0], "200");
        fields[1].parse::<f64>().expect("time field");
        fields[2].parse::<f64>().expect("velocity field");
    }
}

#[test]
fn position_loop_reaches_reference_with_p_gain() {
    let mut link = SimulatedLink::new(SimMode::Position, 0.02);
    link.write_line("G:10,0,0").expect("write");
    link.write_line("R:200").expect("write");
    step_n(&mut link, 400);
    // The deadzone stalls the loop within 50/Kp = 5 deg of target.
    assert!(
        (link.position() - 200.0).abs() < 20.0,
        "expected near 200 deg, got {}",
        link.position()
    );
}

#[test]
fn position_lines_carry_five_fields() {
    let mut link = SimulatedLink::new(SimMode::Position, 0.02);
    link.write_line("G:10,0,0").expect("write");
    link.write_line("R:100").expect("write");
    let lines = step_n(&mut link, 2);
    for line in &lines {
        let rest = line.strip_prefix("Data:").expect("Data tag");
        assert_eq!(rest.split(',').count(), 5, "line: {line}");
    }
}

#[test]
fn zero_command_resets_position_and_reference() {
    let mut link = SimulatedLink::new(SimMode::Position, 0.02);
    link.write_line("G:10,0,0").expect("write");
    link.write_line("R:100").expect("write");
    // Let the loop stall in the deadzone so the shaft is at rest.
    step_n(&mut link, 400);
    assert!(link.position() > 10.0);
    link.write_line("S").expect("write");
    link.write_line("Z").expect("write");
    assert_eq!(link.position(), 0.0);
    // With a zero reference and no residual speed the loop stays put.
    step_n(&mut link, 50);
    assert!(link.position().abs() < 1.0);
}

#[test]
fn commands_are_logged_in_order() {
    let mut link = SimulatedLink::new(SimMode::Position, 0.02);
    for cmd in ["S", "Z", "G:50,0,0", "R:200", "R:0", "S"] {
        link.write_line(cmd).expect("write");
    }
    assert_eq!(link.writes, vec!["S", "Z", "G:50,0,0", "R:200", "R:0", "S"]);
}
