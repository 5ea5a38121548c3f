//! Telemetry line decoding.
//!
//! One text line in, exactly one event out. Decoding is total: malformed
//! numerics, unknown tags and wrong field counts all map to `Unrecognized`
//! rather than an error, because the stream is noisy by nature (boot
//! banners, partial lines after a reset, line corruption).

/// A decoded telemetry line. Field counts are fixed per tag; anything that
/// does not match a known shape lands in `Unrecognized` with the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// Raw wrapped-angle sample (`Angle:<deg>`). Arrival time is stamped by
    /// the consumer; the decoder stays stateless.
    Angle { degrees: f64 },
    /// Open-loop velocity record: `Data:<duty>,<t>,<velocity>`.
    Velocity { duty: i32, t: f64, velocity: f64 },
    /// Closed-loop record: `Data:<t>,<position>,<reference>,<error>,<control>`.
    Loop {
        t: f64,
        position: f64,
        reference: f64,
        error: f64,
        control: f64,
    },
    /// Device-side time-constant announcement: `Tau:<duty>,<t>,<tau>`.
    Tau { duty: i32, t: f64, tau_s: f64 },
    /// Device-side DC-gain announcement: `K:<duty>,<t>,<k>,<steady>`.
    Gain {
        duty: i32,
        t: f64,
        k: f64,
        steady_velocity: f64,
    },
    /// Task banner printed by the firmware at boot: `TASK:<label>`.
    Task { label: String },
    /// Anything else, kept verbatim for trace logging.
    Unrecognized { raw: String },
}

/// Decode one raw line. Never panics, never fails.
pub fn decode_line(line: &str) -> TelemetryEvent {
    let trimmed = line.trim();
    let unrecognized = || TelemetryEvent::Unrecognized {
        raw: line.to_string(),
    };

    let Some((tag, rest)) = trimmed.split_once(':') else {
        return unrecognized();
    };

    match tag {
        "Angle" => match num(rest) {
            Some(degrees) => TelemetryEvent::Angle { degrees },
            None => unrecognized(),
        },
        "Data" => {
            let fields: Vec<&str> = rest.split(',').collect();
            match fields.as_slice() {
                [duty, t, velocity] => match (int(duty), num(t), num(velocity)) {
                    (Some(duty), Some(t), Some(velocity)) => TelemetryEvent::Velocity {
                        duty,
                        t,
                        velocity,
                    },
                    _ => unrecognized(),
                },
                [t, position, reference, error, control] => {
                    match (num(t), num(position), num(reference), num(error), num(control)) {
                        (Some(t), Some(position), Some(reference), Some(error), Some(control)) => {
                            TelemetryEvent::Loop {
                                t,
                                position,
                                reference,
                                error,
                                control,
                            }
                        }
                        _ => unrecognized(),
                    }
                }
                _ => unrecognized(),
            }
        }
        "Tau" => {
            let fields: Vec<&str> = rest.split(',').collect();
            match fields.as_slice() {
                [duty, t, tau_s] => match (int(duty), num(t), num(tau_s)) {
                    (Some(duty), Some(t), Some(tau_s)) => TelemetryEvent::Tau { duty, t, tau_s },
                    _ => unrecognized(),
                },
                _ => unrecognized(),
            }
        }
        "K" => {
            let fields: Vec<&str> = rest.split(',').collect();
            match fields.as_slice() {
                [duty, t, k, steady] => match (int(duty), num(t), num(k), num(steady)) {
                    (Some(duty), Some(t), Some(k), Some(steady_velocity)) => TelemetryEvent::Gain {
                        duty,
                        t,
                        k,
                        steady_velocity,
                    },
                    _ => unrecognized(),
                },
                _ => unrecognized(),
            }
        }
        "TASK" => TelemetryEvent::Task {
            label: rest.to_string(),
        },
        _ => unrecognized(),
    }
}

/// Parse a finite float field. Non-finite values are treated as corruption.
fn num(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn int(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}
