//! Simulated controller board behind the `Transport` seam.
//!
//! Models the bench rig closely enough for integration tests and
//! hardware-free dry runs: a first-order velocity plant
//! `dω/dt = (K·u − ω)/τ` driven either open-loop by a duty command or by
//! the firmware's PID position loop, emitting the same line formats the
//! real firmware streams. One plant step is taken per `drain_lines` call,
//! so a poll-paced driver advances the simulation at its own cadence.

use motorlab_traits::Transport;

/// Which firmware personality to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    /// Open-loop duty drive, streaming `Data:<duty>,<t>,<velocity>`.
    Velocity,
    /// Closed-loop PID position control, streaming
    /// `Data:<t>,<position>,<reference>,<error>,<control>`.
    Position,
}

// Firmware constants.
const PWM_MAX: f64 = 255.0;
const PWM_DEADZONE: f64 = 50.0;
const INTEGRAL_MAX: f64 = 100.0;
const DERIVATIVE_ALPHA: f64 = 0.2;

pub struct SimulatedLink {
    mode: SimMode,
    tau_s: f64,
    gain: f64,
    dt_s: f64,

    // Drive state
    duty: f64,
    // PID state
    kp: f64,
    ki: f64,
    kd: f64,
    reference: f64,
    integral: f64,
    prev_error: f64,
    derivative_filtered: f64,
    last_error: f64,
    last_control: f64,
    // Plant state
    velocity: f64,
    position: f64,
    t: f64,

    /// Commands received, in order; inspectable by tests.
    pub writes: Vec<String>,
}

impl SimulatedLink {
    /// Default plant: τ = 0.25 s, K = 2.0 (deg/s per duty unit).
    pub fn new(mode: SimMode, dt_s: f64) -> Self {
        Self {
            mode,
            tau_s: 0.25,
            gain: 2.0,
            dt_s: if dt_s > 0.0 { dt_s } else { 0.05 },
            duty: 0.0,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            reference: 0.0,
            integral: 0.0,
            prev_error: 0.0,
            derivative_filtered: 0.0,
            last_error: 0.0,
            last_control: 0.0,
            velocity: 0.0,
            position: 0.0,
            t: 0.0,
            writes: Vec::new(),
        }
    }

    /// Override the plant parameters.
    pub fn with_plant(mut self, tau_s: f64, gain: f64) -> Self {
        if tau_s > 0.0 {
            self.tau_s = tau_s;
        }
        self.gain = gain;
        self
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    fn apply_command(&mut self, line: &str) {
        let cmd = line.trim();
        if cmd == "S" {
            self.duty = 0.0;
            self.integral = 0.0;
        } else if cmd == "Z" {
            self.position = 0.0;
            self.reference = 0.0;
            self.integral = 0.0;
            self.prev_error = 0.0;
            self.derivative_filtered = 0.0;
        } else if let Some(rest) = cmd.strip_prefix("G:") {
            let parts: Vec<&str> = rest.split(',').collect();
            if let [kp, ki, kd] = parts.as_slice()
                && let (Ok(kp), Ok(ki), Ok(kd)) =
                    (kp.trim().parse(), ki.trim().parse(), kd.trim().parse())
            {
                self.kp = kp;
                self.ki = ki;
                self.kd = kd;
                self.integral = 0.0;
            }
        } else if let Some(rest) = cmd.strip_prefix("R:") {
            if let Ok(r) = rest.trim().parse() {
                self.reference = r;
                self.integral = 0.0;
            }
        } else if let Ok(duty) = cmd.parse::<i32>() {
            self.duty = f64::from(duty);
        }
    }

    fn step_once(&mut self) -> String {
        self.t += self.dt_s;
        let u = match self.mode {
            SimMode::Velocity => self.duty,
            SimMode::Position => self.pid_output(),
        };
        self.velocity += self.dt_s * (self.gain * u - self.velocity) / self.tau_s;
        self.position += self.velocity * self.dt_s;
        match self.mode {
            SimMode::Velocity => format!(
                "Data:{},{:.3},{:.2}",
                self.duty as i32, self.t, self.velocity
            ),
            SimMode::Position => format!(
                "Data:{:.3},{:.2},{:.2},{:.2},{:.2}",
                self.t, self.position, self.reference, self.last_error, self.last_control
            ),
        }
    }

    fn pid_output(&mut self) -> f64 {
        let error = self.reference - self.position;
        let p = self.kp * error;

        self.integral = (self.integral + error * self.dt_s).clamp(-INTEGRAL_MAX, INTEGRAL_MAX);
        let i = self.ki * self.integral;

        let derivative_raw = (error - self.prev_error) / self.dt_s;
        self.derivative_filtered =
            DERIVATIVE_ALPHA * derivative_raw + (1.0 - DERIVATIVE_ALPHA) * self.derivative_filtered;
        let d = self.kd * self.derivative_filtered;
        self.prev_error = error;

        let control = p + i + d;
        self.last_error = error;
        self.last_control = control;
        if control.abs() > PWM_DEADZONE {
            control.clamp(-PWM_MAX, PWM_MAX)
        } else {
            0.0
        }
    }
}

impl Transport for SimulatedLink {
    fn drain_lines(&mut self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(vec![self.step_once()])
    }

    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.writes.push(line.to_string());
        self.apply_command(line);
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Nothing accumulates between drains.
        Ok(())
    }
}
