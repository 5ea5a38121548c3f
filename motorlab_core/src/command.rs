//! Wire commands understood by the controller firmware.

use std::fmt;

/// One command line. `Display` renders the exact token the firmware parses;
/// the transport appends the newline terminator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Open-loop PWM duty magnitude in device units. `Duty(0)` is the
    /// neutral/coast command.
    Duty(i32),
    /// Output stage off.
    Stop,
    /// Zero the encoder count and the position reference.
    Zero,
    /// Load PID gains.
    Gains { kp: f64, ki: f64, kd: f64 },
    /// Closed-loop step to a position reference, degrees.
    MoveTo(f64),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Duty(d) => write!(f, "{d}"),
            Command::Stop => write!(f, "S"),
            Command::Zero => write!(f, "Z"),
            Command::Gains { kp, ki, kd } => write!(f, "G:{kp},{ki},{kd}"),
            Command::MoveTo(r) => write!(f, "R:{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Command;

    #[test]
    fn renders_firmware_tokens() {
        assert_eq!(Command::Duty(150).to_string(), "150");
        assert_eq!(Command::Duty(0).to_string(), "0");
        assert_eq!(Command::Stop.to_string(), "S");
        assert_eq!(Command::Zero.to_string(), "Z");
        assert_eq!(Command::MoveTo(200.0).to_string(), "R:200");
        assert_eq!(Command::MoveTo(0.0).to_string(), "R:0");
    }

    #[test]
    fn gains_render_without_trailing_zeros() {
        let cmd = Command::Gains {
            kp: 50.0,
            ki: 0.0,
            kd: 5.0,
        };
        assert_eq!(cmd.to_string(), "G:50,0,5");
        let cmd = Command::Gains {
            kp: 0.5,
            ki: 0.0,
            kd: 12.5,
        };
        assert_eq!(cmd.to_string(), "G:0.5,0,12.5");
    }
}
