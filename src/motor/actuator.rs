// Motor actuator capability consumed by the kinematics engine
//
// One actuator instance drives all four wheels, addressed by `Wheel`.
// Implementations: the PCA9685 I2C motor shield (hardware) and `LoggingActuator` (dry run).

use std::convert::Infallible;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wheel identities in the fixed 1..4 layout used by every table in the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wheel {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl Wheel {
    /// All wheels, in index order
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::BackLeft,
        Wheel::BackRight,
    ];

    /// Zero-based array index
    pub fn index(self) -> usize {
        match self {
            Wheel::FrontLeft => 0,
            Wheel::FrontRight => 1,
            Wheel::BackLeft => 2,
            Wheel::BackRight => 3,
        }
    }

    /// One-based wheel number (1..4)
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Direction a wheel motor is commanded to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    /// Coast: the motor is not driven, whatever the magnitude
    #[default]
    Release,
}

impl Direction {
    /// The opposite running direction; `Release` stays `Release`
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Release => Direction::Release,
        }
    }
}

/// Resolved actuation for a single wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelCommand {
    pub wheel: Wheel,
    pub direction: Direction,
    pub magnitude: u8,
}

impl WheelCommand {
    pub fn released(wheel: Wheel) -> Self {
        Self {
            wheel,
            direction: Direction::Release,
            magnitude: 0,
        }
    }
}

/// Hardware-facing capability the engine emits wheel commands to
pub trait MotorActuator {
    type Error;

    /// Bring up the underlying hardware. Called once by `MecanumDrive::initialize`.
    fn initialize(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_direction(&mut self, wheel: Wheel, direction: Direction) -> Result<(), Self::Error>;

    fn set_magnitude(&mut self, wheel: Wheel, magnitude: u8) -> Result<(), Self::Error>;

    /// Block for `duration`. Used by the timed motion variants.
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Actuator that only logs, for running without hardware
#[derive(Debug, Default)]
pub struct LoggingActuator {
    last: [Option<WheelCommand>; 4],
}

impl LoggingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last command seen for a wheel (direction and magnitude may arrive separately)
    pub fn last_command(&self, wheel: Wheel) -> Option<WheelCommand> {
        self.last[wheel.index()]
    }

    fn entry(&mut self, wheel: Wheel) -> &mut WheelCommand {
        self.last[wheel.index()].get_or_insert(WheelCommand::released(wheel))
    }
}

impl MotorActuator for LoggingActuator {
    type Error = Infallible;

    fn set_direction(&mut self, wheel: Wheel, direction: Direction) -> Result<(), Infallible> {
        debug!("[dry-run] wheel {} direction={:?}", wheel.number(), direction);
        self.entry(wheel).direction = direction;
        Ok(())
    }

    fn set_magnitude(&mut self, wheel: Wheel, magnitude: u8) -> Result<(), Infallible> {
        debug!("[dry-run] wheel {} magnitude={}", wheel.number(), magnitude);
        self.entry(wheel).magnitude = magnitude;
        Ok(())
    }
}
