// Motor control module for the mecanum base
//
// Provides:
// - Mecanum inverse kinematics and skid-steer mapping (motion request -> wheel commands)
// - The motor actuator capability and a dry-run implementation
// - A PCA9685 I2C motor-shield driver
// - The high-level drive engine

pub mod actuator;
mod engine;
pub mod kinematics;
pub mod shield;

pub use actuator::{Direction, LoggingActuator, MotorActuator, Wheel, WheelCommand};
pub use engine::MecanumDrive;
pub use kinematics::{WheelVoltages, resolve_drive, resolve_skid_steer};
pub use shield::{MotorShield, ShieldError};
#[cfg(target_os = "linux")]
pub use shield::LinuxMotorShield;
