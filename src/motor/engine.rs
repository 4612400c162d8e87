// High-level mecanum drive engine
//
// Owns the orientation flag and speed cap, resolves motion requests through the
// kinematics module and emits one direction + magnitude per wheel to the actuator.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::actuator::{MotorActuator, WheelCommand};
use super::kinematics::{clamp_speed_cap, resolve_drive, resolve_skid_steer};

/// Four-wheel mecanum drive over an injected motor actuator
pub struct MecanumDrive<A: MotorActuator> {
    actuator: A,
    max_speed: f64,
    flipped: bool,
}

impl<A: MotorActuator> MecanumDrive<A> {
    /// Create an engine with full speed cap and default orientation
    pub fn new(actuator: A) -> Self {
        Self {
            actuator,
            max_speed: 1.0,
            flipped: false,
        }
    }

    /// Bring up the actuator and leave every wheel released
    pub fn initialize(&mut self) -> Result<(), A::Error> {
        info!("Initializing mecanum drive");
        self.actuator.initialize()?;
        self.stop()?;
        Ok(())
    }

    /// Drive with a translation speed, heading and rotation rate
    ///
    /// # Arguments
    /// * `velocity` - Translation speed, saturated to [-1, 1]
    /// * `heading_deg` - Translation heading in degrees (0 = forward, 90 = right)
    /// * `rotation` - Rotation rate, saturated to [-1, 1] (positive = clockwise)
    pub fn drive(
        &mut self,
        velocity: f64,
        heading_deg: i32,
        rotation: f64,
    ) -> Result<[WheelCommand; 4], A::Error> {
        let commands = resolve_drive(velocity, heading_deg, rotation, self.max_speed, self.flipped);
        debug!(
            "drive(v={}, heading={}, rot={}) -> {:?}",
            velocity, heading_deg, rotation, commands
        );
        self.apply(commands)
    }

    /// Two-sided control: `left` drives wheels 1/3, `right` drives wheels 2/4
    pub fn skid_steer(&mut self, left: f64, right: f64) -> Result<[WheelCommand; 4], A::Error> {
        let commands = resolve_skid_steer(left, right, self.max_speed, self.flipped);
        debug!("skid_steer(left={}, right={}) -> {:?}", left, right, commands);
        self.apply(commands)
    }

    fn apply(&mut self, commands: [WheelCommand; 4]) -> Result<[WheelCommand; 4], A::Error> {
        for cmd in &commands {
            self.actuator.set_direction(cmd.wheel, cmd.direction)?;
            self.actuator.set_magnitude(cmd.wheel, cmd.magnitude)?;
        }
        Ok(commands)
    }

    /// Swap the logical front and back of the chassis
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
        info!("Orientation flipped: {}", self.flipped);
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Set the global speed cap, saturated to [0, 1]. Takes effect on the next command.
    pub fn set_max_speed(&mut self, speed: f64) {
        self.max_speed = clamp_speed_cap(speed);
        info!("Max speed set to {:.3}", self.max_speed);
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    // === Fixed motions ===

    pub fn stop(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(0.0, 0, 0.0)
    }

    pub fn forward(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(1.0, 0, 0.0)
    }

    pub fn reverse(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(-1.0, 0, 0.0)
    }

    pub fn strafe_right(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(1.0, 90, 0.0)
    }

    pub fn strafe_left(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(1.0, 270, 0.0)
    }

    pub fn rotate_right(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(0.0, 0, 1.0)
    }

    pub fn rotate_left(&mut self) -> Result<[WheelCommand; 4], A::Error> {
        self.drive(0.0, 0, -1.0)
    }

    // === Timed motions: run, hold for `duration`, then stop ===

    fn timed(
        &mut self,
        velocity: f64,
        heading_deg: i32,
        rotation: f64,
        duration: Duration,
    ) -> Result<(), A::Error> {
        self.drive(velocity, heading_deg, rotation)?;
        self.actuator.hold(duration);
        self.stop()?;
        Ok(())
    }

    pub fn forward_for(&mut self, duration: Duration) -> Result<(), A::Error> {
        self.timed(1.0, 0, 0.0, duration)
    }

    pub fn reverse_for(&mut self, duration: Duration) -> Result<(), A::Error> {
        self.timed(-1.0, 0, 0.0, duration)
    }

    pub fn strafe_right_for(&mut self, duration: Duration) -> Result<(), A::Error> {
        self.timed(1.0, 90, 0.0, duration)
    }

    pub fn strafe_left_for(&mut self, duration: Duration) -> Result<(), A::Error> {
        self.timed(1.0, 270, 0.0, duration)
    }

    pub fn rotate_right_for(&mut self, duration: Duration) -> Result<(), A::Error> {
        self.timed(0.0, 0, 1.0, duration)
    }

    pub fn rotate_left_for(&mut self, duration: Duration) -> Result<(), A::Error> {
        self.timed(0.0, 0, -1.0, duration)
    }
}

impl<A: MotorActuator> Drop for MecanumDrive<A> {
    fn drop(&mut self) {
        // Try to release motors when the engine is dropped
        if self.stop().is_err() {
            warn!("Failed to stop motors on drop");
        }
    }
}
