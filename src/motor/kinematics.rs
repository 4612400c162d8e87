// Mecanum inverse kinematics for the four-wheel base
// Converts a motion request (speed, heading, rotation) to per-wheel direction and 8-bit magnitude.

use std::f64::consts::{FRAC_PI_4, PI};
use std::ops::Index;

use super::actuator::{Direction, Wheel, WheelCommand};

/// Roller phase offset (45° rollers)
const ROLLER_PHASE: f64 = FRAC_PI_4;

/// Full-scale actuation level
pub const MAX_MAGNITUDE: f64 = 255.0;

/// Normalized values this close to 0 or ±1 are snapped onto them (trig rounding noise)
const SNAP_EPSILON: f64 = 1e-9;

/// Signed relative wheel speeds, indexed by `Wheel`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelVoltages(pub [f64; 4]);

impl WheelVoltages {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Largest absolute value among the four wheels
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
    }
}

impl Index<Wheel> for WheelVoltages {
    type Output = f64;

    fn index(&self, wheel: Wheel) -> &f64 {
        &self.0[wheel.index()]
    }
}

/// Left/right chassis side for skid steering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Wheels 1 and 3 are on the left, 2 and 4 on the right
    pub fn of(wheel: Wheel) -> Self {
        match wheel {
            Wheel::FrontLeft | Wheel::BackLeft => Side::Left,
            Wheel::FrontRight | Wheel::BackRight => Side::Right,
        }
    }
}

/// Saturate a command value into [-1, 1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Saturate a speed cap into [0, 1]. NaN maps to 0.
pub fn clamp_speed_cap(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn deg_to_rad(degrees: i32) -> f64 {
    degrees as f64 * PI / 180.0
}

/// Raw (unnormalized) wheel voltages for a motion request
///
/// # Arguments
/// * `velocity` - Translation speed in [-1, 1]
/// * `radians` - Translation heading (0 = forward, π/2 = right)
/// * `rotation` - Rotation rate in [-1, 1] (positive = clockwise)
/// * `flipped` - Whether the logical front/back of the chassis is swapped
pub fn compute_voltages(velocity: f64, radians: f64, rotation: f64, flipped: bool) -> WheelVoltages {
    let orientation = if flipped { PI } else { 0.0 };
    let angle = radians + orientation + ROLLER_PHASE;
    let (sin_a, cos_a) = angle.sin_cos();

    WheelVoltages([
        velocity * sin_a + rotation,
        velocity * cos_a - rotation,
        velocity * cos_a + rotation,
        velocity * sin_a - rotation,
    ])
}

/// Rescale so the dominant wheel reaches full scale. A neutral set stays all zero.
pub fn normalize(voltages: WheelVoltages) -> WheelVoltages {
    let vmax = voltages.max_abs();
    if vmax == 0.0 {
        return WheelVoltages::zero();
    }
    WheelVoltages(voltages.0.map(|v| snap(v / vmax)))
}

fn snap(v: f64) -> f64 {
    if v.abs() < SNAP_EPSILON {
        0.0
    } else if (v.abs() - 1.0).abs() < SNAP_EPSILON {
        v.signum()
    } else {
        v
    }
}

/// Scale a normalized value by the speed cap into the 0..=255 actuation range
pub fn to_magnitude(value: f64, max_speed: f64) -> u8 {
    let scaled = (max_speed * value.abs() * MAX_MAGNITUDE).round();
    scaled.clamp(0.0, MAX_MAGNITUDE) as u8
}

/// Direction for a wheel voltage, per the motor wiring
pub fn voltage_direction(wheel: Wheel, voltage: f64) -> Direction {
    if voltage == 0.0 {
        return Direction::Release;
    }
    let negative = voltage < 0.0;
    match wheel {
        Wheel::FrontLeft | Wheel::BackLeft => {
            if negative {
                Direction::Forward
            } else {
                Direction::Backward
            }
        }
        Wheel::FrontRight | Wheel::BackRight => {
            if negative {
                Direction::Backward
            } else {
                Direction::Forward
            }
        }
    }
}

/// Direction for one side's skid-steer effort
pub fn skid_direction(side: Side, effort: f64, flipped: bool) -> Direction {
    if effort == 0.0 {
        return Direction::Release;
    }
    let normal = match (side, effort < 0.0) {
        (Side::Left, true) => Direction::Forward,
        (Side::Left, false) => Direction::Backward,
        (Side::Right, true) => Direction::Backward,
        (Side::Right, false) => Direction::Forward,
    };
    if flipped { normal.reversed() } else { normal }
}

/// Turn normalized voltages into the four wheel commands
pub fn voltages_to_commands(voltages: &WheelVoltages, max_speed: f64) -> [WheelCommand; 4] {
    Wheel::ALL.map(|wheel| {
        let v = voltages[wheel];
        WheelCommand {
            wheel,
            direction: voltage_direction(wheel, v),
            magnitude: to_magnitude(v, max_speed),
        }
    })
}

/// Full voltage-model path for an (unclamped) motion request
pub fn resolve_drive(
    velocity: f64,
    heading_deg: i32,
    rotation: f64,
    max_speed: f64,
    flipped: bool,
) -> [WheelCommand; 4] {
    let velocity = clamp_unit(velocity);
    let rotation = clamp_unit(rotation);
    let radians = deg_to_rad(heading_deg);

    let voltages = normalize(compute_voltages(velocity, radians, rotation, flipped));
    voltages_to_commands(&voltages, max_speed)
}

/// Skid-steer path: left effort drives wheels 1 and 3, right effort drives 2 and 4
pub fn resolve_skid_steer(left: f64, right: f64, max_speed: f64, flipped: bool) -> [WheelCommand; 4] {
    // "left" always means the chassis's current logical left
    let (left, right) = if flipped { (right, left) } else { (left, right) };
    let left = clamp_unit(left);
    let right = clamp_unit(right);

    Wheel::ALL.map(|wheel| {
        let side = Side::of(wheel);
        let effort = match side {
            Side::Left => left,
            Side::Right => right,
        };
        WheelCommand {
            wheel,
            direction: skid_direction(side, effort, flipped),
            magnitude: to_magnitude(effort, max_speed),
        }
    })
}
