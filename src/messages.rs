// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::motor::{Wheel, WheelCommand};

// Command from teleop/scripts -> runtime
// Tagged by "op", e.g. {"op":"drive","velocity":1.0,"heading_deg":90,"rotation":0.0}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BaseCommand {
    Drive {
        velocity: f64,
        #[serde(default)]
        heading_deg: i32,
        #[serde(default)]
        rotation: f64,
    },
    SkidSteer {
        left: f64,
        right: f64,
    },
    Stop,
    Flip,
    SetMaxSpeed {
        speed: f64,
    },
}

impl BaseCommand {
    /// Motion commands are latched and re-applied every tick; the rest are one-shot settings
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            BaseCommand::Drive { .. } | BaseCommand::SkidSteer { .. } | BaseCommand::Stop
        )
    }
}

// Actuation output from runtime -> observers
// Defaults to every wheel released
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseActuation {
    pub wheels: [WheelCommand; 4],
}

impl Default for BaseActuation {
    fn default() -> Self {
        Self {
            wheels: Wheel::ALL.map(WheelCommand::released),
        }
    }
}

impl From<[WheelCommand; 4]> for BaseActuation {
    fn from(wheels: [WheelCommand; 4]) -> Self {
        Self { wheels }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::Direction;

    #[test]
    fn test_parse_commands() {
        let drive: BaseCommand =
            serde_json::from_str(r#"{"op":"drive","velocity":0.5,"heading_deg":90,"rotation":-0.25}"#)
                .unwrap();
        assert_eq!(
            drive,
            BaseCommand::Drive {
                velocity: 0.5,
                heading_deg: 90,
                rotation: -0.25
            }
        );

        let skid: BaseCommand =
            serde_json::from_str(r#"{"op":"skid_steer","left":1.0,"right":-1.0}"#).unwrap();
        assert_eq!(skid, BaseCommand::SkidSteer { left: 1.0, right: -1.0 });

        let flip: BaseCommand = serde_json::from_str(r#"{"op":"flip"}"#).unwrap();
        assert_eq!(flip, BaseCommand::Flip);

        let cap: BaseCommand =
            serde_json::from_str(r#"{"op":"set_max_speed","speed":0.3}"#).unwrap();
        assert_eq!(cap, BaseCommand::SetMaxSpeed { speed: 0.3 });
    }

    #[test]
    fn test_drive_defaults_heading_and_rotation() {
        let drive: BaseCommand = serde_json::from_str(r#"{"op":"drive","velocity":1}"#).unwrap();
        assert_eq!(
            drive,
            BaseCommand::Drive {
                velocity: 1.0,
                heading_deg: 0,
                rotation: 0.0
            }
        );
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(serde_json::from_str::<BaseCommand>(r#"{"op":"warp"}"#).is_err());
    }

    #[test]
    fn test_motion_classification() {
        assert!(BaseCommand::Stop.is_motion());
        assert!(BaseCommand::SkidSteer { left: 0.0, right: 0.0 }.is_motion());
        assert!(!BaseCommand::Flip.is_motion());
        assert!(!BaseCommand::SetMaxSpeed { speed: 1.0 }.is_motion());
    }

    #[test]
    fn test_actuation_json_shape() {
        let json = serde_json::to_value(BaseActuation::default()).unwrap();
        let wheels = json["wheels"].as_array().unwrap();
        assert_eq!(wheels.len(), 4);
        assert_eq!(wheels[0]["wheel"], "front_left");
        assert_eq!(wheels[3]["direction"], "release");
        assert_eq!(wheels[3]["magnitude"], 0);

        let all_released = BaseActuation::default()
            .wheels
            .iter()
            .all(|w| w.direction == Direction::Release);
        assert!(all_released);
    }
}
