// Timeouts, topics, motor configuration
use std::time::Duration;

use clap::Parser;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_BASE: &str = "mecanum/cmd/base"; // commands
pub const TOPIC_RT_BASE: &str = "mecanum/rt/base"; // actuation
pub const TOPIC_HEALTH: &str = "mecanum/state/health"; // health status

// Motor configuration
// Linux I2C bus the motor shield sits on (/dev/i2c-N)
pub const MOTOR_I2C_BUS: u8 = 1;

/// Command-line overrides for the runtime
#[derive(Debug, Clone, Parser)]
#[command(name = "mecanum-zenoh-runtime", about = "Mecanum base runtime over Zenoh")]
pub struct RuntimeArgs {
    /// Linux I2C bus number of the motor shield
    #[arg(long, default_value_t = MOTOR_I2C_BUS)]
    pub i2c_bus: u8,

    /// Log wheel commands instead of driving hardware
    #[arg(long)]
    pub dry_run: bool,

    /// Initial speed cap in [0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub max_speed: f64,

    /// Start with the chassis front/back swapped
    #[arg(long)]
    pub flipped: bool,

    /// I2C address of the motor shield (decimal or 0x-prefixed hex)
    #[arg(long, default_value = "0x60", value_parser = parse_address)]
    pub shield_address: u8,
}

impl RuntimeArgs {
    /// Whether wheel commands go to hardware
    pub fn hardware_enabled(&self) -> bool {
        !self.dry_run
    }
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid shield address '{}': {}", s, e))
}
