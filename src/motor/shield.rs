// Adafruit-style DC motor shield: a PCA9685 PWM chip driving four H-bridges over I2C
//
// Each motor port uses three PCA9685 channels: a PWM channel for speed and two
// bridge inputs (IN1/IN2) held fully on or off to select the run direction.

use std::fmt::Debug;

use embedded_hal::i2c::I2c;
use pwm_pca9685::{Address, Channel, Pca9685};
use tracing::{debug, info};

use super::actuator::{Direction, MotorActuator, Wheel};

/// Default I2C address of the motor shield
pub const DEFAULT_SHIELD_ADDRESS: u8 = 0x60;

/// Shield motor port (M1..M4) driving each wheel, in `Wheel::ALL` order
pub const DEFAULT_WHEEL_PORTS: [u8; 4] = [4, 3, 1, 2];

/// Prescale for a 1.6 kHz PWM frequency: round(25 MHz / (4096 * 1600)) - 1
pub const PRESCALE_1600HZ: u8 = 3;

/// PCA9685 counts per 8-bit speed step (255 * 16 = 4080 of 4096)
const COUNTS_PER_STEP: u16 = 16;

/// PCA9685 channels wired to one motor port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPins {
    pub pwm: u8,
    pub in1: u8,
    pub in2: u8,
}

/// Channel layout of ports M1..M4 on the shield
const PORT_PINS: [PortPins; 4] = [
    PortPins { pwm: 8, in1: 10, in2: 9 },
    PortPins { pwm: 13, in1: 11, in2: 12 },
    PortPins { pwm: 2, in1: 4, in2: 3 },
    PortPins { pwm: 7, in1: 5, in2: 6 },
];

/// PCA9685 channels for a shield port, if the port exists
pub fn port_pins(port: u8) -> Option<PortPins> {
    PORT_PINS.get(usize::from(port).checked_sub(1)?).copied()
}

/// Error types for motor shield communication
#[derive(Debug, thiserror::Error)]
pub enum ShieldError {
    #[error("I2C error: {0}")]
    I2c(String),

    #[error("Invalid PWM value for channel {channel}")]
    InvalidValue { channel: u8 },

    #[error("No such PWM channel: {0}")]
    InvalidChannel(u8),

    #[error("Motor port M{0} does not exist (expected 1..=4)")]
    InvalidPort(u8),
}

pub type Result<T> = std::result::Result<T, ShieldError>;

/// PWM outputs the shield needs from its controller chip
pub trait PwmOutputs {
    /// Wake the chip and set the PWM prescale
    fn start(&mut self, prescale: u8) -> Result<()>;

    /// Hold a channel fully on (high) or fully off (low)
    fn set_pin(&mut self, channel: u8, high: bool) -> Result<()>;

    /// Drive a channel with `off_count` of 4096 counts on
    fn set_duty(&mut self, channel: u8, off_count: u16) -> Result<()>;
}

fn channel(n: u8) -> Result<Channel> {
    use Channel::*;
    const CHANNELS: [Channel; 16] = [
        C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11, C12, C13, C14, C15,
    ];
    CHANNELS
        .get(usize::from(n))
        .copied()
        .ok_or(ShieldError::InvalidChannel(n))
}

fn map_pwm_error<E: Debug>(channel: u8, e: pwm_pca9685::Error<E>) -> ShieldError {
    match e {
        pwm_pca9685::Error::I2C(e) => ShieldError::I2c(format!("{:?}", e)),
        pwm_pca9685::Error::InvalidInputData => ShieldError::InvalidValue { channel },
    }
}

impl<I2C, E> PwmOutputs for Pca9685<I2C>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    fn start(&mut self, prescale: u8) -> Result<()> {
        self.enable().map_err(|e| map_pwm_error(0, e))?;
        self.set_prescale(prescale).map_err(|e| map_pwm_error(0, e))
    }

    fn set_pin(&mut self, n: u8, high: bool) -> Result<()> {
        let ch = channel(n)?;
        let result = if high {
            self.set_channel_full_on(ch, 0)
        } else {
            self.set_channel_on_off(ch, 0, 0)
        };
        result.map_err(|e| map_pwm_error(n, e))
    }

    fn set_duty(&mut self, n: u8, off_count: u16) -> Result<()> {
        let ch = channel(n)?;
        self.set_channel_on_off(ch, 0, off_count)
            .map_err(|e| map_pwm_error(n, e))
    }
}

/// Four-port DC motor shield over a PWM controller
pub struct MotorShield<P: PwmOutputs> {
    pwm: P,
    wheel_ports: [u8; 4],
}

impl<I2C, E> MotorShield<Pca9685<I2C>>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    /// Attach to a shield on an I2C bus at `address`
    pub fn on_i2c(i2c: I2C, address: u8, wheel_ports: [u8; 4]) -> Result<Self> {
        let pwm = Pca9685::new(i2c, Address::from(address)).map_err(|e| map_pwm_error(0, e))?;
        Self::new(pwm, wheel_ports)
    }
}

#[cfg(target_os = "linux")]
pub type LinuxMotorShield = MotorShield<Pca9685<rppal::i2c::I2c>>;

#[cfg(target_os = "linux")]
impl LinuxMotorShield {
    /// Open a Linux I2C bus and attach to the shield at `address`
    pub fn open(bus: u8, address: u8) -> Result<Self> {
        info!("Opening motor shield on i2c-{} at 0x{:02X}", bus, address);
        let i2c = rppal::i2c::I2c::with_bus(bus).map_err(|e| ShieldError::I2c(e.to_string()))?;
        Self::on_i2c(i2c, address, DEFAULT_WHEEL_PORTS)
    }
}

impl<P: PwmOutputs> MotorShield<P> {
    /// Wrap a PWM controller; `wheel_ports` assigns a shield port (1..=4) to each wheel
    pub fn new(pwm: P, wheel_ports: [u8; 4]) -> Result<Self> {
        if let Some(&bad) = wheel_ports.iter().find(|&&p| port_pins(p).is_none()) {
            return Err(ShieldError::InvalidPort(bad));
        }
        Ok(Self { pwm, wheel_ports })
    }

    /// Shield port wired to a wheel
    pub fn port_for(&self, wheel: Wheel) -> u8 {
        self.wheel_ports[wheel.index()]
    }

    /// Set the run mode of a motor port
    pub fn run(&mut self, port: u8, direction: Direction) -> Result<()> {
        let pins = port_pins(port).ok_or(ShieldError::InvalidPort(port))?;
        debug!("Run port M{}: {:?}", port, direction);
        // Drop the opposite input before raising one, so both are never high together
        match direction {
            Direction::Forward => {
                self.pwm.set_pin(pins.in2, false)?;
                self.pwm.set_pin(pins.in1, true)
            }
            Direction::Backward => {
                self.pwm.set_pin(pins.in1, false)?;
                self.pwm.set_pin(pins.in2, true)
            }
            Direction::Release => {
                self.pwm.set_pin(pins.in1, false)?;
                self.pwm.set_pin(pins.in2, false)
            }
        }
    }

    /// Set the 8-bit speed of a motor port
    pub fn set_speed(&mut self, port: u8, speed: u8) -> Result<()> {
        let pins = port_pins(port).ok_or(ShieldError::InvalidPort(port))?;
        debug!("Speed port M{}: {}", port, speed);
        self.pwm.set_duty(pins.pwm, u16::from(speed) * COUNTS_PER_STEP)
    }
}

impl<P: PwmOutputs> MotorActuator for MotorShield<P> {
    type Error = ShieldError;

    fn initialize(&mut self) -> Result<()> {
        self.pwm.start(PRESCALE_1600HZ)?;
        for port in 1..=4 {
            self.run(port, Direction::Release)?;
            self.set_speed(port, 0)?;
        }
        info!("Motor shield initialized, wheel ports {:?}", self.wheel_ports);
        Ok(())
    }

    fn set_direction(&mut self, wheel: Wheel, direction: Direction) -> Result<()> {
        self.run(self.port_for(wheel), direction)
    }

    fn set_magnitude(&mut self, wheel: Wheel, magnitude: u8) -> Result<()> {
        self.set_speed(self.port_for(wheel), magnitude)
    }
}
