// 50 Hz loop with watchdog
// Note: a watchdog is a safety mechanism that triggers a safe action if something goes wrong
// Eg. without it if teleop crashes and stops sending motion commands, the base would keep driving

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

// local imports
use crate::config::{CMD_TIMEOUT, LOOP_HZ, RuntimeArgs, TOPIC_CMD_BASE, TOPIC_HEALTH, TOPIC_RT_BASE};
use crate::messages::{BaseActuation, BaseCommand, RuntimeHealth};
use crate::motor::{LoggingActuator, MecanumDrive, MotorActuator};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct Runtime<A: MotorActuator> {
    engine: MecanumDrive<A>,
    latest_motion: Option<BaseCommand>,
    cmd_received_at: Instant,
    health: RuntimeHealth,
}

impl<A: MotorActuator> Runtime<A> {
    pub fn new(engine: MecanumDrive<A>) -> Self {
        Self {
            engine,
            latest_motion: None,
            cmd_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn engine(&self) -> &MecanumDrive<A> {
        &self.engine
    }

    /// Process incoming command
    fn on_command(&mut self, cmd: BaseCommand) {
        self.on_command_at(cmd, Instant::now());
    }

    fn on_command_at(&mut self, cmd: BaseCommand, now: Instant) {
        info!("Received command: {:?}", &cmd);
        if cmd.is_motion() {
            self.latest_motion = Some(cmd);
            self.cmd_received_at = now;
            return;
        }
        match cmd {
            BaseCommand::Flip => self.engine.flip(),
            BaseCommand::SetMaxSpeed { speed } => self.engine.set_max_speed(speed),
            _ => {}
        }
    }

    /// Apply the latched motion, or stop if the watchdog has fired
    fn compute_actuation(&mut self) -> Result<BaseActuation, A::Error> {
        self.compute_actuation_at(Instant::now())
    }

    fn compute_actuation_at(&mut self, now: Instant) -> Result<BaseActuation, A::Error> {
        let cmd_age = now.saturating_duration_since(self.cmd_received_at);

        let motion = match self.latest_motion {
            Some(ref cmd) if cmd_age <= CMD_TIMEOUT => Some(cmd.clone()),
            Some(_) => {
                // Watchdog triggered - stop the robot
                if self.health != RuntimeHealth::CmdStale {
                    warn!("Command stale ({:?} old), stopping robot", cmd_age);
                }
                None
            }
            // No motion command ever received
            None => None,
        };

        let wheels = match motion {
            Some(BaseCommand::Drive {
                velocity,
                heading_deg,
                rotation,
            }) => self.engine.drive(velocity, heading_deg, rotation)?,
            Some(BaseCommand::SkidSteer { left, right }) => self.engine.skid_steer(left, right)?,
            Some(_) => self.engine.stop()?,
            None => {
                self.health = RuntimeHealth::CmdStale;
                return Ok(BaseActuation::from(self.engine.stop()?));
            }
        };

        self.health = RuntimeHealth::Ok;
        Ok(BaseActuation::from(wheels))
    }
}

/// Open the actuator selected by `args` and run the control loop
pub async fn run(args: RuntimeArgs) -> Result<(), BoxError> {
    if args.hardware_enabled() {
        run_hardware(&args).await
    } else {
        info!("Dry run: wheel commands are logged, not sent to hardware");
        run_with(MecanumDrive::new(LoggingActuator::new()), &args).await
    }
}

#[cfg(target_os = "linux")]
async fn run_hardware(args: &RuntimeArgs) -> Result<(), BoxError> {
    let shield = crate::motor::LinuxMotorShield::open(args.i2c_bus, args.shield_address)?;
    run_with(MecanumDrive::new(shield), args).await
}

#[cfg(not(target_os = "linux"))]
async fn run_hardware(_args: &RuntimeArgs) -> Result<(), BoxError> {
    Err("motor shield needs a Linux I2C bus; run with --dry-run on this platform".into())
}

async fn run_with<A>(mut engine: MecanumDrive<A>, args: &RuntimeArgs) -> Result<(), BoxError>
where
    A: MotorActuator,
    A::Error: std::error::Error + Send + Sync + 'static,
{
    engine.initialize()?;
    engine.set_max_speed(args.max_speed);
    if args.flipped {
        engine.flip();
    }

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_BASE).await?;
    let pub_actuation = session.declare_publisher(TOPIC_RT_BASE).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut runtime = Runtime::new(engine);
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        LOOP_HZ,
        CMD_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}", TOPIC_CMD_BASE);
    info!("Publishing to: {}, {}", TOPIC_RT_BASE, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking)
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<BaseCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd),
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 2. Drive the wheels (includes watchdog logic)
        let actuation = runtime.compute_actuation()?;

        // 3. Publish actuation
        let actuation_json = serde_json::to_string(&actuation)?;
        pub_actuation.put(actuation_json).await?;

        // 4. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::Direction;

    fn runtime() -> Runtime<LoggingActuator> {
        Runtime::new(MecanumDrive::new(LoggingActuator::new()))
    }

    fn forward() -> BaseCommand {
        BaseCommand::Drive {
            velocity: 1.0,
            heading_deg: 0,
            rotation: 0.0,
        }
    }

    fn all_released(actuation: &BaseActuation) -> bool {
        actuation
            .wheels
            .iter()
            .all(|w| w.direction == Direction::Release && w.magnitude == 0)
    }

    #[test]
    fn test_starts_stale_and_stopped() {
        let mut rt = runtime();
        let actuation = rt.compute_actuation().unwrap();
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
        assert!(all_released(&actuation));
    }

    #[test]
    fn test_fresh_motion_is_applied() {
        let mut rt = runtime();
        let t0 = Instant::now();
        rt.on_command_at(forward(), t0);

        let actuation = rt.compute_actuation_at(t0 + Duration::from_millis(20)).unwrap();
        assert_eq!(rt.health(), RuntimeHealth::Ok);
        assert!(actuation.wheels.iter().all(|w| w.magnitude == 255));
    }

    #[test]
    fn test_watchdog_stops_stale_motion() {
        let mut rt = runtime();
        let t0 = Instant::now();
        rt.on_command_at(forward(), t0);
        rt.compute_actuation_at(t0).unwrap();

        let actuation = rt
            .compute_actuation_at(t0 + CMD_TIMEOUT + Duration::from_millis(1))
            .unwrap();
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
        assert!(all_released(&actuation));
    }

    #[test]
    fn test_settings_apply_without_refreshing_watchdog() {
        let mut rt = runtime();
        let t0 = Instant::now();
        rt.on_command_at(BaseCommand::SetMaxSpeed { speed: 0.5 }, t0);
        rt.on_command_at(BaseCommand::Flip, t0);

        assert_eq!(rt.engine().max_speed(), 0.5);
        assert!(rt.engine().is_flipped());

        // No motion latched, so still stale
        rt.compute_actuation_at(t0).unwrap();
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
    }

    #[test]
    fn test_skid_steer_and_stop_commands() {
        let mut rt = runtime();
        let t0 = Instant::now();

        rt.on_command_at(BaseCommand::SkidSteer { left: 1.0, right: 0.0 }, t0);
        let actuation = rt.compute_actuation_at(t0).unwrap();
        assert_eq!(actuation.wheels[0].magnitude, 255);
        assert_eq!(actuation.wheels[1].direction, Direction::Release);

        rt.on_command_at(BaseCommand::Stop, t0);
        let actuation = rt.compute_actuation_at(t0).unwrap();
        assert_eq!(rt.health(), RuntimeHealth::Ok);
        assert!(all_released(&actuation));
    }
}
