// Keyboard teleop: WASD move, Z/X rotate, T skid-steer toggle, V flip, R/F speed, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use mecanum_zenoh_runtime::config::TOPIC_CMD_BASE;
use mecanum_zenoh_runtime::messages::BaseCommand;
use std::time::{Duration, Instant};
use tracing::info;

const SPEEDS: [f64; 3] = [0.25, 0.5, 1.0]; // speed cap levels
const INPUT_TIMEOUT_MS: u64 = 100; // Reset motion after this much time with no input

type Publisher<'a> = zenoh::pubsub::Publisher<'a>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_BASE).await?;

    info!("Controls: WASD=move, Z/X=rotate, T=skid steer, V=flip, R/F=speed, Q=quit");
    send(&publisher, &BaseCommand::SetMaxSpeed { speed: SPEEDS[0] }).await?;
    print_speed(0);

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn send(
    publisher: &Publisher<'_>,
    cmd: &BaseCommand,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    publisher.put(serde_json::to_string(cmd)?).await?;
    Ok(())
}

async fn run_teleop(publisher: &Publisher<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;
    let mut skid = false;

    // Persistent motion state: forward/right effort and rotation
    let mut forward = 0.0;
    let mut right = 0.0;
    let mut rotation = 0.0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    KeyCode::Char('w') if pressed => {
                        forward = 1.0;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        forward = -1.0;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        right = -1.0;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        right = 1.0;
                        last_movement_input = Instant::now();
                    }

                    // Rotation
                    KeyCode::Char('z') if pressed => {
                        rotation = -1.0;
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('x') if pressed => {
                        rotation = 1.0;
                        last_movement_input = Instant::now();
                    }

                    // Modes
                    KeyCode::Char('t') if pressed => {
                        skid = !skid;
                        info!("Skid steer: {}", skid);
                    }
                    KeyCode::Char('v') if pressed => {
                        send(publisher, &BaseCommand::Flip).await?;
                        info!("Flip");
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        send(publisher, &BaseCommand::SetMaxSpeed { speed: SPEEDS[speed_idx] }).await?;
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        send(publisher, &BaseCommand::SetMaxSpeed { speed: SPEEDS[speed_idx] }).await?;
                        print_speed(speed_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset motion if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            forward = 0.0;
            right = 0.0;
            rotation = 0.0;
        }

        // Always publish at ~50Hz
        let cmd = if skid {
            // W/S drive both sides, A/D turn by slowing one side
            BaseCommand::SkidSteer {
                left: forward + right,
                right: forward - right,
            }
        } else {
            motion_command(forward, right, rotation)
        };
        send(publisher, &cmd).await?;
    }

    send(publisher, &BaseCommand::Stop).await?;
    Ok(())
}

/// Map forward/right effort onto speed + heading (0° = forward, 90° = right)
fn motion_command(forward: f64, right: f64, rotation: f64) -> BaseCommand {
    let velocity: f64 = if forward == 0.0 && right == 0.0 { 0.0 } else { 1.0 };
    let heading_deg = right.atan2(forward).to_degrees().round() as i32;
    BaseCommand::Drive {
        velocity,
        heading_deg,
        rotation,
    }
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
