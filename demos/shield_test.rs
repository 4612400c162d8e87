// Shield test: careful, step-by-step timed motion test on the mecanum base
//
// Usage: cargo run --example shield_test -- [i2c bus]
// Example: cargo run --example shield_test -- 1
//
// Safety features:
// - Explicit confirmation before any writes
// - Low speed cap
// - Every timed motion ends with a stop
// - Easy abort with Ctrl+C

#[cfg(target_os = "linux")]
use mecanum_zenoh_runtime::config::MOTOR_I2C_BUS;
#[cfg(target_os = "linux")]
use mecanum_zenoh_runtime::motor::shield::DEFAULT_SHIELD_ADDRESS;
#[cfg(target_os = "linux")]
use mecanum_zenoh_runtime::motor::{LinuxMotorShield, MecanumDrive, ShieldError, Wheel};
use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

const TEST_SPEED: f64 = 0.25;
const TEST_DURATION: Duration = Duration::from_millis(400);
const PAUSE_DURATION: Duration = Duration::from_millis(500);

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("The motor shield test needs a Linux I2C bus.");
}

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bus = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u8>()?,
        None => MOTOR_I2C_BUS,
    };

    println!("Mecanum shield test (WITH WRITES)");
    println!("  This tool WILL drive the motors.");
    println!("  Make sure wheels are OFF THE GROUND before proceeding.");
    println!();
    println!("I2C bus: {}, shield address: 0x{:02X}", bus, DEFAULT_SHIELD_ADDRESS);
    println!();

    if !confirm("Are the robot's wheels OFF THE GROUND?")? {
        println!("Please elevate the robot so wheels can spin freely.");
        return Ok(());
    }

    println!("Step 1: Opening motor shield and initializing...");
    let shield = LinuxMotorShield::open(bus, DEFAULT_SHIELD_ADDRESS)?;
    let mut drive = MecanumDrive::new(shield);
    drive.initialize()?;
    for wheel in Wheel::ALL {
        println!(
            "  ✓ Wheel {} ({:?}) on port M{}",
            wheel.number(),
            wheel,
            drive.actuator().port_for(wheel)
        );
    }
    println!();

    println!("Step 2: Timed motion test at {:.0}% speed", TEST_SPEED * 100.0);
    if !confirm("Proceed with motion test?")? {
        drive.stop()?;
        return Ok(());
    }
    drive.set_max_speed(TEST_SPEED);

    type Motion = fn(&mut MecanumDrive<LinuxMotorShield>, Duration) -> Result<(), ShieldError>;
    let tests: [(&str, Motion); 6] = [
        ("Forward", MecanumDrive::forward_for),
        ("Reverse", MecanumDrive::reverse_for),
        ("Strafe right", MecanumDrive::strafe_right_for),
        ("Strafe left", MecanumDrive::strafe_left_for),
        ("Rotate right", MecanumDrive::rotate_right_for),
        ("Rotate left", MecanumDrive::rotate_left_for),
    ];

    for (name, motion) in tests {
        println!("  Testing: {}...", name);
        motion(&mut drive, TEST_DURATION)?;
        sleep(PAUSE_DURATION);
    }

    println!();
    println!("Step 3: Skid steer, left side then right side");
    drive.skid_steer(1.0, 0.0)?;
    sleep(TEST_DURATION);
    drive.skid_steer(0.0, 1.0)?;
    sleep(TEST_DURATION);
    drive.stop()?;

    println!();
    println!("Test complete. You can now try the full runtime with: cargo run");
    Ok(())
}
