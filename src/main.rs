use clap::Parser;
use tracing_subscriber::EnvFilter;

use mecanum_zenoh_runtime::config::RuntimeArgs;

#[tokio::main]
async fn main() {
    let args = RuntimeArgs::parse();

    // Setup logging (set RUST_LOG=info or debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init(); // installs the subscriber globally

    if let Err(e) = mecanum_zenoh_runtime::runtime::run(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
