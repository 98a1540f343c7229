//! Runnable strip controller with a logging output stage.
//!
//! Run with: cargo run --example serve -- --port 8080
//!
//! Point the real Home Assistant integration (or curl) at it:
//!
//! ```text
//! curl -X POST http://127.0.0.1:8080/command \
//!     -d '{"method": "set_rgbw", "param": {"r":1,"g":0,"b":0,"w":0,"time":2000}}'
//! ```
//!
//! On a fatal socket error the process waits a few seconds and exits
//! nonzero so a supervisor can restart it, the same recovery story as the
//! physical device, which reboots when its network goes away.

use std::time::Duration;

use clap::Parser;
use rgbw_strip_rs::{DeviceConfig, DeviceServer, LogDriver, StaticIdentity};

#[derive(Parser)]
#[command(name = "serve")]
#[command(about = "Run an RGBW strip controller on a local port", long_about = None)]
struct Cli {
    /// TCP port for the control endpoint (the real device uses 80)
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// MAC address reported by get_info
    #[arg(short, long, default_value = "AA:BB:CC:DD:EE:FF")]
    mac: String,

    /// Scheduler tick interval in milliseconds
    #[arg(short, long, default_value = "10")]
    tick_ms: u64,

    /// Seconds to wait before exiting after a fatal error
    #[arg(long, default_value = "10")]
    restart_delay: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = DeviceConfig::new()
        .with_port(cli.port)
        .with_tick_interval(Duration::from_millis(cli.tick_ms));
    let identity = StaticIdentity::new(&cli.mac);
    let mut server = DeviceServer::new(config, LogDriver::new(), identity);

    if let Err(e) = server.run().await {
        eprintln!(
            "fatal: {e}; exiting in {} s so a supervisor can restart us",
            cli.restart_delay
        );
        tokio::time::sleep(Duration::from_secs(cli.restart_delay)).await;
        std::process::exit(1);
    }
}
