//! Listen to a gyroscope input device and print composed records.
//!
//! Opens the device by name (or a config file), enables it, sets the sampling
//! interval, then blocks on the event node and prints every record the driver
//! produces.

use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use gyro_hal::{EventPayload, GyroConfig, GyroSensor, Properties, SensorEvent};
use tracing::info;

/// Gyroscope event listener
#[derive(Parser, Debug)]
#[command(name = "listen_gyro")]
#[command(about = "Stream calibrated and raw angular rate from a gyroscope input device")]
#[command(version)]
struct Args {
    /// JSON driver configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input device name (overrides the config file)
    #[arg(short, long)]
    name: Option<String>,

    /// Sampling interval in milliseconds
    #[arg(short, long, default_value = "10")]
    delay_ms: i64,

    /// Stop after this many seconds (0 = run forever)
    #[arg(short, long, default_value = "0")]
    seconds: u64,

    /// Poll timeout in milliseconds
    #[arg(long, default_value = "1000")]
    poll_timeout_ms: i32,
}

fn wait_readable(fd: i32, timeout_ms: i32) -> Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: `pfd` is a single valid pollfd for the duration of the call.
    let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::Interrupted {
            return Ok(false);
        }
        bail!("poll failed: {err}");
    }
    Ok(rc > 0)
}

fn print_event(event: &SensorEvent) {
    match &event.payload {
        EventPayload::Gyro(sample) => {
            let c = sample.calibrated;
            let u = sample.uncalibrated;
            println!(
                "{:>16} gyro [{:+.5} {:+.5} {:+.5}] raw [{:+.5} {:+.5} {:+.5}] status={}",
                event.timestamp,
                c.x,
                c.y,
                c.z,
                u.x,
                u.y,
                u.z,
                sample.status.code()
            );
        }
        EventPayload::Meta(meta) => {
            println!("{:>16} meta {:?} sensor={}", event.timestamp, meta.what, meta.sensor);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GyroConfig::load_from_file(path)?,
        None => GyroConfig::default(),
    };
    if let Some(name) = args.name {
        config.input_name = name;
    }

    let mut gyro = GyroSensor::open(&config, Properties::from_env(), None)?;
    if !gyro.is_enabled() {
        gyro.enable(true)?;
    }
    gyro.set_delay(args.delay_ms * 1_000_000)?;
    info!(
        "Listening on {} ({} ms)",
        gyro.source().path().display(),
        args.delay_ms
    );

    let deadline = (args.seconds > 0).then(|| Instant::now() + Duration::from_secs(args.seconds));
    let mut slots = [SensorEvent::default(); 16];
    let mut total = 0usize;

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        if !gyro.has_pending_events() && !wait_readable(gyro.as_raw_fd(), args.poll_timeout_ms)? {
            continue;
        }

        let n = gyro.read_events(&mut slots)?;
        for event in &slots[..n] {
            print_event(event);
        }
        total += n;
    }

    info!("Received {} records", total);
    Ok(())
}
