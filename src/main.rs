//! hs-telemetry - Main Entry Point
//!
//! Command-line front end for the ~HS serial protocol:
//! - `capture`: record a live device for a fixed time and export the result
//! - `parse`: decode a recorded capture file
//! - `monitor`: watch live (or replayed) values and raw frames
//! - `ports`: list serial ports

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hs_telemetry::{
    backend::{list_ports, LiveEvent, LiveSession, ReplaySource, SerialSource},
    config::AppConfig,
    export::{prepare_output_dir, CaptureSummary, ReportExporter},
    protocol::DeviceCommand,
    session::{BatchIngest, CaptureReport},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often the monitor and capture loops wake up
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "hs-telemetry")]
#[command(about = "Capture and decode ~HS sensor telemetry", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a live device for a fixed time and export the samples
    Capture {
        /// Directory to write the exported files into
        output: PathBuf,

        /// Serial port name, or any unique part of it
        port: String,

        /// Recording length in seconds
        seconds: f64,

        /// Reuse a non-empty output directory
        #[arg(long)]
        force: bool,
    },

    /// Decode a recorded capture file
    Parse {
        /// Capture file of `\r`-terminated frames
        file: PathBuf,

        /// Export the decoded samples into this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Reuse a non-empty output directory
        #[arg(long, requires = "output")]
        force: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show live values and raw frames
    Monitor {
        /// Serial port name, or any unique part of it
        #[arg(conflicts_with = "replay")]
        port: Option<String>,

        /// Replay a capture file instead of opening a port
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<f64>,

        /// Ask the device to reboot once connected
        #[arg(long)]
        reboot: bool,

        /// Ask the device for its firmware version once connected
        #[arg(long)]
        get_version: bool,
    },

    /// List serial ports
    Ports,
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Held until exit so buffered log lines reach the file
    let _guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Capture {
            output,
            port,
            seconds,
            force,
        } => run_capture(&config, &output, &port, seconds, force),
        Commands::Parse {
            file,
            output,
            force,
            json,
        } => run_parse(&config, &file, output.as_deref(), force, json),
        Commands::Monitor {
            port,
            replay,
            seconds,
            reboot,
            get_version,
        } => run_monitor(&config, port, replay, seconds, reboot, get_version),
        Commands::Ports => run_ports(),
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Explicit paths must load; the default path falls back to defaults
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path).with_context(|| format!("Loading {:?}", path)),
        None => Ok(AppConfig::default_path()
            .map(AppConfig::load_or_default)
            .unwrap_or_default()),
    }
}

fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let default_filter = config
        .logging
        .filter
        .as_deref()
        .unwrap_or("info,hs_telemetry=debug");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Opening log file {:?}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn duration_from_secs(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("Duration must be a positive number of seconds, got {}", seconds);
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn run_capture(
    config: &AppConfig,
    output: &Path,
    port: &str,
    seconds: f64,
    force: bool,
) -> Result<()> {
    let duration = duration_from_secs(seconds)?;
    prepare_output_dir(output, force)?;

    let serial = config.serial.clone().with_port(port);
    let source = SerialSource::open_configured(&serial)?;

    let mut session = LiveSession::new(config);
    session.start(Box::new(source))?;
    println!(
        "Recording from {} for {:.1}s...",
        session.source_name().unwrap_or(port),
        seconds
    );

    let deadline = Instant::now() + duration;
    while Instant::now() < deadline && session.state().is_running() {
        std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        for event in session.drain_events() {
            if let LiveEvent::TransportError(e) = event {
                eprintln!("Transport error: {}", e);
            }
        }
    }

    session.stop()?;
    let raw = config.capture.save_raw.then(|| session.raw_capture());
    let source_name = session.source_name().unwrap_or(port).to_string();
    let last_error = session.last_error();
    let report = session.finish()?;

    if let Some(e) = last_error {
        eprintln!("Capture ended early: {}", e);
    }

    let summary = CaptureSummary::new(&report, source_name).with_duration(seconds);
    let exporter = ReportExporter::new(output, config.export.clone());
    exporter.export(&report, &summary, raw.as_deref())?;

    print_report(&report);
    println!("Saved to {}", output.display());
    Ok(())
}

fn run_parse(
    config: &AppConfig,
    file: &Path,
    output: Option<&Path>,
    force: bool,
    json: bool,
) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("Reading {:?}", file))?;
    let report = BatchIngest::run(&raw);
    let summary = CaptureSummary::new(&report, file.display().to_string());

    if json {
        println!("{}", summary.to_json()?);
    } else {
        print_report(&report);
    }

    if let Some(output) = output {
        prepare_output_dir(output, force)?;
        let exporter = ReportExporter::new(output, config.export.clone());
        let raw = config.capture.save_raw.then_some(raw.as_slice());
        exporter.export(&report, &summary, raw)?;
        if !json {
            println!("Saved to {}", output.display());
        }
    }
    Ok(())
}

fn run_monitor(
    config: &AppConfig,
    port: Option<String>,
    replay: Option<PathBuf>,
    seconds: Option<f64>,
    reboot: bool,
    get_version: bool,
) -> Result<()> {
    let deadline = seconds
        .map(duration_from_secs)
        .transpose()?
        .map(|d| Instant::now() + d);

    let mut session = LiveSession::new(config);
    match (port, replay) {
        (_, Some(path)) => {
            let source = ReplaySource::from_file(&path)?.with_interval(Duration::from_millis(1));
            session.start(Box::new(source))?;
        }
        (Some(port), None) => {
            let serial = config.serial.clone().with_port(port);
            session.start(Box::new(SerialSource::open_configured(&serial)?))?;
        }
        (None, None) if config.serial.port.is_some() => session.start_serial()?,
        (None, None) => bail!("No port given; pass a port, --replay, or set serial.port"),
    }

    if reboot {
        session.send_command(DeviceCommand::Reboot)?;
    }
    if get_version {
        session.send_command(DeviceCommand::GetVersion)?;
    }

    let mut log_offset = 0;
    let mut last_line = String::new();
    loop {
        let finished = !session.state().is_running();

        for event in session.drain_events() {
            match event {
                LiveEvent::CommandFailed { command, error } => {
                    eprintln!("Failed to send {} command: {}", command, error)
                }
                LiveEvent::TransportError(e) => eprintln!("Transport error: {}", e),
                _ => {}
            }
        }

        let entries = session.raw_log_since(log_offset);
        log_offset += entries.len();
        for entry in &entries {
            println!("{}", entry);
        }

        let line = status_line(&session);
        if line != last_line {
            println!("{}", line);
            last_line = line;
        }

        if finished || deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let dropped = session.snapshot().dropped_events;
    let report = session.finish()?;
    if dropped > 0 {
        tracing::debug!("{} live events were dropped", dropped);
    }
    print_report(&report);
    Ok(())
}

fn status_line(session: &LiveSession) -> String {
    let snapshot = session.snapshot();
    let latest = snapshot.latest;

    let version = latest
        .version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    let pot = latest
        .pot
        .map(|p| p.value.to_string())
        .unwrap_or_else(|| "-".to_string());
    let accel = latest
        .accel
        .map(|a| format!("{}, {}, {}", a.x, a.y, a.z))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "[{}] record {} | version {} | pot {} | accel ({})",
        snapshot.state.display_name(),
        latest.record_number(),
        version,
        pot,
        accel
    )
}

fn run_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{:<32} {}", port.name, port.kind);
    }
    Ok(())
}

fn print_report(report: &CaptureReport) {
    let stats = &report.stats;
    println!("Frames:          {}", stats.frames);
    println!(
        "Recognized:      {} ({} accel, {} pot, {} version)",
        stats.recognized(),
        stats.accel_frames,
        stats.pot_frames,
        stats.version_frames
    );
    println!(
        "Dropped:         {} unrecognized, {} malformed",
        stats.unrecognized, stats.malformed
    );
    println!(
        "Samples:         {} accel, {} pot",
        report.accel.len(),
        report.pot.len()
    );
    if let Some(version) = report.version {
        println!("Version:         {}", version);
    }
    if !report.reconciliation.is_aligned() {
        println!("Reconciliation:  {:?}", report.reconciliation);
    }
    if report.trailing_bytes > 0 {
        println!("Trailing bytes:  {}", report.trailing_bytes);
    }
}
