/*!
 * pinlink CLI - Command Line Interface
 */

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pinlink::{
    cli_style::{print_error, print_info, print_success, print_warning, section_header},
    config::PinConfig,
    device::DeviceShell,
    error::{PinError, Result, EXIT_SUCCESS},
    logging,
    output::{ConnectReport, OutputWriter, StatusReport},
    recorder::view_stream,
    AdbBridge, AdbClient, Connection, Connector, HotspotJoiner, IpCache, PromptCredentials,
    RtspRecorder, StreamEndpoint, TcpProbe,
};

#[derive(Parser)]
#[command(name = "pinlink")]
#[command(version, about = "LUCI Pin toolkit: discovery, RTSP recording, and file browsing", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.pinlink/pinlink.toml)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Log file path (JSON format; default: stderr)
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reachable device IP and persist it to the cache
    Connect {
        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record the RTSP stream to segmented files
    Record {
        /// Recording duration in seconds (default: 10, or the configured value)
        #[arg(long)]
        duration: Option<u64>,

        /// FFmpeg segment duration in seconds (default: 5, or the configured value)
        #[arg(long = "segment-time")]
        segment_time: Option<u32>,

        /// Directory to save recordings (default: recordings, or the configured value)
        #[arg(long = "save-dir")]
        save_dir: Option<PathBuf>,

        /// Path to ffmpeg executable (default: ffmpeg, or the configured value)
        #[arg(long)]
        ffmpeg: Option<String>,
    },

    /// Open the RTSP stream in a viewer window
    View,

    /// Show device health: storage, OS release, uptime, IP
    Status {
        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse and transfer files on the device
    Browse,
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            print_error(&e.to_string(), e.remediation());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PinConfig::load(path)?,
        None => PinConfig::load_default()?,
    };
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }
    config.validate()?;
    logging::init_logging(&config)?;

    match cli.command {
        Commands::Connect { json } => cmd_connect(&config, json),
        Commands::Record {
            duration,
            segment_time,
            save_dir,
            ffmpeg,
        } => {
            config.apply_record_overrides(duration, segment_time, save_dir, ffmpeg);
            cmd_record(&config)
        }
        Commands::View => cmd_view(&config),
        Commands::Status { json } => cmd_status(&config, json),
        Commands::Browse => cmd_browse(&config),
    }
}

/// Build the live connection stack from configuration
fn connector(config: &PinConfig) -> Result<Connector<TcpProbe, AdbBridge>> {
    let cache = IpCache::new(config.cache_path()?);
    let probe = TcpProbe::new(Duration::from_secs(config.probe_timeout_secs));
    let adb = AdbClient::new(
        &config.adb_path,
        Duration::from_secs(config.bridge_timeout_secs),
    );
    let joiner = HotspotJoiner::new(&config.hotspot_join_cmd);
    Ok(Connector::new(
        cache,
        probe,
        AdbBridge::new(adb, joiner),
        config.stream_port,
    ))
}

/// Run the fallback chain with interactive hotspot credentials
fn establish(config: &PinConfig) -> Result<Connection> {
    connector(config)?.establish(&PromptCredentials)
}

fn endpoint(config: &PinConfig, connection: &Connection) -> StreamEndpoint {
    StreamEndpoint::new(
        connection.ip.clone(),
        config.stream_port,
        config.stream_path.clone(),
    )
}

fn cmd_connect(config: &PinConfig, json: bool) -> Result<()> {
    let connection = establish(config)?;
    let stream_url = endpoint(config, &connection).url();
    OutputWriter::new(json).connect_report(&ConnectReport {
        ip: connection.ip,
        serial: connection.serial,
        stream_url,
    });
    Ok(())
}

fn cmd_record(config: &PinConfig) -> Result<()> {
    let connection = establish(config)?;
    let url = endpoint(config, &connection).url();

    section_header("Recording");
    print_info(&format!("Recording RTSP stream: {}", url));

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .map_err(|e| PinError::Other(format!("failed to install Ctrl-C handler: {}", e)))?;
    }

    let recorder = RtspRecorder::new(&config.ffmpeg_path, &config.save_dir, config.segment_time);
    let session = recorder.start(&url)?;

    print_info(&format!("Recording for {} seconds (Ctrl-C stops early)", config.duration));
    let stopped_early = wait_or_interrupt(config.duration, &interrupted);
    if stopped_early {
        print_warning("Interrupted, stopping recording safely");
    }

    session.stop()?;
    print_success(&format!(
        "Recording finished, files saved in {}",
        config.save_dir.display()
    ));
    Ok(())
}

/// Wait out the recording duration with a progress bar, returning early
/// (true) when the interrupt flag is raised.
fn wait_or_interrupt(duration_secs: u64, interrupted: &AtomicBool) -> bool {
    let bar = ProgressBar::new(duration_secs);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len}s")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let step = Duration::from_millis(100);
    let mut elapsed = Duration::ZERO;
    let total = Duration::from_secs(duration_secs);
    while elapsed < total {
        if interrupted.load(Ordering::SeqCst) {
            bar.abandon();
            return true;
        }
        std::thread::sleep(step);
        elapsed += step;
        bar.set_position(elapsed.as_secs());
    }
    bar.finish();
    false
}

fn cmd_view(config: &PinConfig) -> Result<()> {
    let connection = establish(config)?;
    let url = endpoint(config, &connection).url();
    print_info(&format!("Opening RTSP stream: {}", url));
    view_stream(&config.ffplay_path, &url)
}

fn cmd_status(config: &PinConfig, json: bool) -> Result<()> {
    let adb = AdbClient::new(
        &config.adb_path,
        Duration::from_secs(config.bridge_timeout_secs),
    );
    let serial = adb
        .devices()?
        .into_iter()
        .next()
        .ok_or(PinError::DeviceNotFound)?;

    let shell = DeviceShell::new(adb.transport(serial.clone()));
    let report = StatusReport {
        serial,
        ip: shell.ip_address()?,
        storage: shell.storage()?.stdout,
        os_release: shell.os_release()?.stdout,
        uptime: shell.uptime()?.stdout,
    };
    OutputWriter::new(json).status_report(&report);
    Ok(())
}

fn cmd_browse(config: &PinConfig) -> Result<()> {
    let adb = AdbClient::new(
        &config.adb_path,
        Duration::from_secs(config.bridge_timeout_secs),
    );
    let serial = adb
        .devices()?
        .into_iter()
        .next()
        .ok_or(PinError::DeviceNotFound)?;
    print_info(&format!("Browsing device {}", serial));

    pinlink::browse::run_browser(adb.transport(serial), config.ffmpeg_path.clone())
}
