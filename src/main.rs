// Wi-Fi Monitor - Main Entry Point
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # Wi-Fi Monitor
//!
//! Watches whether a wireless network is in range, whether the host is
//! associated with it, whether that association yields working internet
//! connectivity, and reconnects when it does not.
//!
//! This entry point is thin presentation glue: it collects the target
//! network once at startup, starts the monitor worker, renders its
//! event stream to stdout, and requests a cooperative stop on Ctrl-C.
//! All monitoring logic lives in the service modules.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

mod models;
mod nmcli;
mod probe;
mod profile;
mod services;

use models::{MonitorConfig, MonitorEvent, NetworkTarget, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use services::MonitorService;

/// Human-readable application name.
pub const APP_NAME: &str = "Wi-Fi Monitor";

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable consulted for the passphrase when `-p` is not
/// given, so the secret does not have to appear in the process list.
const PASSPHRASE_ENV: &str = "WIFI_MONITOR_PASSPHRASE";

/// Print version information and exit.
fn print_version() {
    println!("{} {}", APP_NAME, VERSION);
    println!("Copyright (C) 2026 Christos A. Daggas");
    println!("License: MIT");
    println!();
    println!("Wi-Fi availability and reconnection monitor for Linux.");
}

/// Print help information and exit.
fn print_help() {
    println!(
        "Usage: {} [OPTIONS] -s <SSID>",
        env::args().next().unwrap_or_else(|| "wifi-monitor".to_string())
    );
    println!();
    println!("Wi-Fi availability and reconnection monitor for Linux.");
    println!();
    println!("Options:");
    println!("  -h, --help               Show this help message and exit");
    println!("  -v, --version            Show version information and exit");
    println!("  -d, --debug              Enable debug logging");
    println!("  -s, --ssid <SSID>        Network to monitor (required)");
    println!("  -p, --passphrase <PASS>  WPA2 passphrase (or {})", PASSPHRASE_ENV);
    println!("  -c, --config <PATH>      Configuration file path");
    println!();
    println!("Environment variables:");
    println!("  RUST_LOG                 Set log level (trace, debug, info, warn, error)");
    println!("  {}  Network passphrase", PASSPHRASE_ENV);
}

/// Parsed command-line options.
#[derive(Debug, Default)]
struct CliOptions {
    debug_mode: bool,
    ssid: Option<String>,
    passphrase: Option<String>,
    config_path: Option<PathBuf>,
}

/// Default configuration file location under the XDG config directory.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Load the configuration, writing a default file on first run so the
/// user has something to edit. A present-but-broken file is an error
/// the user should see, not silently replace.
fn load_config(path: &std::path::Path) -> Result<MonitorConfig, models::Error> {
    if path.exists() {
        debug!("Loading configuration from {:?}", path);
        return MonitorConfig::load_from_file(path);
    }

    debug!("No configuration at {:?}, using defaults", path);
    let config = MonitorConfig::default();
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_ok() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700));
            }
            if let Err(e) = config.save_to_file(path) {
                debug!("Could not write default configuration: {}", e);
            }
        }
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let mut options = CliOptions::default();

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            "-d" | "--debug" => {
                options.debug_mode = true;
            }
            "-s" | "--ssid" => {
                options.ssid = iter.next().cloned();
            }
            "-p" | "--passphrase" => {
                options.passphrase = iter.next().cloned();
            }
            "-c" | "--config" => {
                options.config_path = iter.next().map(PathBuf::from);
            }
            _ => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Try '--help' for more information.");
                return ExitCode::FAILURE;
            }
        }
    }

    // Initialize logging with appropriate level
    let log_level = if options.debug_mode {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.into()),
        )
        .init();

    info!("Starting {} v{}", APP_NAME, VERSION);

    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(default_config_path);
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(ssid) = options.ssid else {
        eprintln!("A network name is required (-s <SSID>).");
        eprintln!("Try '--help' for more information.");
        return ExitCode::FAILURE;
    };
    let passphrase = options
        .passphrase
        .or_else(|| env::var(PASSPHRASE_ENV).ok());
    let Some(passphrase) = passphrase else {
        eprintln!(
            "A passphrase is required (-p <PASS> or {}).",
            PASSPHRASE_ENV
        );
        return ExitCode::FAILURE;
    };

    let target = match NetworkTarget::new(ssid, passphrase) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config, target))
}

/// Drive the monitor session: render events until the stream ends or
/// Ctrl-C requests a stop, then join the worker.
async fn run(config: MonitorConfig, target: NetworkTarget) -> ExitCode {
    let ssid = target.ssid().to_string();
    let (mut handle, mut events) = MonitorService::new(config, target).spawn();
    info!("Monitoring \"{}\" (Ctrl-C to stop)", ssid);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stop requested");
                break;
            }
            event = events.recv() => match event {
                Some(event) => render_event(event),
                None => break,
            },
        }
    }

    // Joins the worker; may wait out an in-flight reconnect attempt.
    handle.stop();
    ExitCode::SUCCESS
}

/// Render one monitor event to stdout. Refreshes of an unchanged status
/// stay off the console; the connected signal is surfaced to the log
/// only, since the status line already carries it for a human reader.
fn render_event(event: MonitorEvent) {
    match event {
        MonitorEvent::Status {
            text,
            new_entry,
            timestamp,
        } => {
            if new_entry {
                println!("[{}] {}", timestamp.format("%H:%M:%S"), text);
            } else {
                debug!("Status refresh: {}", text);
            }
        }
        MonitorEvent::Connectivity { connected } => {
            debug!("Connected signal: {}", connected);
        }
    }
}
