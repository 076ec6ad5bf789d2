/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use metro_hmi::config::HmiConfig;
use metro_hmi::display::ReadingBoard;
use metro_hmi::service::RefreshService;
use metro_hmi::source::SimulatedSource;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Metro railway SCADA HMI – telemetry refresh loop.
///
/// Runs against the simulated data source; the field-protocol client is
/// provided separately.
///
/// Example:
///   metro-hmi --config hmi.yaml --min-refresh-ms 1000 --offline PLC-03
#[derive(Debug, Parser)]
#[command(
    name = "metro-hmi",
    about = "Metro railway SCADA HMI – telemetry refresh loop",
    long_about = None,
)]
struct Cli {
    /// Path to a YAML file overriding the reference topology and timing.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Base timer period in milliseconds.
    #[arg(short = 't', long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Minimum interval between two refresh cycles in milliseconds.
    #[arg(short = 'm', long = "min-refresh-ms")]
    min_refresh_ms: Option<u64>,

    /// Controller the simulated source reports as disconnected (repeatable).
    #[arg(short = 'o', long = "offline")]
    offline: Vec<String>,

    /// Stop after this many refresh cycles instead of running until Ctrl-C.
    #[arg(short = 'n', long = "cycles")]
    cycles: Option<u64>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Metro HMI starting up...");

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    info!(
        config         = ?cli.config,
        tick_ms        = ?cli.tick_ms,
        min_refresh_ms = ?cli.min_refresh_ms,
        offline        = ?cli.offline,
        cycles         = ?cli.cycles,
        "Configuration"
    );

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => match HmiConfig::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Failed to load HMI configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No configuration file provided, using the reference topology");
            HmiConfig::reference()
        }
    };

    if cli.tick_ms.is_some() || cli.min_refresh_ms.is_some() {
        match config.timing.with_overrides(cli.tick_ms, cli.min_refresh_ms) {
            Ok(timing) => config = config.with_timing(timing),
            Err(e) => {
                error!("Invalid refresh timing: {}", e);
                process::exit(1);
            }
        }
    }

    for id in &cli.offline {
        if let Err(e) = config.registry.get(id) {
            error!("Invalid --offline value: {}", e);
            process::exit(1);
        }
    }

    // ── Print loaded topology ─────────────────────────────────────────────────
    info!("Loaded {} line(s):", config.topology.iter().count());
    for line in config.topology.iter() {
        info!(
            "  [{id}]  sensors={s}  signals={g}  station sensors={ss}  station signals={sg}  icon={icon}",
            id = line.id,
            s = line.sensor_range,
            g = line.signal_range,
            ss = line.station_sensor_range,
            sg = line.station_signal_range,
            icon = line.icon,
        );
    }
    info!("Loaded {} controller(s):", config.registry.len());
    for c in config.registry.list() {
        info!(
            "  [{id}]  {endpoint}  role={role:?}  source={source}  registers={r}  coils={co}",
            id = c.id,
            endpoint = c.endpoint(),
            role = c.role,
            source = c.source,
            r = c.register_window,
            co = c.coil_window,
        );
    }

    // ── Run the refresh loop ──────────────────────────────────────────────────
    let source = SimulatedSource::with_offline(cli.offline.iter().cloned());
    let mut service = RefreshService::new(Arc::new(config), source, ReadingBoard::new());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let cycles = service.run_until(shutdown, cli.cycles).await;

    info!(
        cycles,
        connected = service.tracker().connected_count(),
        available_readings = service.sink().available_line_count(),
        "Metro HMI stopped"
    );
}
