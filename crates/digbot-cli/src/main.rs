//! `digbot-cli` – node-set entry point.
//!
//! Wires the whole stack together:
//!
//! 1. Loads `digbot.toml` (with `DIGBOT_*` overrides) and initialises
//!    structured logging.
//! 2. Builds the event bus and spawns the three nodes: the drivebase
//!    translator, the hazard broadcaster (with its localize service), and
//!    the fixed-rate hardware cycle over the simulated joint interface.
//! 3. Intercepts **Ctrl-C**, publishes a shutdown fault on the alerts
//!    lane, and stops every loop.

mod config;
mod control_loop;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tracing::{error, info, warn};

use digbot_beacon::{BeaconConfig, HazardBroadcaster};
use digbot_drive::{DriveGeometry, DrivebasePublisher};
use digbot_hal::{JointInterface, JointLimits};
use digbot_middleware::{EventBus, Topic, service_pair};
use digbot_types::{DigError, Event, EventPayload, PoseRequest};

use control_loop::ControlLoop;

fn init_tracing() {
    // RUST_LOG controls the filter; DIGBOT_LOG_FORMAT=json switches to
    // newline-delimited JSON for log aggregators.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("DIGBOT_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }
}

fn print_banner() {
    println!("{}", "digbot – drivebase & hazard nodes".bold());
    println!();
}

#[tokio::main]
async fn main() -> Result<(), DigError> {
    init_tracing();
    print_banner();

    let cfg = config::load()?;
    info!(?cfg, "configuration loaded");

    let bus = EventBus::default();
    let shutdown = Arc::new(AtomicBool::new(false));

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    {
        let shutdown = shutdown.clone();
        let bus = bus.clone();
        ctrlc::set_handler(move || {
            println!();
            println!("{}", "Ctrl-C received – shutting down".yellow().bold());
            let _ = bus.publish_to(
                Topic::SystemAlerts,
                Event::new(
                    "digbot-cli",
                    EventPayload::Fault {
                        component: "cli".to_string(),
                        code: 911,
                        message: "operator shutdown".to_string(),
                    },
                ),
            );
            shutdown.store(true, Ordering::Relaxed);
        })
        .map_err(|e| DigError::Config(format!("failed to install Ctrl-C handler: {e}")))?;
    }

    // ── Alert monitor ─────────────────────────────────────────────────────
    {
        let mut alerts = bus.subscribe_to(Topic::SystemAlerts);
        tokio::spawn(async move {
            while let Ok(event) = alerts.recv().await {
                if let EventPayload::Fault {
                    component,
                    code,
                    message,
                } = event.payload
                {
                    warn!(%component, code, %message, "system alert");
                }
            }
        });
    }

    // ── Drivebase translator ──────────────────────────────────────────────
    let geometry = DriveGeometry::new(cfg.wheel_radius, cfg.wheel_span)?;
    tokio::spawn(DrivebasePublisher::new(bus.clone(), geometry).run(shutdown.clone()));
    info!(
        wheel_radius = cfg.wheel_radius,
        wheel_span = cfg.wheel_span,
        "drivebase translator running"
    );

    // ── Hazard broadcaster + localize service ─────────────────────────────
    let (localize_client, localize_server) = service_pair::<PoseRequest, bool>();
    let beacon = HazardBroadcaster::new(
        bus.clone(),
        BeaconConfig {
            parent_frame: cfg.parent_frame.clone(),
            hazard_frame: cfg.hazard_frame.clone(),
            diameter: cfg.diameter,
            height: cfg.height,
            hz: cfg.hz,
            service_name: cfg.service_name.clone(),
        },
    );
    tokio::spawn(beacon.run(localize_server, shutdown.clone()));
    info!(
        parent = %cfg.parent_frame,
        child = %cfg.hazard_frame,
        hz = cfg.hz,
        "hazard broadcaster running"
    );
    // The localize client is handed to whichever planner component drives
    // this process; keep it alive so the service stays open.
    let _localize_client = localize_client;

    // ── Hardware cycle (simulated joints) ─────────────────────────────────
    let limits = JointLimits::new(cfg.lower_limits, cfg.upper_limits)?;
    let interface = JointInterface::new_sim(limits);
    for (name, actuation) in interface.registration() {
        info!(joint = name, ?actuation, "registered joint");
    }
    let control = ControlLoop::new(interface, bus.clone(), cfg.control_rate_hz);
    let control_handle = tokio::spawn(control.run(shutdown.clone()));

    // ── Idle until shutdown ───────────────────────────────────────────────
    while !shutdown.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // The control loop owns the register file; wait for its last cycle.
    if let Err(e) = control_handle.await {
        error!(%e, "control loop task failed");
    }
    info!("digbot stopped");
    Ok(())
}
