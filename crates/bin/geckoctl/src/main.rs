//! # geckoctl — gecko testbed operator CLI
//!
//! Composition root that wires the sequence services to a rig backend.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Install the `tracing` subscriber
//! - Load a sequence from a TOML plan or an exported JSON program
//! - Construct the backend adapter (HTTP or virtual) and the application services
//! - Run one operator command and report its outcome
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod plan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gecko_adapter_http::HttpBackend;
use gecko_adapter_virtual::VirtualRig;
use gecko_app::motor_check::MotorCheckGate;
use gecko_app::ports::{ProgramFile, SequenceBackend};
use gecko_app::services::control_service::ControlService;
use gecko_app::services::sequence_service::{SequenceService, StepOverview, overview};
use gecko_app::services::telemetry_monitor::TelemetryMonitor;
use gecko_app::telemetry_bus::{InProcessTelemetryBus, TelemetryTap};
use gecko_domain::telemetry::{CalibrationFactors, StepCounts};

use config::{BackendKind, Config};

const TELEMETRY_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "geckoctl", version, about = "Edit, inspect and run gecko testbed sequences")]
struct Cli {
    /// Configuration file (defaults to `geckoctl.toml` when present).
    #[arg(long, global = true, env = "GECKOCTL_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print each step's label and trigger summary.
    Summary {
        /// TOML plan or exported JSON program.
        sequence: PathBuf,
    },
    /// Print the categorized program the executor would receive.
    Export {
        sequence: PathBuf,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Submit the sequence for execution.
    Run {
        sequence: PathBuf,
        /// Confirm the rig already completed its motor check.
        #[arg(long)]
        motor_checked: bool,
    },
    /// Have the backend render the sequence as a program file.
    Download {
        sequence: PathBuf,
        /// Directory the file is written to.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Upload a program file and print the rebuilt sequence.
    Upload {
        file: PathBuf,
    },
    /// Stop the running sequence.
    Stop,
    /// Halt every motor immediately.
    EmergencyStop,
    /// Start the rig's motor check.
    MotorCheck,
    /// Re-zero the force sensor.
    Zero,
    /// Replace the force-sensor calibration factors.
    Calibrate {
        #[arg(long, default_value_t = 1.0)]
        fx: f64,
        #[arg(long, default_value_t = 1.0)]
        fy: f64,
        #[arg(long, default_value_t = 1.0)]
        fz: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.logging.filter);

    // Offline commands never reach a backend.
    match &cli.command {
        Command::Summary { sequence } => {
            let sequence = plan::load_sequence(sequence)?;
            print_overview(&overview(&sequence));
            return Ok(());
        }
        Command::Export { sequence, output } => {
            let sequence = plan::load_sequence(sequence)?;
            let json = sequence.program().to_json_pretty()?;
            match output {
                Some(path) => std::fs::write(path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
            return Ok(());
        }
        _ => {}
    }

    let gate = MotorCheckGate::new(config.safety.require_motor_check);
    match config.backend.kind {
        BackendKind::Http => {
            let backend = HttpBackend::new(&config.http_backend())?;
            tracing::info!(base_url = %backend.base_url(), "using HTTP backend");
            execute(cli.command, Arc::new(backend), gate).await
        }
        BackendKind::Virtual => {
            tracing::info!("using virtual rig");
            let bus = Arc::new(InProcessTelemetryBus::new(TELEMETRY_CAPACITY));
            let tap = bus.subscribe();
            let rig = Arc::new(VirtualRig::new(Arc::clone(&bus)));
            let result = execute(cli.command, rig, gate.clone()).await;
            print_telemetry(tap, gate);
            result
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn execute<B>(command: Command, backend: Arc<B>, gate: MotorCheckGate) -> anyhow::Result<()>
where
    B: SequenceBackend + Send + Sync,
{
    let control = ControlService::new(Arc::clone(&backend));
    match command {
        Command::Summary { .. } | Command::Export { .. } => {}
        Command::Run {
            sequence,
            motor_checked,
        } => {
            if motor_checked {
                gate.mark_passed();
            }
            let service = SequenceService::with_sequence(backend, gate, plan::load_sequence(&sequence)?);
            service.run().await?;
            println!("Sequence submitted ({} steps)", service.sequence().len());
        }
        Command::Download {
            sequence,
            output_dir,
        } => {
            let service = SequenceService::with_sequence(backend, gate, plan::load_sequence(&sequence)?);
            let file = service.download().await?;
            let path = write_program_file(&output_dir, &file)?;
            println!("Saved {}", path.display());
        }
        Command::Upload { file } => {
            let contents = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let name = file
                .file_name()
                .map_or_else(|| "upload.json".to_string(), |n| n.to_string_lossy().into_owned());
            let mut service = SequenceService::new(backend, gate);
            service.upload(ProgramFile { name, contents }).await?;
            print_overview(&service.overview());
        }
        Command::Stop => control.stop_sequence().await?,
        Command::EmergencyStop => control.emergency_stop().await?,
        Command::MotorCheck => control.motor_check().await?,
        Command::Zero => control.zero_sensor().await?,
        Command::Calibrate { fx, fy, fz } => {
            control.calibrate(CalibrationFactors { fx, fy, fz }).await?;
        }
    }
    Ok(())
}

fn print_overview(rows: &[StepOverview]) {
    if rows.is_empty() {
        println!("(empty sequence)");
    }
    for row in rows {
        println!("{}", row.label);
        for line in row.summary.lines() {
            println!("  {line}");
        }
    }
}

fn write_program_file(dir: &Path, file: &ProgramFile) -> anyhow::Result<PathBuf> {
    // Server-provided names must not escape the output directory.
    let name = Path::new(&file.name)
        .file_name()
        .context("program file has no usable name")?;
    let path = dir.join(name);
    std::fs::write(&path, &file.contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Echo what the virtual rig reported while the command ran.
fn print_telemetry(mut tap: TelemetryTap, gate: MotorCheckGate) {
    let mut monitor = TelemetryMonitor::new(gate);
    monitor.catch_up(&mut tap);
    if tap.missed() > 0 {
        println!("[rig] ({} earlier events not shown)", tap.missed());
    }
    for entry in monitor.log() {
        println!("[rig] {}", entry.message);
    }
    let counts = monitor.step_counts();
    if counts != StepCounts::default() {
        println!("[rig] steps X {} | Y {} | Z {}", counts.x, counts.y, counts.z);
    }
}
