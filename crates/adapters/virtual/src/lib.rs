//! # gecko-adapter-virtual
//!
//! Virtual rig that implements [`SequenceBackend`] in memory, for demos and
//! tests without hardware.
//!
//! ## Behaviour
//!
//! | Command | Telemetry published |
//! |---------|---------------------|
//! | run program | `Sequence started`, per-step progress, step counts, force, `Sequence complete` |
//! | stop | `Sequence manually stopped` |
//! | emergency stop | `Emergency stop: All motors halted.` |
//! | motor check | `Motor check started.` then `Motor check completed.` |
//! | zero sensor | `Sensor zeroed.` |
//! | calibrate | `Calibration updated.` |
//!
//! Programs are replayed instantly; there is no motion timing.
//!
//! ## Dependency rule
//!
//! Depends on `gecko-app` (port traits) and `gecko-domain` only.

mod script;

use std::sync::{Mutex, MutexGuard, PoisonError};

use gecko_app::ports::{ProgramFile, SequenceBackend, TelemetryPublisher};
use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::{CalibrationFactors, StepCounts, TelemetryEvent};
use gecko_domain::time::now;
use gecko_domain::wire::CategorizedProgram;

pub use script::PULSES_PER_STEP;

/// A command received by the virtual rig, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigCommand {
    Run,
    Stop,
    EmergencyStop,
    MotorCheck,
    ZeroSensor,
    Calibrate,
}

#[derive(Debug, Default)]
struct RigState {
    commands: Vec<RigCommand>,
    programs: Vec<CategorizedProgram>,
    calibration: CalibrationFactors,
    step_counts: StepCounts,
}

/// In-memory rig that publishes what a real one would report.
pub struct VirtualRig<P> {
    publisher: P,
    state: Mutex<RigState>,
}

impl<P: TelemetryPublisher + Sync> VirtualRig<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            publisher,
            state: Mutex::new(RigState::default()),
        }
    }

    /// Commands received so far.
    #[must_use]
    pub fn commands(&self) -> Vec<RigCommand> {
        self.lock_state().commands.clone()
    }

    /// Programs submitted for execution so far.
    #[must_use]
    pub fn programs(&self) -> Vec<CategorizedProgram> {
        self.lock_state().programs.clone()
    }

    #[must_use]
    pub fn calibration(&self) -> CalibrationFactors {
        self.lock_state().calibration
    }

    #[must_use]
    pub fn step_counts(&self) -> StepCounts {
        self.lock_state().step_counts
    }

    fn lock_state(&self) -> MutexGuard<'_, RigState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, command: RigCommand) {
        self.lock_state().commands.push(command);
    }

    async fn publish_all(&self, events: Vec<TelemetryEvent>) -> Result<(), GeckoError> {
        for event in events {
            self.publisher.publish(event).await?;
        }
        Ok(())
    }

    async fn publish_log(&self, message: &str) -> Result<(), GeckoError> {
        self.publisher
            .publish(TelemetryEvent::Log(message.to_string()))
            .await
    }
}

impl<P: TelemetryPublisher + Sync> SequenceBackend for VirtualRig<P> {
    async fn run_program(&self, program: CategorizedProgram) -> Result<(), GeckoError> {
        let events = {
            let mut state = self.lock_state();
            state.commands.push(RigCommand::Run);
            state.step_counts = StepCounts::default();
            let mut counts = state.step_counts;
            let events = script::playback(&program, &mut counts);
            state.step_counts = counts;
            state.programs.push(program);
            events
        };
        tracing::debug!(events = events.len(), "replaying program");
        self.publish_all(events).await
    }

    async fn stop_sequence(&self) -> Result<(), GeckoError> {
        self.record(RigCommand::Stop);
        self.publish_log("Sequence manually stopped").await
    }

    async fn emergency_stop(&self) -> Result<(), GeckoError> {
        self.record(RigCommand::EmergencyStop);
        self.publish_log("Emergency stop: All motors halted.").await
    }

    async fn motor_check(&self) -> Result<(), GeckoError> {
        self.record(RigCommand::MotorCheck);
        self.publish_log("Motor check started.").await?;
        self.publish_log("Motor check completed.").await
    }

    async fn zero_sensor(&self) -> Result<(), GeckoError> {
        self.record(RigCommand::ZeroSensor);
        self.publish_log("Sensor zeroed.").await
    }

    async fn calibrate(&self, factors: CalibrationFactors) -> Result<(), GeckoError> {
        {
            let mut state = self.lock_state();
            state.commands.push(RigCommand::Calibrate);
            state.calibration = factors;
        }
        self.publish_log("Calibration updated.").await
    }

    async fn download_program(
        &self,
        program: CategorizedProgram,
    ) -> Result<ProgramFile, GeckoError> {
        let contents = program
            .to_json_pretty()
            .map_err(|err| GeckoError::Backend(Box::new(err)))?
            .into_bytes();
        let name = format!("export_{}.json", now().format("%Y%m%d_%H%M%S"));
        self.publish_log(&format!("Downloading state as {name}"))
            .await?;
        Ok(ProgramFile { name, contents })
    }

    async fn upload_program(&self, file: ProgramFile) -> Result<CategorizedProgram, GeckoError> {
        serde_json::from_slice(&file.contents).map_err(|err| GeckoError::Backend(Box::new(err)))
    }
}
