//! Backend port — the rig's sequence executor and its command surface.
//!
//! Every command is a single request; implementations never retry.

use std::future::Future;

use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::CalibrationFactors;
use gecko_domain::wire::CategorizedProgram;

/// A program rendered as a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramFile {
    /// Suggested file name, e.g. `export_20250101_120000.json`.
    pub name: String,
    pub contents: Vec<u8>,
}

/// Executes programs and rig commands on behalf of the application.
pub trait SequenceBackend {
    /// Submit a categorized program for execution.
    fn run_program(
        &self,
        program: CategorizedProgram,
    ) -> impl Future<Output = Result<(), GeckoError>> + Send;

    /// Ask the executor to stop the running sequence after the current pulse.
    fn stop_sequence(&self) -> impl Future<Output = Result<(), GeckoError>> + Send;

    /// Halt every motor immediately.
    fn emergency_stop(&self) -> impl Future<Output = Result<(), GeckoError>> + Send;

    /// Start the motor check. Completion is reported over telemetry.
    fn motor_check(&self) -> impl Future<Output = Result<(), GeckoError>> + Send;

    /// Re-zero the force sensor.
    fn zero_sensor(&self) -> impl Future<Output = Result<(), GeckoError>> + Send;

    /// Replace the force-sensor calibration factors.
    fn calibrate(
        &self,
        factors: CalibrationFactors,
    ) -> impl Future<Output = Result<(), GeckoError>> + Send;

    /// Render `program` as a downloadable JSON file.
    fn download_program(
        &self,
        program: CategorizedProgram,
    ) -> impl Future<Output = Result<ProgramFile, GeckoError>> + Send;

    /// Upload a program file and get back the program it contains.
    fn upload_program(
        &self,
        file: ProgramFile,
    ) -> impl Future<Output = Result<CategorizedProgram, GeckoError>> + Send;
}

impl<T: SequenceBackend + Send + Sync> SequenceBackend for std::sync::Arc<T> {
    fn run_program(
        &self,
        program: CategorizedProgram,
    ) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).run_program(program)
    }

    fn stop_sequence(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).stop_sequence()
    }

    fn emergency_stop(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).emergency_stop()
    }

    fn motor_check(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).motor_check()
    }

    fn zero_sensor(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).zero_sensor()
    }

    fn calibrate(
        &self,
        factors: CalibrationFactors,
    ) -> impl Future<Output = Result<(), GeckoError>> + Send {
        (**self).calibrate(factors)
    }

    fn download_program(
        &self,
        program: CategorizedProgram,
    ) -> impl Future<Output = Result<ProgramFile, GeckoError>> + Send {
        (**self).download_program(program)
    }

    fn upload_program(
        &self,
        file: ProgramFile,
    ) -> impl Future<Output = Result<CategorizedProgram, GeckoError>> + Send {
        (**self).upload_program(file)
    }
}
