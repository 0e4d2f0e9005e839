//! Sequence service — use-cases for editing a sequence and handing it to the executor.

use gecko_domain::axis::Axis;
use gecko_domain::error::GeckoError;
use gecko_domain::id::StepId;
use gecko_domain::sequence::Sequence;
use gecko_domain::step::SequenceStep;
use gecko_domain::wire::CategorizedProgram;

use crate::motor_check::MotorCheckGate;
use crate::ports::{ProgramFile, SequenceBackend};

/// One row of the sequence overview: position label and gating summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOverview {
    pub id: StepId,
    pub label: String,
    pub summary: String,
}

/// Label and summary for every step of `sequence`, in position order.
#[must_use]
pub fn overview(sequence: &Sequence) -> Vec<StepOverview> {
    sequence
        .steps()
        .iter()
        .zip(sequence.labels())
        .map(|(step, label)| StepOverview {
            id: step.id(),
            label,
            summary: step.summary(),
        })
        .collect()
}

/// Owns the operator's sequence and submits it to a [`SequenceBackend`].
///
/// Edits take `&mut self` and complete synchronously; submissions export the
/// program before awaiting the backend, so no edit can interleave with an export.
pub struct SequenceService<B> {
    backend: B,
    gate: MotorCheckGate,
    sequence: Sequence,
}

impl<B: SequenceBackend> SequenceService<B> {
    /// Create a service with an empty sequence.
    pub fn new(backend: B, gate: MotorCheckGate) -> Self {
        Self::with_sequence(backend, gate, Sequence::new())
    }

    /// Create a service editing an existing sequence.
    pub fn with_sequence(backend: B, gate: MotorCheckGate, sequence: Sequence) -> Self {
        Self {
            backend,
            gate,
            sequence,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn into_sequence(self) -> Sequence {
        self.sequence
    }

    #[tracing::instrument(skip(self))]
    pub fn add_step(&mut self, axis: Axis) -> StepId {
        let id = self.sequence.add_step(axis);
        tracing::debug!(%id, "step added");
        id
    }

    /// Remove a step; unknown ids are ignored.
    #[tracing::instrument(skip(self))]
    pub fn remove_step(&mut self, id: StepId) -> Option<SequenceStep> {
        let removed = self.sequence.remove_step(id);
        if removed.is_none() {
            tracing::debug!("step already gone");
        }
        removed
    }

    /// Apply `edit` to the step with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoError::NotFound`] when no step has this id.
    pub fn edit_step<T>(
        &mut self,
        id: StepId,
        edit: impl FnOnce(&mut SequenceStep) -> T,
    ) -> Result<T, GeckoError> {
        let step = self.sequence.require_step_mut(id)?;
        Ok(edit(step))
    }

    /// # Errors
    ///
    /// Returns [`GeckoError::Validation`] for a zero repeat count.
    pub fn set_repeat(&mut self, repeat: Option<u32>) -> Result<(), GeckoError> {
        self.sequence.set_repeat(repeat)?;
        Ok(())
    }

    /// Label and summary for every step, in position order.
    pub fn overview(&self) -> Vec<StepOverview> {
        overview(&self.sequence)
    }

    pub fn program(&self) -> CategorizedProgram {
        self.sequence.program()
    }

    /// Replace the sequence with one rebuilt from `program`.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoError::Validation`] when the program cannot be rehydrated;
    /// the current sequence is kept in that case.
    pub fn load_program(&mut self, program: &CategorizedProgram) -> Result<(), GeckoError> {
        self.sequence = Sequence::from_program(program)?;
        tracing::info!(steps = self.sequence.len(), "sequence loaded");
        Ok(())
    }

    /// Submit the current program for execution. Failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoError::MotorCheckPending`] before a completed motor check,
    /// or the backend's error. The sequence is left untouched either way.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GeckoError> {
        self.gate.check()?;
        let program = self.sequence.program();
        let steps = program.len();
        match self.backend.run_program(program).await {
            Ok(()) => {
                tracing::info!(steps, "sequence submitted");
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, "sequence submission failed");
                Err(error)
            }
        }
    }

    /// Render the current program as a downloadable file.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self) -> Result<ProgramFile, GeckoError> {
        let program = self.sequence.program();
        self.backend
            .download_program(program)
            .await
            .inspect_err(|error| tracing::error!(%error, "program download failed"))
    }

    /// Upload a program file and replace the sequence with its contents.
    ///
    /// # Errors
    ///
    /// Returns the backend's error or [`GeckoError::Validation`] when the
    /// uploaded program cannot be rehydrated. The sequence is kept on error.
    #[tracing::instrument(skip(self, file), fields(file_name = %file.name))]
    pub async fn upload(&mut self, file: ProgramFile) -> Result<(), GeckoError> {
        let program = self
            .backend
            .upload_program(file)
            .await
            .inspect_err(|error| tracing::error!(%error, "program upload failed"))?;
        self.load_program(&program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gecko_domain::error::ValidationError;
    use gecko_domain::telemetry::{CalibrationFactors, TelemetryEvent};
    use gecko_domain::trigger::{Comparator, Metric, TriggerRole};
    use std::future::Future;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        submitted: Mutex<Vec<CategorizedProgram>>,
        fail: bool,
    }

    impl RecordingBackend {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn result<T>(&self, value: T) -> Result<T, GeckoError> {
            if self.fail {
                Err(GeckoError::Backend("connection refused".into()))
            } else {
                Ok(value)
            }
        }
    }

    impl SequenceBackend for RecordingBackend {
        fn run_program(
            &self,
            program: CategorizedProgram,
        ) -> impl Future<Output = Result<(), GeckoError>> + Send {
            let result = self.result(());
            if result.is_ok() {
                self.submitted.lock().unwrap().push(program);
            }
            async { result }
        }

        fn stop_sequence(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
            let result = self.result(());
            async { result }
        }

        fn emergency_stop(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
            let result = self.result(());
            async { result }
        }

        fn motor_check(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
            let result = self.result(());
            async { result }
        }

        fn zero_sensor(&self) -> impl Future<Output = Result<(), GeckoError>> + Send {
            let result = self.result(());
            async { result }
        }

        fn calibrate(
            &self,
            _factors: CalibrationFactors,
        ) -> impl Future<Output = Result<(), GeckoError>> + Send {
            let result = self.result(());
            async { result }
        }

        fn download_program(
            &self,
            program: CategorizedProgram,
        ) -> impl Future<Output = Result<ProgramFile, GeckoError>> + Send {
            let result = self.result(ProgramFile {
                name: "export_test.json".to_string(),
                contents: serde_json::to_vec_pretty(&program).unwrap(),
            });
            async { result }
        }

        fn upload_program(
            &self,
            file: ProgramFile,
        ) -> impl Future<Output = Result<CategorizedProgram, GeckoError>> + Send {
            let result = self
                .result(())
                .and_then(|()| {
                    serde_json::from_slice::<CategorizedProgram>(&file.contents)
                        .map_err(|err| GeckoError::Backend(Box::new(err)))
                });
            async { result }
        }
    }

    fn checked_gate() -> MotorCheckGate {
        let gate = MotorCheckGate::new(true);
        gate.observe(&TelemetryEvent::Log("Motor check completed.".to_string()));
        gate
    }

    fn make_service() -> SequenceService<RecordingBackend> {
        SequenceService::new(RecordingBackend::default(), checked_gate())
    }

    #[tokio::test]
    async fn should_submit_categorized_program_when_running() {
        let mut svc = make_service();
        svc.add_step(Axis::X);
        svc.add_step(Axis::Y);
        svc.add_step(Axis::X);

        svc.run().await.unwrap();

        let submitted = svc.backend.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].x.len(), 2);
        assert_eq!(submitted[0].y.len(), 1);
        assert!(submitted[0].z.is_empty());
    }

    #[tokio::test]
    async fn should_refuse_run_before_motor_check() {
        let mut svc = SequenceService::new(RecordingBackend::default(), MotorCheckGate::new(true));
        svc.add_step(Axis::Z);

        let err = svc.run().await.unwrap_err();

        assert!(matches!(err, GeckoError::MotorCheckPending));
        assert!(svc.backend.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_keep_sequence_when_submission_fails() {
        let mut svc = SequenceService::new(RecordingBackend::failing(), checked_gate());
        let id = svc.add_step(Axis::Z);
        let before = svc.sequence().clone();

        let err = svc.run().await.unwrap_err();

        assert!(matches!(err, GeckoError::Backend(_)));
        assert_eq!(svc.sequence(), &before);
        assert!(svc.sequence().step(id).is_some());
    }

    #[test]
    fn should_edit_step_through_service() {
        let mut svc = make_service();
        let id = svc.add_step(Axis::X);

        svc.edit_step(id, |step| {
            step.add_condition(TriggerRole::Stop, Metric::Fx, Comparator::GreaterOrEqual, 5.0)
        })
        .unwrap()
        .unwrap();

        let overview = svc.overview();
        assert_eq!(overview[0].label, "Step 1: Move X Axis");
        assert_eq!(
            overview[0].summary,
            "This action ends when:\n- Axis X stops moving if Fx >= 5N"
        );
    }

    #[test]
    fn should_return_not_found_when_editing_unknown_step() {
        let mut svc = make_service();
        let err = svc
            .edit_step(StepId::new(), |step| step.set_enabled(false))
            .unwrap_err();
        assert!(matches!(err, GeckoError::NotFound(_)));
    }

    #[test]
    fn should_ignore_removal_of_absent_step() {
        let mut svc = make_service();
        let id = svc.add_step(Axis::Y);
        assert!(svc.remove_step(id).is_some());
        assert!(svc.remove_step(id).is_none());
    }

    #[test]
    fn should_reject_zero_repeat() {
        let mut svc = make_service();
        let err = svc.set_repeat(Some(0)).unwrap_err();
        assert!(matches!(
            err,
            GeckoError::Validation(ValidationError::ZeroRepeat)
        ));
    }

    #[tokio::test]
    async fn should_restore_sequence_from_downloaded_file() {
        let mut svc = make_service();
        let id = svc.add_step(Axis::Z);
        svc.edit_step(id, |step| step.add_default_condition(TriggerRole::Hold))
            .unwrap();
        svc.set_repeat(Some(3)).unwrap();
        let program = svc.program();

        let file = svc.download().await.unwrap();
        let mut other = make_service();
        other.upload(file).await.unwrap();

        assert_eq!(other.program(), program);
        assert_eq!(other.sequence().repeat(), Some(3));
    }

    #[tokio::test]
    async fn should_keep_sequence_when_upload_is_invalid() {
        let mut svc = make_service();
        svc.add_step(Axis::X);
        let file = ProgramFile {
            name: "bad.json".to_string(),
            contents: br#"{"X": [{"type": "move-Y-axis", "data": {}}]}"#.to_vec(),
        };

        let err = svc.upload(file).await.unwrap_err();

        assert!(matches!(err, GeckoError::Validation(_)));
        assert_eq!(svc.sequence().len(), 1);
    }
}
