//! Motor-check gate — runs are refused until the rig reports a completed motor check.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::{LogSignal, TelemetryEvent};

/// Shared flag opened by the rig's `Motor check completed` log line.
///
/// Clones share state, so the telemetry side can open the gate that the
/// sequence service checks.
#[derive(Debug, Clone)]
pub struct MotorCheckGate {
    required: bool,
    passed: Arc<AtomicBool>,
}

impl MotorCheckGate {
    /// A gate that must see a completed motor check before it opens.
    #[must_use]
    pub fn new(required: bool) -> Self {
        Self {
            required,
            passed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A gate that is always open.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Open the gate if `event` announces a completed motor check.
    ///
    /// Returns `true` when this event is the one that opened it.
    pub fn observe(&self, event: &TelemetryEvent) -> bool {
        match event {
            TelemetryEvent::Log(message) => self.observe_log(message),
            TelemetryEvent::Force(_) | TelemetryEvent::StepCount(_) => false,
        }
    }

    /// Same as [`observe`](Self::observe) for a bare log line.
    pub fn observe_log(&self, message: &str) -> bool {
        LogSignal::classify(message) == Some(LogSignal::MotorCheckCompleted)
            && !self.passed.swap(true, Ordering::SeqCst)
    }

    /// Record a completed motor check observed out of band.
    pub fn mark_passed(&self) {
        self.passed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.required || self.passed.load(Ordering::SeqCst)
    }

    /// # Errors
    ///
    /// Returns [`GeckoError::MotorCheckPending`] while the gate is closed.
    pub fn check(&self) -> Result<(), GeckoError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(GeckoError::MotorCheckPending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stay_closed_until_motor_check_completes() {
        let gate = MotorCheckGate::new(true);
        assert!(matches!(gate.check(), Err(GeckoError::MotorCheckPending)));

        assert!(!gate.observe(&TelemetryEvent::Log("Motor check started.".to_string())));
        assert!(!gate.is_open());

        assert!(gate.observe(&TelemetryEvent::Log("Motor check completed.".to_string())));
        assert!(gate.check().is_ok());
    }

    #[test]
    fn should_share_state_between_clones() {
        let gate = MotorCheckGate::new(true);
        let other = gate.clone();
        other.mark_passed();
        assert!(gate.is_open());
    }

    #[test]
    fn should_report_opening_only_once() {
        let gate = MotorCheckGate::new(true);
        let done = TelemetryEvent::Log("Motor check completed.".to_string());
        assert!(gate.observe(&done));
        assert!(!gate.observe(&done));
    }

    #[test]
    fn should_always_be_open_when_disabled() {
        assert!(MotorCheckGate::disabled().check().is_ok());
    }
}
