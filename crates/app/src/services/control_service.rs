//! Control service — fire-and-forget rig commands.

use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::CalibrationFactors;

use crate::ports::SequenceBackend;

/// Forwards operator commands to the backend and logs failures.
///
/// Each command is sent once; outcomes surface through telemetry.
pub struct ControlService<B> {
    backend: B,
}

impl<B: SequenceBackend> ControlService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[tracing::instrument(skip(self))]
    pub async fn stop_sequence(&self) -> Result<(), GeckoError> {
        log_outcome("stop sequence", self.backend.stop_sequence().await)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[tracing::instrument(skip(self))]
    pub async fn emergency_stop(&self) -> Result<(), GeckoError> {
        tracing::warn!("emergency stop requested");
        log_outcome("emergency stop", self.backend.emergency_stop().await)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[tracing::instrument(skip(self))]
    pub async fn motor_check(&self) -> Result<(), GeckoError> {
        log_outcome("motor check", self.backend.motor_check().await)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[tracing::instrument(skip(self))]
    pub async fn zero_sensor(&self) -> Result<(), GeckoError> {
        log_outcome("zero sensor", self.backend.zero_sensor().await)
    }

    /// Non-finite factors are sent as `1`, leaving that component unscaled.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    #[tracing::instrument(skip(self))]
    pub async fn calibrate(&self, factors: CalibrationFactors) -> Result<(), GeckoError> {
        let sanitize = |v: f64| if v.is_finite() { v } else { 1.0 };
        let factors = CalibrationFactors {
            fx: sanitize(factors.fx),
            fy: sanitize(factors.fy),
            fz: sanitize(factors.fz),
        };
        log_outcome("calibrate", self.backend.calibrate(factors).await)
    }
}

fn log_outcome(command: &'static str, result: Result<(), GeckoError>) -> Result<(), GeckoError> {
    match &result {
        Ok(()) => tracing::info!(command, "command accepted"),
        Err(error) => tracing::error!(command, %error, "command failed"),
    }
    result
}
