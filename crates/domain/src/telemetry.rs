//! Telemetry — readings pushed by the rig while it runs.
//!
//! These values are displayed and fed to trigger evaluation; they never
//! mutate sequence state.

use serde::{Deserialize, Serialize};

use crate::axis::Axis;

/// One force-sensor sample, in Newtons.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceReading {
    #[serde(rename = "Fx")]
    pub fx: f64,
    #[serde(rename = "Fy")]
    pub fy: f64,
    #[serde(rename = "Fz")]
    pub fz: f64,
}

impl ForceReading {
    /// Magnitude of the combined force vector.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.fx * self.fx + self.fy * self.fy + self.fz * self.fz).sqrt()
    }

    /// Component measured along `axis`.
    #[must_use]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.fx,
            Axis::Y => self.fy,
            Axis::Z => self.fz,
        }
    }
}

/// Signed pulse counters per axis, relative to the run's start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepCounts {
    #[serde(rename = "X")]
    pub x: i64,
    #[serde(rename = "Y")]
    pub y: i64,
    #[serde(rename = "Z")]
    pub z: i64,
}

impl StepCounts {
    #[must_use]
    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Per-component scale factors applied by the rig to raw force-sensor output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFactors {
    #[serde(rename = "Fx")]
    pub fx: f64,
    #[serde(rename = "Fy")]
    pub fy: f64,
    #[serde(rename = "Fz")]
    pub fz: f64,
}

impl Default for CalibrationFactors {
    fn default() -> Self {
        Self {
            fx: 1.0,
            fy: 1.0,
            fz: 1.0,
        }
    }
}

/// An event pushed over the telemetry channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Free-text progress message.
    Log(String),
    /// Latest force-sensor sample.
    Force(ForceReading),
    /// Latest step counters.
    StepCount(StepCounts),
}

/// Meaning carried by certain fixed log phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSignal {
    /// The rig started executing a sequence.
    SequenceStarted,
    /// The sequence completed or was stopped by the operator.
    SequenceFinished,
    /// The rig finished its motor check; runs may be submitted.
    MotorCheckCompleted,
}

impl LogSignal {
    /// Recognise the phrases the rig uses to announce state changes.
    #[must_use]
    pub fn classify(message: &str) -> Option<Self> {
        if message.contains("Motor check completed") {
            Some(Self::MotorCheckCompleted)
        } else if message.contains("Sequence complete") || message.contains("manually stopped") {
            Some(Self::SequenceFinished)
        } else if message.contains("Sequence started") {
            Some(Self::SequenceStarted)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compute_magnitude() {
        let f = ForceReading {
            fx: 1.0,
            fy: 2.0,
            fz: 2.0,
        };
        assert!((f.magnitude() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn should_deserialize_force_event_ignoring_extra_fields() {
        let json = serde_json::json!({
            "event": "force",
            "data": {"Fx": 0.5, "Fy": -0.25, "Fz": 3.0, "F_shear": 0.56}
        });
        let event: TelemetryEvent = serde_json::from_value(json).unwrap();
        let TelemetryEvent::Force(f) = event else {
            panic!("expected force event");
        };
        assert!((f.along(Axis::Z) - 3.0).abs() < f64::EPSILON);
        assert!((f.fy + 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn should_default_missing_force_components_to_zero() {
        let f: ForceReading = serde_json::from_str(r#"{"Fz": 1.5}"#).unwrap();
        assert!(f.fx.abs() < f64::EPSILON);
        assert!((f.fz - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_deserialize_step_count_event() {
        let json = serde_json::json!({"event": "step_count", "data": {"X": -12, "Y": 0, "Z": 40}});
        let event: TelemetryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(
            event,
            TelemetryEvent::StepCount(StepCounts { x: -12, y: 0, z: 40 })
        );
    }

    #[test]
    fn should_deserialize_log_event() {
        let json = serde_json::json!({"event": "log", "data": "Sequence started"});
        let event: TelemetryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event, TelemetryEvent::Log("Sequence started".to_string()));
    }

    #[test]
    fn should_classify_fixed_log_phrases() {
        assert_eq!(
            LogSignal::classify("Sequence started"),
            Some(LogSignal::SequenceStarted)
        );
        assert_eq!(
            LogSignal::classify("Experiment manually stopped"),
            Some(LogSignal::SequenceFinished)
        );
        assert_eq!(
            LogSignal::classify("Motor check completed."),
            Some(LogSignal::MotorCheckCompleted)
        );
        assert_eq!(LogSignal::classify("X: Step 0 is initiated."), None);
    }
}
