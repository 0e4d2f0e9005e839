//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`GeckoError`]
//! via `#[from]` (domain errors) or a boxed source (adapter errors).

use crate::axis::Axis;
use crate::trigger::{Metric, TriggerRole};

/// Top-level error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum GeckoError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The backend executor (or the transport to it) failed.
    #[error("backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A run was requested before the rig reported a completed motor check.
    #[error("motor check has not completed yet")]
    MotorCheckPending,
}

/// Violations of the trigger / step / program invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The metric cannot be used by a trigger of this role on this axis.
    #[error("metric {metric} is not allowed for {role} triggers on axis {axis}")]
    MetricNotAllowed {
        metric: Metric,
        role: TriggerRole,
        axis: Axis,
    },

    /// Duration and count thresholds must be non-negative.
    #[error("threshold for {metric} must be non-negative, got {value}")]
    NegativeThreshold { metric: Metric, value: f64 },

    /// A wire label did not name a known metric.
    #[error("unknown trigger type {0:?}")]
    UnknownMetric(String),

    /// A wire label did not name a known comparator.
    #[error("unknown comparator {0:?}")]
    UnknownComparator(String),

    /// A wire label did not name a known axis.
    #[error("unknown axis {0:?}")]
    UnknownAxis(String),

    /// A wire label did not name a known direction.
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),

    /// A wire flag was neither `"True"` nor `"False"`.
    #[error("unknown fire-all flag {0:?}")]
    UnknownFlag(String),

    /// A step type tag did not follow the `move-<AXIS>-axis` pattern.
    #[error("unknown step type {0:?}")]
    UnknownStepType(String),

    /// A step descriptor disagrees with the bucket or payload it sits in.
    #[error("step for axis {found} found where axis {expected} was expected")]
    AxisMismatch { expected: Axis, found: Axis },

    /// The repeat count of a program must be at least one.
    #[error("repeat count must be at least 1")]
    ZeroRepeat,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of item that was looked up (e.g. `"Step"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}
