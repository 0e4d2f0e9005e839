//! Metric — the measurable quantity a trigger condition compares.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::error::ValidationError;

/// A quantity a trigger condition can be evaluated against.
///
/// Serialized with its bare name (`"Fx"`, `"duration"`, …); the wire labels
/// carrying a unit suffix (`"Fx (N)"`) are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Fx", alias = "Fx (N)")]
    Fx,
    #[serde(rename = "Fy", alias = "Fy (N)")]
    Fy,
    #[serde(rename = "Fz", alias = "Fz (N)")]
    Fz,
    /// Magnitude of the combined force vector.
    #[serde(rename = "F_Gesamt", alias = "F_Gesamt (N)", alias = "F_total")]
    FTotal,
    /// Seconds elapsed since the role's reference instant.
    #[serde(rename = "duration", alias = "duration (sec)")]
    Duration,
    /// Pulse / step counter.
    #[serde(rename = "steps", alias = "steps (count)")]
    Steps,
}

/// Physical unit of a [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Newton,
    Second,
    Count,
}

impl Unit {
    /// Suffix appended to a threshold in summaries (`5N`, `2sec`, `100`).
    #[must_use]
    pub fn summary_suffix(self) -> &'static str {
        match self {
            Self::Newton => "N",
            Self::Second => "sec",
            Self::Count => "",
        }
    }

    fn wire_suffix(self) -> &'static str {
        match self {
            Self::Newton => "(N)",
            Self::Second => "(sec)",
            Self::Count => "(count)",
        }
    }
}

impl Metric {
    /// Every metric, in the order the force sensor and counters expose them.
    pub const ALL: [Self; 6] = [
        Self::Fx,
        Self::Fy,
        Self::Fz,
        Self::FTotal,
        Self::Duration,
        Self::Steps,
    ];

    /// Name without unit (`"Fx"`, `"F_Gesamt"`, `"duration"`).
    #[must_use]
    pub fn bare_name(self) -> &'static str {
        match self {
            Self::Fx => "Fx",
            Self::Fy => "Fy",
            Self::Fz => "Fz",
            Self::FTotal => "F_Gesamt",
            Self::Duration => "duration",
            Self::Steps => "steps",
        }
    }

    #[must_use]
    pub fn unit(self) -> Unit {
        match self {
            Self::Fx | Self::Fy | Self::Fz | Self::FTotal => Unit::Newton,
            Self::Duration => Unit::Second,
            Self::Steps => Unit::Count,
        }
    }

    /// Label with unit suffix as the backend expects it (`"Fz (N)"`).
    #[must_use]
    pub fn wire_label(self) -> String {
        format!("{} {}", self.bare_name(), self.unit().wire_suffix())
    }

    #[must_use]
    pub fn is_force(self) -> bool {
        self.unit() == Unit::Newton
    }

    /// Duration and count thresholds cannot be negative.
    #[must_use]
    pub fn requires_non_negative(self) -> bool {
        !self.is_force()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_label())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    /// Accepts both the wire label (`"Fz (N)"`) and the bare name (`"Fz"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.wire_label() == trimmed || m.bare_name() == trimmed)
            .or_else(|| (trimmed == "F_total").then_some(Self::FTotal))
            .ok_or_else(|| ValidationError::UnknownMetric(s.to_string()))
    }
}

/// Which gate of an axis step a trigger set controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerRole {
    /// Gates when movement starts.
    Init,
    /// Gates when movement stops.
    Stop,
    /// Gates when force holding ends.
    Hold,
}

impl TriggerRole {
    /// All roles, in summary order.
    pub const ALL: [Self; 3] = [Self::Init, Self::Stop, Self::Hold];

    /// Metrics a condition of this role may use on `axis`, in display order.
    ///
    /// Init triggers cannot use duration. Hold triggers cannot reference the
    /// axis's own force component, since that is the force being held.
    #[must_use]
    pub fn allowed_metrics(self, axis: Axis) -> Vec<Metric> {
        match self {
            Self::Init | Self::Stop => vec![
                Metric::Fx,
                Metric::Fy,
                Metric::Fz,
                Metric::FTotal,
                Metric::Steps,
            ],
            Self::Hold => [
                Metric::Fz,
                Metric::Fx,
                Metric::Fy,
                Metric::FTotal,
                Metric::Duration,
                Metric::Steps,
            ]
            .into_iter()
            .filter(|m| *m != axis.force_component())
            .collect(),
        }
    }

    #[must_use]
    pub fn allows(self, metric: Metric, axis: Axis) -> bool {
        self.allowed_metrics(axis).contains(&metric)
    }

    /// Metric preselected for a freshly added condition.
    #[must_use]
    pub fn default_metric(self, axis: Axis) -> Metric {
        // every role keeps at least four metrics for any axis
        self.allowed_metrics(axis)[0]
    }
}

impl fmt::Display for TriggerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Stop => f.write_str("stop"),
            Self::Hold => f.write_str("hold"),
        }
    }
}
