//! Motion axes of the rig and their travel direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::trigger::Metric;

/// One of the three independently driven motion axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes, in bucket order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Upper-case label used on the wire (`"X"`, `"Y"`, `"Z"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    /// Force component measured along this axis (`X` → `Fx`).
    #[must_use]
    pub fn force_component(self) -> Metric {
        match self {
            Self::X => Metric::Fx,
            Self::Y => Metric::Fy,
            Self::Z => Metric::Fz,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" | "x" => Ok(Self::X),
            "Y" | "y" => Ok(Self::Y),
            "Z" | "z" => Ok(Self::Z),
            other => Err(ValidationError::UnknownAxis(other.to_string())),
        }
    }
}

/// Travel direction of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Positive,
    Negative,
}

impl Direction {
    /// Label used on the wire (`"positive"` / `"negative"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            other => Err(ValidationError::UnknownDirection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_axis_to_its_force_component() {
        assert_eq!(Axis::X.force_component(), Metric::Fx);
        assert_eq!(Axis::Y.force_component(), Metric::Fy);
        assert_eq!(Axis::Z.force_component(), Metric::Fz);
    }

    #[test]
    fn should_parse_axis_case_insensitively() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("Z".parse::<Axis>().unwrap(), Axis::Z);
    }

    #[test]
    fn should_reject_unknown_axis() {
        let err = "W".parse::<Axis>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownAxis("W".to_string()));
    }

    #[test]
    fn should_default_direction_to_positive() {
        assert_eq!(Direction::default(), Direction::Positive);
    }

    #[test]
    fn should_serialize_direction_in_lowercase() {
        let json = serde_json::to_string(&Direction::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn should_serialize_axis_as_upper_case_letter() {
        let json = serde_json::to_string(&Axis::Y).unwrap();
        assert_eq!(json, "\"Y\"");
    }
}
