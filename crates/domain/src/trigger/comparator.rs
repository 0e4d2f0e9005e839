//! Comparator — the relation between a live value and a threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Numeric comparison applied as `live <comparator> threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl Comparator {
    /// All comparators, in the order an operator picks from.
    pub const ALL: [Self; 5] = [
        Self::GreaterOrEqual,
        Self::LessOrEqual,
        Self::Equal,
        Self::Greater,
        Self::Less,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::Greater => ">",
            Self::Less => "<",
        }
    }

    /// Evaluate `live <self> threshold` with plain IEEE semantics.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn holds(self, live: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterOrEqual => live >= threshold,
            Self::LessOrEqual => live <= threshold,
            Self::Equal => live == threshold,
            Self::Greater => live > threshold,
            Self::Less => live < threshold,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.symbol() == s.trim())
            .ok_or_else(|| ValidationError::UnknownComparator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_evaluate_each_comparator() {
        assert!(Comparator::GreaterOrEqual.holds(5.0, 5.0));
        assert!(Comparator::LessOrEqual.holds(4.9, 5.0));
        assert!(Comparator::Equal.holds(5.0, 5.0));
        assert!(Comparator::Greater.holds(5.1, 5.0));
        assert!(Comparator::Less.holds(-1.5, -1.0));
        assert!(!Comparator::Greater.holds(5.0, 5.0));
        assert!(!Comparator::Less.holds(5.0, 5.0));
    }

    #[test]
    fn should_never_hold_against_nan() {
        for c in Comparator::ALL {
            assert!(!c.holds(f64::NAN, 1.0));
        }
    }

    #[test]
    fn should_parse_symbols() {
        assert_eq!("<=".parse::<Comparator>().unwrap(), Comparator::LessOrEqual);
        assert!("=>".parse::<Comparator>().is_err());
    }

    #[test]
    fn should_serialize_as_symbol() {
        let json = serde_json::to_string(&Comparator::Greater).unwrap();
        assert_eq!(json, "\">\"");
    }
}
