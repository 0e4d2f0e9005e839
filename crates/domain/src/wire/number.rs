//! Serde helpers for numbers as the rig's JSON expects them.
//!
//! Whole numbers go out as integers (`5`, not `5.0`) and non-finite numbers
//! as `null`. Incoming numbers are read leniently: numeric strings are
//! accepted, and anything unreadable becomes `0`.

use serde::{Deserialize, Deserializer, Serializer};

use crate::input::parse_lenient_number;

/// Largest integer an IEEE double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl Loose {
    fn into_f64(self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => n,
            Self::Text(s) => parse_lenient_number(&s),
            Self::Number(_) | Self::Other(_) => 0.0,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let value = *value;
    if !value.is_finite() {
        serializer.serialize_none()
    } else if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Loose::deserialize(deserializer)?.into_f64())
}

/// Pulse interval: an integer on the way out, truncated and floored at zero on the way in.
pub(crate) mod pulse {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Loose;
    use crate::input::parse_lenient_pulse;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(crate) fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*value)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<u32, D::Error> {
        let value = Loose::deserialize(deserializer)?.into_f64();
        Ok(parse_lenient_pulse(&value.to_string()))
    }
}
