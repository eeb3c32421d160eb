//! State value carried by an entity's `state` field

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The value of an entity's `state` field
///
/// The hub reports states as strings ("on", "23.5", "unavailable") but
/// templates and thresholds may carry plain numbers. Anything that reads as
/// a number compares by that number, so `"10"`, `"10.0"` and `10` are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Number(f64),
    Text(String),
}

impl StateValue {
    /// Read a state value from JSON; `null`, arrays and objects have no state
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            _ => None,
        }
    }

    /// Numeric reading of the state, if it has one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Numeric reading when there is one, the text otherwise
    fn canonical(&self) -> Canonical<'_> {
        match self {
            Self::Number(n) => Canonical::Number(*n),
            Self::Text(s) => match s.trim().parse() {
                Ok(n) => Canonical::Number(n),
                Err(_) => Canonical::Text(s),
            },
        }
    }

    /// Convert back to JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) => json_number(*n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical(), other.canonical()) {
            (Canonical::Number(a), Canonical::Number(b)) => a == b,
            (Canonical::Text(a), Canonical::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// Hashes the canonical reading, so values that compare equal hash equal
impl Hash for StateValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.canonical() {
            Canonical::Number(n) => {
                0u8.hash(state);
                // -0.0 and 0.0 compare equal
                (n + 0.0).to_bits().hash(state);
            }
            Canonical::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

enum Canonical<'a> {
    Number(f64),
    Text(&'a str),
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for StateValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Encode a number as JSON, using an integer when the value has no fraction
///
/// The hub expects integral fields such as `brightness` or `hs_color` as
/// integers, while internal attributes are kept as `f64`.
pub fn json_number(n: f64) -> serde_json::Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}
