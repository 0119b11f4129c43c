use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ValueKind
///
/// Stable canonical kind tag for the supported scalar kinds. Wildcard key
/// components carry one of these to declare the kind they range over, and
/// component replacement checks compatibility by tag equality.
///
/// IMPORTANT:
/// Tag values drive deterministic cross-kind ordering of distinct-value
/// sets, which fixes report row order; they must remain fixed.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ValueKind {
    Date = 1,
    Float = 2,
    Int = 3,
    Text = 4,
}

impl ValueKind {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable canonical rank used by cross-kind ordering.
    #[must_use]
    pub const fn rank(self) -> u8 {
        // Tags are 1-based for stability; rank is 0-based.
        self.to_u8() - 1
    }

    /// Stable human-readable kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Text => "Text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable canonical kind tag for a value.
#[must_use]
pub(super) const fn kind_of(value: &Value) -> ValueKind {
    match value {
        Value::Date(_) => ValueKind::Date,
        Value::Float(_) => ValueKind::Float,
        Value::Int(_) => ValueKind::Int,
        Value::Text(_) => ValueKind::Text,
    }
}
