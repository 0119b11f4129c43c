mod compare;
mod tag;


use crate::types::{Date, Float64, FloatError};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

// re-exports
pub use tag::ValueKind;

///
/// Value
///
/// One typed scalar component of a composite key. The kind set is closed:
/// every position of the aggregation space holds an integer, a finite
/// float, text, or a calendar date.
///
/// Equality and hashing are structural; the aggregation map's lookup
/// correctness depends on structurally equal values hashing identically.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Date(Date),
    Float(Float64),
    Int(i64),
    Text(String),
}

impl Value {
    ///
    /// TYPES
    ///

    /// Stable kind tag for this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        tag::kind_of(self)
    }

    /// Returns true if the value is one of the numeric kinds.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<Date> {
        if let Self::Date(d) = self {
            Some(*d)
        } else {
            None
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare::canonical_cmp(self, other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Bare scalar rendering: the report writer joins these with commas, so text
// is written unquoted and unescaped.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    Date    => Date,
    Float64 => Float,
    i8      => Int,
    i16     => Int,
    i32     => Int,
    i64     => Int,
    u8      => Int,
    u16     => Int,
    u32     => Int,
    &str    => Text,
    String  => Text,
}

impl TryFrom<f64> for Value {
    type Error = FloatError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Float64::try_from(v).map(Self::Float)
    }
}
