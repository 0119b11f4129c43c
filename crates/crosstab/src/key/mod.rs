mod position;

#[cfg(test)]
mod tests;

use crate::{
    MAX_KEY_ARITY, MIN_KEY_ARITY,
    error::KeyError,
    value::{Value, ValueKind},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

// re-exports
pub use position::PositionOrder;

///
/// KeyComponent
///
/// One position of a composite key: a concrete value, or a typed wildcard
/// meaning "match any value of this kind here". A wildcard is a marker,
/// not data; it never compares equal to a concrete value.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KeyComponent {
    Value(Value),
    Wildcard(ValueKind),
}

impl KeyComponent {
    /// Kind expected at this position for replacement compatibility.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Value(v) => v.kind(),
            Self::Wildcard(kind) => *kind,
        }
    }

    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard(_))
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Wildcard(_) => None,
        }
    }
}

impl From<Value> for KeyComponent {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<ValueKind> for KeyComponent {
    fn from(kind: ValueKind) -> Self {
        Self::Wildcard(kind)
    }
}

impl fmt::Display for KeyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Wildcard(_) => f.write_str("*"),
        }
    }
}

///
/// CompositeKey
///
/// Ordered tuple of 2..=5 typed components identifying one cell of the
/// aggregation space. Immutable: replacement and growth return new keys, so
/// a caller's key is never corrupted across recursive resolution.
///
/// Equality and hashing are structural, which is what makes lookups against
/// independently reconstructed keys correct.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "Vec<KeyComponent>", into = "Vec<KeyComponent>")]
pub struct CompositeKey {
    components: Vec<KeyComponent>,
}

impl CompositeKey {
    ///
    /// CONSTRUCTION
    ///

    /// Build a key from components, validating the arity bound.
    pub fn new<I>(components: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = KeyComponent>,
    {
        let components: Vec<KeyComponent> = components.into_iter().collect();
        let arity = components.len();
        if !(MIN_KEY_ARITY..=MAX_KEY_ARITY).contains(&arity) {
            return Err(KeyError::UnsupportedArity { arity });
        }

        Ok(Self { components })
    }

    /// Build a fully concrete key from values.
    pub fn from_values<I, T>(values: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::new(values.into_iter().map(|v| KeyComponent::Value(v.into())))
    }

    ///
    /// INSPECTION
    ///

    #[must_use]
    pub fn arity(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn components(&self) -> &[KeyComponent] {
        &self.components
    }

    /// The component at `index`, or an explicit bounds failure.
    pub fn component(&self, index: usize) -> Result<&KeyComponent, KeyError> {
        self.components.get(index).ok_or(KeyError::IndexOutOfBounds {
            index,
            arity: self.components.len(),
        })
    }

    /// The concrete value at `index`; None for wildcards and out-of-range
    /// positions alike.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.components.get(index).and_then(KeyComponent::value)
    }

    #[must_use]
    pub fn is_wildcard(&self, index: usize) -> bool {
        self.components
            .get(index)
            .is_some_and(KeyComponent::is_wildcard)
    }

    /// Lowest wildcard position, or None for a fully concrete key.
    #[must_use]
    pub fn first_wildcard(&self) -> Option<usize> {
        self.components.iter().position(KeyComponent::is_wildcard)
    }

    /// Every wildcard position, in order; possibly empty.
    #[must_use]
    pub fn wildcard_positions(&self) -> Vec<usize> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_wildcard())
            .map(|(i, _)| i)
            .collect()
    }

    #[must_use]
    pub fn wildcard_count(&self) -> usize {
        self.components.iter().filter(|c| c.is_wildcard()).count()
    }

    /// First position whose component structurally equals `value`.
    #[must_use]
    pub fn position_of(&self, value: &Value) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.value() == Some(value))
    }

    ///
    /// DERIVATION
    ///

    /// New key with position `index` replaced by `value`.
    ///
    /// The replacement must carry the kind already expected at that position
    /// (the prior concrete value's kind, or the wildcard's declared kind).
    /// The aggregation space partitions values by position kind, and a
    /// mismatched replacement would silently corrupt lookups.
    pub fn with_component(&self, index: usize, value: Value) -> Result<Self, KeyError> {
        let expected = self.component(index)?.kind();
        let found = value.kind();
        if found != expected {
            return Err(KeyError::TypeMismatch {
                position: index,
                expected,
                found,
            });
        }

        let mut components = self.components.clone();
        components[index] = KeyComponent::Value(value);

        Ok(Self { components })
    }

    /// New key with one more component appended; fails once the arity
    /// bound is reached, leaving the original untouched.
    pub fn appended(&self, component: impl Into<KeyComponent>) -> Result<Self, KeyError> {
        let arity = self.components.len();
        if arity >= MAX_KEY_ARITY {
            return Err(KeyError::ArityExceeded { arity });
        }

        let mut components = self.components.clone();
        components.push(component.into());

        Ok(Self { components })
    }

    ///
    /// MATCHING
    ///

    /// Order-sensitive subset match against a pattern.
    ///
    /// Walks positions up to the pattern's arity: every pattern position
    /// must be a wildcard or structurally equal to this key's component.
    /// Pattern positions beyond this key's arity fail the match, wildcards
    /// included: a wildcard ranges over values, and absence is not a value.
    #[must_use]
    pub fn matches(&self, pattern: &Self) -> bool {
        pattern
            .components
            .iter()
            .enumerate()
            .all(|(i, p)| match p {
                KeyComponent::Wildcard(_) => i < self.components.len(),
                concrete => self.components.get(i) == Some(concrete),
            })
    }

    ///
    /// ORDERING
    ///

    /// Primary-dimension ordering: compares position 0 only.
    ///
    /// This is NOT a lexicographic order over the whole key, and it is only
    /// meaningful when position 0 holds the primary (typically numeric)
    /// dimension; `CompositeKey` deliberately does not implement `Ord`.
    /// Keys whose first position is a wildcard sort before concrete keys.
    #[must_use]
    pub fn primary_cmp(&self, other: &Self) -> Ordering {
        match (self.value_at(0), other.value_at(0)) {
            (Some(a), Some(b)) => a.cmp(b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

// Comma-joined rendering of the components, in order.
impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
        }

        Ok(())
    }
}

impl TryFrom<Vec<KeyComponent>> for CompositeKey {
    type Error = KeyError;

    fn try_from(components: Vec<KeyComponent>) -> Result<Self, Self::Error> {
        Self::new(components)
    }
}

impl From<CompositeKey> for Vec<KeyComponent> {
    fn from(key: CompositeKey) -> Self {
        key.components
    }
}
