use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by distinct-set ordering, report row
/// order, and the per-position key comparator.
///
/// Ordering rules:
/// 1. Canonical kind rank
/// 2. Kind-specific natural comparison for same-ranked values
///
/// Mixing kinds at one key position is a caller error, but the rank step
/// keeps even that case deterministic.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.kind().rank().cmp(&right.kind().rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
