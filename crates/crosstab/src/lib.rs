//! Core runtime for crosstab: typed scalar values, composite keys with
//! positional wildcards, the aggregation map, and the cross-tab report
//! writer that enumerates dimension combinations into tabular output.

pub mod error;
pub mod key;
pub mod map;
pub mod report;
pub mod types;
pub mod value;

///
/// CONSTANTS
///

/// Minimum number of components in a composite key.
///
/// A single-component key has nothing to cross-tabulate; both the key
/// constructor and the report writer reject it.
pub const MIN_KEY_ARITY: usize = 2;

/// Maximum number of components in a composite key.
///
/// This bound keeps wildcard-resolution depth fixed and the report
/// cross-product enumerable; growth past it is rejected.
pub const MAX_KEY_ARITY: usize = 5;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, writers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        key::{CompositeKey, KeyComponent, PositionOrder},
        map::AggregationMap,
        report::{Bag, CrossTab, DistributionSummary, ReportOptions},
        types::{Date, Float64},
        value::{Value, ValueKind},
    };
}
