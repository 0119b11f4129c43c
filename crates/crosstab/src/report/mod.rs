
use crate::{
    MAX_KEY_ARITY, MIN_KEY_ARITY,
    error::ReportError,
    key::{CompositeKey, KeyComponent},
    value::Value,
};
use itertools::Itertools;
use serde::Deserialize;
use std::io::Write;
use tracing::{debug, warn};

/// Trailing column names of every statistics header.
///
/// Fixed even when the sum flag repurposes the `Count` slot; downstream
/// consumers key on these names.
const STATS_COLUMNS: [&str; 8] = ["Min", "Max", "Count", "Mean", "P25", "P50", "P75", "SD"];

///
/// DistributionSummary
///
/// Histogram summary of the observations a bag holds at one key. The three
/// quartiles are materialized because they are exactly what the statistics
/// rows consume.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistributionSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

///
/// Bag
///
/// Query contract of the companion multiset/histogram store. The report
/// writer drives dimension enumeration through this trait; production
/// implementations live in the wider pipeline.
///

pub trait Bag {
    /// Occurrence count at a fully concrete key; zero when unobserved.
    fn count(&self, key: &CompositeKey) -> u64;

    /// Histogram summary at a fully concrete key, or None when no data
    /// was observed there.
    fn stats(&self, key: &CompositeKey) -> Option<DistributionSummary>;

    /// Sorted distinct values observed at a key position.
    fn distinct_values(&self, position: usize) -> Vec<Value>;
}

///
/// ValueColumn
///
/// Which figure fills the third trailing column of a statistics row. The
/// header always names the slot `Count`; sum-of-observations reports reuse
/// it.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumn {
    #[default]
    Count,
    Sum,
}

///
/// ReportOptions
///
/// Report-wide configuration; pipelines deserialize this from their own
/// config files.
///

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Leading column value (e.g. a dataset label) prefixed to every row.
    pub label: Option<String>,

    /// Decimal places shared by every numeric statistic in a report.
    pub decimals: usize,

    /// Which figure fills the count-or-sum statistics column.
    pub value_column: ValueColumn,

    /// Upper bound on enumerated combinations; None disables the guard.
    /// Wildcards over high-cardinality dimensions can otherwise make the
    /// cross-product explode.
    pub max_rows: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            label: None,
            decimals: 2,
            value_column: ValueColumn::Count,
            max_rows: None,
        }
    }
}

///
/// CrossTab
///
/// Writes one line per combination of a filter key's dimensions: wildcard
/// positions range over the bag's distinct sets, fixed positions stay
/// fixed, and the cross-product is walked with the leftmost position
/// varying slowest.
///
/// Rows are comma-joined with no escaping of embedded commas; downstream
/// consumers of the original pipeline depend on that exact framing.
///

#[derive(Debug)]
pub struct CrossTab<W: Write> {
    sink: W,
    options: ReportOptions,
}

impl<W: Write> CrossTab<W> {
    #[must_use]
    pub const fn new(sink: W, options: ReportOptions) -> Self {
        Self { sink, options }
    }

    ///
    /// HEADERS
    ///

    /// Header for a count report: the given columns plus `Count`.
    pub fn write_count_header(&mut self, columns: &[&str]) -> Result<(), ReportError> {
        self.write_header(columns, &["Count"])
    }

    /// Header for a statistics report: the given columns plus the fixed
    /// `Min,Max,Count,Mean,P25,P50,P75,SD` tail.
    pub fn write_stats_header(&mut self, columns: &[&str]) -> Result<(), ReportError> {
        self.write_header(columns, &STATS_COLUMNS)
    }

    fn write_header(&mut self, columns: &[&str], tail: &[&str]) -> Result<(), ReportError> {
        let line = columns.iter().chain(tail.iter()).join(",");
        writeln!(self.sink, "{line}")?;

        Ok(())
    }

    ///
    /// EMISSION
    ///

    /// One count row per combination implied by the filter key.
    ///
    /// Every combination emits a row, explicit zero counts included.
    /// Returns the number of rows written.
    pub fn counts(&mut self, bag: &impl Bag, filter: &CompositeKey) -> Result<usize, ReportError> {
        let candidates = self.candidate_sets(bag, filter)?;

        let mut rows = 0;
        for combo in candidates.into_iter().multi_cartesian_product() {
            let key = CompositeKey::from_values(combo)?;
            let count = bag.count(&key);
            self.write_row(&key, &[count.to_string()])?;
            rows += 1;
        }

        debug!(rows, "count rows written");
        Ok(rows)
    }

    /// One statistics row per combination implied by the filter key.
    ///
    /// Combinations the bag holds no observations for emit an all-empty
    /// statistics tail of the same width as the header. Returns the number
    /// of rows written.
    pub fn stats(&mut self, bag: &impl Bag, filter: &CompositeKey) -> Result<usize, ReportError> {
        let candidates = self.candidate_sets(bag, filter)?;

        let mut rows = 0;
        for combo in candidates.into_iter().multi_cartesian_product() {
            let key = CompositeKey::from_values(combo)?;
            let tail = match bag.stats(&key) {
                Some(summary) if summary.count > 0 => self.stats_tail(&summary),
                _ => vec![String::new(); STATS_COLUMNS.len()],
            };
            self.write_row(&key, &tail)?;
            rows += 1;
        }

        debug!(rows, "statistics rows written");
        Ok(rows)
    }

    /// Flush and release the sink.
    pub fn finish(mut self) -> Result<W, ReportError> {
        self.sink.flush()?;

        Ok(self.sink)
    }

    ///
    /// INTERNALS
    ///

    fn candidate_sets(
        &self,
        bag: &impl Bag,
        filter: &CompositeKey,
    ) -> Result<Vec<Vec<Value>>, ReportError> {
        let arity = filter.arity();
        if !(MIN_KEY_ARITY..=MAX_KEY_ARITY).contains(&arity) {
            return Err(ReportError::UnsupportedArity { arity });
        }

        let mut candidates = Vec::with_capacity(arity);
        for (position, component) in filter.components().iter().enumerate() {
            let set = match component {
                KeyComponent::Wildcard(_) => bag.distinct_values(position),
                KeyComponent::Value(v) => vec![v.clone()],
            };
            candidates.push(set);
        }

        if let Some(limit) = self.options.max_rows {
            let combinations = candidates
                .iter()
                .try_fold(1usize, |acc, set| acc.checked_mul(set.len()))
                .unwrap_or(usize::MAX);
            if combinations > limit {
                warn!(combinations, limit, "refusing oversized cross-product");
                return Err(ReportError::TooManyCombinations {
                    combinations,
                    limit,
                });
            }
        }

        Ok(candidates)
    }

    fn stats_tail(&self, summary: &DistributionSummary) -> Vec<String> {
        #[expect(clippy::cast_precision_loss)]
        let volume = match self.options.value_column {
            ValueColumn::Count => summary.count as f64,
            ValueColumn::Sum => summary.sum,
        };

        vec![
            self.fixed(summary.min),
            self.fixed(summary.max),
            self.fixed(volume),
            self.fixed(summary.mean),
            self.fixed(summary.p25),
            self.fixed(summary.p50),
            self.fixed(summary.p75),
            self.fixed(summary.std_dev),
        ]
    }

    fn fixed(&self, x: f64) -> String {
        format!("{x:.prec$}", prec = self.options.decimals)
    }

    fn write_row(&mut self, key: &CompositeKey, tail: &[String]) -> Result<(), ReportError> {
        let mut line = String::new();
        if let Some(label) = &self.options.label {
            line.push_str(label);
            line.push(',');
        }
        line.push_str(&key.to_string());
        for field in tail {
            line.push(',');
            line.push_str(field);
        }
        writeln!(self.sink, "{line}")?;

        Ok(())
    }
}
