
use crate::{error::KeyError, key::CompositeKey, value::Value};
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeSet, HashMap},
    iter::Sum,
};
use tracing::trace;

///
/// AggregationMap
///
/// Associates composite keys with an arbitrary payload and answers
/// wildcard-driven queries over the stored tuple space.
///
/// The per-position distinct-value cache sits behind a single staleness
/// flag and is rebuilt lazily on read, so reads mutate internal state; the
/// map is single-threaded by design and deliberately not shareable across
/// threads while writes can interleave.
///

#[derive(Debug)]
pub struct AggregationMap<V> {
    entries: HashMap<CompositeKey, V>,
    arity: usize,
    stale: Cell<bool>,
    distinct: RefCell<HashMap<usize, Vec<Value>>>,
}

impl<V> AggregationMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            arity: 0,
            stale: Cell::new(false),
            distinct: RefCell::new(HashMap::new()),
        }
    }

    ///
    /// MUTATION
    ///

    /// Insert or overwrite one entry, returning the previous payload.
    ///
    /// Records the key's arity as the map's current arity and invalidates
    /// the distinct-value cache. Mixing arities across inserts is a caller
    /// contract, not enforced: lookups against a different arity simply
    /// miss.
    pub fn insert(&mut self, key: CompositeKey, value: V) -> Option<V> {
        self.arity = key.arity();
        self.stale.set(true);

        self.entries.insert(key, value)
    }

    ///
    /// LOOKUP
    ///

    /// Exact lookup; no wildcard resolution.
    #[must_use]
    pub fn get(&self, key: &CompositeKey) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arity of the most recently inserted key.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompositeKey, &V)> {
        self.entries.iter()
    }

    ///
    /// DISTINCT VALUES
    ///

    /// Sorted distinct values observed at `position` across all stored
    /// keys; positions past a key's arity contribute nothing.
    ///
    /// An insert marks the whole cache stale; the next read drops every
    /// cached position and recomputes the one requested.
    #[must_use]
    pub fn distinct_values(&self, position: usize) -> Vec<Value> {
        if self.stale.replace(false) {
            self.distinct.borrow_mut().clear();
        }

        if let Some(cached) = self.distinct.borrow().get(&position) {
            return cached.clone();
        }

        let set: BTreeSet<&Value> = self
            .entries
            .keys()
            .filter_map(|k| k.value_at(position))
            .collect();
        let sorted: Vec<Value> = set.into_iter().cloned().collect();
        trace!(position, distinct = sorted.len(), "rebuilt distinct-value cache");

        self.distinct
            .borrow_mut()
            .insert(position, sorted.clone());

        sorted
    }

    ///
    /// RESOLUTION
    ///

    /// Every payload matching `pattern`, resolving wildcards recursively.
    ///
    /// Wildcard positions are expanded left to right: each one ranges over
    /// the sorted distinct set at that position, and every substitution
    /// recurses on a fresh key, so enumeration order is the nested sorted
    /// order. Leaf misses contribute nothing; sparse combinations are
    /// expected and common.
    pub fn values(&self, pattern: &CompositeKey) -> Result<Vec<&V>, KeyError> {
        let mut out = Vec::new();
        self.resolve(pattern.clone(), &mut out)?;

        Ok(out)
    }

    /// Sum of every payload matching `pattern`; absent leaves contribute
    /// zero.
    pub fn sum(&self, pattern: &CompositeKey) -> Result<V, KeyError>
    where
        V: Copy + Sum<V>,
    {
        Ok(self.values(pattern)?.into_iter().copied().sum())
    }

    fn resolve<'a>(
        &'a self,
        pattern: CompositeKey,
        out: &mut Vec<&'a V>,
    ) -> Result<(), KeyError> {
        let Some(position) = pattern.first_wildcard() else {
            if let Some(payload) = self.entries.get(&pattern) {
                out.push(payload);
            }
            return Ok(());
        };

        for candidate in self.distinct_values(position) {
            let next = pattern.with_component(position, candidate)?;
            self.resolve(next, out)?;
        }

        Ok(())
    }

    ///
    /// PARTITIONING
    ///

    /// Sub-map of the entries carrying `value` at `position`.
    #[must_use]
    pub fn filtered(&self, position: usize, value: &Value) -> Self
    where
        V: Clone,
    {
        let mut sub = Self::new();
        for (key, payload) in &self.entries {
            if key.value_at(position) == Some(value) {
                sub.insert(key.clone(), payload.clone());
            }
        }

        sub
    }
}

impl<V> Default for AggregationMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
