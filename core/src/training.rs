//! Training rows and the generic association training set.
//!
//! A training row is an id plus a list of distinct values observed together.
//! The training set aggregates rows into value frequencies and pairwise
//! co-occurrence counts, which the association models turn into probabilities.
use std::fmt::{Debug, Display};
use std::hash::Hash;

use ahash::{AHashMap, AHashSet};

use crate::error::{GraniteError, GraniteResult};
use crate::Config;

/// Anything that can be counted by the association models.
pub trait Value: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Value for T {}

/// A single training observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingRow<K, V> {
    pub id: K,
    pub values: Vec<V>,
}

impl<K, V> TrainingRow<K, V> {
    pub fn new(id: K, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            id,
            values: values.into_iter().collect(),
        }
    }
}

/// Frequency tables built from a list of training rows. Immutable once built.
///
/// # Example
/// ```
/// use granite_core::training::{AssociationTrainingSet, TrainingRow};
///
/// let rows = vec![
///     TrainingRow::new(1, ["a", "b"]),
///     TrainingRow::new(2, ["b", "c"]),
/// ];
/// let set = AssociationTrainingSet::build(rows).unwrap();
/// assert_eq!(set.total_value_frequency(), 4);
/// assert_eq!(set.value_frequency("b"), 2);
/// assert_eq!(set.co_occurrence("b", "c"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AssociationTrainingSet<K, V: Value> {
    rows: Vec<TrainingRow<K, V>>,
    value_frequency: AHashMap<V, u64>,
    value_to_value_frequency: AHashMap<V, AHashMap<V, u64>>,
    total_value_frequency: u64,
    strict_association: bool,
}

impl<K: Display, V: Value> AssociationTrainingSet<K, V> {
    /// Build with strict association (a value never pairs with itself).
    pub fn build(rows: Vec<TrainingRow<K, V>>) -> GraniteResult<Self> {
        AssociationTrainingSetBuilder::new().rows(rows).build()
    }

    pub fn builder() -> AssociationTrainingSetBuilder<K, V> {
        AssociationTrainingSetBuilder::new()
    }
}

impl<K, V: Value> AssociationTrainingSet<K, V> {
    pub fn rows(&self) -> &[TrainingRow<K, V>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_strict_association(&self) -> bool {
        self.strict_association
    }

    /// Sum of all value occurrences.
    pub fn total_value_frequency(&self) -> u64 {
        self.total_value_frequency
    }

    /// Occurrences of `value` across all rows (0 when unknown).
    pub fn value_frequency<Q>(&self, value: &Q) -> u64
    where
        V: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.value_frequency.get(value).copied().unwrap_or(0)
    }

    /// Number of times `partner` appeared in a row alongside `value`.
    pub fn co_occurrence<Q>(&self, value: &Q, partner: &Q) -> u64
    where
        V: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.value_to_value_frequency
            .get(value)
            .and_then(|partners| partners.get(partner))
            .copied()
            .unwrap_or(0)
    }

    pub fn value_frequencies(&self) -> &AHashMap<V, u64> {
        &self.value_frequency
    }

    pub fn value_to_value_frequencies(&self) -> &AHashMap<V, AHashMap<V, u64>> {
        &self.value_to_value_frequency
    }
}

/// Builder for [`AssociationTrainingSet`].
#[derive(Debug, Clone)]
pub struct AssociationTrainingSetBuilder<K, V> {
    rows: Vec<TrainingRow<K, V>>,
    strict_association: bool,
}

impl<K, V> Default for AssociationTrainingSetBuilder<K, V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            strict_association: true,
        }
    }
}

impl<K: Display, V: Value> AssociationTrainingSetBuilder<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder carrying the association settings of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new().strict_association(config.strict_association)
    }

    pub fn rows(mut self, rows: Vec<TrainingRow<K, V>>) -> Self {
        self.rows = rows;
        self
    }

    /// When false, each occurrence of a value also counts as an association
    /// of the value with itself.
    pub fn strict_association(mut self, strict: bool) -> Self {
        self.strict_association = strict;
        self
    }

    pub fn build(self) -> GraniteResult<AssociationTrainingSet<K, V>> {
        validate_rows(&self.rows)?;

        let mut value_frequency: AHashMap<V, u64> = AHashMap::new();
        let mut value_to_value_frequency: AHashMap<V, AHashMap<V, u64>> = AHashMap::new();
        let mut total_value_frequency = 0u64;

        for row in &self.rows {
            for (outer_index, outer) in row.values.iter().enumerate() {
                *value_frequency.entry(outer.clone()).or_default() += 1;
                total_value_frequency += 1;

                // [a, b, c] gives a -> {b:1, c:1}, b -> {a:1, c:1}, ...
                for (inner_index, inner) in row.values.iter().enumerate() {
                    if inner_index == outer_index && self.strict_association {
                        continue;
                    }
                    *value_to_value_frequency
                        .entry(outer.clone())
                        .or_default()
                        .entry(inner.clone())
                        .or_default() += 1;
                }
            }
        }

        Ok(AssociationTrainingSet {
            rows: self.rows,
            value_frequency,
            value_to_value_frequency,
            total_value_frequency,
            strict_association: self.strict_association,
        })
    }
}

fn validate_rows<K: Display, V: Value>(rows: &[TrainingRow<K, V>]) -> GraniteResult<()> {
    if rows.is_empty() {
        return Err(GraniteError::EmptyTrainingSet);
    }
    for row in rows {
        if row.values.is_empty() {
            return Err(GraniteError::invalid_row(&row.id, "row has no values"));
        }
        let distinct: AHashSet<&V> = row.values.iter().collect();
        if distinct.len() != row.values.len() {
            return Err(GraniteError::invalid_row(
                &row.id,
                "row contains duplicate values",
            ));
        }
    }
    Ok(())
}
