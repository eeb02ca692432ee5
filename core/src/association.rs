//! The association model interface.
//!
//! A model answers "how likely is value V, given that we observed the values
//! in `context`?". Implementations only provide the per-partner vector
//! (`supporting_probabilities`) and a fallback for empty contexts; the
//! ensembles (mean, median, arbitrary reducer), their bulk variants and
//! arg-max are default methods.
use ahash::AHashMap;

use crate::probability::{mean, median};
use crate::statistics::AssociationStatistics;
use crate::training::Value;

/// Score returned by [`AssociationModel::most_probable`] for an empty candidate list.
pub const NO_CANDIDATE_SCORE: f64 = -1.0;

pub trait AssociationModel<V: Value> {
    /// Statistics of a known value.
    fn statistics(&self, value: &V) -> Option<&AssociationStatistics<V>>;

    /// Sum of all value frequencies the model was built from.
    fn total_value_frequency(&self) -> u64;

    /// Per-partner support for `value`: one entry per distinct context value.
    ///
    /// Unknown `value` or empty `context` give an empty map.
    fn supporting_probabilities(&self, value: &V, context: &[V]) -> AHashMap<V, f64>;

    /// Scalar score of `value` when there is no context to condition on.
    fn empty_context_probability(&self, value: &V) -> f64;

    /// Reduce the supporting probabilities with `reducer`.
    ///
    /// Unknown values score 0; an empty context falls back to
    /// [`empty_context_probability`](Self::empty_context_probability).
    fn ensemble_probability<F>(&self, value: &V, context: &[V], reducer: F) -> f64
    where
        F: Fn(&[f64]) -> f64,
    {
        if self.statistics(value).is_none() {
            return 0.0;
        }
        if context.is_empty() {
            return self.empty_context_probability(value);
        }
        let support: Vec<f64> = self
            .supporting_probabilities(value, context)
            .into_values()
            .collect();
        reducer(&support)
    }

    fn mean_probability(&self, value: &V, context: &[V]) -> f64 {
        self.ensemble_probability(value, context, mean)
    }

    fn median_probability(&self, value: &V, context: &[V]) -> f64 {
        self.ensemble_probability(value, context, median)
    }

    /// [`ensemble_probability`](Self::ensemble_probability) for every value.
    fn ensemble_probabilities<F>(&self, values: &[V], context: &[V], reducer: F) -> AHashMap<V, f64>
    where
        F: Fn(&[f64]) -> f64,
    {
        values
            .iter()
            .map(|v| (v.clone(), self.ensemble_probability(v, context, &reducer)))
            .collect()
    }

    fn mean_probabilities(&self, values: &[V], context: &[V]) -> AHashMap<V, f64> {
        self.ensemble_probabilities(values, context, mean)
    }

    fn median_probabilities(&self, values: &[V], context: &[V]) -> AHashMap<V, f64> {
        self.ensemble_probabilities(values, context, median)
    }

    /// Highest scoring value; ties keep the earliest candidate.
    ///
    /// Returns `(None, NO_CANDIDATE_SCORE)` when `values` is empty.
    fn most_probable<F>(&self, values: &[V], context: &[V], reducer: F) -> (Option<V>, f64)
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut best: (Option<V>, f64) = (None, NO_CANDIDATE_SCORE);
        for value in values {
            let score = self.ensemble_probability(value, context, &reducer);
            if best.0.is_none() || score > best.1 {
                best = (Some(value.clone()), score);
            }
        }
        best
    }
}
