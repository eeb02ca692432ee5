//! Frequency association model.
//!
//! Support for V given an observed partner A is `P(V)·P(A) / assocProb(V | A)`,
//! i.e. the joint frequency estimate scaled by how often A is seen with V.
use ahash::AHashMap;

use crate::association::AssociationModel;
use crate::error::GraniteResult;
use crate::statistics::{compute_statistics, AssociationStatistics};
use crate::training::{AssociationTrainingSet, AssociationTrainingSetBuilder, TrainingRow, Value};
use crate::Config;

/// Priors and partner probabilities for every value of a training set.
///
/// # Example
/// ```
/// use granite_core::{AssociationModel, FrequencyModel, TrainingRow};
///
/// let model = FrequencyModel::train(vec![
///     TrainingRow::new(1, ["a", "b"]),
///     TrainingRow::new(2, ["a", "c"]),
/// ]).unwrap();
/// assert!((model.mean_probability(&"a", &[]) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyModel<V: Value> {
    statistics: AHashMap<V, AssociationStatistics<V>>,
    total_value_frequency: u64,
}

impl<V: Value> FrequencyModel<V> {
    pub fn build<K>(training_set: &AssociationTrainingSet<K, V>) -> Self {
        Self {
            statistics: compute_statistics(training_set),
            total_value_frequency: training_set.total_value_frequency(),
        }
    }

    /// Validate rows, build the training set with strict association and
    /// derive the model.
    pub fn train<K: std::fmt::Display>(rows: Vec<TrainingRow<K, V>>) -> GraniteResult<Self> {
        Ok(Self::build(&AssociationTrainingSet::build(rows)?))
    }

    /// As [`Self::train`], with the association settings of `config`.
    pub fn train_with_config<K: std::fmt::Display>(
        rows: Vec<TrainingRow<K, V>>,
        config: &Config,
    ) -> GraniteResult<Self> {
        let training_set = AssociationTrainingSetBuilder::from_config(config)
            .rows(rows)
            .build()?;
        Ok(Self::build(&training_set))
    }

    pub fn association_statistics(&self) -> &AHashMap<V, AssociationStatistics<V>> {
        &self.statistics
    }
}

impl<V: Value> AssociationModel<V> for FrequencyModel<V> {
    fn statistics(&self, value: &V) -> Option<&AssociationStatistics<V>> {
        self.statistics.get(value)
    }

    fn total_value_frequency(&self) -> u64 {
        self.total_value_frequency
    }

    fn supporting_probabilities(&self, value: &V, context: &[V]) -> AHashMap<V, f64> {
        let Some(value_stats) = self.statistics.get(value) else {
            return AHashMap::new();
        };
        context
            .iter()
            .map(|associated| {
                let support = self
                    .statistics
                    .get(associated)
                    .and_then(|a| {
                        a.association_probability(value)
                            .map(|p| value_stats.probability * a.probability / p)
                    })
                    .unwrap_or(0.0);
                (associated.clone(), support)
            })
            .collect()
    }

    /// The prior `P(V)`.
    fn empty_context_probability(&self, value: &V) -> f64 {
        self.statistics
            .get(value)
            .map(|s| s.probability)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> FrequencyModel<&'static str> {
        FrequencyModel::train(vec![
            TrainingRow::new(100, ["a", "b", "c", "d"]),
            TrainingRow::new(200, ["a", "e", "f", "d"]),
            TrainingRow::new(300, ["g", "b", "c", "e"]),
            TrainingRow::new(400, ["f", "h", "i", "b"]),
        ])
        .unwrap()
    }

    const B: f64 = 3.0 / 16.0;
    const A: f64 = 2.0 / 16.0;
    const C: f64 = 2.0 / 16.0;
    const G: f64 = 1.0 / 16.0;

    #[test]
    fn mean_probability_of_c() {
        let model = model();
        let expected = ((C * B) / (2.0 / 9.0) + (C * A) / (1.0 / 6.0)) / 2.0;
        assert!((model.mean_probability(&"c", &["b", "a"]) - expected).abs() < 1e-9);
    }

    #[test]
    fn missing_association_counts_as_zero() {
        let model = model();
        let support = model.supporting_probabilities(&"g", &["b", "a"]);
        assert_eq!(support.len(), 2);
        assert_eq!(support[&"a"], 0.0);
        let expected = (G * B) / (1.0 / 9.0) / 2.0;
        assert!((model.mean_probability(&"g", &["b", "a"]) - expected).abs() < 1e-9);
    }

    #[test]
    fn unknown_values() {
        let model = model();
        assert!(model.supporting_probabilities(&"zz", &["a"]).is_empty());
        assert_eq!(model.mean_probability(&"zz", &["a"]), 0.0);
        assert_eq!(model.mean_probability(&"zz", &[]), 0.0);
        let support = model.supporting_probabilities(&"a", &["zz"]);
        assert_eq!(support[&"zz"], 0.0);
    }

    #[test]
    fn empty_context_uses_prior() {
        let model = model();
        assert!(model.supporting_probabilities(&"b", &[]).is_empty());
        assert!((model.mean_probability(&"b", &[]) - B).abs() < 1e-12);
    }

    #[test]
    fn most_probable_and_bulk() {
        let model = model();
        let (best, score) = model.most_probable(&["g", "c", "zz"], &["b", "a"], crate::probability::mean);
        assert_eq!(best, Some("c"));
        assert!((score - model.mean_probability(&"c", &["b", "a"])).abs() < 1e-12);

        let (none, score) = model.most_probable(&[], &["b"], crate::probability::mean);
        assert_eq!(none, None);
        assert_eq!(score, -1.0);

        let bulk = model.mean_probabilities(&["c", "g"], &["b", "a"]);
        assert_eq!(bulk.len(), 2);
        assert!((bulk[&"g"] - model.mean_probability(&"g", &["b", "a"])).abs() < 1e-12);
    }

    #[test]
    fn median_of_two_is_their_mean() {
        let model = model();
        let c = model.mean_probability(&"c", &["b", "a"]);
        assert!((model.median_probability(&"c", &["b", "a"]) - c).abs() < 1e-12);
        assert_eq!(model.total_value_frequency(), 16);
    }
}
