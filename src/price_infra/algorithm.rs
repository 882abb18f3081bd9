use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;
use crate::error::{Error, Result};
use crate::types::ids::SourceId;

/// Reduces the per-source prices of one window to a single fair price.
///
/// Implementations must be pure: deterministic for a given input and
/// total over non-empty inputs. An empty input is `Error::InsufficientData`.
#[cfg_attr(test, mockall::automock)]
pub trait FairPriceAlgorithm: Send + Sync {
    fn calculate_price(&self, prices: &BTreeMap<SourceId, f64>) -> Result<f64>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    #[default]
    Mean,
    Median,
    WeightedMean,
}

impl AggregationMethod {
    pub fn build(self, weights: HashMap<SourceId, f64>) -> Arc<dyn FairPriceAlgorithm> {
        match self {
            AggregationMethod::Mean => Arc::new(MeanAlgorithm),
            AggregationMethod::Median => Arc::new(MedianAlgorithm),
            AggregationMethod::WeightedMean => Arc::new(WeightedMeanAlgorithm::new(weights)),
        }
    }
}

/// Arithmetic mean of all sources.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanAlgorithm;

impl FairPriceAlgorithm for MeanAlgorithm {
    fn calculate_price(&self, prices: &BTreeMap<SourceId, f64>) -> Result<f64> {
        if prices.is_empty() {
            return Err(Error::InsufficientData);
        }

        let sum: f64 = prices.values().sum();
        Ok(sum / prices.len() as f64)
    }
}

/// Median; even counts average the two middle values.
#[derive(Clone, Copy, Debug, Default)]
pub struct MedianAlgorithm;

impl FairPriceAlgorithm for MedianAlgorithm {
    fn calculate_price(&self, prices: &BTreeMap<SourceId, f64>) -> Result<f64> {
        if prices.is_empty() {
            return Err(Error::InsufficientData);
        }

        let mut sorted: Vec<f64> = prices.values().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Ok(sorted[mid])
        }
    }
}

/// Mean weighted per source. Sources without a usable weight count as 1.0.
#[derive(Clone, Debug, Default)]
pub struct WeightedMeanAlgorithm {
    weights: HashMap<SourceId, f64>,
}

impl WeightedMeanAlgorithm {
    const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(weights: HashMap<SourceId, f64>) -> Self {
        for (source_id, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                warn!(%source_id, weight, "Ignoring invalid weight, using {}", Self::DEFAULT_WEIGHT);
            }
        }
        WeightedMeanAlgorithm { weights }
    }

    fn get_weight(&self, source_id: &SourceId) -> f64 {
        self.weights
            .get(source_id)
            .copied()
            .filter(|w| w.is_finite() && *w >= 0.0)
            .unwrap_or(Self::DEFAULT_WEIGHT)
    }
}

impl FairPriceAlgorithm for WeightedMeanAlgorithm {
    fn calculate_price(&self, prices: &BTreeMap<SourceId, f64>) -> Result<f64> {
        let (weighted_sum, total_weight) = prices.iter().fold((0.0, 0.0), |(sum, total), (source_id, price)| {
            let weight = self.get_weight(source_id);
            (sum + price * weight, total + weight)
        });

        // Also covers the empty input
        if total_weight <= 0.0 {
            return Err(Error::InsufficientData);
        }

        Ok(weighted_sum / total_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prices(values: &[(&str, f64)]) -> BTreeMap<SourceId, f64> {
        values.iter().map(|(id, p)| (SourceId::from(*id), *p)).collect()
    }

    #[test]
    fn mean_of_sources() {
        let fair = MeanAlgorithm.calculate_price(&prices(&[("a", 1.0), ("b", 2.0), ("c", 6.0)])).unwrap();
        assert_eq!(fair, 3.0);
    }

    #[test]
    fn every_algorithm_rejects_empty_input() {
        let empty = BTreeMap::new();
        assert!(matches!(MeanAlgorithm.calculate_price(&empty), Err(Error::InsufficientData)));
        assert!(matches!(MedianAlgorithm.calculate_price(&empty), Err(Error::InsufficientData)));
        assert!(matches!(
            WeightedMeanAlgorithm::default().calculate_price(&empty),
            Err(Error::InsufficientData)
        ));
    }

    #[test]
    fn median_handles_odd_and_even_counts() {
        assert_eq!(MedianAlgorithm.calculate_price(&prices(&[("a", 9.0), ("b", 1.0), ("c", 2.0)])).unwrap(), 2.0);
        assert_eq!(
            MedianAlgorithm.calculate_price(&prices(&[("a", 4.0), ("b", 1.0), ("c", 2.0), ("d", 100.0)])).unwrap(),
            3.0
        );
    }

    #[test]
    fn weighted_mean_uses_configured_weights() {
        let weights = HashMap::from([(SourceId::from("a"), 3.0), (SourceId::from("b"), 1.0)]);
        let algorithm = WeightedMeanAlgorithm::new(weights);

        let fair = algorithm.calculate_price(&prices(&[("a", 1.0), ("b", 5.0)])).unwrap();
        assert_eq!(fair, 2.0);

        // unknown source weighs 1.0
        let fair = algorithm.calculate_price(&prices(&[("b", 5.0), ("c", 1.0)])).unwrap();
        assert_eq!(fair, 3.0);
    }

    #[test]
    fn weighted_mean_with_zero_total_weight_is_insufficient() {
        let weights = HashMap::from([(SourceId::from("a"), 0.0)]);
        let algorithm = WeightedMeanAlgorithm::new(weights);
        assert!(matches!(
            algorithm.calculate_price(&prices(&[("a", 1.0)])),
            Err(Error::InsufficientData)
        ));
    }

    #[test]
    fn method_builds_matching_algorithm() {
        let input = prices(&[("a", 1.0), ("b", 2.0), ("c", 9.0)]);
        assert_eq!(AggregationMethod::Mean.build(HashMap::new()).calculate_price(&input).unwrap(), 4.0);
        assert_eq!(AggregationMethod::Median.build(HashMap::new()).calculate_price(&input).unwrap(), 2.0);
    }

    proptest! {
        #[test]
        fn prop_mean_matches_arithmetic_mean(values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..32)) {
            let input: BTreeMap<SourceId, f64> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (SourceId::new(format!("s{:02}", i)), *v))
                .collect();

            let expected = input.values().sum::<f64>() / input.len() as f64;
            let fair = MeanAlgorithm.calculate_price(&input).unwrap();

            prop_assert_eq!(fair, expected);
            prop_assert_eq!(MeanAlgorithm.calculate_price(&input).unwrap(), fair);
        }

        #[test]
        fn prop_median_lies_within_range(values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..32)) {
            let input: BTreeMap<SourceId, f64> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (SourceId::new(format!("s{:02}", i)), *v))
                .collect();

            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let fair = MedianAlgorithm.calculate_price(&input).unwrap();

            prop_assert!(fair >= min && fair <= max);
        }
    }
}
