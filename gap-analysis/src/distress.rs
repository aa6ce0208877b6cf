//! Composite distress index over monthly Reddit activity.
//!
//! Three components are standardised with the mean and sample standard
//! deviation of reliable (non-sparse) months only, then applied to every
//! month:
//!
//! `composite = z(normalized volume) - z(avg sentiment) + w * z(unique subreddits)`
//!
//! The composite is rescaled min-max into `[0, 100]`. Raw post counts never
//! enter the index.

use crate::monthly::MonthlyRedditStats;
use crate::stats::{mean, sample_std};
use tracing::{info, warn};

/// Mean and spread used to standardise one component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScaler {
    pub mean: Option<f64>,
    pub std: f64,
}

impl ZScaler {
    /// A missing, zero or undefined spread falls back to 1.
    pub fn fit(values: &[f64]) -> Self {
        let std = sample_std(values).filter(|s| *s > 0.0).unwrap_or(1.0);
        Self {
            mean: mean(values),
            std,
        }
    }

    pub fn score(&self, value: Option<f64>) -> Option<f64> {
        Some((value? - self.mean?) / self.std)
    }
}

pub fn composite(volume_z: Option<f64>, sentiment_z: Option<f64>, diversity_z: Option<f64>, diversity_weight: f64) -> Option<f64> {
    Some(volume_z? - sentiment_z? + diversity_weight * diversity_z?)
}

/// Min-max rescaling into `[0, 100]`; a degenerate range maps every present
/// value to 0.
pub fn min_max_scale(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return values.iter().map(|v| v.map(|_| 0.0)).collect();
    }
    values
        .iter()
        .map(|v| v.map(|v| (v - min) / (max - min) * 100.0))
        .collect()
}

/// Fills the z-score and distress columns of every month in place.
pub fn compute_distress(monthly: &mut [MonthlyRedditStats], diversity_weight: f64) {
    let reliable: Vec<&MonthlyRedditStats> = monthly.iter().filter(|m| !m.is_sparse).collect();

    if reliable.is_empty() {
        warn!("No reliable months, distress index set to 0");
        for month in monthly.iter_mut() {
            month.distress_index_composite = Some(0.0);
            month.distress_index_norm = Some(0.0);
        }
        return;
    }

    let volume = ZScaler::fit(&reliable.iter().filter_map(|m| m.post_volume_normalized).collect::<Vec<_>>());
    let sentiment = ZScaler::fit(&reliable.iter().filter_map(|m| m.avg_sentiment).collect::<Vec<_>>());
    let diversity = ZScaler::fit(&reliable.iter().map(|m| m.unique_subreddits as f64).collect::<Vec<_>>());

    if volume.mean.is_none() {
        warn!("Normalized volume unavailable for reliable months, distress index will be empty");
    }

    for month in monthly.iter_mut() {
        month.volume_zscore = volume.score(month.post_volume_normalized);
        month.sentiment_zscore = sentiment.score(month.avg_sentiment);
        month.diversity_zscore = diversity.score(Some(month.unique_subreddits as f64));
        month.distress_index_composite = composite(
            month.volume_zscore,
            month.sentiment_zscore,
            month.diversity_zscore,
            diversity_weight,
        );
    }

    let composites: Vec<Option<f64>> = monthly.iter().map(|m| m.distress_index_composite).collect();
    for (month, norm) in monthly.iter_mut().zip(min_max_scale(&composites)) {
        month.distress_index_norm = norm;
    }

    info!(
        "Distress index computed from {} reliable months (normalized volume, inverted sentiment, diversity)",
        reliable_count(monthly)
    );
}

fn reliable_count(monthly: &[MonthlyRedditStats]) -> usize {
    monthly.iter().filter(|m| !m.is_sparse).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::monthly_stats;

    #[test]
    fn test_distress_index_components() {
        let volumes = [10.0, 20.0, 30.0, 40.0, 50.0];
        let sentiments = [0.5, 0.2, -0.1, -0.3, -0.5];
        let diversity = [1, 2, 2, 3, 4];
        let mut monthly: Vec<MonthlyRedditStats> = (0..5)
            .map(|i| monthly_stats(i, 20, Some(volumes[i]), Some(sentiments[i]), diversity[i]))
            .collect();

        compute_distress(&mut monthly, 0.5);

        let max_idx = monthly
            .iter()
            .enumerate()
            .max_by(|a, b| {
                a.1.distress_index_composite
                    .partial_cmp(&b.1.distress_index_composite)
                    .unwrap()
            })
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_idx, 4);
        assert_eq!(monthly[4].distress_index_norm, Some(100.0));
        assert_eq!(monthly[0].distress_index_norm, Some(0.0));

        // Volume z-scores are centred on the reliable mean
        let z_sum: f64 = monthly.iter().filter_map(|m| m.volume_zscore).sum();
        assert!(z_sum.abs() < 1e-9);
    }

    #[test]
    fn test_sparse_months_do_not_shape_the_scale() {
        let mut monthly = vec![
            monthly_stats(0, 20, Some(10.0), Some(0.1), 2),
            monthly_stats(1, 20, Some(20.0), Some(-0.1), 3),
            // Sparse outlier: scored but excluded from mean/std
            monthly_stats(2, 3, Some(500.0), Some(-0.9), 1),
        ];
        compute_distress(&mut monthly, 0.5);

        let volume_std = (50.0f64).sqrt();
        let expected = (500.0 - 15.0) / volume_std;
        assert!((monthly[2].volume_zscore.unwrap() - expected).abs() < 1e-9);
        assert!(monthly[2].distress_index_norm.is_some());
    }

    #[test]
    fn test_distress_index_normalization() {
        let raw = [Some(-2.5), Some(-1.0), Some(0.5), Some(2.0), Some(3.5)];
        let norm = min_max_scale(&raw);
        assert_eq!(norm[0], Some(0.0));
        assert_eq!(norm[4], Some(100.0));
        assert!(norm.iter().flatten().all(|v| (0.0..=100.0).contains(v)));

        assert_eq!(min_max_scale(&[Some(1.0), Some(1.0)]), vec![Some(0.0), Some(0.0)]);
        assert_eq!(min_max_scale(&[Some(1.0), None, Some(3.0)]), vec![Some(0.0), None, Some(100.0)]);
    }

    #[test]
    fn test_missing_normalized_volume_never_uses_raw_counts() {
        let mut monthly = vec![
            monthly_stats(0, 100, None, Some(0.3), 2),
            monthly_stats(1, 50, None, Some(-0.2), 3),
        ];
        compute_distress(&mut monthly, 0.5);
        assert!(monthly.iter().all(|m| m.volume_zscore.is_none()));
        assert!(monthly.iter().all(|m| m.distress_index_composite.is_none()));
        assert!(monthly.iter().all(|m| m.distress_index_norm.is_none()));
    }

    #[test]
    fn test_no_reliable_months() {
        let mut monthly = vec![monthly_stats(0, 2, Some(1.0), Some(0.0), 1)];
        compute_distress(&mut monthly, 0.5);
        assert_eq!(monthly[0].distress_index_composite, Some(0.0));
        assert_eq!(monthly[0].distress_index_norm, Some(0.0));
    }

    #[test]
    fn test_zscaler_falls_back_to_unit_std() {
        let scaler = ZScaler::fit(&[4.0]);
        assert_eq!(scaler.std, 1.0);
        assert_eq!(scaler.score(Some(6.0)), Some(2.0));

        let constant = ZScaler::fit(&[3.0, 3.0, 3.0]);
        assert_eq!(constant.std, 1.0);
        assert_eq!(ZScaler::fit(&[]).score(Some(1.0)), None);
    }
}
