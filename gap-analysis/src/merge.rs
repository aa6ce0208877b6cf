//! Left join of the official baseline with the monthly Reddit statistics.

use crate::monthly::MonthlyRedditStats;
use crate::official::OfficialFeatureRow;
use reality_gap_core::YearMonth;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// One row of `df_merged_features.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedFeatureRow {
    pub month: YearMonth,
    #[serde(rename = "UNRATE")]
    pub unrate: Option<f64>,
    #[serde(rename = "U6RATE")]
    pub u6rate: Option<f64>,
    #[serde(rename = "CIVPART")]
    pub civpart: Option<f64>,
    #[serde(rename = "LNS14000036")]
    pub youth_unemployment: Option<f64>,
    #[serde(rename = "CGBD2024")]
    pub degree_unemployment: Option<f64>,
    #[serde(rename = "U6_U3_SPREAD")]
    pub u6_u3_spread: Option<f64>,
    #[serde(rename = "YOUTH_PREMIUM")]
    pub youth_premium: Option<f64>,
    #[serde(rename = "DEGREE_PREMIUM")]
    pub degree_premium: Option<f64>,
    #[serde(rename = "UNRATE_MOM")]
    pub unrate_mom: Option<f64>,
    #[serde(rename = "CIVPART_MOM")]
    pub civpart_mom: Option<f64>,
    #[serde(rename = "UNRATE_3MA")]
    pub unrate_3ma: Option<f64>,
    #[serde(rename = "U6RATE_3MA")]
    pub u6rate_3ma: Option<f64>,
    #[serde(rename = "LNS14000036_3MA")]
    pub youth_unemployment_3ma: Option<f64>,
    #[serde(rename = "CGBD2024_3MA")]
    pub degree_unemployment_3ma: Option<f64>,
    #[serde(rename = "CIVPART_3MA")]
    pub civpart_3ma: Option<f64>,
    #[serde(rename = "UNRATE_YOY")]
    pub unrate_yoy: Option<f64>,

    pub post_count: u64,
    pub avg_score: Option<f64>,
    pub median_score: Option<f64>,
    pub total_score: i64,
    pub avg_sentiment: Option<f64>,
    pub median_sentiment: Option<f64>,
    pub pct_negative: Option<f64>,
    pub pct_positive: Option<f64>,
    pub unique_subreddits: u64,
    pub avg_text_length: Option<f64>,
    pub post_count_negative: u64,
    pub post_count_positive: u64,
    pub avg_sentiment_negative: Option<f64>,
    pub avg_sentiment_positive: Option<f64>,
    pub total_subscribers: Option<u64>,
    pub avg_posts_per_10k_subs: Option<f64>,
    pub post_volume_normalized: Option<f64>,
    pub is_sparse: bool,
    pub volume_zscore: Option<f64>,
    pub sentiment_zscore: Option<f64>,
    pub diversity_zscore: Option<f64>,
    pub distress_index_composite: Option<f64>,
    pub distress_index_norm: Option<f64>,
}

impl MergedFeatureRow {
    /// Official columns only; the month had no Reddit posts.
    fn without_reddit(official: &OfficialFeatureRow) -> Self {
        Self {
            month: official.month,
            unrate: official.unrate,
            u6rate: official.u6rate,
            civpart: official.civpart,
            youth_unemployment: official.youth_unemployment,
            degree_unemployment: official.degree_unemployment,
            u6_u3_spread: official.u6_u3_spread,
            youth_premium: official.youth_premium,
            degree_premium: official.degree_premium,
            unrate_mom: official.unrate_mom,
            civpart_mom: official.civpart_mom,
            unrate_3ma: official.unrate_3ma,
            u6rate_3ma: official.u6rate_3ma,
            youth_unemployment_3ma: official.youth_unemployment_3ma,
            degree_unemployment_3ma: official.degree_unemployment_3ma,
            civpart_3ma: official.civpart_3ma,
            unrate_yoy: official.unrate_yoy,
            post_count: 0,
            avg_score: None,
            median_score: None,
            total_score: 0,
            avg_sentiment: None,
            median_sentiment: None,
            pct_negative: None,
            pct_positive: None,
            unique_subreddits: 0,
            avg_text_length: None,
            post_count_negative: 0,
            post_count_positive: 0,
            avg_sentiment_negative: None,
            avg_sentiment_positive: None,
            total_subscribers: None,
            avg_posts_per_10k_subs: None,
            post_volume_normalized: None,
            is_sparse: true,
            volume_zscore: None,
            sentiment_zscore: None,
            diversity_zscore: None,
            distress_index_composite: None,
            distress_index_norm: None,
        }
    }

    fn with_reddit(official: &OfficialFeatureRow, reddit: &MonthlyRedditStats) -> Self {
        Self {
            post_count: reddit.post_count,
            avg_score: reddit.avg_score,
            median_score: reddit.median_score,
            total_score: reddit.total_score,
            avg_sentiment: reddit.avg_sentiment,
            median_sentiment: reddit.median_sentiment,
            pct_negative: reddit.pct_negative,
            pct_positive: reddit.pct_positive,
            unique_subreddits: reddit.unique_subreddits,
            avg_text_length: reddit.avg_text_length,
            post_count_negative: reddit.post_count_negative,
            post_count_positive: reddit.post_count_positive,
            avg_sentiment_negative: reddit.avg_sentiment_negative,
            avg_sentiment_positive: reddit.avg_sentiment_positive,
            total_subscribers: reddit.total_subscribers,
            avg_posts_per_10k_subs: reddit.avg_posts_per_10k_subs,
            post_volume_normalized: reddit.post_volume_normalized,
            is_sparse: reddit.is_sparse,
            volume_zscore: reddit.volume_zscore,
            sentiment_zscore: reddit.sentiment_zscore,
            diversity_zscore: reddit.diversity_zscore,
            distress_index_composite: reddit.distress_index_composite,
            distress_index_norm: reddit.distress_index_norm,
            ..Self::without_reddit(official)
        }
    }

    pub fn is_reliable(&self) -> bool {
        !self.is_sparse
    }
}

/// Keeps every official month, attaching Reddit statistics where present.
/// Reddit months outside the official range are dropped.
pub fn merge_features(
    official: &[OfficialFeatureRow],
    monthly: &[MonthlyRedditStats],
) -> Vec<MergedFeatureRow> {
    let by_month: HashMap<YearMonth, &MonthlyRedditStats> =
        monthly.iter().map(|m| (m.month, m)).collect();

    let merged: Vec<MergedFeatureRow> = official
        .iter()
        .map(|row| match by_month.get(&row.month) {
            Some(reddit) => MergedFeatureRow::with_reddit(row, reddit),
            None => MergedFeatureRow::without_reddit(row),
        })
        .collect();

    let reliable = merged.iter().filter(|r| r.is_reliable()).count();
    info!(
        "Merged dataset: {} months ({} reliable, {} sparse)",
        merged.len(),
        reliable,
        merged.len() - reliable
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{monthly_stats, official_row};

    #[test]
    fn test_left_join_keeps_official_months() {
        let official: Vec<OfficialFeatureRow> = (0..3).map(|i| official_row(i, 4.0 + i as f64)).collect();
        let monthly = vec![
            monthly_stats(1, 25, Some(3.0), Some(-0.2), 3),
            // Outside the official range
            monthly_stats(7, 40, Some(3.0), Some(-0.2), 3),
        ];

        let merged = merge_features(&official, &monthly);
        assert_eq!(merged.len(), 3);

        assert_eq!(merged[0].post_count, 0);
        assert!(merged[0].is_sparse);
        assert_eq!(merged[0].avg_sentiment, None);
        assert_eq!(merged[0].unrate, Some(4.0));

        assert_eq!(merged[1].post_count, 25);
        assert!(merged[1].is_reliable());
        assert_eq!(merged[1].post_volume_normalized, Some(3.0));
        assert_eq!(merged[1].unrate, Some(5.0));
        assert_eq!(merged[1].month, official[1].month);
    }
}
