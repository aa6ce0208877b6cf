//! Feature engineering for the reality gap study: official baseline features,
//! post audit, monthly aggregation, distress index, merge and correlations.

pub mod audit;
pub mod census;
pub mod correlation;
pub mod distress;
pub mod merge;
pub mod monthly;
pub mod official;
pub mod stats;

pub use audit::{audit_posts, AuditReport};
pub use census::{degree_fields, industries, CensusBar};
pub use correlation::{correlation_matrix, CorrelationFinding, CorrelationMatrix, Strength};
pub use distress::compute_distress;
pub use merge::{merge_features, MergedFeatureRow};
pub use monthly::{aggregate_monthly, posts_per_10k, subscriber_map, MonthlyRedditStats};
pub use official::{engineer_official_features, OfficialFeatureRow};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::monthly::MonthlyRedditStats;
    use crate::official::OfficialFeatureRow;
    use chrono::NaiveDate;
    use reality_gap_core::{RedditPost, TermCategory, YearMonth};

    fn month_at(index: usize) -> YearMonth {
        YearMonth::from_ordinal(YearMonth::new(2020, 1).unwrap().ordinal() + index as i32)
    }

    pub fn post(id: &str, subreddit: &str, date: &str, score: i64, selftext: &str) -> RedditPost {
        RedditPost {
            post_id: id.to_string(),
            subreddit: subreddit.to_string(),
            search_term: "layoff".to_string(),
            term_category: TermCategory::Negative,
            created_utc: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            title: "title".to_string(),
            selftext: selftext.to_string(),
            score,
            vader_neg: None,
            vader_neu: None,
            vader_pos: None,
            vader_compound: None,
        }
    }

    pub fn scored_post(
        id: &str,
        subreddit: &str,
        date: &str,
        category: TermCategory,
        compound: f64,
    ) -> RedditPost {
        RedditPost {
            term_category: category,
            vader_compound: Some(compound),
            ..post(id, subreddit, date, 1, "")
        }
    }

    pub fn monthly_stats(
        index: usize,
        post_count: u64,
        volume: Option<f64>,
        sentiment: Option<f64>,
        unique_subreddits: u64,
    ) -> MonthlyRedditStats {
        MonthlyRedditStats {
            month: month_at(index),
            post_count,
            avg_score: Some(1.0),
            median_score: Some(1.0),
            total_score: post_count as i64,
            avg_sentiment: sentiment,
            median_sentiment: sentiment,
            pct_negative: Some(0.5),
            pct_positive: Some(0.25),
            unique_subreddits,
            avg_text_length: Some(100.0),
            post_count_negative: post_count,
            post_count_positive: 0,
            avg_sentiment_negative: sentiment,
            avg_sentiment_positive: None,
            total_subscribers: volume.map(|_| 10_000),
            avg_posts_per_10k_subs: volume,
            post_volume_normalized: volume,
            is_sparse: post_count < 10,
            volume_zscore: None,
            sentiment_zscore: None,
            diversity_zscore: None,
            distress_index_composite: None,
            distress_index_norm: None,
        }
    }

    /// Official row whose series all move with `unrate`; CIVPART and the
    /// premiums stay constant.
    pub fn official_row(index: usize, unrate: f64) -> OfficialFeatureRow {
        OfficialFeatureRow {
            month: month_at(index),
            unrate: Some(unrate),
            u6rate: Some(unrate * 2.0),
            civpart: Some(62.0),
            youth_unemployment: Some(unrate + 5.0),
            degree_unemployment: Some(unrate + 1.0),
            u6_u3_spread: Some(unrate),
            youth_premium: Some(5.0),
            degree_premium: Some(1.0),
            unrate_mom: None,
            civpart_mom: None,
            unrate_3ma: Some(unrate),
            u6rate_3ma: Some(unrate * 2.0),
            youth_unemployment_3ma: Some(unrate + 5.0),
            degree_unemployment_3ma: Some(unrate + 1.0),
            civpart_3ma: Some(62.0),
            unrate_yoy: None,
        }
    }
}
