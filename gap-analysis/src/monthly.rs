//! Monthly aggregation of scored posts.

use crate::stats::{mean, median};
use reality_gap_core::{RedditPost, SubredditSubscribers, TermCategory, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

/// Posts per 10 000 subscribers; a community without subscribers has no rate.
pub fn posts_per_10k(posts: u64, subscribers: u64) -> Option<f64> {
    (subscribers > 0).then(|| posts as f64 / subscribers as f64 * 10_000.0)
}

pub fn subscriber_map(rows: &[SubredditSubscribers]) -> HashMap<String, u64> {
    rows.iter()
        .map(|r| (r.subreddit.clone(), r.subscribers_current))
        .collect()
}

/// Reddit activity of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRedditStats {
    pub month: YearMonth,
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

fn compounds(posts: &[&RedditPost]) -> Vec<f64> {
    posts.iter().filter_map(|p| p.vader_compound).collect()
}

fn in_category<'a>(posts: &[&'a RedditPost], category: TermCategory) -> Vec<&'a RedditPost> {
    posts
        .iter()
        .copied()
        .filter(|p| p.term_category == category)
        .collect()
}

fn share(values: &[f64], predicate: impl Fn(f64) -> bool) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().filter(|v| predicate(**v)).count() as f64 / values.len() as f64)
}

fn aggregate_month(
    month: YearMonth,
    posts: &[&RedditPost],
    subscribers: &HashMap<String, u64>,
    neutral_band: f64,
    sparse_threshold: u64,
) -> MonthlyRedditStats {
    let scores: Vec<f64> = posts.iter().map(|p| p.score as f64).collect();
    let sentiments = compounds(posts);
    let text_lengths: Vec<f64> = posts.iter().map(|p| p.text_length() as f64).collect();

    let negative = in_category(posts, TermCategory::Negative);
    let positive = in_category(posts, TermCategory::Positive);

    let mut per_subreddit: BTreeMap<&str, u64> = BTreeMap::new();
    for post in posts {
        *per_subreddit.entry(post.subreddit.as_str()).or_default() += 1;
    }

    let known: Vec<(u64, u64)> = per_subreddit
        .iter()
        .filter_map(|(sub, count)| subscribers.get(*sub).map(|subs| (*count, *subs)))
        .collect();
    let total_subscribers = (!known.is_empty()).then(|| known.iter().map(|(_, s)| s).sum::<u64>());
    let rates: Vec<f64> = known
        .iter()
        .filter_map(|(count, subs)| posts_per_10k(*count, *subs))
        .collect();

    let post_count = posts.len() as u64;
    MonthlyRedditStats {
        month,
        post_count,
        avg_score: mean(&scores),
        median_score: median(&scores),
        total_score: posts.iter().map(|p| p.score).sum(),
        avg_sentiment: mean(&sentiments),
        median_sentiment: median(&sentiments),
        pct_negative: share(&sentiments, |c| c < -neutral_band),
        pct_positive: share(&sentiments, |c| c > neutral_band),
        unique_subreddits: per_subreddit.len() as u64,
        avg_text_length: mean(&text_lengths),
        post_count_negative: negative.len() as u64,
        post_count_positive: positive.len() as u64,
        avg_sentiment_negative: mean(&compounds(&negative)),
        avg_sentiment_positive: mean(&compounds(&positive)),
        total_subscribers,
        avg_posts_per_10k_subs: mean(&rates),
        post_volume_normalized: total_subscribers.and_then(|total| posts_per_10k(post_count, total)),
        is_sparse: post_count < sparse_threshold,
        volume_zscore: None,
        sentiment_zscore: None,
        diversity_zscore: None,
        distress_index_composite: None,
        distress_index_norm: None,
    }
}

/// Groups posts by calendar month, sorted ascending. Only months with at
/// least one post appear.
pub fn aggregate_monthly(
    posts: &[RedditPost],
    subscribers: &HashMap<String, u64>,
    neutral_band: f64,
    sparse_threshold: u64,
) -> Vec<MonthlyRedditStats> {
    if subscribers.is_empty() {
        warn!("No subscriber counts available, normalized volume will be empty");
    }

    let mut by_month: BTreeMap<YearMonth, Vec<&RedditPost>> = BTreeMap::new();
    for post in posts {
        by_month.entry(post.month()).or_default().push(post);
    }

    let monthly: Vec<MonthlyRedditStats> = by_month
        .into_iter()
        .map(|(month, month_posts)| {
            aggregate_month(month, &month_posts, subscribers, neutral_band, sparse_threshold)
        })
        .collect();

    let sparse = monthly.iter().filter(|m| m.is_sparse).count();
    info!(
        "Aggregated {} months ({} reliable, {} sparse with fewer than {} posts)",
        monthly.len(),
        monthly.len() - sparse,
        sparse,
        sparse_threshold
    );
    monthly
}

/// Post counts per subreddit and month, for the activity heatmap.
pub fn subreddit_month_counts(posts: &[RedditPost]) -> BTreeMap<(String, YearMonth), u64> {
    let mut counts = BTreeMap::new();
    for post in posts {
        *counts.entry((post.subreddit.clone(), post.month())).or_default() += 1;
    }
    counts
}

/// Posts per search term, most frequent first.
pub fn term_counts(posts: &[RedditPost]) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for post in posts {
        *counts.entry(post.search_term.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, u64)> = counts.into_iter().map(|(t, c)| (t.to_string(), c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Distinct subreddits, alphabetical.
pub fn subreddits(posts: &[RedditPost]) -> Vec<String> {
    posts
        .iter()
        .map(|p| p.subreddit.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
