//! Data-quality audit of the harvested posts.

use crate::stats::{mean, median, quantile, sample_std};
use chrono::NaiveDateTime;
use reality_gap_core::{RedditPost, YearMonth};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LengthStats {
    pub min: usize,
    pub median: f64,
    pub max: usize,
    pub mean: f64,
}

impl LengthStats {
    fn from_lengths(lengths: &[usize]) -> Option<Self> {
        let as_f64: Vec<f64> = lengths.iter().map(|l| *l as f64).collect();
        Some(Self {
            min: *lengths.iter().min()?,
            median: median(&as_f64)?,
            max: *lengths.iter().max()?,
            mean: mean(&as_f64)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreStats {
    pub min: i64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: i64,
    pub mean: f64,
    pub std: Option<f64>,
    /// Q3 + 1.5 * IQR
    pub outlier_threshold: f64,
    pub outliers: usize,
}

impl ScoreStats {
    fn from_scores(scores: &[i64]) -> Option<Self> {
        let as_f64: Vec<f64> = scores.iter().map(|s| *s as f64).collect();
        let q1 = quantile(&as_f64, 0.25)?;
        let q3 = quantile(&as_f64, 0.75)?;
        let outlier_threshold = q3 + 1.5 * (q3 - q1);
        Some(Self {
            min: *scores.iter().min()?,
            q1,
            median: median(&as_f64)?,
            q3,
            max: *scores.iter().max()?,
            mean: mean(&as_f64)?,
            std: sample_std(&as_f64),
            outlier_threshold,
            outliers: as_f64.iter().filter(|s| **s > outlier_threshold).count(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub rows: usize,
    pub duplicates_removed: usize,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
    pub posts_per_month: BTreeMap<YearMonth, usize>,
    /// Months between the first and last post without any post.
    pub missing_months: Vec<YearMonth>,
    pub empty_selftext: usize,
    pub body_length: Option<LengthStats>,
    pub title_length: Option<LengthStats>,
    pub score: Option<ScoreStats>,
    /// Descending by count, ties by name.
    pub subreddit_counts: Vec<(String, usize)>,
    pub term_counts: Vec<(String, usize)>,
}

impl AuditReport {
    pub fn empty_selftext_pct(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.empty_selftext as f64 / self.rows as f64 * 100.0
        }
    }

    pub fn log(&self) {
        info!("Rows: {} ({} duplicates removed)", self.rows, self.duplicates_removed);
        if let (Some(earliest), Some(latest)) = (self.earliest, self.latest) {
            info!("Date coverage: {} to {}", earliest, latest);
        }

        let counts: Vec<f64> = self.posts_per_month.values().map(|c| *c as f64).collect();
        if let (Some(min), Some(max), Some(med)) = (
            self.posts_per_month.values().min(),
            self.posts_per_month.values().max(),
            median(&counts),
        ) {
            info!(
                "Months covered: {} | posts per month min={}, max={}, median={:.0}",
                self.posts_per_month.len(),
                min,
                max,
                med
            );
        }
        if self.missing_months.is_empty() {
            info!("No gaps in monthly coverage");
        } else {
            let missing: Vec<String> = self.missing_months.iter().map(|m| m.to_string()).collect();
            warn!("Missing months: {}", missing.join(", "));
        }

        info!(
            "Empty selftext: {} ({:.1}%)",
            self.empty_selftext,
            self.empty_selftext_pct()
        );
        if let Some(body) = &self.body_length {
            info!(
                "Body length (non-empty): min={}, median={:.0}, max={}, mean={:.0}",
                body.min, body.median, body.max, body.mean
            );
        }
        if let Some(title) = &self.title_length {
            info!(
                "Title length: min={}, median={:.0}, max={}",
                title.min, title.median, title.max
            );
        }
        if let Some(score) = &self.score {
            info!(
                "Score: min={}, q1={:.0}, median={:.0}, q3={:.0}, max={}, mean={:.1}, std={:.1}",
                score.min,
                score.q1,
                score.median,
                score.q3,
                score.max,
                score.mean,
                score.std.unwrap_or(f64::NAN)
            );
            info!(
                "Score outliers (>{:.0}): {}",
                score.outlier_threshold, score.outliers
            );
        }

        for (subreddit, count) in &self.subreddit_counts {
            info!("  r/{:<20} {:>6} ({:.1}%)", subreddit, count, self.share(*count));
        }
        for (term, count) in &self.term_counts {
            info!("  '{}' {:>6} ({:.1}%)", term, count, self.share(*count));
        }
    }

    fn share(&self, count: usize) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            count as f64 / self.rows as f64 * 100.0
        }
    }
}

fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Drops duplicate post ids (first occurrence wins) and summarises the rest.
pub fn audit_posts(posts: Vec<RedditPost>) -> (Vec<RedditPost>, AuditReport) {
    let before = posts.len();
    let mut seen = HashSet::with_capacity(before);
    let posts: Vec<RedditPost> = posts
        .into_iter()
        .filter(|p| seen.insert(p.post_id.clone()))
        .collect();
    let duplicates_removed = before - posts.len();
    if duplicates_removed > 0 {
        warn!("Removing {} duplicate posts", duplicates_removed);
    }

    let earliest = posts.iter().map(|p| p.created_utc).min();
    let latest = posts.iter().map(|p| p.created_utc).max();

    let mut posts_per_month: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for post in &posts {
        *posts_per_month.entry(post.month()).or_default() += 1;
    }

    let missing_months = match (earliest, latest) {
        (Some(first), Some(last)) => YearMonth::range_inclusive(
            YearMonth::from_date(first.date()),
            YearMonth::from_date(last.date()),
        )
        .into_iter()
        .filter(|m| !posts_per_month.contains_key(m))
        .collect(),
        _ => Vec::new(),
    };

    let body_lengths: Vec<usize> = posts
        .iter()
        .filter(|p| !p.selftext.is_empty())
        .map(|p| p.text_length())
        .collect();
    let title_lengths: Vec<usize> = posts.iter().map(|p| p.title.chars().count()).collect();
    let scores: Vec<i64> = posts.iter().map(|p| p.score).collect();

    let report = AuditReport {
        rows: posts.len(),
        duplicates_removed,
        earliest,
        latest,
        missing_months,
        empty_selftext: posts.iter().filter(|p| p.selftext.is_empty()).count(),
        body_length: LengthStats::from_lengths(&body_lengths),
        title_length: LengthStats::from_lengths(&title_lengths),
        score: ScoreStats::from_scores(&scores),
        subreddit_counts: ranked_counts(posts.iter().map(|p| p.subreddit.as_str())),
        term_counts: ranked_counts(posts.iter().map(|p| p.search_term.as_str())),
        posts_per_month,
    };
    (posts, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::post;

    #[test]
    fn test_audit_removes_duplicates_and_finds_gaps() {
        let posts = vec![
            post("a", "jobs", "2021-01-05", 10, ""),
            post("a", "jobs", "2021-01-05", 10, ""),
            post("b", "layoffs", "2021-03-10", 2, "body text"),
            post("c", "jobs", "2021-03-11", 4, "more"),
        ];

        let (deduped, report) = audit_posts(posts);
        assert_eq!(deduped.len(), 3);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.missing_months, vec![YearMonth::new(2021, 2).unwrap()]);
        assert_eq!(report.empty_selftext, 1);
        assert_eq!(report.body_length.as_ref().unwrap().max, 9);
        assert_eq!(report.subreddit_counts[0], ("jobs".to_string(), 2));
        assert_eq!(report.posts_per_month.len(), 2);
    }

    #[test]
    fn test_score_outliers() {
        let scores = [1, 2, 3, 4, 5, 6, 7, 8, 100];
        let stats = ScoreStats::from_scores(&scores).unwrap();
        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.q3, 7.0);
        assert_eq!(stats.outlier_threshold, 13.0);
        assert_eq!(stats.outliers, 1);
    }

    #[test]
    fn test_empty_audit() {
        let (posts, report) = audit_posts(Vec::new());
        assert!(posts.is_empty());
        assert_eq!(report.rows, 0);
        assert!(report.score.is_none());
        assert_eq!(report.empty_selftext_pct(), 0.0);
    }
}
