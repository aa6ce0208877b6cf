pub mod analyzer;
pub mod lexicon;

pub use analyzer::{normalize, tokenize, SentimentAnalyzer};
pub use lexicon::Lexicon;

use reality_gap_core::{AnalysisSettings, RedditPost, SentimentError};
use tracing::{debug, info};

/// Builds the analyzer named by the settings: a custom lexicon file when one
/// is configured, reference VADER otherwise.
pub fn analyzer_for(settings: &AnalysisSettings) -> Result<SentimentAnalyzer, SentimentError> {
    match &settings.lexicon_path {
        Some(path) => SentimentAnalyzer::from_lexicon_file(path),
        None => Ok(SentimentAnalyzer::vader()),
    }
}

/// First `cap` characters of the scored text.
pub fn capped_text(post: &RedditPost, cap: usize) -> String {
    post.full_text().chars().take(cap).collect()
}

/// Scores every post that has not been scored yet. Already scored posts keep
/// their values.
pub fn score_posts(
    analyzer: &SentimentAnalyzer,
    posts: Vec<RedditPost>,
    text_cap: usize,
) -> Vec<RedditPost> {
    let total = posts.len();
    let mut newly_scored = 0;

    let scored: Vec<RedditPost> = posts
        .into_iter()
        .map(|post| {
            if post.is_scored() {
                return post;
            }
            newly_scored += 1;
            let scores = analyzer.polarity_scores(&capped_text(&post, text_cap));
            post.scored(scores)
        })
        .collect();

    info!("Scored {} of {} posts", newly_scored, total);
    if let Some(mean) = mean_compound(&scored) {
        debug!("Mean compound sentiment: {:.4}", mean);
    }
    scored
}

fn mean_compound(posts: &[RedditPost]) -> Option<f64> {
    let values: Vec<f64> = posts.iter().filter_map(|p| p.vader_compound).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reality_gap_core::{PolarityScores, TermCategory};

    fn post(id: &str, title: &str, selftext: &str) -> RedditPost {
        RedditPost {
            post_id: id.to_string(),
            subreddit: "jobs".to_string(),
            search_term: "hired".to_string(),
            term_category: TermCategory::Positive,
            created_utc: NaiveDate::from_ymd_opt(2023, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            title: title.to_string(),
            selftext: selftext.to_string(),
            score: 3,
            vader_neg: None,
            vader_neu: None,
            vader_pos: None,
            vader_compound: None,
        }
    }

    #[test]
    fn test_score_posts_fills_every_column() {
        let analyzer = SentimentAnalyzer::vader();
        let posts = vec![
            post("a", "Finally hired!", "I am so happy and grateful"),
            post("b", "Ghosted again", "This is hopeless and awful"),
        ];

        let scored = score_posts(&analyzer, posts, 5000);
        assert!(scored.iter().all(|p| p.is_scored() && p.vader_neu.is_some()));
        assert!(scored[0].vader_compound.unwrap() > 0.05);
        assert!(scored[1].vader_compound.unwrap() < -0.05);
    }

    #[test]
    fn test_score_posts_keeps_existing_scores() {
        let analyzer = SentimentAnalyzer::vader();
        let existing = post("a", "terrible", "").scored(PolarityScores {
            neg: 0.0,
            neu: 0.0,
            pos: 1.0,
            compound: 0.5,
        });

        let scored = score_posts(&analyzer, vec![existing], 5000);
        assert_eq!(scored[0].vader_compound, Some(0.5));
    }

    #[test]
    fn test_text_cap() {
        let long = post("a", "title", &"x".repeat(10_000));
        assert_eq!(capped_text(&long, 5000).chars().count(), 5000);
        assert_eq!(capped_text(&post("b", "short", "body"), 5000), "short body");
    }

    #[test]
    fn test_analyzer_for_missing_lexicon_file() {
        let settings = AnalysisSettings {
            lexicon_path: Some("/nonexistent/lexicon.txt".into()),
            ..AnalysisSettings::default()
        };
        assert!(matches!(
            analyzer_for(&settings),
            Err(SentimentError::LexiconNotFound { .. })
        ));
        let default = analyzer_for(&AnalysisSettings::default()).unwrap();
        assert!(default.lexicon().is_none());
    }
}
