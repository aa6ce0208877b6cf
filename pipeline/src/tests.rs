use super::*;
use chrono::NaiveDate;
use dataset::read_csv;
use reality_gap_core::{DataError, RedditPost, SearchTerm, TermCategory};
use reddit_client::{HarvestProgress, SearchQuery};

fn post(id: &str) -> RedditPost {
    RedditPost {
        post_id: id.to_string(),
        subreddit: "jobs".to_string(),
        search_term: "layoff".to_string(),
        term_category: TermCategory::Negative,
        created_utc: NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
        title: "Laid off".to_string(),
        selftext: String::new(),
        score: 3,
        vader_neg: None,
        vader_neu: None,
        vader_pos: None,
        vader_compound: None,
    }
}

#[test]
fn test_phase_names_and_order() {
    let names: Vec<&str> = Phase::ALL.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["official", "census", "reddit", "analyze"]);
    assert_eq!(Phase::Reddit.to_string(), "reddit");
    assert!(Phase::Official.needs_network());
    assert!(!Phase::Analyze.needs_network());
}

#[test]
fn test_checkpoint_progress_saves_posts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    let mut progress = CheckpointProgress::new(&paths);

    let query = SearchQuery {
        year: 2024,
        subreddit: "jobs".to_string(),
        term: SearchTerm::new("layoff", TermCategory::Negative),
        query: "layoff".to_string(),
    };
    progress.on_query(0, 2, &query, 2, 2);
    progress
        .on_checkpoint(&[post("a"), post("b")])
        .unwrap();
    assert_eq!(progress.checkpoints, 1);

    let saved: Vec<RedditPost> = read_csv(&paths.reddit_checkpoint()).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].post_id, "b");

    paths.remove_checkpoint().unwrap();
    assert!(!paths.reddit_checkpoint().exists());
}

#[tokio::test]
async fn test_analyze_phase_fails_without_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = StudyConfig::default().with_data_dir(dir.path());
    let pipeline = Pipeline::new(config, Secrets::default());

    let result = pipeline.run(Phase::Analyze).await;
    assert!(matches!(
        result,
        Err(CoreError::Data(DataError::FileNotFound { .. }))
    ));
    // The layout is created even when the phase fails
    assert!(pipeline.paths().plots_dir().is_dir());
}

#[tokio::test]
async fn test_official_phase_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = StudyConfig::default().with_data_dir(dir.path());
    let pipeline = Pipeline::new(config, Secrets::default());

    let result = pipeline.run(Phase::Official).await;
    assert!(matches!(result, Err(CoreError::Config(_))));
    assert!(!pipeline.paths().official().exists());
}
