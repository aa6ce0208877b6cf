pub mod parquet;
pub mod tables;

pub use parquet::write_posts_parquet;
pub use tables::{read_csv, read_csv_if_exists, write_csv};

use reality_gap_core::{CoreError, RedditPost};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File layout of one study under its data directory. Every phase reads and
/// writes through these paths.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn official(&self) -> PathBuf {
        self.root.join("df_official.csv")
    }

    pub fn census(&self) -> PathBuf {
        self.root.join("df_census_degree_mismatch.csv")
    }

    pub fn reddit_posts(&self) -> PathBuf {
        self.root.join("df_reddit_sentiment.csv")
    }

    pub fn reddit_parquet(&self) -> PathBuf {
        self.root.join("df_reddit_sentiment.parquet")
    }

    pub fn reddit_checkpoint(&self) -> PathBuf {
        self.root.join("temp_reddit_checkpoint.csv")
    }

    pub fn subscribers(&self) -> PathBuf {
        self.root.join("subreddit_subscribers.csv")
    }

    pub fn merged_features(&self) -> PathBuf {
        self.root.join("df_merged_features.csv")
    }

    pub fn scored_posts(&self) -> PathBuf {
        self.root.join("df_reddit_scored.csv")
    }

    pub fn correlations(&self) -> PathBuf {
        self.root.join("correlations.csv")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.root.join("plots")
    }

    pub fn ensure_dirs(&self) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.plots_dir())?;
        Ok(())
    }

    /// Saves the in-progress harvest so an interrupted run keeps its posts.
    pub fn write_checkpoint(&self, posts: &[RedditPost]) -> Result<(), CoreError> {
        write_csv(&self.reddit_checkpoint(), posts)?;
        info!("Checkpoint saved: {} posts", posts.len());
        Ok(())
    }

    pub fn remove_checkpoint(&self) -> Result<(), CoreError> {
        let path = self.reddit_checkpoint();
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!("Removed checkpoint {}", path.display());
        }
        Ok(())
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reality_gap_core::TermCategory;

    fn sample_post() -> RedditPost {
        RedditPost {
            post_id: "abc".to_string(),
            subreddit: "layoffs".to_string(),
            search_term: "layoff".to_string(),
            term_category: TermCategory::Negative,
            created_utc: NaiveDate::from_ymd_opt(2022, 11, 9)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            title: "Laid off today".to_string(),
            selftext: String::new(),
            score: 12,
            vader_neg: None,
            vader_neu: None,
            vader_pos: None,
            vader_compound: None,
        }
    }

    #[test]
    fn test_paths_layout() {
        let paths = DataPaths::new("/tmp/study");
        assert_eq!(paths.official(), PathBuf::from("/tmp/study/df_official.csv"));
        assert_eq!(
            paths.census(),
            PathBuf::from("/tmp/study/df_census_degree_mismatch.csv")
        );
        assert_eq!(paths.plots_dir(), PathBuf::from("/tmp/study/plots"));
        assert_eq!(DataPaths::default().root(), Path::new("data"));
    }

    #[test]
    fn test_checkpoint_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        paths.ensure_dirs().unwrap();
        assert!(paths.plots_dir().is_dir());

        paths.write_checkpoint(&[sample_post()]).unwrap();
        let restored: Vec<RedditPost> = read_csv(&paths.reddit_checkpoint()).unwrap();
        assert_eq!(restored, vec![sample_post()]);

        paths.remove_checkpoint().unwrap();
        assert!(!paths.reddit_checkpoint().exists());
        // Removing twice is fine
        paths.remove_checkpoint().unwrap();
    }
}
