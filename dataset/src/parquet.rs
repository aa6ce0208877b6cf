//! Columnar backup of the harvested posts.

use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use reality_gap_core::{timestamp_format, CoreError, DataError, RedditPost};
use std::fs::File;
use std::path::Path;
use tracing::info;

fn posts_frame(posts: &[RedditPost]) -> Result<DataFrame, DataError> {
    let post_ids: Vec<&str> = posts.iter().map(|p| p.post_id.as_str()).collect();
    let subreddits: Vec<&str> = posts.iter().map(|p| p.subreddit.as_str()).collect();
    let terms: Vec<&str> = posts.iter().map(|p| p.search_term.as_str()).collect();
    let categories: Vec<&str> = posts.iter().map(|p| p.term_category.as_str()).collect();
    let created: Vec<String> = posts
        .iter()
        .map(|p| p.created_utc.format(timestamp_format::FORMAT).to_string())
        .collect();
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    let bodies: Vec<&str> = posts.iter().map(|p| p.selftext.as_str()).collect();
    let scores: Vec<i64> = posts.iter().map(|p| p.score).collect();
    let neg: Vec<Option<f64>> = posts.iter().map(|p| p.vader_neg).collect();
    let neu: Vec<Option<f64>> = posts.iter().map(|p| p.vader_neu).collect();
    let pos: Vec<Option<f64>> = posts.iter().map(|p| p.vader_pos).collect();
    let compound: Vec<Option<f64>> = posts.iter().map(|p| p.vader_compound).collect();

    DataFrame::new(vec![
        Column::from(Series::new("post_id".into(), post_ids)),
        Column::from(Series::new("subreddit".into(), subreddits)),
        Column::from(Series::new("search_term".into(), terms)),
        Column::from(Series::new("term_category".into(), categories)),
        Column::from(Series::new("created_utc".into(), created)),
        Column::from(Series::new("title".into(), titles)),
        Column::from(Series::new("selftext".into(), bodies)),
        Column::from(Series::new("score".into(), scores)),
        Column::from(Series::new("vader_neg".into(), neg)),
        Column::from(Series::new("vader_neu".into(), neu)),
        Column::from(Series::new("vader_pos".into(), pos)),
        Column::from(Series::new("vader_compound".into(), compound)),
    ])
    .map_err(|e| DataError::Parquet {
        details: format!("dataframe creation: {e}"),
    })
}

/// Writes the posts table as Parquet with the same columns as the CSV.
pub fn write_posts_parquet(path: &Path, posts: &[RedditPost]) -> Result<(), CoreError> {
    let mut df = posts_frame(posts)?;
    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .map_err(|e| DataError::Parquet {
            details: format!("write parquet: {e}"),
        })?;

    info!("Saved Parquet backup to {}", path.display());
    Ok(())
}
