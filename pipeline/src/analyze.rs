use dataset::{read_csv, read_csv_if_exists, write_csv, DataPaths};
use gap_analysis::correlation::log_findings;
use gap_analysis::{
    aggregate_monthly, audit_posts, compute_distress, correlation_matrix,
    engineer_official_features, merge_features, subscriber_map,
};
use reality_gap_core::{
    CensusRow, CoreError, DataError, EconomicRecord, ErrorReporter, RedditPost, StudyConfig,
    SubredditSubscribers,
};
use reporting::{render_all, ChartData};
use sentiment_engine::{analyzer_for, score_posts};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    pub posts: usize,
    pub months: usize,
    pub reliable_months: usize,
    /// Rows written to the correlations file; zero when there were too few
    /// reliable months.
    pub correlations: usize,
    pub charts: Vec<PathBuf>,
}

/// Joins the collected data into the monthly feature table, ranks the
/// correlations and draws the charts.
pub fn run_analyze(config: &StudyConfig, paths: &DataPaths) -> Result<AnalysisSummary, CoreError> {
    let settings = &config.analysis;

    let records: Vec<EconomicRecord> = read_csv(&paths.official())?;
    if records.is_empty() {
        // Every output is keyed by the official months
        return Err(DataError::EmptyTable {
            table: paths.official().display().to_string(),
        }
        .into());
    }
    let posts: Vec<RedditPost> = read_csv(&paths.reddit_posts())?;
    info!("Loaded {} official months and {} posts", records.len(), posts.len());

    let subscribers: HashMap<String, u64> =
        match read_csv_if_exists::<SubredditSubscribers>(&paths.subscribers())? {
            Some(rows) => subscriber_map(&rows),
            None => {
                warn!("{} not found, volume will not be normalized", paths.subscribers().display());
                HashMap::new()
            }
        };
    let census: Vec<CensusRow> = read_csv_if_exists(&paths.census())?.unwrap_or_else(|| {
        warn!("{} not found, census chart will be skipped", paths.census().display());
        Vec::new()
    });

    let analyzer = analyzer_for(settings)?;
    let posts = score_posts(&analyzer, posts, settings.sentiment_text_cap);
    let (posts, audit) = audit_posts(posts);
    audit.log();

    let official = engineer_official_features(&records, settings.rolling_window);
    let mut monthly = aggregate_monthly(
        &posts,
        &subscribers,
        settings.neutral_band,
        settings.sparse_threshold,
    );
    compute_distress(&mut monthly, settings.diversity_weight);

    let merged = merge_features(&official, &monthly);
    let reliable_months = merged.iter().filter(|r| r.is_reliable()).count();
    info!(
        "Merged table: {} months, {} with at least {} posts",
        merged.len(),
        reliable_months,
        settings.sparse_threshold
    );

    write_csv(&paths.merged_features(), &merged)?;
    write_csv(&paths.scored_posts(), &posts)?;

    let correlations = match correlation_matrix(&merged, settings.min_correlation_rows) {
        Ok(matrix) => {
            log_findings(&matrix);
            let findings = matrix.findings();
            write_csv(&paths.correlations(), &findings)?;
            findings.len()
        }
        Err(e @ DataError::InsufficientData { .. }) => {
            ErrorReporter::new().report_warning(&CoreError::from(e));
            info!("Skipping correlations, no correlations file written");
            0
        }
        Err(e) => return Err(e.into()),
    };

    let data = ChartData {
        official: &official,
        merged: &merged,
        monthly: &monthly,
        posts: &posts,
        census: &census,
        min_scatter_rows: settings.min_correlation_rows,
    };
    let charts = render_all(&data, &paths.plots_dir())?;

    Ok(AnalysisSummary {
        posts: posts.len(),
        months: merged.len(),
        reliable_months,
        correlations,
        charts,
    })
}
