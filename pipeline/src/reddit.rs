use dataset::{write_csv, write_posts_parquet, DataPaths};
use reality_gap_core::{
    CoreError, ErrorReporter, RedditPost, Secrets, StudyConfig, SubredditSubscribers,
    TermCategory,
};
use reddit_client::{
    harvest, plan_queries, HarvestProgress, HarvestStats, LogProgress, RateLimitStatus,
    RedditClient, RedditCredentials, SearchQuery,
};
use sentiment_engine::{analyzer_for, score_posts};
use tracing::{info, warn};

/// Logs every query and saves the posts collected so far at each checkpoint.
pub struct CheckpointProgress<'a> {
    paths: &'a DataPaths,
    log: LogProgress,
    pub checkpoints: usize,
}

impl<'a> CheckpointProgress<'a> {
    pub fn new(paths: &'a DataPaths) -> Self {
        Self {
            paths,
            log: LogProgress,
            checkpoints: 0,
        }
    }
}

impl HarvestProgress for CheckpointProgress<'_> {
    fn on_query(&mut self, index: usize, total: usize, query: &SearchQuery, added: usize, collected: usize) {
        self.log.on_query(index, total, query, added, collected);
    }

    fn on_checkpoint(&mut self, posts: &[RedditPost]) -> Result<(), CoreError> {
        self.paths.write_checkpoint(posts)?;
        self.checkpoints += 1;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RedditSummary {
    pub posts: usize,
    pub stats: HarvestStats,
    pub subscribers: Vec<SubredditSubscribers>,
    /// Requests sent and 429 responses seen over the whole phase.
    pub pacing: RateLimitStatus,
}

/// Harvests posts for every (year, subreddit, term) query, scores them and
/// records current subscriber counts for normalization.
pub async fn run_reddit(
    config: &StudyConfig,
    secrets: &Secrets,
    paths: &DataPaths,
) -> Result<RedditSummary, CoreError> {
    let settings = &config.reddit;
    let credentials = RedditCredentials::from_secrets(secrets)?;
    let mut client = RedditClient::new(credentials, settings.request_delay(), config.retry.clone())?;
    client.authenticate().await?;
    client.verify().await?;

    let queries = plan_queries(settings, &config.window);
    info!(
        "Planned {} queries over {} subreddits and {} terms",
        queries.len(),
        settings.subreddits.len(),
        settings.terms.len()
    );

    let mut progress = CheckpointProgress::new(paths);
    let (posts, stats) = harvest(&mut client, &queries, settings, &config.window, &mut progress).await?;
    info!(
        "Harvest done: {} kept, {} duplicates, {} outside the window, {} pages",
        stats.kept, stats.duplicates, stats.out_of_window, stats.pages
    );
    if posts.is_empty() {
        warn!("No posts collected for the study window");
    }

    let analyzer = analyzer_for(&config.analysis)?;
    let posts = score_posts(&analyzer, posts, config.analysis.sentiment_text_cap);
    log_categories(&posts);

    write_csv(&paths.reddit_posts(), &posts)?;
    write_posts_parquet(&paths.reddit_parquet(), &posts)?;

    let subscribers = fetch_subscribers(&mut client, &settings.subreddits).await;
    write_csv(&paths.subscribers(), &subscribers)?;

    paths.remove_checkpoint()?;

    let pacing = client.api().rate_limit_status().await;
    info!(
        "Sent {} Reddit requests at {:?} spacing, {} rate limited",
        pacing.requests, pacing.min_interval, pacing.throttled
    );
    Ok(RedditSummary {
        posts: posts.len(),
        stats,
        subscribers,
        pacing,
    })
}

/// Current subscriber counts. A subreddit whose count cannot be read is left
/// out, which leaves its normalized volume empty.
async fn fetch_subscribers(client: &mut RedditClient, subreddits: &[String]) -> Vec<SubredditSubscribers> {
    let reporter = ErrorReporter::new();
    let mut rows = Vec::with_capacity(subreddits.len());
    for subreddit in subreddits {
        match client.subscriber_count(subreddit).await {
            Ok(Some(count)) => {
                info!("r/{}: {} subscribers", subreddit, count);
                rows.push(SubredditSubscribers {
                    subreddit: subreddit.clone(),
                    subscribers_current: count,
                });
            }
            Ok(None) => warn!("r/{}: subscriber count not reported", subreddit),
            Err(e) => {
                warn!("r/{}: subscriber lookup failed", subreddit);
                reporter.report_warning(&e);
            }
        }
    }
    rows
}

fn log_categories(posts: &[RedditPost]) {
    for category in [TermCategory::Negative, TermCategory::Positive] {
        let count = posts.iter().filter(|p| p.term_category == category).count();
        info!("{} term posts: {}", category, count);
    }
}
