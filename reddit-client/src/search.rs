//! Year-partitioned search plan and the harvest loop.
//!
//! Reddit search favours recent posts, so every term is queried once per
//! calendar year with a `timestamp:start..end` clause.

use crate::api::{RedditListing, RedditPostData, SearchParams};
use chrono::NaiveDate;
use reality_gap_core::{
    utc_from_epoch, CoreError, RedditPost, RedditSettings, SearchTerm, StudyWindow,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info};

static URL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").ok());
static WHITESPACE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// One search request of the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub year: i32,
    pub subreddit: String,
    pub term: SearchTerm,
    pub query: String,
}

/// Epoch bounds `[start, end)` for one year, clamped to the study window.
pub fn year_bounds(year: i32, window: &StudyWindow) -> (i64, i64) {
    let window_start = window.start_timestamp().and_utc().timestamp();
    let window_end = window.end_exclusive_timestamp().and_utc().timestamp();

    let year_start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(window_start);
    let next_year = NaiveDate::from_ymd_opt(year + 1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(window_end);

    (year_start.max(window_start), next_year.min(window_end))
}

pub fn timestamp_query(term: &str, start: i64, end: i64) -> String {
    format!("{} timestamp:{}..{}", term, start, end)
}

/// Years x subreddits x terms, in that nesting order.
pub fn plan_queries(settings: &RedditSettings, window: &StudyWindow) -> Vec<SearchQuery> {
    let mut queries =
        Vec::with_capacity(window.years().len() * settings.subreddits.len() * settings.terms.len());
    for year in window.years() {
        let (start, end) = year_bounds(year, window);
        for subreddit in &settings.subreddits {
            for term in &settings.terms {
                queries.push(SearchQuery {
                    year,
                    subreddit: subreddit.clone(),
                    term: term.clone(),
                    query: timestamp_query(&term.text, start, end),
                });
            }
        }
    }
    queries
}

/// Drops URLs and collapses whitespace. Deleted or removed bodies become empty.
pub fn clean_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "[deleted]" || trimmed == "[removed]" {
        return String::new();
    }

    let without_urls = match URL_RE.as_ref() {
        Some(re) => re.replace_all(trimmed, " ").into_owned(),
        None => trimmed.to_string(),
    };
    match WHITESPACE_RE.as_ref() {
        Some(re) => re.replace_all(&without_urls, " ").trim().to_string(),
        None => without_urls.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Source of search result pages. The live implementation is
/// [`crate::RedditClient`].
#[allow(async_fn_in_trait)]
pub trait SearchBackend {
    async fn search_page(
        &mut self,
        subreddit: &str,
        params: &SearchParams<'_>,
    ) -> Result<RedditListing<RedditPostData>, CoreError>;
}

/// Observer of the harvest loop.
pub trait HarvestProgress {
    /// Called after each query with the number of posts it added.
    fn on_query(&mut self, index: usize, total: usize, query: &SearchQuery, added: usize, collected: usize);

    /// Called every `checkpoint_every` queries with everything collected so far.
    fn on_checkpoint(&mut self, posts: &[RedditPost]) -> Result<(), CoreError>;
}

/// Progress reporter that logs through `tracing` and keeps no checkpoint.
pub struct LogProgress;

impl HarvestProgress for LogProgress {
    fn on_query(&mut self, index: usize, total: usize, query: &SearchQuery, added: usize, collected: usize) {
        info!(
            "[{}/{}] {} r/{} '{}' +{} | total {} posts",
            index + 1,
            total,
            query.year,
            query.subreddit,
            query.term.text,
            added,
            collected
        );
    }

    fn on_checkpoint(&mut self, _posts: &[RedditPost]) -> Result<(), CoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestStats {
    pub queries: usize,
    pub pages: usize,
    pub fetched: usize,
    pub duplicates: usize,
    pub out_of_window: usize,
    pub kept: usize,
}

/// Pages through one query until `page_limit` posts, `max_pages` pages, an
/// empty page or a missing `after` cursor.
pub async fn search_all_pages<B: SearchBackend>(
    backend: &mut B,
    subreddit: &str,
    query: &str,
    settings: &RedditSettings,
) -> Result<(Vec<RedditPostData>, usize), CoreError> {
    let limit = settings.page_limit.min(100);
    let mut posts: Vec<RedditPostData> = Vec::new();
    let mut after: Option<String> = None;
    let mut pages = 0;

    for _ in 0..settings.max_pages.max(1) {
        let params = SearchParams {
            query,
            sort: &settings.sort,
            time_filter: &settings.time_filter,
            limit,
            after: after.as_deref(),
        };
        let listing = backend.search_page(subreddit, &params).await?;
        pages += 1;

        if listing.data.children.is_empty() {
            break;
        }
        posts.extend(listing.data.children.into_iter().map(|c| c.data));

        after = listing.data.after;
        if after.is_none() || posts.len() >= settings.page_limit as usize {
            break;
        }
    }

    posts.truncate(settings.page_limit as usize);
    Ok((posts, pages))
}

/// Runs every planned query, deduplicating by post id across the whole run
/// and keeping only posts created inside the study window.
pub async fn harvest<B, P>(
    backend: &mut B,
    queries: &[SearchQuery],
    settings: &RedditSettings,
    window: &StudyWindow,
    progress: &mut P,
) -> Result<(Vec<RedditPost>, HarvestStats), CoreError>
where
    B: SearchBackend,
    P: HarvestProgress,
{
    let mut posts: Vec<RedditPost> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut stats = HarvestStats::default();

    for (index, query) in queries.iter().enumerate() {
        let (raw_posts, pages) =
            search_all_pages(backend, &query.subreddit, &query.query, settings).await?;
        stats.pages += pages;
        stats.fetched += raw_posts.len();

        let mut added = 0;
        for raw in raw_posts {
            if seen_ids.contains(&raw.id) {
                stats.duplicates += 1;
                continue;
            }
            let Some(created) = utc_from_epoch(raw.created_utc).filter(|ts| window.contains(*ts))
            else {
                stats.out_of_window += 1;
                continue;
            };

            seen_ids.insert(raw.id.clone());
            added += 1;
            posts.push(RedditPost {
                post_id: raw.id,
                subreddit: if raw.subreddit.is_empty() {
                    query.subreddit.clone()
                } else {
                    raw.subreddit
                },
                search_term: query.term.text.clone(),
                term_category: query.term.category,
                created_utc: created,
                title: clean_text(&raw.title),
                selftext: clean_text(&raw.selftext),
                score: raw.score,
                vader_neg: None,
                vader_neu: None,
                vader_pos: None,
                vader_compound: None,
            });
        }

        stats.queries += 1;
        progress.on_query(index, queries.len(), query, added, posts.len());

        if stats.queries % settings.checkpoint_every.max(1) == 0 && !posts.is_empty() {
            debug!("Checkpointing {} posts after {} queries", posts.len(), stats.queries);
            progress.on_checkpoint(&posts)?;
        }
    }

    posts.sort_by(|a, b| a.created_utc.cmp(&b.created_utc));
    stats.kept = posts.len();
    Ok((posts, stats))
}
