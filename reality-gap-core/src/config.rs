use crate::error::ConfigError;
use crate::retry::RetryConfig;
use crate::types::{FredSeries, SearchTerm, TermCategory, YearMonth};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "reality-gap.toml";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.json";

/// Study settings. Every section falls back to the defaults used for the
/// published analysis, so an absent config file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub data_dir: PathBuf,
    pub window: StudyWindow,
    pub retry: RetryConfig,
    pub fred: FredSettings,
    pub census: CensusSettings,
    pub reddit: RedditSettings,
    pub analysis: AnalysisSettings,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            window: StudyWindow::default(),
            retry: RetryConfig::default(),
            fred: FredSettings::default(),
            census: CensusSettings::default(),
            reddit: RedditSettings::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

/// Inclusive study window. Dates are written as quoted strings in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for StudyWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl StudyWindow {
    pub fn start_timestamp(&self) -> NaiveDateTime {
        self.start.and_hms_opt(0, 0, 0).unwrap_or_default()
    }

    /// First instant after the window, the exclusive upper bound for posts.
    pub fn end_exclusive_timestamp(&self) -> NaiveDateTime {
        self.end
            .checked_add_days(Days::new(1))
            .unwrap_or(self.end)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start_timestamp() && timestamp < self.end_exclusive_timestamp()
    }

    pub fn years(&self) -> Vec<i32> {
        (self.start.year()..=self.end.year()).collect()
    }

    pub fn first_month(&self) -> YearMonth {
        YearMonth::from_date(self.start)
    }

    pub fn last_month(&self) -> YearMonth {
        YearMonth::from_date(self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FredSettings {
    pub base_url: String,
    pub series: Vec<FredSeries>,
    pub request_delay_ms: u64,
}

impl Default for FredSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.stlouisfed.org/fred".to_string(),
            series: FredSeries::ALL.to_vec(),
            request_delay_ms: 500,
        }
    }
}

impl FredSettings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusSettings {
    pub base_url: String,
    /// Tried in order, most recent first.
    pub years: Vec<i32>,
    pub geography: String,
    pub geography_label: String,
    pub request_delay_ms: u64,
    pub label_delay_ms: u64,
}

impl Default for CensusSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.census.gov/data".to_string(),
            years: vec![2023, 2022],
            geography: "us:*".to_string(),
            geography_label: "United States".to_string(),
            request_delay_ms: 1000,
            label_delay_ms: 500,
        }
    }
}

impl CensusSettings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn label_delay(&self) -> Duration {
        Duration::from_millis(self.label_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub subreddits: Vec<String>,
    pub terms: Vec<SearchTerm>,
    pub sort: String,
    pub time_filter: String,
    pub page_limit: u32,
    pub max_pages: u32,
    pub request_delay_ms: u64,
    pub checkpoint_every: usize,
}

impl Default for RedditSettings {
    fn default() -> Self {
        let negative = [
            "layoff",
            "unemployed",
            "severance",
            "ghosted",
            "hundred applications",
            "hiring freeze",
            "overqualified",
            "entry level experience",
            "no response",
            "job market",
            "recession",
            "cost of living",
        ];
        let positive = ["got a job", "job offer", "hired", "promotion"];

        let terms = negative
            .iter()
            .map(|t| SearchTerm::new(*t, TermCategory::Negative))
            .chain(
                positive
                    .iter()
                    .map(|t| SearchTerm::new(*t, TermCategory::Positive)),
            )
            .collect();

        Self {
            subreddits: ["layoffs", "jobs", "recruitinghell", "csMajors"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            terms,
            sort: "relevance".to_string(),
            time_filter: "all".to_string(),
            page_limit: 100,
            max_pages: 10,
            request_delay_ms: 1000,
            checkpoint_every: 50,
        }
    }
}

impl RedditSettings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn terms_in(&self, category: TermCategory) -> Vec<&SearchTerm> {
        self.terms.iter().filter(|t| t.category == category).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Months with fewer posts are kept for display but left out of statistics.
    pub sparse_threshold: u64,
    pub rolling_window: usize,
    pub diversity_weight: f64,
    pub sentiment_text_cap: usize,
    pub neutral_band: f64,
    pub min_correlation_rows: usize,
    /// Custom lexicon file in the VADER format; reference VADER is used when
    /// unset.
    pub lexicon_path: Option<PathBuf>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sparse_threshold: 10,
            rolling_window: 3,
            diversity_weight: 0.5,
            sentiment_text_cap: 5000,
            neutral_band: 0.05,
            min_correlation_rows: 5,
            lexicon_path: None,
        }
    }
}

impl StudyConfig {
    /// Loads `path`, or the default config file when present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using built-in settings", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidFormat {
            details: format!("{}: {}", path.display(), e),
        })?;
        let config: StudyConfig = toml::from_str(&raw)?;
        info!("Loaded study settings from {}", path.display());
        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.start >= self.window.end {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "study window start {} must precede end {}",
                    self.window.start, self.window.end
                ),
            });
        }
        if self.fred.series.is_empty() {
            return Err(ConfigError::MissingField {
                field: "fred.series".to_string(),
            });
        }
        if self.census.years.is_empty() {
            return Err(ConfigError::MissingField {
                field: "census.years".to_string(),
            });
        }
        if self.reddit.subreddits.is_empty() {
            return Err(ConfigError::MissingField {
                field: "reddit.subreddits".to_string(),
            });
        }
        if self.reddit.terms.is_empty() {
            return Err(ConfigError::MissingField {
                field: "reddit.terms".to_string(),
            });
        }

        // A term may only belong to one category.
        let mut seen = HashSet::new();
        for term in &self.reddit.terms {
            let key = term.text.trim().to_lowercase();
            if key.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "reddit.terms".to_string(),
                    value: "empty search term".to_string(),
                });
            }
            if !seen.insert(key) {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("search term '{}' is listed more than once", term.text),
                });
            }
        }

        if self.reddit.page_limit == 0 || self.reddit.page_limit > 100 {
            return Err(ConfigError::InvalidValue {
                field: "reddit.page_limit".to_string(),
                value: self.reddit.page_limit.to_string(),
            });
        }
        if self.reddit.checkpoint_every == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reddit.checkpoint_every".to_string(),
                value: "0".to_string(),
            });
        }
        if self.analysis.sparse_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.sparse_threshold".to_string(),
                value: "0".to_string(),
            });
        }
        if self.analysis.rolling_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.rolling_window".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// API credentials from `secrets.json`. Environment variables of the same
/// name take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secrets {
    #[serde(rename = "FRED_API_KEY", default)]
    pub fred_api_key: Option<String>,
    #[serde(rename = "CENSUS_API_KEY", default)]
    pub census_api_key: Option<String>,
    #[serde(rename = "REDDIT_CLIENT_ID", default)]
    pub reddit_client_id: Option<String>,
    #[serde(rename = "REDDIT_CLIENT_SECRET", default)]
    pub reddit_client_secret: Option<String>,
    #[serde(rename = "REDDIT_USER_AGENT", default)]
    pub reddit_user_agent: Option<String>,
}

impl Secrets {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut secrets = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidFormat {
                details: format!("{}: {}", path.display(), e),
            })?;
            Self::from_json(&raw)?
        } else {
            debug!("{} not found, reading credentials from the environment", path.display());
            Self::default()
        };
        secrets.apply_overrides(|name| std::env::var(name).ok());
        Ok(secrets)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidFormat {
            details: e.to_string(),
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            ("FRED_API_KEY", &mut self.fred_api_key),
            ("CENSUS_API_KEY", &mut self.census_api_key),
            ("REDDIT_CLIENT_ID", &mut self.reddit_client_id),
            ("REDDIT_CLIENT_SECRET", &mut self.reddit_client_secret),
            ("REDDIT_USER_AGENT", &mut self.reddit_user_agent),
        ];
        for (name, slot) in slots {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
    }

    pub fn fred_api_key(&self) -> Result<&str, ConfigError> {
        required("FRED_API_KEY", &self.fred_api_key)
    }

    pub fn census_api_key(&self) -> Result<&str, ConfigError> {
        required("CENSUS_API_KEY", &self.census_api_key)
    }

    pub fn reddit_client_id(&self) -> Result<&str, ConfigError> {
        required("REDDIT_CLIENT_ID", &self.reddit_client_id)
    }

    pub fn reddit_client_secret(&self) -> Result<&str, ConfigError> {
        required("REDDIT_CLIENT_SECRET", &self.reddit_client_secret)
    }

    pub fn reddit_user_agent(&self) -> Result<&str, ConfigError> {
        required("REDDIT_USER_AGENT", &self.reddit_user_agent)
    }
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            field: field.to_string(),
        })
}
