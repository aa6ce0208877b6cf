use crate::error::*;
use std::time::Duration;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Fred(e) => {
                error!("FRED error details: {:?}", e);
            }
            CoreError::Census(e) => {
                error!("Census error details: {:?}", e);
            }
            CoreError::Data(e) => {
                error!("Data error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::Fred(e) => e.is_retryable(),
            CoreError::Census(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CoreError::Timeout { .. } => true,
            CoreError::RequestFailed { .. } => false,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::RedditApi(e) => e.retry_after(),
            CoreError::Fred(e) => e.retry_after(),
            CoreError::Census(e) => e.retry_after(),
            CoreError::Timeout { seconds } => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Fred(e) => e.user_friendly_message(),
            CoreError::Census(e) => e.user_friendly_message(),
            CoreError::Data(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Sentiment(SentimentError::LexiconNotFound { path }) => {
                format!("Sentiment lexicon '{}' could not be found.", path)
            }
            CoreError::Report(ReportError::NoData { chart }) => {
                format!("Nothing to draw for chart '{}'.", chart)
            }
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "Invalid input provided. Please check your input and try again.".to_string()
            }
            CoreError::Timeout { .. } => {
                "The operation took too long to complete. Please try again.".to_string()
            }
            CoreError::RequestFailed { message, .. } => {
                format!("Request failed: {}", message)
            }
            _ => "An unexpected error occurred. Please rerun the phase.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Fred(_) => "FRED_API".to_string(),
            CoreError::Census(_) => "CENSUS_API".to_string(),
            CoreError::Data(_) => "DATA".to_string(),
            CoreError::Sentiment(_) => "SENTIMENT".to_string(),
            CoreError::Report(_) => "REPORT".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::RequestFailed { .. } => "REQUEST_FAILED".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            RedditApiError::RateLimitExceeded { .. } => true,
            RedditApiError::RequestTimeout => true,
            RedditApiError::ServerError { status_code } => *status_code >= 500,
            RedditApiError::InvalidResponse { .. } => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            RedditApiError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET."
                    .to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The subreddit may be private or quarantined.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please re-authenticate.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for FredError {
    fn log_error(&self) -> &Self {
        error!("FredError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("FredError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            FredError::RateLimitExceeded { .. } => true,
            FredError::ServerError { status_code } => *status_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            FredError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            FredError::InvalidApiKey => {
                "FRED rejected the API key. Please check FRED_API_KEY in secrets.json.".to_string()
            }
            FredError::SeriesNotFound { series_id } => {
                format!("FRED series '{}' does not exist.", series_id)
            }
            FredError::RateLimitExceeded { retry_after } => format!(
                "FRED rate limit reached. Please wait {} seconds.",
                retry_after
            ),
            _ => "FRED API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            FredError::InvalidApiKey => "FRED_INVALID_API_KEY".to_string(),
            FredError::SeriesNotFound { .. } => "FRED_SERIES_NOT_FOUND".to_string(),
            FredError::RateLimitExceeded { .. } => "FRED_RATE_LIMIT".to_string(),
            FredError::InvalidResponse { .. } => "FRED_INVALID_RESPONSE".to_string(),
            FredError::ServerError { .. } => "FRED_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for CensusError {
    fn log_error(&self) -> &Self {
        error!("CensusError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CensusError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CensusError::RateLimitExceeded { .. } => true,
            CensusError::ServerError { status_code } => *status_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CensusError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CensusError::InvalidApiKey => {
                "Census rejected the API key. Please check CENSUS_API_KEY in secrets.json."
                    .to_string()
            }
            CensusError::NoYearAvailable { years } => format!(
                "None of the ACS years {} are published yet for the requested tables.",
                years
            ),
            CensusError::TableUnavailable { table, year } => {
                format!("Table {} is not published for {}.", table, year)
            }
            _ => "Census API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CensusError::InvalidApiKey => "CENSUS_INVALID_API_KEY".to_string(),
            CensusError::TableUnavailable { .. } => "CENSUS_TABLE_UNAVAILABLE".to_string(),
            CensusError::NoYearAvailable { .. } => "CENSUS_NO_YEAR_AVAILABLE".to_string(),
            CensusError::RateLimitExceeded { .. } => "CENSUS_RATE_LIMIT".to_string(),
            CensusError::InvalidResponse { .. } => "CENSUS_INVALID_RESPONSE".to_string(),
            CensusError::ServerError { .. } => "CENSUS_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for DataError {
    fn log_error(&self) -> &Self {
        error!("DataError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("DataError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            DataError::FileNotFound { path } => format!(
                "Input file '{}' is missing. Run the phase that produces it first.",
                path
            ),
            DataError::MissingColumn { file, column } => {
                format!("Column '{}' is missing from '{}'.", column, file)
            }
            DataError::EmptyTable { table } => format!("Table '{}' has no rows.", table),
            DataError::InsufficientData {
                what,
                needed,
                available,
            } => format!(
                "Not enough data for {}: {} rows needed, {} available.",
                what, needed, available
            ),
            _ => "A data file could not be read or written.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            DataError::FileNotFound { .. } => "DATA_FILE_NOT_FOUND".to_string(),
            DataError::MissingColumn { .. } => "DATA_MISSING_COLUMN".to_string(),
            DataError::InvalidRecord { .. } => "DATA_INVALID_RECORD".to_string(),
            DataError::EmptyTable { .. } => "DATA_EMPTY_TABLE".to_string(),
            DataError::InsufficientData { .. } => "DATA_INSUFFICIENT".to_string(),
            DataError::Parquet { .. } => "DATA_PARQUET".to_string(),
            DataError::Csv(_) => "DATA_CSV".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidFormat { .. } => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs errors with their code and user-facing message, and recoverable
/// ones as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }

    /// For failures the run recovers from.
    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
    }
}
