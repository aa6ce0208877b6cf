use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("FRED API error: {0}")]
    Fred(#[from] FredError),

    #[error("Census API error: {0}")]
    Census(#[from] CensusError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Sentiment error: {0}")]
    Sentiment(#[from] SentimentError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Request failed: {message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum FredError {
    #[error("FRED API key rejected")]
    InvalidApiKey,

    #[error("Series not found: {series_id}")]
    SeriesNotFound { series_id: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum CensusError {
    #[error("Census API key rejected")]
    InvalidApiKey,

    #[error("Table {table} is not available for ACS year {year}")]
    TableUnavailable { table: String, year: i32 },

    #[error("No ACS year available among: {years}")]
    NoYearAvailable { years: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: String },

    #[error("Column {column} missing from {file}")]
    MissingColumn { file: String, column: String },

    #[error("Invalid record in {file}: {details}")]
    InvalidRecord { file: String, details: String },

    #[error("Table is empty: {table}")]
    EmptyTable { table: String },

    #[error("Not enough data for {what}: need {needed}, have {available}")]
    InsufficientData {
        what: String,
        needed: usize,
        available: usize,
    },

    #[error("Parquet write failed: {details}")]
    Parquet { details: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Lexicon file not found: {path}")]
    LexiconNotFound { path: String },

    #[error("Invalid lexicon entry on line {line}: {details}")]
    InvalidLexiconEntry { line: usize, details: String },

    #[error("Lexicon is empty")]
    EmptyLexicon,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to render {chart}: {details}")]
    RenderFailed { chart: String, details: String },

    #[error("No data to plot for {chart}")]
    NoData { chart: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
