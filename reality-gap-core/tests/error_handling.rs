use reality_gap_core::{
    CensusError, ConfigError, CoreError, DataError, ErrorExt, ErrorReporter, FredError,
    RedditApiError,
};
use std::time::Duration;

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let fred_error = CoreError::Fred(FredError::InvalidApiKey);
    assert_eq!(fred_error.error_code(), "FRED_API");

    let census_error = CoreError::Census(CensusError::NoYearAvailable {
        years: "2023, 2022".to_string(),
    });
    assert_eq!(census_error.error_code(), "CENSUS_API");

    let data_error = CoreError::Data(DataError::FileNotFound {
        path: "data/df_official.csv".to_string(),
    });
    assert_eq!(data_error.error_code(), "DATA");

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "FRED_API_KEY".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_nested_error_codes() {
    assert_eq!(
        FredError::SeriesNotFound {
            series_id: "XYZ".to_string()
        }
        .error_code(),
        "FRED_SERIES_NOT_FOUND"
    );
    assert_eq!(
        CensusError::TableUnavailable {
            table: "B15011".to_string(),
            year: 2023
        }
        .error_code(),
        "CENSUS_TABLE_UNAVAILABLE"
    );
    assert_eq!(
        DataError::InsufficientData {
            what: "correlation".to_string(),
            needed: 5,
            available: 2
        }
        .error_code(),
        "DATA_INSUFFICIENT"
    );
}

#[test]
fn test_retryable_errors() {
    let rate_limited = CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert!(rate_limited.is_retryable());

    let census_busy = CoreError::Census(CensusError::RateLimitExceeded { retry_after: 2 });
    assert!(census_busy.is_retryable());

    let server = CoreError::Fred(FredError::ServerError { status_code: 503 });
    assert!(server.is_retryable());

    let bad_key = CoreError::Fred(FredError::InvalidApiKey);
    assert!(!bad_key.is_retryable());

    let non_retryable_error = CoreError::Config(ConfigError::MissingField {
        field: "api_key".to_string(),
    });
    assert!(!non_retryable_error.is_retryable());

    let empty = CoreError::Data(DataError::EmptyTable {
        table: "data/df_official.csv".to_string(),
    });
    assert!(!empty.is_retryable());
}

#[test]
fn test_retry_after() {
    let rate_limit_error =
        CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert_eq!(rate_limit_error.retry_after(), Some(Duration::from_secs(60)));

    let timeout_error = CoreError::Timeout { seconds: 30 };
    assert_eq!(timeout_error.retry_after(), Some(Duration::from_secs(30)));

    let server = CoreError::Fred(FredError::ServerError { status_code: 500 });
    assert_eq!(server.retry_after(), None);
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "CENSUS_API_KEY".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("CENSUS_API_KEY"));

    let data_error = CoreError::Data(DataError::FileNotFound {
        path: "data/df_reddit_sentiment.csv".to_string(),
    });
    let message = data_error.user_friendly_message();
    assert!(message.contains("df_reddit_sentiment.csv"));
    assert!(message.contains("Run the phase"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::Census(CensusError::InvalidApiKey);
    reporter.report_error(&error);

    let skipped = CoreError::Data(DataError::InsufficientData {
        what: "correlation".to_string(),
        needed: 5,
        available: 2,
    });
    reporter.report_warning(&skipped);
    assert_eq!(skipped.error_code(), "DATA");
}
