use chrono::NaiveDate;
use reality_gap_core::{CoreError, FredError, FredSeries, RetryConfig, RetryExecutor};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FredObservationsResponse {
    #[serde(default)]
    pub count: Option<u32>,
    pub observations: Vec<FredObservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FredObservation {
    pub date: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FredErrorBody {
    #[serde(default)]
    error_message: Option<String>,
}

/// A parsed observation; FRED marks missing values with `"."`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl FredObservation {
    pub fn parse(&self) -> Result<Observation, FredError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            FredError::InvalidResponse {
                details: format!("bad observation date '{}': {}", self.date, e),
            }
        })?;
        let value = match self.value.trim() {
            "." | "" => None,
            raw => Some(raw.parse::<f64>().map_err(|_| FredError::InvalidResponse {
                details: format!("bad observation value '{}' on {}", raw, self.date),
            })?),
        };
        Ok(Observation { date, value })
    }
}

impl FredObservationsResponse {
    pub fn into_observations(self) -> Result<Vec<Observation>, FredError> {
        self.observations.iter().map(FredObservation::parse).collect()
    }
}

#[derive(Debug)]
pub struct FredClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    retry: RetryExecutor,
}

impl FredClient {
    pub fn new(base_url: &str, api_key: &str, retry: RetryConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry: RetryExecutor::new(retry),
        })
    }

    pub fn observations_url(
        &self,
        series: FredSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Url, CoreError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        Url::parse_with_params(
            &format!("{}/series/observations", self.base_url),
            &[
                ("series_id", series.series_id()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ],
        )
        .map_err(|e| CoreError::InvalidInput {
            message: format!("invalid FRED base URL '{}': {}", self.base_url, e),
        })
    }

    /// Fetches one series, retrying transient failures.
    pub async fn fetch_series(
        &self,
        series: FredSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, CoreError> {
        let url = self.observations_url(series, start, end)?;
        let operation_name = format!("fred:{}", series.series_id());

        let observations = self
            .retry
            .execute(&operation_name, || self.request_observations(series, url.clone()))
            .await?;

        info!(
            "Fetched {} observations for {} ({})",
            observations.len(),
            series.series_id(),
            series.description()
        );
        Ok(observations)
    }

    async fn request_observations(
        &self,
        series: FredSeries,
        url: Url,
    ) -> Result<Vec<Observation>, CoreError> {
        debug!("Requesting FRED series {}", series.series_id());
        let response = self.http_client.get(url).send().await.map_err(|e| {
            error!("Network error for FRED series {}: {}", series.series_id(), e);
            if e.is_timeout() {
                CoreError::Timeout { seconds: 30 }
            } else {
                CoreError::Network(e)
            }
        })?;

        let response = check_status(series, response).await?;
        let body: FredObservationsResponse = response.json().await.map_err(|e| {
            error!("Failed to parse FRED response for {}: {}", series.series_id(), e);
            CoreError::Fred(FredError::InvalidResponse {
                details: format!("unparseable observations for {}", series.series_id()),
            })
        })?;

        Ok(body.into_observations()?)
    }
}

async fn check_status(series: FredSeries, response: Response) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    warn!("FRED request for {} failed with {}", series.series_id(), status);
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_BACKOFF_SECS);
        return Err(FredError::RateLimitExceeded { retry_after }.into());
    }
    if status.is_server_error() {
        return Err(FredError::ServerError {
            status_code: status.as_u16(),
        }
        .into());
    }

    let message = response
        .json::<FredErrorBody>()
        .await
        .ok()
        .and_then(|b| b.error_message)
        .unwrap_or_default();
    Err(classify_client_error(series, status, &message))
}

pub fn classify_client_error(series: FredSeries, status: StatusCode, message: &str) -> CoreError {
    let lowered = message.to_lowercase();
    if lowered.contains("api_key") || lowered.contains("api key") || status == StatusCode::FORBIDDEN
    {
        CoreError::Fred(FredError::InvalidApiKey)
    } else if lowered.contains("does not exist") || status == StatusCode::NOT_FOUND {
        CoreError::Fred(FredError::SeriesNotFound {
            series_id: series.series_id().to_string(),
        })
    } else {
        CoreError::RequestFailed {
            message: format!("FRED {}: {}", series.series_id(), message),
            status_code: Some(status.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_observations_with_missing_marker() {
        let body = r#"{
            "count": 3,
            "observations": [
                {"realtime_start": "2024-01-01", "realtime_end": "2024-01-01", "date": "2020-01-01", "value": "3.6"},
                {"realtime_start": "2024-01-01", "realtime_end": "2024-01-01", "date": "2020-02-01", "value": "."},
                {"realtime_start": "2024-01-01", "realtime_end": "2024-01-01", "date": "2020-03-01", "value": "4.4"}
            ]
        }"#;
        let response: FredObservationsResponse = serde_json::from_str(body).unwrap();
        let observations = response.into_observations().unwrap();

        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].value, Some(3.6));
        assert_eq!(observations[1].value, None);
        assert_eq!(
            observations[2].date,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_bad_value_is_invalid_response() {
        let observation = FredObservation {
            date: "2020-01-01".to_string(),
            value: "n/a".to_string(),
        };
        assert!(matches!(
            observation.parse(),
            Err(FredError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_observations_url_contains_query() {
        let client = FredClient::new(
            "https://api.stlouisfed.org/fred/",
            "secret",
            RetryConfig::immediate(1),
        )
        .unwrap();
        let url = client
            .observations_url(
                FredSeries::YouthUnemployment,
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            )
            .unwrap();

        assert_eq!(url.path(), "/fred/series/observations");
        let query = url.query().unwrap();
        assert!(query.contains("series_id=LNS14000036"));
        assert!(query.contains("file_type=json"));
        assert!(query.contains("observation_end=2026-01-31"));
    }

    #[test]
    fn test_client_error_classification() {
        let bad_key = classify_client_error(
            FredSeries::Unrate,
            StatusCode::BAD_REQUEST,
            "Bad Request.  The value for variable api_key is not registered.",
        );
        assert!(matches!(bad_key, CoreError::Fred(FredError::InvalidApiKey)));

        let missing = classify_client_error(
            FredSeries::DegreeUnemployment,
            StatusCode::BAD_REQUEST,
            "Bad Request.  The series does not exist.",
        );
        assert!(matches!(
            missing,
            CoreError::Fred(FredError::SeriesNotFound { ref series_id }) if series_id == "CGBD2024"
        ));
    }
}
