use reality_gap_core::{CensusError, CensusTable, CoreError, RetryConfig, RetryExecutor};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 2;

/// A `get=group(..)` response: one header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl GroupTable {
    pub fn from_json(raw: &str) -> Result<Self, CensusError> {
        let matrix: Vec<Vec<serde_json::Value>> =
            serde_json::from_str(raw).map_err(|e| CensusError::InvalidResponse {
                details: format!("expected a JSON array of rows: {}", e),
            })?;

        let mut rows = matrix.into_iter();
        let headers = rows
            .next()
            .ok_or_else(|| CensusError::InvalidResponse {
                details: "response has no header row".to_string(),
            })?
            .into_iter()
            .map(|v| cell_to_string(v).unwrap_or_default())
            .collect::<Vec<_>>();

        let rows = rows
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        Ok(Self { headers, rows })
    }
}

fn cell_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GroupMetadata {
    #[serde(default)]
    variables: HashMap<String, VariableMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct VariableMetadata {
    #[serde(default)]
    label: Option<String>,
}

/// Parses `groups/{table}.json` into variable code -> label.
pub fn parse_labels(raw: &str) -> Result<HashMap<String, String>, CensusError> {
    let metadata: GroupMetadata =
        serde_json::from_str(raw).map_err(|e| CensusError::InvalidResponse {
            details: format!("unparseable group metadata: {}", e),
        })?;
    Ok(metadata
        .variables
        .into_iter()
        .map(|(id, var)| {
            let label = var.label.unwrap_or_else(|| id.clone());
            (id, label)
        })
        .collect())
}

#[derive(Debug)]
pub struct CensusClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    geography: String,
    retry: RetryExecutor,
}

impl CensusClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        geography: &str,
        retry: RetryConfig,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            geography: geography.to_string(),
            retry: RetryExecutor::new(retry),
        })
    }

    pub fn group_url(&self, table: CensusTable, year: i32) -> Result<Url, CoreError> {
        let group = format!("group({})", table.table_id());
        Url::parse_with_params(
            &format!("{}/{}/acs/acs1", self.base_url, year),
            &[
                ("get", group.as_str()),
                ("for", self.geography.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| CoreError::InvalidInput {
            message: format!("invalid Census base URL '{}': {}", self.base_url, e),
        })
    }

    pub fn labels_url(&self, table: CensusTable, year: i32) -> Result<Url, CoreError> {
        Url::parse(&format!(
            "{}/{}/acs/acs1/groups/{}.json",
            self.base_url,
            year,
            table.table_id()
        ))
        .map_err(|e| CoreError::InvalidInput {
            message: format!("invalid Census base URL '{}': {}", self.base_url, e),
        })
    }

    /// Fetches a whole table group. A year that is not published for this
    /// table fails with `CensusError::TableUnavailable`.
    pub async fn fetch_group(
        &self,
        table: CensusTable,
        year: i32,
    ) -> Result<GroupTable, CoreError> {
        let url = self.group_url(table, year)?;
        let operation_name = format!("census:{}:{}", table.table_id(), year);
        let group = self
            .retry
            .execute(&operation_name, || self.request_group(table, year, url.clone()))
            .await?;

        let Some(group) = group else {
            return Err(CensusError::TableUnavailable {
                table: table.table_id().to_string(),
                year,
            }
            .into());
        };
        info!(
            "{}: {} variables retrieved for ACS {}",
            table.table_id(),
            group.headers.len(),
            year
        );
        Ok(group)
    }

    async fn request_group(
        &self,
        table: CensusTable,
        year: i32,
        url: Url,
    ) -> Result<Option<GroupTable>, CoreError> {
        debug!("Requesting Census table {} for {}", table.table_id(), year);
        let response = self.http_client.get(url).send().await.map_err(|e| {
            error!("Network error for Census table {}: {}", table.table_id(), e);
            if e.is_timeout() {
                CoreError::Timeout { seconds: 30 }
            } else {
                CoreError::Network(e)
            }
        })?;

        let status = response.status();
        if is_unpublished(status) {
            debug!(
                "{}: ACS year {} not published (HTTP {})",
                table.table_id(),
                year,
                status.as_u16()
            );
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_BACKOFF_SECS);
            return Err(CensusError::RateLimitExceeded { retry_after }.into());
        }
        if status.is_server_error() {
            return Err(CensusError::ServerError {
                status_code: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_client_error(status, &body));
        }
        if looks_like_invalid_key(&body) {
            return Err(CensusError::InvalidApiKey.into());
        }
        Ok(Some(GroupTable::from_json(&body)?))
    }

    /// Variable labels for a table. Failures degrade to an empty map so the
    /// raw variable codes are used instead.
    pub async fn fetch_labels(&self, table: CensusTable, year: i32) -> HashMap<String, String> {
        match self.request_labels(table, year).await {
            Ok(labels) => {
                info!("{}: {} variable labels loaded", table.table_id(), labels.len());
                labels
            }
            Err(e) => {
                warn!("Could not fetch labels for {}: {}", table.table_id(), e);
                HashMap::new()
            }
        }
    }

    async fn request_labels(
        &self,
        table: CensusTable,
        year: i32,
    ) -> Result<HashMap<String, String>, CoreError> {
        let url = self.labels_url(table, year)?;
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::RequestFailed {
                message: format!("labels for {}", table.table_id()),
                status_code: Some(status.as_u16()),
            });
        }
        let body = response.text().await?;
        Ok(parse_labels(&body)?)
    }
}

/// The API answers 204 (or 404 on some endpoints) for a year it has not
/// published.
pub fn is_unpublished(status: StatusCode) -> bool {
    status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND
}

fn looks_like_invalid_key(body: &str) -> bool {
    let head: String = body.chars().take(512).collect::<String>().to_lowercase();
    head.contains("invalid key")
}

pub fn classify_client_error(status: StatusCode, body: &str) -> CoreError {
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || looks_like_invalid_key(body)
    {
        return CoreError::Census(CensusError::InvalidApiKey);
    }
    let snippet: String = body.chars().take(200).collect();
    CoreError::RequestFailed {
        message: format!("Census request rejected: {}", snippet.trim()),
        status_code: Some(status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reality_gap_core::ErrorExt;

    #[test]
    fn test_group_table_from_json() {
        let raw = r#"[
            ["GEO_ID","NAME","B15011_001E","B15011_001EA","B15011_002E","us"],
            ["0100000US","United States","70000000",null,"33000000","1"]
        ]"#;
        let table = GroupTable::from_json(raw).unwrap();
        assert_eq!(table.headers.len(), 6);
        assert_eq!(table.headers[2], "B15011_001E");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][2].as_deref(), Some("70000000"));
        assert_eq!(table.rows[0][3], None);
    }

    #[test]
    fn test_group_table_rejects_non_array() {
        assert!(matches!(
            GroupTable::from_json("<html>Invalid Key</html>"),
            Err(CensusError::InvalidResponse { .. })
        ));
        assert!(matches!(
            GroupTable::from_json("[]"),
            Err(CensusError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_parse_labels() {
        let raw = r#"{"variables": {
            "B15011_001E": {"label": "Estimate!!Total:", "concept": "SEX BY AGE"},
            "B15011_002E": {"label": "Estimate!!Total:!!Male:"},
            "GEO_ID": {}
        }}"#;
        let labels = parse_labels(raw).unwrap();
        assert_eq!(labels["B15011_001E"], "Estimate!!Total:");
        assert_eq!(labels["GEO_ID"], "GEO_ID");
    }

    #[test]
    fn test_group_url() {
        let client = CensusClient::new(
            "https://api.census.gov/data",
            "k",
            "us:*",
            RetryConfig::immediate(1),
        )
        .unwrap();
        let url = client.group_url(CensusTable::Industry, 2023).unwrap();
        assert_eq!(url.path(), "/data/2023/acs/acs1");
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["get"], "group(C24030)");
        assert_eq!(pairs["for"], "us:*");

        let labels = client.labels_url(CensusTable::DegreeField, 2022).unwrap();
        assert!(labels.as_str().ends_with("/2022/acs/acs1/groups/B15011.json"));
    }

    #[test]
    fn test_invalid_key_detection() {
        let err = classify_client_error(
            StatusCode::BAD_REQUEST,
            "<html><body>Invalid Key. A valid key must be included</body></html>",
        );
        assert!(matches!(err, CoreError::Census(CensusError::InvalidApiKey)));

        let other = classify_client_error(StatusCode::BAD_REQUEST, "error: unknown variable");
        assert!(matches!(
            other,
            CoreError::RequestFailed {
                status_code: Some(400),
                ..
            }
        ));
    }

    #[test]
    fn test_unpublished_year_statuses() {
        assert!(is_unpublished(StatusCode::NO_CONTENT));
        assert!(is_unpublished(StatusCode::NOT_FOUND));
        assert!(!is_unpublished(StatusCode::OK));
        assert!(!is_unpublished(StatusCode::TOO_MANY_REQUESTS));

        // The year walk moves on instead of retrying
        let unavailable = CensusError::TableUnavailable {
            table: "B15011".to_string(),
            year: 2024,
        };
        assert!(!unavailable.is_retryable());
    }
}
