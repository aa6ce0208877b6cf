use census_client::{fetch_snapshot, CensusClient, CensusSnapshot};
use dataset::{write_csv, DataPaths};
use reality_gap_core::{CensusTable, CoreError, Secrets, StudyConfig};
use tracing::info;

/// Fetches the degree-field and industry tables from the newest ACS year
/// that publishes both.
pub async fn run_census(
    config: &StudyConfig,
    secrets: &Secrets,
    paths: &DataPaths,
) -> Result<CensusSnapshot, CoreError> {
    let settings = &config.census;
    let client = CensusClient::new(
        &settings.base_url,
        secrets.census_api_key()?,
        &settings.geography,
        config.retry.clone(),
    )?;

    let snapshot = fetch_snapshot(&client, settings, &CensusTable::ALL).await?;
    for table in CensusTable::ALL {
        info!(
            "ACS {} {}: {} rows",
            snapshot.acs_year,
            table.table_id(),
            snapshot.rows_for(table).count()
        );
    }

    write_csv(&paths.census(), &snapshot.rows)?;
    Ok(snapshot)
}
