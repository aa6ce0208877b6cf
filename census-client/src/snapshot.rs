use crate::api::{CensusClient, GroupTable};
use crate::processing::process_table;
use reality_gap_core::{CensusError, CensusRow, CensusSettings, CensusTable, CoreError};
use tracing::{info, warn};

/// All requested tables for the single ACS year that had every one of them.
#[derive(Debug, Clone)]
pub struct CensusSnapshot {
    pub acs_year: i32,
    pub rows: Vec<CensusRow>,
}

impl CensusSnapshot {
    pub fn rows_for(&self, table: CensusTable) -> impl Iterator<Item = &CensusRow> {
        self.rows.iter().filter(move |r| r.source == table)
    }
}

/// Walks the configured years newest first and stops at the first year for
/// which every table is published.
pub async fn fetch_snapshot(
    client: &CensusClient,
    settings: &CensusSettings,
    tables: &[CensusTable],
) -> Result<CensusSnapshot, CoreError> {
    for &year in &settings.years {
        info!("Trying ACS 1-Year {}", year);
        let Some(raw_tables) = fetch_year(client, settings, tables, year).await? else {
            continue;
        };

        info!("Fetched all tables for ACS {}", year);
        let mut rows = Vec::new();
        for (table, group) in &raw_tables {
            let labels = client.fetch_labels(*table, year).await;
            if !settings.label_delay().is_zero() {
                tokio::time::sleep(settings.label_delay()).await;
            }
            let processed = process_table(*table, group, &labels, year, &settings.geography_label);
            info!("{}: {} estimate rows", table.table_id(), processed.len());
            rows.extend(processed);
        }

        return Ok(CensusSnapshot {
            acs_year: year,
            rows,
        });
    }

    let years = settings
        .years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(CensusError::NoYearAvailable { years }.into())
}

async fn fetch_year(
    client: &CensusClient,
    settings: &CensusSettings,
    tables: &[CensusTable],
    year: i32,
) -> Result<Option<Vec<(CensusTable, GroupTable)>>, CoreError> {
    let mut fetched = Vec::with_capacity(tables.len());
    for table in tables {
        match client.fetch_group(*table, year).await {
            Ok(group) => fetched.push((*table, group)),
            Err(CoreError::Census(e @ CensusError::TableUnavailable { .. })) => {
                warn!("{}, trying the next year", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        if !settings.request_delay().is_zero() {
            tokio::time::sleep(settings.request_delay()).await;
        }
    }
    Ok(Some(fetched))
}
