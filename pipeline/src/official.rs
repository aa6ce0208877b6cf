use dataset::{write_csv, DataPaths};
use fred_client::{fetch_baseline, quality_report, FredClient};
use reality_gap_core::{CoreError, EconomicRecord, Secrets, StudyConfig};
use tracing::{info, warn};

/// Downloads the official labor series for the study window and saves one
/// row per month.
pub async fn run_official(
    config: &StudyConfig,
    secrets: &Secrets,
    paths: &DataPaths,
) -> Result<Vec<EconomicRecord>, CoreError> {
    let settings = &config.fred;
    let client = FredClient::new(&settings.base_url, secrets.fred_api_key()?, config.retry.clone())?;

    info!(
        "Fetching {} FRED series from {} to {}",
        settings.series.len(),
        config.window.start,
        config.window.end
    );
    let records = fetch_baseline(
        &client,
        &settings.series,
        config.window.start,
        config.window.end,
        settings.request_delay(),
    )
    .await?;

    for quality in quality_report(&records, &settings.series) {
        if quality.missing > 0 {
            warn!(
                "{}: {} of {} months missing ({:.1}%)",
                quality.series.series_id(),
                quality.missing,
                quality.present + quality.missing,
                quality.missing_pct()
            );
        } else {
            info!("{}: complete, {} months", quality.series.series_id(), quality.present);
        }
    }

    write_csv(&paths.official(), &records)?;
    Ok(records)
}
