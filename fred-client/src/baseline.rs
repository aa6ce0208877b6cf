use crate::api::{FredClient, Observation};
use chrono::NaiveDate;
use reality_gap_core::{CoreError, EconomicRecord, FredSeries, YearMonth};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Missing-value summary for one series in the baseline table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuality {
    pub series: FredSeries,
    pub present: usize,
    pub missing: usize,
}

impl SeriesQuality {
    pub fn missing_pct(&self) -> f64 {
        let total = self.present + self.missing;
        if total == 0 {
            0.0
        } else {
            self.missing as f64 / total as f64 * 100.0
        }
    }
}

/// Fetches every series in order with a polite pause in between, then
/// merges them into one record per month.
pub async fn fetch_baseline(
    client: &FredClient,
    series: &[FredSeries],
    start: NaiveDate,
    end: NaiveDate,
    delay: Duration,
) -> Result<Vec<EconomicRecord>, CoreError> {
    let mut fetched = Vec::with_capacity(series.len());
    for (i, s) in series.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let observations = client.fetch_series(*s, start, end).await?;
        fetched.push((*s, observations));
    }

    let records = merge_series(&fetched);
    info!(
        "Official baseline covers {} months across {} series",
        records.len(),
        series.len()
    );
    Ok(records)
}

/// Outer-joins series by month; the result is sorted and month keys are unique.
pub fn merge_series(fetched: &[(FredSeries, Vec<Observation>)]) -> Vec<EconomicRecord> {
    let mut by_month: BTreeMap<YearMonth, EconomicRecord> = BTreeMap::new();
    for (series, observations) in fetched {
        for observation in observations {
            let month = YearMonth::from_date(observation.date);
            let record = by_month
                .entry(month)
                .or_insert_with(|| EconomicRecord::empty(month));
            // Monthly series carry one observation per month; keep the
            // first non-missing one if the source ever repeats a month.
            if record.get(*series).is_none() {
                record.set(*series, observation.value);
            }
        }
    }
    by_month.into_values().collect()
}

pub fn quality_report(records: &[EconomicRecord], series: &[FredSeries]) -> Vec<SeriesQuality> {
    series
        .iter()
        .map(|s| {
            let present = records.iter().filter(|r| r.get(*s).is_some()).count();
            SeriesQuality {
                series: *s,
                present,
                missing: records.len() - present,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(y: i32, m: u32, value: Option<f64>) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            value,
        }
    }

    #[test]
    fn test_merge_series_joins_by_month() {
        let fetched = vec![
            (
                FredSeries::Unrate,
                vec![obs(2020, 2, Some(3.5)), obs(2020, 1, Some(3.6))],
            ),
            (
                FredSeries::U6Rate,
                vec![obs(2020, 1, Some(6.9)), obs(2020, 3, None)],
            ),
        ];

        let records = merge_series(&fetched);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].month.to_string(), "2020-01");
        assert_eq!(records[0].unrate, Some(3.6));
        assert_eq!(records[0].u6rate, Some(6.9));
        assert_eq!(records[1].u6rate, None);
        assert_eq!(records[2].unrate, None);
    }

    #[test]
    fn test_quality_report_counts_missing() {
        let fetched = vec![(
            FredSeries::Civpart,
            vec![obs(2020, 1, Some(63.3)), obs(2020, 2, None)],
        )];
        let records = merge_series(&fetched);
        let report = quality_report(&records, &[FredSeries::Civpart, FredSeries::Unrate]);

        assert_eq!(report[0].missing, 1);
        assert_eq!(report[0].missing_pct(), 50.0);
        assert_eq!(report[1].present, 0);
    }
}
