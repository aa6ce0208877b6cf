//! Engineered features of the official FRED baseline.

use reality_gap_core::{EconomicRecord, FredSeries, YearMonth};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Linear interpolation of interior gaps. Trailing gaps repeat the last
/// observed value; leading gaps stay missing.
pub fn interpolate(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut last_known: Option<(usize, f64)> = None;

    for idx in 0..values.len() {
        let Some(current) = values[idx] else {
            continue;
        };
        if let Some((prev_idx, prev)) = last_known {
            let span = (idx - prev_idx) as f64;
            for (offset, slot) in out[prev_idx + 1..idx].iter_mut().enumerate() {
                let step = (offset + 1) as f64 / span;
                *slot = Some(prev + (current - prev) * step);
            }
        }
        last_known = Some((idx, current));
    }

    if let Some((last_idx, last)) = last_known {
        for slot in &mut out[last_idx + 1..] {
            *slot = Some(last);
        }
    }
    out
}

/// `x[i] - x[i - lag]`, missing when either side is missing.
pub fn diff(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|idx| {
            let prev = idx.checked_sub(lag).and_then(|p| values[p])?;
            Some(values[idx]? - prev)
        })
        .collect()
}

/// Trailing rolling mean over present values; one present value is enough.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|idx| {
            let start = (idx + 1).saturating_sub(window);
            let present: Vec<f64> = values[start..=idx].iter().flatten().copied().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        })
        .collect()
}

fn spread(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

/// One month of the official baseline with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialFeatureRow {
    pub month: YearMonth,
    #[serde(rename = "UNRATE")]
    pub unrate: Option<f64>,
    #[serde(rename = "U6RATE")]
    pub u6rate: Option<f64>,
    #[serde(rename = "CIVPART")]
    pub civpart: Option<f64>,
    #[serde(rename = "LNS14000036")]
    pub youth_unemployment: Option<f64>,
    #[serde(rename = "CGBD2024")]
    pub degree_unemployment: Option<f64>,
    #[serde(rename = "U6_U3_SPREAD")]
    pub u6_u3_spread: Option<f64>,
    #[serde(rename = "YOUTH_PREMIUM")]
    pub youth_premium: Option<f64>,
    #[serde(rename = "DEGREE_PREMIUM")]
    pub degree_premium: Option<f64>,
    #[serde(rename = "UNRATE_MOM")]
    pub unrate_mom: Option<f64>,
    #[serde(rename = "CIVPART_MOM")]
    pub civpart_mom: Option<f64>,
    #[serde(rename = "UNRATE_3MA")]
    pub unrate_3ma: Option<f64>,
    #[serde(rename = "U6RATE_3MA")]
    pub u6rate_3ma: Option<f64>,
    #[serde(rename = "LNS14000036_3MA")]
    pub youth_unemployment_3ma: Option<f64>,
    #[serde(rename = "CGBD2024_3MA")]
    pub degree_unemployment_3ma: Option<f64>,
    #[serde(rename = "CIVPART_3MA")]
    pub civpart_3ma: Option<f64>,
    #[serde(rename = "UNRATE_YOY")]
    pub unrate_yoy: Option<f64>,
}

/// Interpolates gaps and derives spreads, premiums, deltas and rolling means.
/// Records must be sorted by month.
pub fn engineer_official_features(
    records: &[EconomicRecord],
    rolling_window: usize,
) -> Vec<OfficialFeatureRow> {
    let column = |series: FredSeries| -> Vec<Option<f64>> {
        records.iter().map(|r| r.get(series)).collect()
    };

    let missing_before: usize = FredSeries::ALL
        .iter()
        .map(|s| column(*s).iter().filter(|v| v.is_none()).count())
        .sum();

    let unrate = interpolate(&column(FredSeries::Unrate));
    let u6rate = interpolate(&column(FredSeries::U6Rate));
    let civpart = interpolate(&column(FredSeries::Civpart));
    let youth = interpolate(&column(FredSeries::YouthUnemployment));
    let degree = interpolate(&column(FredSeries::DegreeUnemployment));

    let missing_after = [&unrate, &u6rate, &civpart, &youth, &degree]
        .iter()
        .map(|c| c.iter().filter(|v| v.is_none()).count())
        .sum::<usize>();
    info!("Interpolated {} missing values", missing_before - missing_after);

    let unrate_mom = diff(&unrate, 1);
    let civpart_mom = diff(&civpart, 1);
    let unrate_yoy = diff(&unrate, 12);
    let unrate_ma = rolling_mean(&unrate, rolling_window);
    let u6rate_ma = rolling_mean(&u6rate, rolling_window);
    let youth_ma = rolling_mean(&youth, rolling_window);
    let degree_ma = rolling_mean(&degree, rolling_window);
    let civpart_ma = rolling_mean(&civpart, rolling_window);

    records
        .iter()
        .enumerate()
        .map(|(i, record)| OfficialFeatureRow {
            month: record.month,
            unrate: unrate[i],
            u6rate: u6rate[i],
            civpart: civpart[i],
            youth_unemployment: youth[i],
            degree_unemployment: degree[i],
            u6_u3_spread: spread(u6rate[i], unrate[i]),
            youth_premium: spread(youth[i], unrate[i]),
            degree_premium: spread(degree[i], unrate[i]),
            unrate_mom: unrate_mom[i],
            civpart_mom: civpart_mom[i],
            unrate_3ma: unrate_ma[i],
            u6rate_3ma: u6rate_ma[i],
            youth_unemployment_3ma: youth_ma[i],
            degree_unemployment_3ma: degree_ma[i],
            civpart_3ma: civpart_ma[i],
            unrate_yoy: unrate_yoy[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        let filled = interpolate(&[None, Some(1.0), None, None, Some(4.0), None]);
        assert_eq!(
            filled,
            vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(4.0)]
        );
        assert_eq!(interpolate(&[None, None]), vec![None, None]);
    }

    #[test]
    fn test_diff() {
        let values = [Some(1.0), Some(3.0), None, Some(4.0)];
        assert_eq!(diff(&values, 1), vec![None, Some(2.0), None, None]);
        assert_eq!(diff(&values, 3), vec![None, None, None, Some(3.0)]);
    }

    #[test]
    fn test_rolling_mean_min_periods_one() {
        let values = [Some(3.0), Some(6.0), None, Some(9.0), None, None, None];
        assert_eq!(
            rolling_mean(&values, 3),
            vec![
                Some(3.0),
                Some(4.5),
                Some(4.5),
                Some(7.5),
                Some(9.0),
                Some(9.0),
                None
            ]
        );
    }

    #[test]
    fn test_engineer_official_features() {
        let records: Vec<EconomicRecord> = (1..=14)
            .map(|m| {
                let month = YearMonth::from_ordinal(YearMonth::new(2020, 1).unwrap().ordinal() + m - 1);
                let mut record = EconomicRecord::empty(month);
                record.unrate = Some(m as f64);
                record.u6rate = Some(m as f64 * 2.0);
                record.civpart = Some(60.0);
                record.youth_unemployment = Some(m as f64 + 5.0);
                record.degree_unemployment = if m == 3 { None } else { Some(m as f64 + 1.0) };
                record
            })
            .collect();

        let rows = engineer_official_features(&records, 3);
        assert_eq!(rows.len(), 14);

        let march = &rows[2];
        assert_eq!(march.degree_unemployment, Some(4.0));
        assert_eq!(march.u6_u3_spread, Some(3.0));
        assert_eq!(march.youth_premium, Some(5.0));
        assert_eq!(march.degree_premium, Some(1.0));
        assert_eq!(march.unrate_mom, Some(1.0));
        assert_eq!(march.civpart_mom, Some(0.0));
        assert_eq!(march.unrate_3ma, Some(2.0));

        assert_eq!(rows[0].unrate_mom, None);
        assert_eq!(rows[11].unrate_yoy, None);
        assert_eq!(rows[12].unrate_yoy, Some(12.0));
    }
}
