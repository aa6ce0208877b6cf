//! Pearson correlations between the official baseline and Reddit signals,
//! restricted to reliable months.

use crate::merge::MergedFeatureRow;
use crate::stats::{correlation_p_value, pearson_complete};
use reality_gap_core::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

pub const POST_COUNT: &str = "post_count";
pub const POST_VOLUME_NORMALIZED: &str = "post_volume_normalized";
pub const AVG_SENTIMENT: &str = "avg_sentiment";
pub const DISTRESS_INDEX_NORM: &str = "distress_index_norm";

/// Columns always entering the matrix, in display order.
const BASE_COLUMNS: [&str; 8] = [
    "UNRATE",
    "U6RATE",
    "U6_U3_SPREAD",
    "YOUTH_PREMIUM",
    "DEGREE_PREMIUM",
    "CIVPART",
    POST_COUNT,
    AVG_SENTIMENT,
];

/// Signals whose correlations are ranked and written out.
const TARGETS: [&str; 3] = [POST_COUNT, POST_VOLUME_NORMALIZED, AVG_SENTIMENT];

fn column_value(row: &MergedFeatureRow, column: &str) -> Option<f64> {
    match column {
        "UNRATE" => row.unrate,
        "U6RATE" => row.u6rate,
        "U6_U3_SPREAD" => row.u6_u3_spread,
        "YOUTH_PREMIUM" => row.youth_premium,
        "DEGREE_PREMIUM" => row.degree_premium,
        "CIVPART" => row.civpart,
        POST_COUNT => Some(row.post_count as f64),
        AVG_SENTIMENT => row.avg_sentiment,
        DISTRESS_INDEX_NORM => row.distress_index_norm,
        POST_VOLUME_NORMALIZED => row.post_volume_normalized,
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn from_r(r: f64) -> Self {
        if r.abs() > 0.5 {
            Strength::Strong
        } else if r.abs() > 0.3 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strength::Weak => "weak",
            Strength::Moderate => "moderate",
            Strength::Strong => "strong",
        };
        f.write_str(s)
    }
}

/// One row of `correlations.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFinding {
    pub target: String,
    pub variable: String,
    pub r: Option<f64>,
    pub p_value: Option<f64>,
    pub n: usize,
    pub strength: Option<Strength>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where a column is constant.
    pub values: Vec<Vec<Option<f64>>>,
    pub n: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Correlations of `target` with every other column, ascending by r.
    /// Undefined coefficients come last.
    pub fn ranked(&self, target: &str) -> Vec<CorrelationFinding> {
        if !self.columns.iter().any(|c| c == target) {
            return Vec::new();
        }
        let mut findings: Vec<CorrelationFinding> = self
            .columns
            .iter()
            .filter(|c| c.as_str() != target)
            .map(|variable| {
                let r = self.get(target, variable);
                CorrelationFinding {
                    target: target.to_string(),
                    variable: variable.clone(),
                    r,
                    p_value: r.and_then(|r| correlation_p_value(r, self.n)),
                    n: self.n,
                    strength: r.map(Strength::from_r),
                }
            })
            .collect();
        findings.sort_by(|a, b| match (a.r, b.r) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.variable.cmp(&b.variable),
        });
        findings
    }

    pub fn findings(&self) -> Vec<CorrelationFinding> {
        TARGETS.iter().flat_map(|t| self.ranked(t)).collect()
    }
}

/// Builds the correlation matrix over reliable months with no missing value
/// in any selected column.
pub fn correlation_matrix(
    rows: &[MergedFeatureRow],
    min_rows: usize,
) -> Result<CorrelationMatrix, DataError> {
    let reliable: Vec<&MergedFeatureRow> = rows.iter().filter(|r| r.is_reliable()).collect();

    // Derived signals join only when some reliable month carries them
    let mut columns: Vec<&str> = BASE_COLUMNS.to_vec();
    for optional in [DISTRESS_INDEX_NORM, POST_VOLUME_NORMALIZED] {
        if reliable.iter().any(|r| column_value(r, optional).is_some()) {
            columns.push(optional);
        }
    }

    let complete: Vec<Vec<f64>> = reliable
        .iter()
        .filter_map(|row| {
            columns
                .iter()
                .map(|c| column_value(row, c))
                .collect::<Option<Vec<f64>>>()
        })
        .collect();

    info!(
        "Correlation input: {} reliable months, {} complete rows, excluding {} sparse months",
        reliable.len(),
        complete.len(),
        rows.len() - reliable.len()
    );

    if complete.len() < min_rows {
        return Err(DataError::InsufficientData {
            what: "correlation analysis".to_string(),
            needed: min_rows,
            available: complete.len(),
        });
    }

    let series: Vec<Vec<f64>> = (0..columns.len())
        .map(|j| complete.iter().map(|row| row[j]).collect())
        .collect();
    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    if i == j {
                        Some(1.0)
                    } else {
                        pearson_complete(&series[i], &series[j])
                    }
                })
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
        n: complete.len(),
    })
}

pub fn log_findings(matrix: &CorrelationMatrix) {
    for target in TARGETS {
        let ranked = matrix.ranked(target);
        if ranked.is_empty() {
            continue;
        }
        info!("Key correlations with {} (n = {}):", target, matrix.n);
        for finding in ranked {
            match (finding.r, finding.strength) {
                (Some(r), Some(strength)) => info!(
                    "  {} {:<28} r = {:+.3} ({}), p = {:.4}",
                    if r > 0.0 { "+" } else { "-" },
                    finding.variable,
                    r,
                    strength,
                    finding.p_value.unwrap_or(f64::NAN)
                ),
                _ => info!("  ? {:<28} r undefined (constant column)", finding.variable),
            }
        }
    }
}
