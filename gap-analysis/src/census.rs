//! Chart-ready views of the ACS cross-section.

use reality_gap_core::{CensusRow, CensusTable};
use std::collections::BTreeMap;
use tracing::info;

pub const DEGREE_AGE_BUCKET: &str = "25 to 39 years";
pub const DEGREE_TOP_N: usize = 8;
pub const INDUSTRY_TOP_N: usize = 10;
pub const LABEL_MAX_CHARS: usize = 35;

const DEGREE_FALLBACK_KEYWORDS: [&str; 5] = [
    "science and engineering",
    "business",
    "education",
    "arts",
    "humanities",
];

/// One bar of the census mismatch chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusBar {
    pub label: String,
    pub count: f64,
}

pub fn short_label(field: &str) -> String {
    field.chars().take(LABEL_MAX_CHARS).collect()
}

pub fn split_by_table(rows: &[CensusRow]) -> (Vec<&CensusRow>, Vec<&CensusRow>) {
    let (degree, industry): (Vec<&CensusRow>, Vec<&CensusRow>) = rows
        .iter()
        .filter(|r| CensusTable::ALL.contains(&r.source))
        .partition(|r| r.source == CensusTable::DegreeField);
    info!(
        "Census rows: {} degree categories, {} industry categories",
        degree.len(),
        industry.len()
    );
    (degree, industry)
}

/// Sums counts per shortened label and keeps the `n` largest, largest first.
fn top_by_label<'a>(rows: impl Iterator<Item = &'a CensusRow>, n: usize) -> Vec<CensusBar> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        if let Some(count) = row.count {
            *totals.entry(short_label(&row.field)).or_default() += count;
        }
    }
    let mut bars: Vec<CensusBar> = totals
        .into_iter()
        .map(|(label, count)| CensusBar { label, count })
        .collect();
    bars.sort_by(|a, b| b.count.total_cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    bars.truncate(n);
    bars
}

/// Degree fields of the 25-39 age group, male and female combined.
/// Falls back to broad field keywords when no row carries the age bucket.
pub fn degree_fields(rows: &[CensusRow]) -> Vec<CensusBar> {
    let degree = || rows.iter().filter(|r| r.source == CensusTable::DegreeField);

    let age_rows: Vec<&CensusRow> = degree()
        .filter(|r| r.bucket.contains(DEGREE_AGE_BUCKET))
        .collect();
    if !age_rows.is_empty() {
        return top_by_label(age_rows.into_iter(), DEGREE_TOP_N);
    }

    top_by_label(
        degree().filter(|r| {
            let field = r.field.to_lowercase();
            DEGREE_FALLBACK_KEYWORDS.iter().any(|k| field.contains(k))
        }),
        DEGREE_TOP_N,
    )
}

/// Top-level industries directly under the Male / Female split.
pub fn is_top_level_industry(row: &CensusRow) -> bool {
    let sex = row.bucket.split(" / ").next().unwrap_or_default();
    matches!(sex, "Male" | "Female")
        && row.field.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

pub fn industries(rows: &[CensusRow]) -> Vec<CensusBar> {
    top_by_label(
        rows.iter()
            .filter(|r| r.source == CensusTable::Industry)
            .filter(|r| is_top_level_industry(r)),
        INDUSTRY_TOP_N,
    )
}
