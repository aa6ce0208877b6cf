use crate::api::GroupTable;
use reality_gap_core::{CensusRow, CensusTable};
use std::collections::HashMap;

const LABEL_PREFIX: &str = "Estimate!!";
const LABEL_SEPARATOR: &str = "!!";

/// Keeps only `{table}_xxxE` estimate columns (margins and annotations end
/// differently).
pub fn is_estimate_column(table: CensusTable, column: &str) -> bool {
    column.starts_with(&format!("{}_", table.table_id())) && column.ends_with('E')
}

pub fn clean_label(label: &str) -> String {
    label.replace(LABEL_PREFIX, "").trim().to_string()
}

/// Splits a cleaned `Total:!!Male:!!25 to 39 years:!!Arts` label into a
/// demographic bucket (`Male / 25 to 39 years`) and the leaf field.
pub fn split_label(label: &str) -> (String, String) {
    let mut segments: Vec<&str> = label
        .split(LABEL_SEPARATOR)
        .map(|s| s.trim().trim_end_matches(':').trim())
        .filter(|s| !s.is_empty())
        .collect();

    if segments.first() == Some(&"Total") && segments.len() > 1 {
        segments.remove(0);
    }

    match segments.split_last() {
        Some((field, bucket)) => (bucket.join(" / "), field.to_string()),
        None => (String::new(), "Total".to_string()),
    }
}

/// Estimates are counts; ACS encodes unavailable estimates as large negative
/// sentinels, which become missing.
pub fn parse_count(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Turns a wide group response into one long row per estimate variable.
pub fn process_table(
    table: CensusTable,
    group: &GroupTable,
    labels: &HashMap<String, String>,
    acs_year: i32,
    geography: &str,
) -> Vec<CensusRow> {
    let estimate_columns: Vec<(usize, &String)> = group
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_estimate_column(table, h))
        .collect();

    let mut rows = Vec::with_capacity(estimate_columns.len() * group.rows.len());
    for data_row in &group.rows {
        for (idx, variable) in &estimate_columns {
            let label = labels
                .get(*variable)
                .map(|l| clean_label(l))
                .unwrap_or_else(|| variable.to_string());
            let (bucket, field) = split_label(&label);
            rows.push(CensusRow {
                source: table,
                variable: variable.to_string(),
                category: label,
                bucket,
                field,
                count: parse_count(data_row.get(*idx).and_then(|c| c.as_deref())),
                acs_year,
                geography: geography.to_string(),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> GroupTable {
        GroupTable {
            headers: vec![
                "GEO_ID".to_string(),
                "C24030_001E".to_string(),
                "C24030_001EA".to_string(),
                "C24030_002E".to_string(),
                "C24030_003E".to_string(),
                "C24030_002M".to_string(),
            ],
            rows: vec![vec![
                Some("0100000US".to_string()),
                Some("160000000".to_string()),
                None,
                Some("85000000".to_string()),
                Some("-666666666".to_string()),
                Some("12000".to_string()),
            ]],
        }
    }

    #[test]
    fn test_estimate_column_filter() {
        assert!(is_estimate_column(CensusTable::Industry, "C24030_001E"));
        assert!(!is_estimate_column(CensusTable::Industry, "C24030_001EA"));
        assert!(!is_estimate_column(CensusTable::Industry, "C24030_001M"));
        assert!(!is_estimate_column(CensusTable::DegreeField, "C24030_001E"));
        assert!(!is_estimate_column(CensusTable::Industry, "NAME"));
    }

    #[test]
    fn test_split_label() {
        let (bucket, field) = split_label(&clean_label(
            "Estimate!!Total:!!Male:!!25 to 39 years:!!Science and Engineering",
        ));
        assert_eq!(bucket, "Male / 25 to 39 years");
        assert_eq!(field, "Science and Engineering");

        let (bucket, field) = split_label("Total:");
        assert_eq!(bucket, "");
        assert_eq!(field, "Total");

        let (bucket, field) = split_label("");
        assert_eq!(bucket, "");
        assert_eq!(field, "Total");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("1234")), Some(1234.0));
        assert_eq!(parse_count(Some("-666666666")), None);
        assert_eq!(parse_count(Some("N")), None);
        assert_eq!(parse_count(None), None);
    }

    #[test]
    fn test_process_table() {
        let mut labels = HashMap::new();
        labels.insert("C24030_001E".to_string(), "Estimate!!Total:".to_string());
        labels.insert(
            "C24030_002E".to_string(),
            "Estimate!!Total:!!Male:".to_string(),
        );

        let rows = process_table(
            CensusTable::Industry,
            &sample_group(),
            &labels,
            2023,
            "United States",
        );

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, "Total:");
        assert_eq!(rows[0].count, Some(160000000.0));
        assert_eq!(rows[1].field, "Male");
        // Unlabelled variables keep their code
        assert_eq!(rows[2].category, "C24030_003E");
        assert_eq!(rows[2].count, None);
        assert!(rows.iter().all(|r| r.acs_year == 2023 && r.source == CensusTable::Industry));
    }
}
