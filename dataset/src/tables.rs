use reality_gap_core::{CoreError, DataError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Column named by a serde "missing field" error, i.e. a required header
/// absent from the file.
fn missing_column(error: &csv::Error) -> Option<String> {
    let csv::ErrorKind::Deserialize { err, .. } = error.kind() else {
        return None;
    };
    let csv::DeserializeErrorKind::Message(message) = err.kind() else {
        return None;
    };
    message
        .strip_prefix("missing field `")?
        .strip_suffix('`')
        .map(str::to_string)
}

/// Writes records with a header row, creating parent directories as needed.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(DataError::from)?;
    for record in records {
        writer.serialize(record).map_err(DataError::from)?;
    }
    writer.flush()?;

    info!("Saved {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Reads every record of a file produced by an earlier phase.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CoreError> {
    if !path.exists() {
        return Err(DataError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let mut reader = csv::Reader::from_path(path).map_err(DataError::from)?;
    let mut records = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let record: T = result.map_err(|e| match missing_column(&e) {
            Some(column) => DataError::MissingColumn {
                file: file_label(path),
                column,
            },
            None => DataError::InvalidRecord {
                file: file_label(path),
                // +2: header row and 1-based numbering
                details: format!("row {}: {}", idx + 2, e),
            },
        })?;
        records.push(record);
    }

    debug!("Loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Like [`read_csv`] but treats a missing file as absent data.
pub fn read_csv_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, CoreError> {
    if path.exists() {
        read_csv(path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reality_gap_core::{CensusRow, CensusTable, EconomicRecord, YearMonth};

    #[test]
    fn test_economic_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("df_official.csv");

        let mut january = EconomicRecord::empty(YearMonth::new(2020, 1).unwrap());
        january.unrate = Some(3.5);
        january.u6rate = Some(6.9);
        let february = EconomicRecord::empty(YearMonth::new(2020, 2).unwrap());

        write_csv(&path, &[january.clone(), february.clone()]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let header = raw.lines().next().unwrap();
        assert!(header.starts_with("month,UNRATE,U6RATE,CIVPART"));
        assert!(raw.contains("2020-01,3.5,6.9,,,"));

        let loaded: Vec<EconomicRecord> = read_csv(&path).unwrap();
        assert_eq!(loaded, vec![january, february]);
    }

    #[test]
    fn test_census_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("census.csv");
        let row = CensusRow {
            source: CensusTable::Industry,
            variable: "C24030_003E".to_string(),
            category: "Total:!!Male:!!Agriculture, forestry, fishing and hunting".to_string(),
            bucket: "Male".to_string(),
            field: "Agriculture, forestry, fishing and hunting".to_string(),
            count: None,
            acs_year: 2023,
            geography: "United States".to_string(),
        };

        write_csv(&path, &[row.clone()]).unwrap();
        let loaded: Vec<CensusRow> = read_csv(&path).unwrap();
        assert_eq!(loaded, vec![row]);
    }

    #[test]
    fn test_missing_file() {
        let result: Result<Vec<EconomicRecord>, _> = read_csv(Path::new("/nonexistent/x.csv"));
        assert!(matches!(
            result,
            Err(CoreError::Data(DataError::FileNotFound { .. }))
        ));

        let optional: Option<Vec<EconomicRecord>> =
            read_csv_if_exists(Path::new("/nonexistent/x.csv")).unwrap();
        assert!(optional.is_none());
    }

    #[test]
    fn test_invalid_row_reports_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "month,UNRATE,U6RATE,CIVPART,LNS14000036,CGBD2024\n2020-13,1,2,3,4,5\n",
        )
        .unwrap();

        let result: Result<Vec<EconomicRecord>, _> = read_csv(&path);
        match result {
            Err(CoreError::Data(DataError::InvalidRecord { file, details })) => {
                assert_eq!(file, "bad.csv");
                assert!(details.starts_with("row 2"));
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("df_official.csv");
        fs::write(&path, "UNRATE,U6RATE\n3.5,6.9\n").unwrap();

        let result: Result<Vec<EconomicRecord>, _> = read_csv(&path);
        match result {
            Err(CoreError::Data(DataError::MissingColumn { file, column })) => {
                assert_eq!(file, "df_official.csv");
                assert_eq!(column, "month");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
