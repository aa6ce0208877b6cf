use reality_gap_core::SentimentError;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Word to mean valence mapping, keyed by lowercase token.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: HashMap<String, f64>,
}

impl Lexicon {
    /// Loads a lexicon in the VADER distribution format
    /// (`token<TAB>mean<TAB>stddev<TAB>[ratings]`); only the first two
    /// columns are read.
    pub fn from_file(path: &Path) -> Result<Self, SentimentError> {
        let raw = std::fs::read_to_string(path).map_err(|_| SentimentError::LexiconNotFound {
            path: path.display().to_string(),
        })?;
        let lexicon = Self::parse(&raw)?;
        info!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    pub fn parse(raw: &str) -> Result<Self, SentimentError> {
        let mut entries = HashMap::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let mut columns = line.split('\t');
            let token = columns.next().unwrap_or_default().trim();
            let valence = columns.next().ok_or_else(|| SentimentError::InvalidLexiconEntry {
                line: idx + 1,
                details: "missing valence column".to_string(),
            })?;
            let valence: f64 =
                valence
                    .trim()
                    .parse()
                    .map_err(|_| SentimentError::InvalidLexiconEntry {
                        line: idx + 1,
                        details: format!("valence '{}' is not a number", valence.trim()),
                    })?;

            if token.is_empty() {
                return Err(SentimentError::InvalidLexiconEntry {
                    line: idx + 1,
                    details: "empty token".to_string(),
                });
            }
            entries.insert(token.to_lowercase(), valence);
        }

        if entries.is_empty() {
            return Err(SentimentError::EmptyLexicon);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.entries.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_vader_format() {
        let lexicon = Lexicon::parse("$:\t-1.5\t0.80623\t[-1, -1, -1]\nGood\t1.9\t0.9434\t[2, 1]\n")
            .unwrap();
        assert_eq!(lexicon.get("$:"), Some(-1.5));
        assert_eq!(lexicon.get("good"), Some(1.9));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Lexicon::parse("lonely"),
            Err(SentimentError::InvalidLexiconEntry { line: 1, .. })
        ));
        assert!(matches!(
            Lexicon::parse("ok\t1.2\nbad\tvery"),
            Err(SentimentError::InvalidLexiconEntry { line: 2, .. })
        ));
        assert!(matches!(
            Lexicon::parse("# only a comment\n"),
            Err(SentimentError::EmptyLexicon)
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hired\t2.0\t0.5\t[2, 2]").unwrap();
        let lexicon = Lexicon::from_file(file.path()).unwrap();
        assert_eq!(lexicon.get("hired"), Some(2.0));

        let missing = Lexicon::from_file(Path::new("/nonexistent/vader_lexicon.txt"));
        assert!(matches!(missing, Err(SentimentError::LexiconNotFound { .. })));
    }
}
