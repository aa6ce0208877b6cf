use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month key, serialised as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Months since year 0, handy as a continuous chart axis.
    pub fn ordinal(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    pub fn from_ordinal(ordinal: i32) -> Self {
        Self {
            year: ordinal.div_euclid(12),
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn succ(&self) -> Self {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// Every month from `start` to `end`, both included.
    pub fn range_inclusive(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
        (start.ordinal()..=end.ordinal())
            .map(YearMonth::from_ordinal)
            .collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts `YYYY-MM` as well as full `YYYY-MM-DD` dates.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '-');
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or_else(|| format!("invalid year in month key '{}'", s))?;
        let month = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(|| format!("invalid month in month key '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// The five FRED series the official baseline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FredSeries {
    #[serde(rename = "UNRATE")]
    Unrate,
    #[serde(rename = "U6RATE")]
    U6Rate,
    #[serde(rename = "CIVPART")]
    Civpart,
    #[serde(rename = "LNS14000036")]
    YouthUnemployment,
    #[serde(rename = "CGBD2024")]
    DegreeUnemployment,
}

impl FredSeries {
    pub const ALL: [FredSeries; 5] = [
        FredSeries::Unrate,
        FredSeries::U6Rate,
        FredSeries::Civpart,
        FredSeries::YouthUnemployment,
        FredSeries::DegreeUnemployment,
    ];

    pub fn series_id(&self) -> &'static str {
        match self {
            FredSeries::Unrate => "UNRATE",
            FredSeries::U6Rate => "U6RATE",
            FredSeries::Civpart => "CIVPART",
            FredSeries::YouthUnemployment => "LNS14000036",
            FredSeries::DegreeUnemployment => "CGBD2024",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FredSeries::Unrate => "Official unemployment rate (U-3)",
            FredSeries::U6Rate => "Underemployment rate (U-6)",
            FredSeries::Civpart => "Labor force participation rate",
            FredSeries::YouthUnemployment => "Unemployment rate, ages 20-24",
            FredSeries::DegreeUnemployment => "Unemployment rate, bachelor's degree, ages 20-24",
        }
    }
}

/// One row of the official baseline table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicRecord {
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
}

impl EconomicRecord {
    pub fn empty(month: YearMonth) -> Self {
        Self {
            month,
            unrate: None,
            u6rate: None,
            civpart: None,
            youth_unemployment: None,
            degree_unemployment: None,
        }
    }

    pub fn get(&self, series: FredSeries) -> Option<f64> {
        match series {
            FredSeries::Unrate => self.unrate,
            FredSeries::U6Rate => self.u6rate,
            FredSeries::Civpart => self.civpart,
            FredSeries::YouthUnemployment => self.youth_unemployment,
            FredSeries::DegreeUnemployment => self.degree_unemployment,
        }
    }

    pub fn set(&mut self, series: FredSeries, value: Option<f64>) {
        let slot = match series {
            FredSeries::Unrate => &mut self.unrate,
            FredSeries::U6Rate => &mut self.u6rate,
            FredSeries::Civpart => &mut self.civpart,
            FredSeries::YouthUnemployment => &mut self.youth_unemployment,
            FredSeries::DegreeUnemployment => &mut self.degree_unemployment,
        };
        *slot = value;
    }
}

/// ACS tables pulled for the degree/industry mismatch view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CensusTable {
    #[serde(rename = "B15011_Degree_Field")]
    DegreeField,
    #[serde(rename = "C24030_Industry")]
    Industry,
}

impl CensusTable {
    pub const ALL: [CensusTable; 2] = [CensusTable::DegreeField, CensusTable::Industry];

    pub fn table_id(&self) -> &'static str {
        match self {
            CensusTable::DegreeField => "B15011",
            CensusTable::Industry => "C24030",
        }
    }

    pub fn source_label(&self) -> &'static str {
        match self {
            CensusTable::DegreeField => "B15011_Degree_Field",
            CensusTable::Industry => "C24030_Industry",
        }
    }
}

/// A single point-in-time ACS estimate. Never joined onto the monthly table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusRow {
    pub source: CensusTable,
    pub variable: String,
    pub category: String,
    pub bucket: String,
    pub field: String,
    pub count: Option<f64>,
    pub acs_year: i32,
    pub geography: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermCategory {
    Positive,
    Negative,
}

impl TermCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermCategory::Positive => "positive",
            TermCategory::Negative => "negative",
        }
    }
}

impl fmt::Display for TermCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchTerm {
    pub text: String,
    pub category: TermCategory,
}

impl SearchTerm {
    pub fn new(text: impl Into<String>, category: TermCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// VADER-style polarity breakdown of one text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// A harvested Reddit post. The `vader_*` columns stay empty until the
/// analysis phase scores the post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub post_id: String,
    pub subreddit: String,
    pub search_term: String,
    pub term_category: TermCategory,
    #[serde(with = "timestamp_format")]
    pub created_utc: NaiveDateTime,
    pub title: String,
    pub selftext: String,
    pub score: i64,
    #[serde(default)]
    pub vader_neg: Option<f64>,
    #[serde(default)]
    pub vader_neu: Option<f64>,
    #[serde(default)]
    pub vader_pos: Option<f64>,
    #[serde(default)]
    pub vader_compound: Option<f64>,
}

impl RedditPost {
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.created_utc.date())
    }

    /// Title and body as scored by the sentiment engine.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.selftext)
    }

    pub fn text_length(&self) -> usize {
        self.selftext.chars().count()
    }

    pub fn scored(mut self, scores: PolarityScores) -> Self {
        self.vader_neg = Some(scores.neg);
        self.vader_neu = Some(scores.neu);
        self.vader_pos = Some(scores.pos);
        self.vader_compound = Some(scores.compound);
        self
    }

    pub fn is_scored(&self) -> bool {
        self.vader_compound.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditSubscribers {
    pub subreddit: String,
    pub subscribers_current: u64,
}

/// Converts a Reddit `created_utc` epoch value into a naive UTC timestamp.
pub fn utc_from_epoch(seconds: f64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp(seconds.trunc() as i64, 0).map(|dt| dt.naive_utc())
}

pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
