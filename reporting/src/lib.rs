//! Static SVG charts of the study.

pub mod activity;
pub mod axis;
pub mod census;
pub mod official;
pub mod palette;
pub mod scatter;
pub mod sentiment;
pub mod volume;


use gap_analysis::{MergedFeatureRow, MonthlyRedditStats, OfficialFeatureRow};
use reality_gap_core::{CensusRow, CoreError, RedditPost, ReportError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    UnemploymentRates,
    U6U3Spread,
    RealityGap,
    Heatmap,
    SearchTerms,
    SentimentTimeseries,
    CorrelationScatter,
    CensusMismatch,
}

impl Chart {
    pub const ALL: [Chart; 8] = [
        Chart::UnemploymentRates,
        Chart::U6U3Spread,
        Chart::RealityGap,
        Chart::Heatmap,
        Chart::SearchTerms,
        Chart::SentimentTimeseries,
        Chart::CorrelationScatter,
        Chart::CensusMismatch,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Chart::UnemploymentRates => "01_unemployment_rates.svg",
            Chart::U6U3Spread => "02_u6_u3_spread.svg",
            Chart::RealityGap => "03_reality_gap.svg",
            Chart::Heatmap => "04_heatmap.svg",
            Chart::SearchTerms => "05_search_terms.svg",
            Chart::SentimentTimeseries => "06_sentiment_timeseries.svg",
            Chart::CorrelationScatter => "07_correlation_scatter.svg",
            Chart::CensusMismatch => "08_census_mismatch.svg",
        }
    }
}

/// Everything the charts are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub official: &'a [OfficialFeatureRow],
    pub merged: &'a [MergedFeatureRow],
    pub monthly: &'a [MonthlyRedditStats],
    pub posts: &'a [RedditPost],
    pub census: &'a [CensusRow],
    /// Fewest reliable months the scatter chart is drawn with.
    pub min_scatter_rows: usize,
}

impl ChartData<'_> {
    fn has_data(&self, chart: Chart) -> bool {
        match chart {
            Chart::UnemploymentRates | Chart::U6U3Spread => !self.official.is_empty(),
            Chart::RealityGap => !self.merged.is_empty(),
            Chart::Heatmap | Chart::SearchTerms => !self.posts.is_empty(),
            Chart::SentimentTimeseries => self.monthly.iter().any(|m| m.avg_sentiment.is_some()),
            Chart::CorrelationScatter => {
                scatter::scatter_rows(self.merged).len() >= self.min_scatter_rows
            }
            Chart::CensusMismatch => !self.census.is_empty(),
        }
    }
}

/// Renders one chart into `dir`.
pub fn render(chart: Chart, data: &ChartData<'_>, dir: &Path) -> Result<PathBuf, ReportError> {
    if !data.has_data(chart) {
        return Err(ReportError::NoData {
            chart: chart.file_name().to_string(),
        });
    }

    let path = dir.join(chart.file_name());
    let result = match chart {
        Chart::UnemploymentRates => official::unemployment_rates(data.official, &path),
        Chart::U6U3Spread => official::u6_u3_spread(data.official, &path),
        Chart::RealityGap => volume::reality_gap(data.merged, &path),
        Chart::Heatmap => activity::heatmap(data.posts, &path),
        Chart::SearchTerms => activity::search_terms(data.posts, &path),
        Chart::SentimentTimeseries => sentiment::sentiment_timeseries(data.monthly, &path),
        Chart::CorrelationScatter => scatter::correlation_scatter(data.merged, &path),
        Chart::CensusMismatch => census::census_mismatch(data.census, &path),
    };

    result.map_err(|e| ReportError::RenderFailed {
        chart: chart.file_name().to_string(),
        details: format!("{:#}", e),
    })?;
    Ok(path)
}

/// Renders every chart that has data. Charts without data are skipped with a
/// warning; a rendering failure aborts.
pub fn render_all(data: &ChartData<'_>, dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(Chart::ALL.len());
    for chart in Chart::ALL {
        match render(chart, data, dir) {
            Ok(path) => {
                info!("Chart saved: {}", path.display());
                written.push(path);
            }
            Err(ReportError::NoData { chart }) => {
                warn!("Skipping {}: not enough data", chart);
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("{} of {} charts written to {}", written.len(), Chart::ALL.len(), dir.display());
    Ok(written)
}
