pub mod api;
pub mod baseline;

pub use api::{FredClient, FredObservation, FredObservationsResponse, Observation};
pub use baseline::{fetch_baseline, merge_series, quality_report, SeriesQuality};
