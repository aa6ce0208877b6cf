//! Chart 7: do official rates predict distress? Reliable months only.

use crate::axis::{gradient, padded_range};
use crate::palette::*;
use anyhow::{Context, Result};
use gap_analysis::stats::{least_squares, pearson_complete};
use gap_analysis::MergedFeatureRow;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Months that can enter the scatter panels.
pub fn scatter_rows(rows: &[MergedFeatureRow]) -> Vec<&MergedFeatureRow> {
    rows.iter()
        .filter(|r| r.is_reliable() && r.post_count > 0 && r.unrate.is_some())
        .collect()
}

struct ScatterPoint {
    x: f64,
    y: f64,
    /// Position on the panel's color scale, 0..=1.
    shade: f64,
}

fn format_r(r: Option<f64>) -> String {
    r.map_or_else(|| "n/a".to_string(), |r| format!("{:.3}", r))
}

fn draw_scatter(
    area: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    y_desc: &str,
    points: &[ScatterPoint],
    palette: &[RGBColor],
    trend: bool,
) -> Result<()> {
    let x_range = padded_range(points.iter().map(|p| p.x)).context("no points")?;
    let y_range = padded_range(points.iter().map(|p| p.y)).context("no points")?;

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 16))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_desc("U-3 Rate (%)")
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(points.iter().map(|p| {
        Circle::new((p.x, p.y), 5, gradient(palette, p.shade).mix(0.75).filled())
    }))?;

    if trend {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        if let Some((slope, intercept)) = least_squares(&xs, &ys) {
            chart.draw_series(LineSeries::new(
                [x_range.start, x_range.end].map(|x| (x, slope * x + intercept)),
                ACCENT.mix(0.7).stroke_width(2),
            ))?;
        }
        chart.draw_series(LineSeries::new(
            [(x_range.start, 0.0), (x_range.end, 0.0)],
            &TEXT_MUTED.mix(0.4),
        ))?;
    }
    Ok(())
}

fn time_points(rows: &[&MergedFeatureRow], value: impl Fn(&MergedFeatureRow) -> Option<f64>) -> Vec<ScatterPoint> {
    let span = rows.len().saturating_sub(1).max(1) as f64;
    rows.iter()
        .enumerate()
        .filter_map(|(i, r)| {
            Some(ScatterPoint {
                x: r.unrate?,
                y: value(*r)?,
                shade: i as f64 / span,
            })
        })
        .collect()
}

fn r_of(points: &[ScatterPoint]) -> Option<f64> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    pearson_complete(&xs, &ys)
}

/// U-3 against raw volume, normalized volume (when subscriber counts exist)
/// and average sentiment with a least-squares trend line.
pub fn correlation_scatter(rows: &[MergedFeatureRow], path: &Path) -> Result<()> {
    let data = scatter_rows(rows);

    let raw = time_points(&data, |r| Some(r.post_count as f64));
    let normalized = time_points(&data, |r| r.post_volume_normalized);
    let sentiment: Vec<ScatterPoint> = data
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                x: r.unrate?,
                y: r.avg_sentiment?,
                shade: r.pct_negative.unwrap_or(0.0),
            })
        })
        .collect();

    let panels = if normalized.is_empty() { 2 } else { 3 };
    let root = SVGBackend::new(path, (700 * panels as u32, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let root = root.titled(
        "Statistical Evidence: Do Official Rates Predict Distress? (excluding months with N<10 posts)",
        (FONT, 22),
    )?;
    let areas = root.split_evenly((1, panels));

    draw_scatter(
        &areas[0],
        &format!("U-3 vs Raw Distress Volume (r = {}, N>=10 only)", format_r(r_of(&raw))),
        "Reddit Posts / Month (Raw)",
        &raw,
        &TIME,
        false,
    )?;

    if !normalized.is_empty() {
        draw_scatter(
            &areas[1],
            &format!("U-3 vs Normalized Volume (r = {}, N>=10 only)", format_r(r_of(&normalized))),
            "Posts per 10k Subscribers",
            &normalized,
            &TIME,
            false,
        )?;
    }

    let last = &areas[panels - 1];
    if sentiment.is_empty() {
        let (w, h) = last.dim_in_pixel();
        last.draw(&Text::new(
            "No scored months",
            (w as i32 / 2 - 60, h as i32 / 2),
            (FONT, 18).into_font().color(&TEXT_MUTED),
        ))?;
    } else {
        draw_scatter(
            last,
            &format!("U-3 vs Avg Sentiment (r = {}, N>=10 only)", format_r(r_of(&sentiment))),
            "Avg VADER Compound Score",
            &sentiment,
            &NEGATIVITY,
            true,
        )?;
    }

    root.present()?;
    Ok(())
}
