//! Chart 6: monthly sentiment trajectory.

use crate::axis::{bar_range, month_range, month_x, padded_range, year_label};
use crate::palette::*;
use anyhow::{Context, Result};
use gap_analysis::MonthlyRedditStats;
use plotters::prelude::*;
use std::path::Path;

const BAR_HALF_WIDTH: f64 = 0.4;

fn sentiment_points(monthly: &[MonthlyRedditStats], sparse: bool) -> Vec<(f64, f64)> {
    monthly
        .iter()
        .filter(|m| m.is_sparse == sparse)
        .filter_map(|m| m.avg_sentiment.map(|s| (month_x(m.month), s)))
        .collect()
}

/// Average compound score per month (sparse months faded) above the share
/// of negative posts.
pub fn sentiment_timeseries(monthly: &[MonthlyRedditStats], path: &Path) -> Result<()> {
    let x_range = month_range(monthly.iter().map(|m| m.month)).context("no monthly stats")?;
    let sentiment_range = padded_range(
        monthly
            .iter()
            .filter_map(|m| m.avg_sentiment)
            .chain(std::iter::once(0.0)),
    )
    .context("no sentiment values")?;

    let root = SVGBackend::new(path, (WIDTH, TALL_HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let (upper, lower) = root.split_vertically(TALL_HEIGHT * 2 / 3);

    let mut top = ChartBuilder::on(&upper)
        .caption(
            "Monthly Sentiment Trajectory (VADER Compound Score), sparse months (N<10) faded",
            (FONT, 20),
        )
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), sentiment_range)?;

    top.configure_mesh()
        .y_desc("Avg VADER Compound")
        .x_label_formatter(&year_label)
        .draw()?;

    top.draw_series(LineSeries::new(
        vec![(x_range.start, 0.0), (x_range.end, 0.0)],
        &TEXT_MUTED.mix(0.5),
    ))?;

    let reliable = sentiment_points(monthly, false);
    top.draw_series(
        reliable
            .iter()
            .map(|(x, y)| {
                let territory = if *y < 0.0 { REDDIT } else { DEGREE };
                Rectangle::new([(*x - BAR_HALF_WIDTH, 0.0), (*x + BAR_HALF_WIDTH, *y)], territory.mix(0.3).filled())
            }),
    )?;
    top.draw_series(LineSeries::new(reliable.iter().copied(), U3.stroke_width(2)))?
        .label("Avg Compound (N>=10)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], U3.stroke_width(2)));
    top.draw_series(reliable.iter().map(|p| Circle::new(*p, 3, U3.filled())))?;

    top.draw_series(
        sentiment_points(monthly, true)
            .into_iter()
            .map(|p| Cross::new(p, 4, U3.mix(0.3).stroke_width(1))),
    )?
    .label("Avg Compound (N<10, unreliable)")
    .legend(|(x, y)| Cross::new((x + 10, y), 4, U3.mix(0.3).stroke_width(1)));

    top.configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(&BACKGROUND.mix(0.85))
        .border_style(&TEXT_MUTED)
        .draw()?;

    let negative_range = bar_range(monthly.iter().filter_map(|m| m.pct_negative.map(|p| p * 100.0)), 1.1);
    let mut bottom = ChartBuilder::on(&lower)
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, negative_range)?;

    bottom
        .configure_mesh()
        .x_desc("Date")
        .y_desc("% Negative Posts")
        .x_label_formatter(&year_label)
        .draw()?;

    for (sparse, opacity, label) in [
        (false, 0.7, "% Negative (N>=10)"),
        (true, 0.3, "% Negative (N<10, unreliable)"),
    ] {
        bottom
            .draw_series(
                monthly
                    .iter()
                    .filter(|m| m.is_sparse == sparse)
                    .filter_map(|m| m.pct_negative.map(|p| (month_x(m.month), p * 100.0)))
                    .map(|(x, y)| {
                        Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, y)], REDDIT.mix(opacity).filled())
                    }),
            )?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], REDDIT.mix(opacity).filled()));
    }

    bottom
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&BACKGROUND.mix(0.85))
        .border_style(&TEXT_MUTED)
        .draw()?;

    root.present()?;
    Ok(())
}
