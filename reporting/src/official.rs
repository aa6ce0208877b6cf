//! Charts of the official FRED baseline.

use crate::axis::{month_range, month_x, padded_range, year_label};
use crate::palette::*;
use anyhow::{Context, Result};
use gap_analysis::stats::mean;
use gap_analysis::OfficialFeatureRow;
use plotters::prelude::*;
use reality_gap_core::YearMonth;
use std::path::Path;

struct ShadedPeriod {
    label: &'static str,
    start: YearMonth,
    end: YearMonth,
    color: RGBColor,
    opacity: f64,
}

const SHADED_PERIODS: [ShadedPeriod; 2] = [
    ShadedPeriod {
        label: "COVID Shock",
        start: YearMonth { year: 2020, month: 3 },
        end: YearMonth { year: 2020, month: 6 },
        color: COVID,
        opacity: 0.15,
    },
    ShadedPeriod {
        label: "Tech Layoff Wave",
        start: YearMonth { year: 2022, month: 10 },
        end: YearMonth { year: 2023, month: 6 },
        color: TECH_LAYOFFS,
        opacity: 0.1,
    },
];

type Accessor = fn(&OfficialFeatureRow) -> Option<f64>;

const RATE_SERIES: [(&str, RGBColor, u32, Accessor); 4] = [
    ("U-3 (Official Rate)", U3, 3, |r| r.unrate),
    ("U-6 (Real Rate)", U6, 2, |r| r.u6rate),
    ("Ages 20-24", YOUTH, 2, |r| r.youth_unemployment),
    ("Bachelor's 20-24", DEGREE, 2, |r| r.degree_unemployment),
];

fn points(rows: &[OfficialFeatureRow], get: Accessor) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| get(r).map(|v| (month_x(r.month), v)))
        .collect()
}

/// Chart 1: U-3, U-6, youth and young-graduate unemployment with the COVID
/// and tech-layoff periods shaded.
pub fn unemployment_rates(rows: &[OfficialFeatureRow], path: &Path) -> Result<()> {
    let x_range = month_range(rows.iter().map(|r| r.month)).context("no official months")?;
    let y_range = padded_range(
        RATE_SERIES
            .iter()
            .flat_map(|(_, _, _, get)| rows.iter().filter_map(move |r| get(r))),
    )
    .context("no unemployment values")?;

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("The Hidden Divergence: Official vs. Youth Unemployment", (FONT, 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Unemployment Rate (%)")
        .x_label_formatter(&year_label)
        .draw()?;

    for period in &SHADED_PERIODS {
        let (color, opacity) = (period.color, period.opacity);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (month_x(period.start), y_range.start),
                    (month_x(period.end), y_range.end),
                ],
                color.mix(opacity).filled(),
            )))?
            .label(period.label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(opacity).filled())
            });
    }

    for (label, color, width, get) in RATE_SERIES {
        chart
            .draw_series(LineSeries::new(points(rows, get), color.stroke_width(width)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&BACKGROUND.mix(0.85))
        .border_style(&TEXT_MUTED)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Chart 2: the U-6 minus U-3 spread as an area with its mean.
pub fn u6_u3_spread(rows: &[OfficialFeatureRow], path: &Path) -> Result<()> {
    let spread = points(rows, |r| r.u6_u3_spread);
    let values: Vec<f64> = spread.iter().map(|(_, v)| *v).collect();
    let mean_spread = mean(&values).context("no spread values")?;

    let x_range = month_range(rows.iter().map(|r| r.month)).context("no official months")?;
    let top = padded_range(values.iter().copied()).context("no spread values")?.end;
    let y_range = 0f64.min(top)..top.max(0.0);

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("The 'Hidden' Unemployed: U-6 minus U-3 Spread", (FONT, 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Spread (percentage points)")
        .x_label_formatter(&year_label)
        .draw()?;

    chart
        .draw_series(
            AreaSeries::new(spread.iter().copied(), 0.0, &SPREAD.mix(0.4))
                .border_style(SPREAD.stroke_width(2)),
        )?
        .label("U-6 minus U-3 Spread")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], SPREAD.mix(0.4).filled()));

    chart
        .draw_series(LineSeries::new(
            vec![(x_range.start, mean_spread), (x_range.end, mean_spread)],
            ACCENT.mix(0.7).stroke_width(2),
        ))?
        .label(format!("Mean Spread ({:.1}pp)", mean_spread))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ACCENT.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&BACKGROUND.mix(0.85))
        .border_style(&TEXT_MUTED)
        .draw()?;

    root.present()?;
    Ok(())
}
