//! Chart 3: the reality gap between Reddit post volume and official rates.

use crate::axis::{bar_range, month_range, month_x, padded_range, year_label};
use crate::palette::*;
use anyhow::{Context, Result};
use gap_analysis::MergedFeatureRow;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const BAR_HALF_WIDTH: f64 = 0.4;

type VolumeAccessor = fn(&MergedFeatureRow) -> Option<f64>;

struct Panel {
    title: &'static str,
    y_desc: &'static str,
    reliable_label: &'static str,
    sparse_label: &'static str,
    value: VolumeAccessor,
}

const RAW: Panel = Panel {
    title: "THE REALITY GAP: Raw Volume vs Official Rates",
    y_desc: "Reddit Posts per Month (Raw)",
    reliable_label: "Reddit Posts (N>=10)",
    sparse_label: "Reddit Posts (N<10, excluded from analysis)",
    value: |r| Some(r.post_count as f64),
};

const NORMALIZED: Panel = Panel {
    title: "THE REALITY GAP: Normalized Volume (Controlling for Subreddit Growth)",
    y_desc: "Posts per 10k Subscribers",
    reliable_label: "Normalized Posts/10k Subs (N>=10)",
    sparse_label: "Normalized Posts/10k Subs (N<10, excluded)",
    value: |r| r.post_volume_normalized,
};

fn bars<'a>(
    rows: &'a [MergedFeatureRow],
    value: VolumeAccessor,
    sparse: bool,
    opacity: f64,
) -> impl Iterator<Item = Rectangle<(f64, f64)>> + 'a {
    rows.iter()
        .filter(move |r| r.is_sparse == sparse)
        .filter_map(move |r| {
            let x = month_x(r.month);
            value(r).map(|v| {
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)],
                    REDDIT.mix(opacity).filled(),
                )
            })
        })
}

fn draw_panel(
    area: &DrawingArea<SVGBackend, Shift>,
    rows: &[MergedFeatureRow],
    panel: &Panel,
    x_range: Range<f64>,
    rate_range: Range<f64>,
) -> Result<()> {
    let y_range = bar_range(rows.iter().filter_map(panel.value), 1.15);

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, (FONT, 20))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .right_y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)?
        .set_secondary_coord(x_range, rate_range);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(panel.y_desc)
        .x_label_formatter(&year_label)
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Unemployment Rate (%)")
        .draw()?;

    chart
        .draw_series(bars(rows, panel.value, false, 0.7))?
        .label(panel.reliable_label)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], REDDIT.mix(0.7).filled()));
    chart
        .draw_series(bars(rows, panel.value, true, 0.3))?
        .label(panel.sparse_label)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], REDDIT.mix(0.3).filled()));

    let unrate: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| r.unrate.map(|v| (month_x(r.month), v)))
        .collect();
    let u6rate: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| r.u6rate.map(|v| (month_x(r.month), v)))
        .collect();
    chart
        .draw_secondary_series(LineSeries::new(unrate, U3.stroke_width(3)))?
        .label("U-3 Rate (%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], U3.stroke_width(3)));
    chart
        .draw_secondary_series(LineSeries::new(u6rate, U6.mix(0.8).stroke_width(2)))?
        .label("U-6 Rate (%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], U6.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&BACKGROUND.mix(0.85))
        .border_style(&TEXT_MUTED)
        .draw()?;
    Ok(())
}

/// Raw and normalized monthly volume bars against U-3 and U-6. Sparse months
/// are drawn faded.
pub fn reality_gap(rows: &[MergedFeatureRow], path: &Path) -> Result<()> {
    let x_range = month_range(rows.iter().map(|r| r.month)).context("no merged months")?;
    let rate_range = padded_range(rows.iter().flat_map(|r| [r.unrate, r.u6rate]).flatten())
        .context("no unemployment values")?;

    let root = SVGBackend::new(path, (WIDTH, TALL_HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let (upper, lower) = root.split_vertically(TALL_HEIGHT / 2);

    draw_panel(&upper, rows, &RAW, x_range.clone(), rate_range.clone())?;

    if rows.iter().any(|r| r.post_volume_normalized.is_some()) {
        draw_panel(&lower, rows, &NORMALIZED, x_range, rate_range)?;
    } else {
        let (w, h) = lower.dim_in_pixel();
        lower.draw(&Text::new(
            "Normalized volume not available (requires subreddit subscriber data)",
            (w as i32 / 2 - 260, h as i32 / 2),
            (FONT, 18).into_font().color(&TEXT_MUTED),
        ))?;
    }

    root.present()?;
    Ok(())
}
