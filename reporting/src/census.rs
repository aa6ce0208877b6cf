//! Chart 8: what people studied against where they work.

use crate::palette::*;
use anyhow::Result;
use gap_analysis::census::{degree_fields, industries};
use gap_analysis::CensusBar;
use plotters::coord::Shift;
use plotters::prelude::*;
use reality_gap_core::CensusRow;
use std::path::Path;

fn draw_bars(
    area: &DrawingArea<SVGBackend, Shift>,
    title: &str,
    bars: &[CensusBar],
    color: RGBColor,
    empty_message: &str,
) -> Result<()> {
    if bars.is_empty() {
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            empty_message.to_string(),
            (w as i32 / 2 - 100, h as i32 / 2),
            (FONT, 18).into_font().color(&TEXT_MUTED),
        ))?;
        return Ok(());
    }

    // Smallest first so the largest bar sits at the top
    let ordered: Vec<&CensusBar> = bars.iter().rev().collect();
    let labels: Vec<String> = ordered.iter().map(|b| b.label.clone()).collect();
    let max = ordered.iter().map(|b| b.count).fold(0.0, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(230)
        .build_cartesian_2d(0.0..max * 1.05, (0..ordered.len() as i32).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Number of People")
        .y_labels(labels.len())
        .x_label_formatter(&|v: &f64| format!("{:.1}M", v / 1_000_000.0))
        .y_label_formatter(&|v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(ordered.iter().enumerate().map(|(i, bar)| {
        let mut rect = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i as i32)),
                (bar.count, SegmentValue::Exact(i as i32 + 1)),
            ],
            color.mix(0.8).filled(),
        );
        rect.set_margin(3, 3, 0, 0);
        rect
    }))?;
    Ok(())
}

/// Degree fields of 25-39 year olds (B15011) next to top-level industries of
/// the civilian employed population (C24030).
pub fn census_mismatch(rows: &[CensusRow], path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1600, 800)).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let root = root.titled("Structural Mismatch: Degrees vs. Jobs", (FONT, 26))?;
    let (left, right) = root.split_horizontally(800);

    draw_bars(
        &left,
        "What People Studied (B15011), Ages 25-39",
        &degree_fields(rows),
        DEGREE,
        "No matching degree data",
    )?;
    draw_bars(
        &right,
        "Where People Work (C24030), Civilian Employed Pop.",
        &industries(rows),
        U6,
        "No matching industry data",
    )?;

    root.present()?;
    Ok(())
}
