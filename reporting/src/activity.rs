//! Charts 4 and 5: where and how the distress posts were found.

use crate::axis::gradient;
use crate::palette::*;
use anyhow::{Context, Result};
use gap_analysis::monthly::{subreddit_month_counts, subreddits, term_counts};
use plotters::prelude::*;
use reality_gap_core::{RedditPost, YearMonth};
use std::collections::BTreeSet;
use std::path::Path;

/// Every third month gets an axis label.
const MONTH_LABEL_STEP: usize = 3;

fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Posts per subreddit and month as a YlOrRd heatmap.
pub fn heatmap(posts: &[RedditPost], path: &Path) -> Result<()> {
    let counts = subreddit_month_counts(posts);
    let subs = subreddits(posts);
    let months: Vec<YearMonth> = posts
        .iter()
        .map(|p| p.month())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let max_count = counts.values().copied().max().context("no posts")? as f64;

    let month_labels: Vec<String> = months
        .iter()
        .enumerate()
        .map(|(i, m)| if i % MONTH_LABEL_STEP == 0 { m.to_string() } else { String::new() })
        .collect();

    let root = SVGBackend::new(path, (WIDTH + 200, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Reddit Distress Activity: Subreddit x Month", (FONT, 26))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(160)
        .build_cartesian_2d(
            (0..months.len() as i32).into_segmented(),
            (0..subs.len() as i32).into_segmented(),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Month")
        .x_labels(months.len())
        .y_labels(subs.len())
        .x_label_formatter(&|v: &SegmentValue<i32>| segment_label(&month_labels, v))
        .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(&subs, v))
        .draw()?;

    chart.draw_series(months.iter().enumerate().flat_map(|(mi, month)| {
        let counts = &counts;
        subs.iter().enumerate().map(move |(si, sub)| {
            let count = counts.get(&(sub.clone(), *month)).copied().unwrap_or(0);
            let color = gradient(&HEAT, count as f64 / max_count);
            Rectangle::new(
                [
                    (SegmentValue::Exact(mi as i32), SegmentValue::Exact(si as i32)),
                    (SegmentValue::Exact(mi as i32 + 1), SegmentValue::Exact(si as i32 + 1)),
                ],
                color.filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

/// Horizontal bars of post counts per search term, most frequent on top.
pub fn search_terms(posts: &[RedditPost], path: &Path) -> Result<()> {
    // Ascending so the largest bar ends up at the top of the axis
    let mut ranked = term_counts(posts);
    ranked.reverse();
    let max_count = ranked.iter().map(|(_, c)| *c).max().context("no posts")? as f64;
    let labels: Vec<String> = ranked.iter().map(|(t, _)| t.clone()).collect();

    let root = SVGBackend::new(path, (1000, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distress Signal Frequency: Which Keywords Dominate?", (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(0.0..max_count * 1.15, (0..labels.len() as i32).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Number of Posts")
        .y_labels(labels.len())
        .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
        .draw()?;

    chart.draw_series(ranked.iter().enumerate().map(|(i, (_, count))| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i as i32)),
                (*count as f64, SegmentValue::Exact(i as i32 + 1)),
            ],
            REDDIT.mix(0.8).filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    chart.draw_series(ranked.iter().enumerate().map(|(i, (_, count))| {
        Text::new(
            format!("{}", count),
            (*count as f64 + max_count * 0.01, SegmentValue::CenterOf(i as i32)),
            (FONT, 13).into_font().color(&TEXT_MUTED),
        )
    }))?;

    root.present()?;
    Ok(())
}
