//! Axis helpers shared by the charts. Months are plotted on a continuous
//! axis of month ordinals.

use plotters::style::RGBColor;
use reality_gap_core::YearMonth;
use std::ops::Range;

pub fn month_x(month: YearMonth) -> f64 {
    month.ordinal() as f64
}

/// Half a month of padding on both sides so bars at the edges stay visible.
pub fn month_range(months: impl Iterator<Item = YearMonth>) -> Option<Range<f64>> {
    let (mut first, mut last) = (None::<YearMonth>, None::<YearMonth>);
    for month in months {
        first = Some(first.map_or(month, |f| f.min(month)));
        last = Some(last.map_or(month, |l| l.max(month)));
    }
    Some(month_x(first?) - 0.5..month_x(last?) + 0.5)
}

pub fn year_label(x: &f64) -> String {
    YearMonth::from_ordinal(x.round() as i32).year.to_string()
}

pub fn month_label(x: &f64) -> String {
    YearMonth::from_ordinal(x.round() as i32).to_string()
}

/// Min/max with 5% headroom. A flat series gets a unit band around it.
pub fn padded_range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        return None;
    }
    if max - min < f64::EPSILON {
        return Some(min - 1.0..max + 1.0);
    }
    let pad = (max - min) * 0.05;
    Some(min - pad..max + pad)
}

/// Zero-based range for bar heights.
pub fn bar_range(values: impl Iterator<Item = f64>, headroom: f64) -> Range<f64> {
    let max = values.filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max <= 0.0 {
        0.0..1.0
    } else {
        0.0..max * headroom
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

pub fn blend(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    RGBColor(lerp(from.0, to.0, t), lerp(from.1, to.1, t), lerp(from.2, to.2, t))
}

/// Piecewise gradient through evenly spaced stops.
pub fn gradient(stops: &[RGBColor], t: f64) -> RGBColor {
    match stops {
        [] => RGBColor(0, 0, 0),
        [only] => *only,
        _ => {
            let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
            let idx = (scaled.floor() as usize).min(stops.len() - 2);
            blend(stops[idx], stops[idx + 1], scaled - idx as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_range() {
        let months = [YearMonth::new(2021, 3).unwrap(), YearMonth::new(2020, 1).unwrap()];
        let range = month_range(months.into_iter()).unwrap();
        assert_eq!(range.start, month_x(months[1]) - 0.5);
        assert_eq!(range.end, month_x(months[0]) + 0.5);
        assert!(month_range(std::iter::empty()).is_none());
    }

    #[test]
    fn test_labels() {
        let x = month_x(YearMonth::new(2022, 10).unwrap());
        assert_eq!(year_label(&x), "2022");
        assert_eq!(month_label(&(x + 0.2)), "2022-10");
    }

    #[test]
    fn test_ranges() {
        let range = padded_range([1.0, 3.0].into_iter()).unwrap();
        assert!((range.start - 0.9).abs() < 1e-12);
        assert!((range.end - 3.1).abs() < 1e-12);
        assert_eq!(padded_range([2.0].into_iter()), Some(1.0..3.0));
        assert_eq!(padded_range(std::iter::empty()), None);
        assert_eq!(bar_range([0.0].into_iter(), 1.1), 0.0..1.0);
    }

    #[test]
    fn test_gradient_endpoints() {
        let stops = [RGBColor(0, 0, 0), RGBColor(200, 100, 50)];
        assert_eq!(gradient(&stops, 0.0), RGBColor(0, 0, 0));
        assert_eq!(gradient(&stops, 1.0), RGBColor(200, 100, 50));
        assert_eq!(gradient(&stops, 0.5), RGBColor(100, 50, 25));
    }
}
