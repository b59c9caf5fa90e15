//! Label layout decisions for bar charts
//!
//! The charting front-end only receives these decisions; nothing here draws.

use serde::Serialize;

/// Default share of the largest bar below which a label moves outside the bar.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 5.0;

/// Axis labels longer than this are shortened with `...`.
pub const AXIS_LABEL_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPlacement {
    Inside,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    White,
    Black,
}

/// Placement for one bar label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelStyle {
    pub placement: LabelPlacement,
    pub color: LabelColor,
}

impl LabelStyle {
    const INSIDE: LabelStyle = LabelStyle {
        placement: LabelPlacement::Inside,
        color: LabelColor::White,
    };
    const OUTSIDE: LabelStyle = LabelStyle {
        placement: LabelPlacement::Outside,
        color: LabelColor::Black,
    };
}

/// Decide label placement for each magnitude, in input order.
///
/// Values strictly below `threshold_percent` of the largest value get an outside,
/// black label; everything else stays inside in white. An empty or all-zero input
/// uses 1 as the largest value.
pub fn place_labels(values: &[f64], threshold_percent: f64) -> Vec<LabelStyle> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max = if max.is_finite() && max != 0.0 { max } else { 1.0 };
    let threshold = max * threshold_percent / 100.0;

    values
        .iter()
        .map(|&v| if v < threshold { LabelStyle::OUTSIDE } else { LabelStyle::INSIDE })
        .collect()
}

/// Same as [`place_labels`] but returned as the two parallel sequences the chart
/// trace takes (`textposition`, `textfont.color`).
pub fn label_positions(values: &[f64], threshold_percent: f64) -> (Vec<LabelPlacement>, Vec<LabelColor>) {
    place_labels(values, threshold_percent)
        .into_iter()
        .map(|s| (s.placement, s.color))
        .unzip()
}

/// How a whole trace should lay out its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TextLayout {
    /// Every bar agreed on one style.
    Uniform(LabelStyle),
    /// Mixed styles; let the renderer choose per bar, with black text.
    Auto,
}

impl TextLayout {
    pub fn for_values(values: &[f64], threshold_percent: f64) -> Self {
        let styles = place_labels(values, threshold_percent);
        match styles.first() {
            Some(first) if styles.iter().all(|s| s == first) => TextLayout::Uniform(*first),
            Some(_) => TextLayout::Auto,
            None => TextLayout::Uniform(LabelStyle::INSIDE),
        }
    }
}

/// Bar text for ranking charts: `"1.234 (12.5%)"`.
pub fn bar_text(count: usize, percent: f64) -> String {
    format!("{} ({:.1}%)", crate::display::format_count(count as u64), percent)
}

/// Shorten long category names for chart axes.
pub fn axis_label(label: &str) -> String {
    if label.chars().count() > AXIS_LABEL_MAX_CHARS {
        let head: String = label.chars().take(AXIS_LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}
