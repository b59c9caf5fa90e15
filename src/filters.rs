//! Global filters: business unit, invoice-date range and carrier
//!
//! Axes combine with AND. An empty selection on an axis means "everything
//! selectable". Invalid input is corrected and reported as a warning.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::display::round1;
use crate::models::ShipmentRecord;

/// What the caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub business_units: Vec<String>,
    #[serde(default)]
    pub carriers: Vec<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// The selectable universe, derived once from the unfiltered table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Sorted, excluded business units removed.
    pub business_units: Vec<String>,
    pub excluded_business_units: Vec<String>,
    /// Sorted distinct carriers.
    pub carriers: Vec<String>,
    /// Invoice-date range of the data; `None` when no invoice date parses.
    pub date_bounds: Option<DateBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterWarning {
    /// Start after end; both bounds were reset to the full data range.
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
    /// Selected business units that are not selectable (absent or excluded).
    IgnoredBusinessUnits { values: Vec<String> },
    IgnoredCarriers { values: Vec<String> },
}

impl std::fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterWarning::InvertedDateRange { start, end } => write!(
                f,
                "start date {} is after end date {}; using the full data range",
                start, end
            ),
            FilterWarning::IgnoredBusinessUnits { values } => {
                write!(f, "ignored unavailable business units: {}", values.join(", "))
            }
            FilterWarning::IgnoredCarriers { values } => {
                write!(f, "ignored unavailable carriers: {}", values.join(", "))
            }
        }
    }
}

/// A selection checked against the options, ready to test records with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedFilters {
    /// Explicit subset; `None` means every selectable unit.
    pub business_units: Option<BTreeSet<String>>,
    /// Always-applied exclusion list.
    pub excluded_business_units: BTreeSet<String>,
    pub carriers: Option<BTreeSet<String>>,
    /// Inclusive invoice-date range; `None` only when the data has no invoice dates.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub warnings: Vec<FilterWarning>,
}

impl FilterOptions {
    pub fn from_records(records: &[ShipmentRecord], excluded_business_units: &[String]) -> Self {
        let excluded: BTreeSet<&str> = excluded_business_units.iter().map(String::as_str).collect();

        let business_units: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.business_unit.as_deref())
            .filter(|bu| !excluded.contains(bu))
            .collect();

        let carriers: BTreeSet<&str> = records.iter().filter_map(|r| r.carrier.as_deref()).collect();

        let mut days = records.iter().filter_map(ShipmentRecord::invoice_day);
        let date_bounds = days.next().map(|first| {
            days.fold(DateBounds { min: first, max: first }, |b, d| DateBounds {
                min: b.min.min(d),
                max: b.max.max(d),
            })
        });

        Self {
            business_units: business_units.into_iter().map(String::from).collect(),
            excluded_business_units: excluded_business_units.to_vec(),
            carriers: carriers.into_iter().map(String::from).collect(),
            date_bounds,
        }
    }

    /// Validate a selection. Never fails: unknown values are dropped, bounds are
    /// clamped to the data range and an inverted range falls back to the full range.
    pub fn resolve(&self, selection: &FilterSelection) -> ResolvedFilters {
        let mut warnings = Vec::new();

        let business_units = narrow(&selection.business_units, &self.business_units, |values| {
            warnings.push(FilterWarning::IgnoredBusinessUnits { values })
        });
        let carriers = narrow(&selection.carriers, &self.carriers, |values| {
            warnings.push(FilterWarning::IgnoredCarriers { values })
        });

        let date_range = self.date_bounds.map(|bounds| {
            let start = selection.start.unwrap_or(bounds.min);
            let end = selection.end.unwrap_or(bounds.max);
            if start > end {
                warnings.push(FilterWarning::InvertedDateRange { start, end });
                (bounds.min, bounds.max)
            } else {
                (start.clamp(bounds.min, bounds.max), end.clamp(bounds.min, bounds.max))
            }
        });

        ResolvedFilters {
            business_units,
            excluded_business_units: self.excluded_business_units.iter().cloned().collect(),
            carriers,
            date_range,
            warnings,
        }
    }
}

/// Intersect a requested subset with what is selectable. `None` when the result
/// puts no restriction in place (empty, or the whole universe).
fn narrow(
    requested: &[String],
    available: &[String],
    mut on_ignored: impl FnMut(Vec<String>),
) -> Option<BTreeSet<String>> {
    let (kept, ignored): (Vec<&String>, Vec<&String>) =
        requested.iter().partition(|v| available.contains(v));

    if !ignored.is_empty() {
        on_ignored(ignored.into_iter().cloned().collect());
    }

    let kept: BTreeSet<String> = kept.into_iter().cloned().collect();
    if kept.is_empty() || kept.len() == available.len() {
        None
    } else {
        Some(kept)
    }
}

impl ResolvedFilters {
    pub fn matches(&self, record: &ShipmentRecord) -> bool {
        self.matches_business_unit(record) && self.matches_date(record) && self.matches_carrier(record)
    }

    fn matches_business_unit(&self, record: &ShipmentRecord) -> bool {
        match (&self.business_units, record.business_unit.as_deref()) {
            (Some(selected), Some(bu)) => selected.contains(bu),
            (Some(_), None) => false,
            (None, Some(bu)) => !self.excluded_business_units.contains(bu),
            (None, None) => true,
        }
    }

    fn matches_date(&self, record: &ShipmentRecord) -> bool {
        match self.date_range {
            Some((start, end)) => record
                .invoice_day()
                .is_some_and(|day| start <= day && day <= end),
            None => true,
        }
    }

    fn matches_carrier(&self, record: &ShipmentRecord) -> bool {
        match (&self.carriers, record.carrier.as_deref()) {
            (Some(selected), Some(carrier)) => selected.contains(carrier),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Build the filtered view. The input is left untouched.
pub fn apply_filters(records: &[ShipmentRecord], filters: &ResolvedFilters) -> Vec<ShipmentRecord> {
    records.iter().filter(|r| filters.matches(r)).cloned().collect()
}

/// Sidebar summary of what the active filters did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub total_records: usize,
    pub filtered_records: usize,
    /// Share of the table removed by the filters, one decimal place.
    pub reduction_percent: f64,
    pub business_units: Option<String>,
    pub carriers: Option<String>,
    /// `dd/mm/yyyy - dd/mm/yyyy`
    pub period: Option<String>,
    /// The filtered view is empty; informational, not an error.
    pub is_empty: bool,
}

impl FilterSummary {
    pub fn new(total_records: usize, filtered_records: usize, filters: &ResolvedFilters) -> Self {
        let reduction_percent = if total_records > 0 {
            round1((total_records - filtered_records) as f64 / total_records as f64 * 100.0)
        } else {
            0.0
        };

        Self {
            total_records,
            filtered_records,
            reduction_percent,
            business_units: filters.business_units.as_ref().map(selection_label),
            carriers: filters.carriers.as_ref().map(selection_label),
            period: filters.date_range.map(|(start, end)| {
                format!("{} - {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y"))
            }),
            is_empty: filtered_records == 0,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered_records != self.total_records
    }
}

fn selection_label(values: &BTreeSet<String>) -> String {
    if values.len() <= 3 {
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    } else {
        format!("{} selecionadas", values.len())
    }
}
