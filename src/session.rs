//! The dashboard session
//!
//! Owns one loaded table: the unfiltered records, the current filter selection
//! and the filtered view derived from it. Every dashboard figure is computed
//! from here; nothing is global.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::filters::{
    apply_filters, FilterOptions, FilterSelection, FilterSummary, FilterWarning, ResolvedFilters,
};
use crate::loader::{load_workbook, load_workbook_bytes, LoadError, LoadedTable};
use crate::lookup::{lookup_invoices, InvoiceDetail};
use crate::metrics::{self, CarrierAttainment, Overview, PendingReport, Ranking};
use crate::models::{Column, Dimension, ShipmentRecord, ESSENTIAL_COLUMNS};

/// What the user sees right after a load, before any analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetPreview {
    pub source: String,
    pub sheet_name: String,
    pub total_records: usize,
    pub column_count: usize,
    /// Invoice-date period as `mm/yyyy - mm/yyyy`, or `N/A`.
    pub period: String,
    pub columns_found: Vec<&'static str>,
    pub columns_missing: Vec<&'static str>,
}

impl DatasetPreview {
    pub fn is_complete(&self) -> bool {
        self.columns_missing.is_empty()
    }
}

pub struct DashboardSession {
    config: DashboardConfig,
    source: String,
    sheet_name: String,
    headers: Vec<String>,
    original: Vec<ShipmentRecord>,
    filtered: Vec<ShipmentRecord>,
    options: FilterOptions,
    selection: FilterSelection,
    filters: ResolvedFilters,
}

impl DashboardSession {
    /// Start a session over a loaded table with no filters selected.
    pub fn new(table: LoadedTable, source: impl Into<String>, config: DashboardConfig) -> Self {
        let options = FilterOptions::from_records(&table.records, &config.excluded_business_units);

        let mut session = Self {
            config,
            source: source.into(),
            sheet_name: table.sheet_name,
            headers: table.headers,
            original: table.records,
            filtered: Vec::new(),
            options,
            selection: FilterSelection::default(),
            filters: ResolvedFilters::default(),
        };
        session.set_filters(FilterSelection::default());
        session
    }

    pub fn open(path: impl AsRef<Path>, config: DashboardConfig) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let table = load_workbook(path, &config.sheet_name)?;
        Ok(Self::new(table, path.display().to_string(), config))
    }

    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<String>, config: DashboardConfig) -> Result<Self, LoadError> {
        let table = load_workbook_bytes(bytes, &config.sheet_name)?;
        Ok(Self::new(table, source, config))
    }

    /// Replace the filter selection and rebuild the filtered view. Returns the
    /// corrections applied to the selection, if any.
    pub fn set_filters(&mut self, selection: FilterSelection) -> &[FilterWarning] {
        let filters = self.options.resolve(&selection);
        for warning in &filters.warnings {
            warn!("Filter corrected: {}", warning);
        }

        self.filtered = apply_filters(&self.original, &filters);
        self.selection = selection;
        self.filters = filters;

        info!(
            "Filtered view: {} of {} records",
            self.filtered.len(),
            self.original.len()
        );
        &self.filters.warnings
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn original(&self) -> &[ShipmentRecord] {
        &self.original
    }

    pub fn filtered(&self) -> &[ShipmentRecord] {
        &self.filtered
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn filters(&self) -> &ResolvedFilters {
        &self.filters
    }

    pub fn preview(&self) -> DatasetPreview {
        let (columns_found, columns_missing): (Vec<Column>, Vec<Column>) = ESSENTIAL_COLUMNS
            .into_iter()
            .partition(|column| self.headers.iter().any(|h| Column::from_header(h) == Some(*column)));

        let mut days = self.original.iter().filter_map(ShipmentRecord::invoice_day);
        let period = match days.next() {
            Some(first) => {
                let (min, max) = days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
                format!("{} - {}", min.format("%m/%Y"), max.format("%m/%Y"))
            }
            None => "N/A".to_string(),
        };

        DatasetPreview {
            source: self.source.clone(),
            sheet_name: self.sheet_name.clone(),
            total_records: self.original.len(),
            column_count: self.headers.len(),
            period,
            columns_found: columns_found.iter().map(Column::header).collect(),
            columns_missing: columns_missing.iter().map(Column::header).collect(),
        }
    }

    pub fn filter_summary(&self) -> FilterSummary {
        FilterSummary::new(self.original.len(), self.filtered.len(), &self.filters)
    }

    pub fn overview(&self) -> Overview {
        metrics::overview(&self.filtered, self.config.sla_target_percent)
    }

    /// Top values on one axis of the filtered view; `limit` defaults to the
    /// configured ranking size.
    pub fn ranking(&self, dimension: Dimension, limit: Option<usize>) -> Ranking {
        metrics::top_values(
            &self.filtered,
            dimension,
            limit.unwrap_or(self.config.ranking_limit),
        )
    }

    pub fn monthly_volume(&self) -> Vec<(String, usize)> {
        metrics::monthly_volume(&self.filtered)
    }

    pub fn carrier_attainment(&self) -> Vec<CarrierAttainment> {
        metrics::carrier_attainment(&self.filtered, self.config.min_carrier_deliveries)
    }

    pub fn pending(&self) -> PendingReport<'_> {
        metrics::pending_report(&self.filtered, self.config.volume_limit)
    }

    /// Invoice lookup over the unfiltered table.
    pub fn lookup(&self, query: &str) -> Vec<InvoiceDetail> {
        let hits = lookup_invoices(&self.original, query);
        info!("Invoice lookup '{}': {} match(es)", query, hits.len());
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateCell;
    use chrono::NaiveDate;

    fn shipment(number: &str, bu: &str, carrier: &str, invoice: &str) -> ShipmentRecord {
        ShipmentRecord {
            invoice_number: number.to_string(),
            business_unit: Some(bu.to_string()),
            carrier: Some(carrier.to_string()),
            invoice_date: DateCell::from_text(invoice),
            ..Default::default()
        }
    }

    fn session() -> DashboardSession {
        let table = LoadedTable {
            sheet_name: "Base".into(),
            headers: vec!["Numero".into(), "Unid Negoc".into(), "Transportador".into(), "Dt Nota Fiscal".into()],
            records: vec![
                shipment("550011", "010", "Braspress", "2024-01-05"),
                shipment("550012", "020", "Jadlog", "2024-02-15"),
                shipment("660011", "070", "Braspress", "2024-03-01"),
                shipment("550013", "010", "Patrus", "2024-03-20"),
            ],
        };
        DashboardSession::new(table, "memory", DashboardConfig::default())
    }

    #[test]
    fn test_new_session_excludes_hidden_units() {
        let s = session();
        assert_eq!(s.original().len(), 4);
        assert_eq!(s.filtered().len(), 3);
        assert_eq!(s.options().business_units, vec!["010", "020"]);
    }

    #[test]
    fn test_lookup_ignores_active_filters() {
        let mut s = session();
        s.set_filters(FilterSelection {
            carriers: vec!["Jadlog".into()],
            ..Default::default()
        });
        assert_eq!(s.filtered().len(), 1);

        // one of the hits is in an excluded unit, another is filtered out by carrier
        let hits = s.lookup("5500");
        assert_eq!(hits.len(), 3);
        assert_eq!(s.lookup("0011").len(), 2);
    }

    #[test]
    fn test_inverted_range_is_reset() {
        let mut s = session();
        let warnings = s
            .set_filters(FilterSelection {
                start: NaiveDate::from_ymd_opt(2024, 3, 1),
                end: NaiveDate::from_ymd_opt(2024, 1, 31),
                ..Default::default()
            })
            .to_vec();
        assert_eq!(warnings.len(), 1);
        assert_eq!(s.filtered().len(), 3);
    }

    #[test]
    fn test_preview() {
        let preview = session().preview();
        assert_eq!(preview.total_records, 4);
        assert_eq!(preview.column_count, 4);
        assert_eq!(preview.period, "01/2024 - 03/2024");
        assert_eq!(preview.columns_found, vec!["Numero", "Transportador", "Dt Nota Fiscal", "Unid Negoc"]);
        assert_eq!(
            preview.columns_missing,
            vec!["Status", "Data de Entrega", "Previsão de Entrega"]
        );
        assert!(!preview.is_complete());
    }

    #[test]
    fn test_empty_filtered_view_is_not_an_error() {
        let mut s = session();
        s.set_filters(FilterSelection {
            business_units: vec!["020".into()],
            carriers: vec!["Patrus".into()],
            ..Default::default()
        });
        assert!(s.filtered().is_empty());
        assert!(s.filter_summary().is_empty);
        assert_eq!(s.overview().sla.summary.rate_percent, 0.0);
        assert!(s.carrier_attainment().is_empty());
        assert!(s.pending().is_empty());
    }
}
