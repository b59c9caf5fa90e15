
use chrono::NaiveDate;
use freight_sla::filters::FilterSelection;
use freight_sla::metrics::PerformanceBand;
use freight_sla::{DashboardConfig, DashboardSession, DeliveryOutcome, Dimension};
use test_helpers::*;

fn open_sample(config: DashboardConfig) -> DashboardSession {
    let (_dir, path) = sample_workbook();
    DashboardSession::open(&path, config).unwrap()
}

#[test]
fn test_default_view_drops_excluded_units_and_undated_invoices() {
    let session = open_sample(DashboardConfig::default());

    assert_eq!(session.original().len(), 5);
    let numbers: Vec<_> = session.filtered().iter().map(|r| r.invoice_number.as_str()).collect();
    assert_eq!(numbers, vec!["123456", "123457", "223456"]);

    let summary = session.filter_summary();
    assert_eq!(summary.reduction_percent, 40.0);
    assert_eq!(summary.period.as_deref(), Some("10/01/2024 - 01/03/2024"));
}

#[test]
fn test_preview_reports_period_and_columns() {
    let preview = open_sample(DashboardConfig::default()).preview();
    assert_eq!(preview.total_records, 5);
    assert_eq!(preview.column_count, 19);
    assert_eq!(preview.period, "01/2024 - 03/2024");
    assert!(preview.is_complete());
}

#[test]
fn test_sla_over_filtered_view() {
    let session = open_sample(DashboardConfig::default());
    let overview = session.overview();

    assert_eq!(overview.total_invoices, 3);
    assert_eq!(overview.sla.summary.evaluated, 2);
    assert_eq!(overview.sla.summary.on_time, 1);
    assert_eq!(overview.sla.summary.rate_percent, 50.0);
    assert_eq!(overview.sla.band, PerformanceBand::Critical);
    assert_eq!(overview.carrier_count, 2);
    assert_eq!(overview.total_weight, 450.0);
}

#[test]
fn test_pending_lists_missing_delivery_separately_from_late() {
    let session = open_sample(DashboardConfig::default());
    let pending = session.pending();

    assert_eq!(pending.undelivered.len(), 1);
    assert_eq!(pending.undelivered[0].invoice_number, "223456");
    assert_eq!(pending.delivered_late.len(), 1);
    assert_eq!(pending.delivered_late[0].invoice_number, "123457");
    let outcomes: Vec<_> = pending.rows().iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![DeliveryOutcome::Undelivered, DeliveryOutcome::Late]);
}

#[test]
fn test_carrier_table_respects_relevance_floor() {
    let session = open_sample(DashboardConfig::default());
    assert!(session.carrier_attainment().is_empty());

    let config = DashboardConfig {
        min_carrier_deliveries: 1,
        ..Default::default()
    };
    let session = open_sample(config);
    let table = session.carrier_attainment();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].carrier, "BRASPRESS");
    assert_eq!(table[0].sla_percent, 100.0);
    assert_eq!(table[1].carrier, "JADLOG");
    assert_eq!(table[1].sla_percent, 0.0);
}

#[test]
fn test_lookup_bypasses_filters() {
    let mut session = open_sample(DashboardConfig::default());
    session.set_filters(FilterSelection {
        carriers: vec!["JADLOG".into()],
        ..Default::default()
    });
    assert_eq!(session.filtered().len(), 1);

    // 123456, 223456 and 323456; the last one is in an excluded unit
    let hits = session.lookup("23456");
    let numbers: Vec<_> = hits.iter().map(|h| h.invoice_number.as_str()).collect();
    assert_eq!(numbers, vec!["123456", "223456", "323456"]);

    let undated = session.lookup("987654");
    assert_eq!(undated.len(), 1);
    assert_eq!(undated[0].invoice_date, "sem data");
    assert_eq!(undated[0].total_time, "N/A");
}

#[test]
fn test_monthly_volume_and_rankings() {
    let session = open_sample(DashboardConfig::default());
    assert_eq!(
        session.monthly_volume(),
        vec![("JANEIRO".to_string(), 1), ("FEVEREIRO".to_string(), 2)]
    );

    let carriers = session.ranking(Dimension::Carrier, None);
    assert_eq!(carriers.leader().unwrap().label, "BRASPRESS");
    assert_eq!(carriers.leader().unwrap().percent, 66.7);

    let occurrences = session.ranking(Dimension::Occurrence, None);
    assert_eq!(occurrences.entries.len(), 1);
}

#[test]
fn test_date_range_selection() {
    let mut session = open_sample(DashboardConfig::default());
    let warnings = session
        .set_filters(FilterSelection {
            start: NaiveDate::from_ymd_opt(2024, 2, 1),
            end: NaiveDate::from_ymd_opt(2024, 2, 29),
            ..Default::default()
        })
        .to_vec();
    assert!(warnings.is_empty());
    assert_eq!(session.filtered().len(), 2);

    session.set_filters(FilterSelection {
        start: NaiveDate::from_ymd_opt(2024, 2, 29),
        end: NaiveDate::from_ymd_opt(2024, 2, 1),
        ..Default::default()
    });
    assert_eq!(session.filtered().len(), 3);
    assert_eq!(session.filters().warnings.len(), 1);
}
