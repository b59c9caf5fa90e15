//! Aggregations over the filtered shipment view
//!
//! Each function is a single pass over the records it is given and is
//! recomputed on every filter change.

use serde::Serialize;
use std::collections::HashMap;

use crate::calendar::order_months;
use crate::display::round1;
use crate::models::{DeliveryOutcome, Dimension, ShipmentRecord};

// ============================================================================
// Rankings
// ============================================================================

/// Counts per value of `dimension`, largest first. Ties keep the order in which
/// values first appear in the table. Records without a value are skipped.
pub fn value_counts(records: &[ShipmentRecord], dimension: Dimension) -> Vec<(String, usize)> {
    value_counts_by(records.iter(), |r| dimension.value(r))
}

fn value_counts_by<'a, I, F>(records: I, key: F) -> Vec<(String, usize)>
where
    I: Iterator<Item = &'a ShipmentRecord>,
    F: Fn(&'a ShipmentRecord) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for record in records {
        let Some(value) = key(record) else { continue };
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(v, c)| (v.to_string(), c)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub label: String,
    pub count: usize,
    /// Share of all records in the view (not just the ranked ones), one decimal.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub dimension: Dimension,
    pub total_records: usize,
    /// Distinct values on this axis, before truncation.
    pub distinct_values: usize,
    pub entries: Vec<RankingEntry>,
}

impl Ranking {
    pub fn leader(&self) -> Option<&RankingEntry> {
        self.entries.first()
    }

    /// Combined share of the first `n` entries.
    pub fn top_share(&self, n: usize) -> f64 {
        round1(self.entries.iter().take(n).map(|e| e.percent).sum())
    }

    pub fn counts(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.count as f64).collect()
    }
}

/// Top-`limit` value counts on one axis.
pub fn top_values(records: &[ShipmentRecord], dimension: Dimension, limit: usize) -> Ranking {
    let counts = value_counts(records, dimension);
    ranking_from_counts(dimension, records.len(), counts, limit)
}

fn ranking_from_counts(
    dimension: Dimension,
    total_records: usize,
    counts: Vec<(String, usize)>,
    limit: usize,
) -> Ranking {
    let distinct_values = counts.len();
    let entries = counts
        .into_iter()
        .take(limit)
        .map(|(label, count)| RankingEntry {
            label,
            count,
            percent: percent_of(count, total_records),
        })
        .collect();

    Ranking {
        dimension,
        total_records,
        distinct_values,
        entries,
    }
}

fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

/// Invoice volume per `Mês Nota`, January first, absent months skipped.
pub fn monthly_volume(records: &[ShipmentRecord]) -> Vec<(String, usize)> {
    order_months(&value_counts(records, Dimension::Month))
}

// ============================================================================
// SLA attainment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlaSummary {
    /// Records where both the delivery and the promised date parse.
    pub evaluated: usize,
    pub on_time: usize,
    pub late: usize,
    /// `on_time / evaluated` in percent; 0 when nothing could be evaluated.
    pub rate_percent: f64,
}

pub fn sla_attainment(records: &[ShipmentRecord]) -> SlaSummary {
    let (mut on_time, mut late) = (0, 0);
    for record in records {
        match record.delivery_outcome() {
            DeliveryOutcome::OnTime => on_time += 1,
            DeliveryOutcome::Late => late += 1,
            DeliveryOutcome::Undelivered | DeliveryOutcome::NoForecast => {}
        }
    }

    let evaluated = on_time + late;
    let rate_percent = if evaluated > 0 {
        on_time as f64 / evaluated as f64 * 100.0
    } else {
        0.0
    };

    SlaSummary {
        evaluated,
        on_time,
        late,
        rate_percent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Attention,
    Critical,
}

impl PerformanceBand {
    pub fn from_rate(rate_percent: f64) -> Self {
        if rate_percent >= 95.0 {
            PerformanceBand::Excellent
        } else if rate_percent >= 85.0 {
            PerformanceBand::Good
        } else if rate_percent >= 70.0 {
            PerformanceBand::Attention
        } else {
            PerformanceBand::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "EXCELENTE",
            PerformanceBand::Good => "BOM",
            PerformanceBand::Attention => "ATENÇÃO",
            PerformanceBand::Critical => "CRÍTICO",
        }
    }
}

/// SLA gauge card: rate against the target plus what it takes to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlaGauge {
    pub summary: SlaSummary,
    pub target_percent: f64,
    pub late_share_percent: f64,
    pub band: PerformanceBand,
    /// Points missing to reach the target; `None` once the target is met.
    pub gap_percent: Option<f64>,
    /// Late deliveries that would have had to be on time to close the gap.
    pub deliveries_to_recover: usize,
    /// Points above target; `None` while below it.
    pub margin_percent: Option<f64>,
}

impl SlaGauge {
    pub fn new(summary: SlaSummary, target_percent: f64) -> Self {
        let rate = summary.rate_percent;
        let (gap_percent, margin_percent) = if rate < target_percent {
            (Some(target_percent - rate), None)
        } else {
            (None, Some(rate - target_percent))
        };
        let deliveries_to_recover = gap_percent
            .map(|gap| (gap / 100.0 * summary.evaluated as f64).floor() as usize)
            .unwrap_or(0);

        Self {
            summary,
            target_percent,
            late_share_percent: 100.0 - rate,
            band: PerformanceBand::from_rate(rate),
            gap_percent,
            deliveries_to_recover,
            margin_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierAttainment {
    pub carrier: String,
    pub on_time: usize,
    pub late: usize,
    pub total: usize,
    /// On-time share, one decimal.
    pub sla_percent: f64,
}

/// Per-carrier on-time share among evaluated deliveries, best first. Carriers
/// below `min_deliveries` evaluated deliveries are dropped whatever their rate.
pub fn carrier_attainment(records: &[ShipmentRecord], min_deliveries: usize) -> Vec<CarrierAttainment> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<CarrierAttainment> = Vec::new();

    for record in records {
        let Some(carrier) = record.carrier.as_deref() else { continue };
        let outcome = record.delivery_outcome();
        if !matches!(outcome, DeliveryOutcome::OnTime | DeliveryOutcome::Late) {
            continue;
        }

        let i = *index.entry(carrier).or_insert_with(|| {
            rows.push(CarrierAttainment {
                carrier: carrier.to_string(),
                on_time: 0,
                late: 0,
                total: 0,
                sla_percent: 0.0,
            });
            rows.len() - 1
        });

        let row = &mut rows[i];
        row.total += 1;
        if outcome == DeliveryOutcome::OnTime {
            row.on_time += 1;
        } else {
            row.late += 1;
        }
    }

    let mut rows: Vec<CarrierAttainment> = rows
        .into_iter()
        .filter(|r| r.total >= min_deliveries)
        .map(|mut r| {
            r.sla_percent = percent_of(r.on_time, r.total);
            r
        })
        .collect();

    rows.sort_by(|a, b| b.sla_percent.total_cmp(&a.sla_percent));
    rows
}

// ============================================================================
// Pending management
// ============================================================================

/// Shipments that need follow-up: never delivered, or delivered after the promise.
/// The two lists are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReport<'a> {
    pub undelivered: Vec<&'a ShipmentRecord>,
    pub delivered_late: Vec<&'a ShipmentRecord>,
    /// Top carriers across both lists.
    pub by_carrier: Vec<(String, usize)>,
}

impl PendingReport<'_> {
    pub fn total(&self) -> usize {
        self.undelivered.len() + self.delivered_late.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Undelivered first, then late, each in table order.
    pub fn records(&self) -> impl Iterator<Item = &ShipmentRecord> + '_ {
        self.undelivered.iter().chain(self.delivered_late.iter()).copied()
    }
}

/// Flat row of the pending table, as listed on screen and exported to CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingRow {
    pub invoice_number: String,
    pub business_unit: Option<String>,
    pub carrier: Option<String>,
    pub status: Option<String>,
    pub invoice_date: String,
    pub expected_delivery: String,
    pub delivery_date: String,
    pub outcome: DeliveryOutcome,
}

impl PendingRow {
    pub fn from_record(record: &ShipmentRecord) -> Self {
        Self {
            invoice_number: record.invoice_number.clone(),
            business_unit: record.business_unit.clone(),
            carrier: record.carrier.clone(),
            status: record.status.clone(),
            invoice_date: record.invoice_date.detail_format(),
            expected_delivery: record.expected_delivery.detail_format(),
            delivery_date: record.delivery_date.detail_format(),
            outcome: record.delivery_outcome(),
        }
    }
}

impl PendingReport<'_> {
    pub fn rows(&self) -> Vec<PendingRow> {
        self.records().map(PendingRow::from_record).collect()
    }
}

pub fn pending_report(records: &[ShipmentRecord], carrier_limit: usize) -> PendingReport<'_> {
    let mut undelivered = Vec::new();
    let mut delivered_late = Vec::new();

    for record in records {
        match record.delivery_outcome() {
            DeliveryOutcome::Undelivered => undelivered.push(record),
            DeliveryOutcome::Late => delivered_late.push(record),
            DeliveryOutcome::OnTime | DeliveryOutcome::NoForecast => {}
        }
    }

    let mut by_carrier = value_counts_by(
        undelivered.iter().chain(delivered_late.iter()).copied(),
        |r| r.carrier.as_deref(),
    );
    by_carrier.truncate(carrier_limit);

    PendingReport {
        undelivered,
        delivered_late,
        by_carrier,
    }
}

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_invoices: usize,
    pub total_weight: f64,
    /// Mean over records that have a weight; 0 when none do.
    pub mean_weight: f64,
    pub total_value: f64,
    pub mean_lead_time: Option<f64>,
    pub carrier_count: usize,
    pub state_count: usize,
    /// Average share of the leading carrier and the leading state, one decimal.
    pub concentration_index: Option<f64>,
    pub sla: SlaGauge,
}

pub fn overview(records: &[ShipmentRecord], sla_target_percent: f64) -> Overview {
    let total = records.len();
    let carriers = value_counts(records, Dimension::Carrier);
    let states = value_counts(records, Dimension::State);

    let concentration_index = match (carriers.first(), states.first()) {
        (Some((_, top_carrier)), Some((_, top_state))) if total > 0 => {
            Some(round1((top_carrier + top_state) as f64 / (2 * total) as f64 * 100.0))
        }
        _ => None,
    };

    Overview {
        total_invoices: total,
        total_weight: records.iter().filter_map(|r| r.gross_weight).sum(),
        mean_weight: mean(records.iter().filter_map(|r| r.gross_weight)).unwrap_or(0.0),
        total_value: records.iter().filter_map(|r| r.invoice_value).sum(),
        mean_lead_time: mean(records.iter().filter_map(|r| r.lead_time)),
        carrier_count: carriers.len(),
        state_count: states.len(),
        concentration_index,
        sla: SlaGauge::new(sla_attainment(records), sla_target_percent),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateCell;

    fn shipment(carrier: &str, delivered: &str, expected: &str) -> ShipmentRecord {
        ShipmentRecord {
            carrier: Some(carrier.to_string()),
            delivery_date: DateCell::from_text(delivered),
            expected_delivery: DateCell::from_text(expected),
            ..Default::default()
        }
    }

    fn with_state(state: &str) -> ShipmentRecord {
        ShipmentRecord {
            dest_state: Some(state.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_value_counts_ties_keep_table_order() {
        let records = vec![
            with_state("MG"),
            with_state("SP"),
            with_state("RJ"),
            with_state("SP"),
            with_state("RJ"),
            ShipmentRecord::default(),
        ];
        let counts = value_counts(&records, Dimension::State);
        assert_eq!(
            counts,
            vec![("SP".to_string(), 2), ("RJ".to_string(), 2), ("MG".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_values_limit_and_percent() {
        let records: Vec<_> = ["SP", "SP", "SP", "RJ", "MG", "PR", "PR", "BA"]
            .iter()
            .map(|s| with_state(s))
            .collect();
        let ranking = top_values(&records, Dimension::State, 3);
        assert_eq!(ranking.entries.len(), 3);
        assert_eq!(ranking.distinct_values, 5);
        assert_eq!(ranking.leader().unwrap().label, "SP");
        assert_eq!(ranking.leader().unwrap().percent, 37.5);
        assert_eq!(ranking.top_share(3), 75.0);
    }

    #[test]
    fn test_sla_rate() {
        let records = vec![
            shipment("A", "2024-01-10", "2024-01-10"),
            shipment("A", "2024-01-09", "2024-01-10"),
            shipment("A", "2024-01-12", "2024-01-10"),
            shipment("A", "", "2024-01-10"),
            shipment("A", "2024-01-12", ""),
        ];
        let sla = sla_attainment(&records);
        assert_eq!(sla.evaluated, 3);
        assert_eq!(sla.on_time, 2);
        assert_eq!(sla.late, 1);
        assert!((sla.rate_percent - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_sla_rate_of_empty_view_is_zero() {
        let sla = sla_attainment(&[]);
        assert_eq!(sla.rate_percent, 0.0);
        assert!(!sla.rate_percent.is_nan());
        let gauge = SlaGauge::new(sla, 95.0);
        assert_eq!(gauge.band, PerformanceBand::Critical);
        assert_eq!(gauge.deliveries_to_recover, 0);
    }

    #[test]
    fn test_gauge_bands_and_gap() {
        assert_eq!(PerformanceBand::from_rate(95.0), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_rate(90.0), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_rate(70.0), PerformanceBand::Attention);
        assert_eq!(PerformanceBand::from_rate(69.9), PerformanceBand::Critical);

        let summary = SlaSummary { evaluated: 200, on_time: 170, late: 30, rate_percent: 85.0 };
        let gauge = SlaGauge::new(summary, 95.0);
        assert_eq!(gauge.gap_percent, Some(10.0));
        assert_eq!(gauge.deliveries_to_recover, 20);
        assert_eq!(gauge.margin_percent, None);
        assert_eq!(gauge.late_share_percent, 15.0);
    }

    #[test]
    fn test_carrier_attainment_relevance_floor() {
        let mut records = Vec::new();
        // 9 perfect deliveries: below the floor
        for _ in 0..9 {
            records.push(shipment("Pequena", "2024-01-05", "2024-01-10"));
        }
        // 10 deliveries, 8 on time
        for i in 0..10 {
            let delivered = if i < 8 { "2024-01-05" } else { "2024-01-15" };
            records.push(shipment("Grande", delivered, "2024-01-10"));
        }
        // undelivered shipments do not count towards the floor
        records.push(shipment("Grande", "", "2024-01-10"));

        let table = carrier_attainment(&records, 10);
        assert_eq!(table.len(), 1);
        let row = &table[0];
        assert_eq!(row.carrier, "Grande");
        assert_eq!((row.on_time, row.late, row.total), (8, 2, 10));
        assert_eq!(row.sla_percent, 80.0);
    }

    #[test]
    fn test_carrier_attainment_sorted_best_first() {
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(shipment("B", if i < 5 { "2024-01-05" } else { "2024-01-15" }, "2024-01-10"));
            records.push(shipment("C", "2024-01-05", "2024-01-10"));
        }
        let table = carrier_attainment(&records, 10);
        let names: Vec<_> = table.iter().map(|r| r.carrier.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn test_pending_report_is_disjoint() {
        let records = vec![
            shipment("A", "", "2024-01-10"),
            shipment("B", "2024-01-12", "2024-01-10"),
            shipment("A", "2024-01-08", "2024-01-10"),
            shipment("A", "2024-01-12", ""),
        ];
        let report = pending_report(&records, 10);

        assert_eq!(report.undelivered.len(), 1);
        assert_eq!(report.delivered_late.len(), 1);
        assert_eq!(report.total(), 2);
        // a record without a delivery date is never reported as late
        assert!(report.delivered_late.iter().all(|r| r.delivery_date.is_parsed()));
        assert_eq!(
            report.by_carrier,
            vec![("A".to_string(), 1), ("B".to_string(), 1)]
        );

        let rows = report.rows();
        assert_eq!(rows[0].outcome, DeliveryOutcome::Undelivered);
        assert_eq!(rows[0].delivery_date, "N/A");
        assert_eq!(rows[1].outcome, DeliveryOutcome::Late);
        assert_eq!(rows[1].delivery_date, "12-01-2024");
    }

    #[test]
    fn test_overview_totals() {
        let records = vec![
            ShipmentRecord {
                carrier: Some("A".into()),
                dest_state: Some("SP".into()),
                gross_weight: Some(100.0),
                invoice_value: Some(1000.0),
                lead_time: Some(4.0),
                ..Default::default()
            },
            ShipmentRecord {
                carrier: Some("A".into()),
                dest_state: Some("RJ".into()),
                gross_weight: None,
                invoice_value: Some(500.0),
                lead_time: Some(2.0),
                ..Default::default()
            },
        ];
        let ov = overview(&records, 95.0);
        assert_eq!(ov.total_invoices, 2);
        assert_eq!(ov.total_weight, 100.0);
        assert_eq!(ov.mean_weight, 100.0);
        assert_eq!(ov.total_value, 1500.0);
        assert_eq!(ov.mean_lead_time, Some(3.0));
        assert_eq!(ov.carrier_count, 1);
        assert_eq!(ov.state_count, 2);
        assert_eq!(ov.concentration_index, Some(75.0));
    }

    #[test]
    fn test_overview_of_empty_view() {
        let ov = overview(&[], 95.0);
        assert_eq!(ov.total_invoices, 0);
        assert_eq!(ov.mean_weight, 0.0);
        assert_eq!(ov.mean_lead_time, None);
        assert_eq!(ov.concentration_index, None);
        assert_eq!(ov.sla.summary.rate_percent, 0.0);
    }

    #[test]
    fn test_monthly_volume_in_calendar_order() {
        let records: Vec<_> = ["MARÇO", "JANEIRO", "MARÇO", "FEVEREIRO"]
            .iter()
            .map(|m| ShipmentRecord {
                invoice_month: Some(m.to_string()),
                ..Default::default()
            })
            .collect();
        assert_eq!(
            monthly_volume(&records),
            vec![
                ("JANEIRO".to_string(), 1),
                ("FEVEREIRO".to_string(), 1),
                ("MARÇO".to_string(), 2),
            ]
        );
    }
}
