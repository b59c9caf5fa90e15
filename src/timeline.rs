//! Delivery timeline for a single shipment
//!
//! Rebuilds the five delivery milestones of one record with their dates and
//! durations. Any date that is missing or does not parse only blanks the parts
//! that depend on it; the other stages still render.

use serde::Serialize;

use crate::calendar::{business_days_between, calendar_days_between, DateCell};
use crate::models::ShipmentRecord;

/// The fixed milestone sequence, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    OrderPlaced,
    InvoiceIssued,
    Dispatched,
    DeliveryForecast,
    Delivered,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::OrderPlaced,
        Stage::InvoiceIssued,
        Stage::Dispatched,
        Stage::DeliveryForecast,
        Stage::Delivered,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Stage::OrderPlaced => "Implantação do Pedido",
            Stage::InvoiceIssued => "Nota Fiscal Emitida",
            Stage::Dispatched => "Mercadoria Despachada",
            Stage::DeliveryForecast => "Previsão de Entrega",
            Stage::Delivered => "Entrega Realizada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneStage {
    pub stage: Stage,
    pub title: &'static str,
    /// `dd/mm/yyyy`, absent when the source date is missing or unparseable.
    pub date: Option<String>,
    /// e.g. `"2 dias"` or `"7 dias úteis"`.
    pub duration: Option<String>,
    pub completed: bool,
}

impl MilestoneStage {
    fn new(stage: Stage, date: &DateCell, duration: Option<String>) -> Self {
        let date = date.timeline_format();
        Self {
            stage,
            title: stage.title(),
            completed: date.is_some(),
            date,
            duration,
        }
    }

    /// One-line caption: `"19/01/2024 • ⏱️ 7 dias úteis"`, or `"Não informado"`.
    pub fn caption(&self) -> String {
        let parts: Vec<String> = self
            .date
            .iter()
            .cloned()
            .chain(self.duration.iter().map(|d| format!("⏱️ {}", d)))
            .collect();

        if parts.is_empty() {
            "Não informado".to_string()
        } else {
            parts.join(" • ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryTimeline {
    pub stages: Vec<MilestoneStage>,
    /// Billing days + dispatch calendar days + invoice-to-delivery calendar days.
    /// Absent unless all three parts are known.
    pub total_elapsed_days: Option<i64>,
}

impl DeliveryTimeline {
    pub fn stage(&self, stage: Stage) -> Option<&MilestoneStage> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.completed).count()
    }
}

fn days_label(days: i64) -> String {
    format!("{} dias", days)
}

fn business_days_label(days: i64) -> String {
    format!("{} dias úteis", days)
}

/// Build the milestone timeline for one shipment.
///
/// The invoice and forecast durations are taken verbatim from `Dias Faturamento`
/// and `Lead Time`; dispatch is counted in calendar days from the invoice; the
/// delivery stage shows business days from the invoice. The total sums calendar
/// days on purpose, so it can differ from the business-day figure on display.
pub fn build_timeline(record: &ShipmentRecord) -> DeliveryTimeline {
    let billing_days = record.billing_days.map(|d| d.trunc() as i64);
    let dispatch_days = calendar_days_between(&record.invoice_date, &record.dispatch_date);
    let delivery_business_days = business_days_between(&record.invoice_date, &record.delivery_date);
    let delivery_calendar_days = calendar_days_between(&record.invoice_date, &record.delivery_date);
    let lead_time = record.lead_time.map(|d| d.trunc() as i64);

    let stages = vec![
        MilestoneStage::new(Stage::OrderPlaced, &record.order_placed, None),
        MilestoneStage::new(Stage::InvoiceIssued, &record.invoice_date, billing_days.map(days_label)),
        MilestoneStage::new(Stage::Dispatched, &record.dispatch_date, dispatch_days.map(days_label)),
        MilestoneStage::new(
            Stage::DeliveryForecast,
            &record.expected_delivery,
            lead_time.map(business_days_label),
        ),
        MilestoneStage::new(
            Stage::Delivered,
            &record.delivery_date,
            delivery_business_days.map(business_days_label),
        ),
    ];

    let total_elapsed_days = match (billing_days, dispatch_days, delivery_calendar_days) {
        (Some(billing), Some(dispatch), Some(delivery)) => {
            billing.checked_add(dispatch).and_then(|t| t.checked_add(delivery))
        }
        _ => None,
    };

    DeliveryTimeline {
        stages,
        total_elapsed_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryOutcome;

    fn sample() -> ShipmentRecord {
        ShipmentRecord {
            invoice_number: "123456".into(),
            invoice_date: DateCell::from_text("2024-01-10"),
            dispatch_date: DateCell::from_text("2024-01-12"),
            expected_delivery: DateCell::from_text("2024-01-20"),
            delivery_date: DateCell::from_text("2024-01-19"),
            billing_days: Some(3.0),
            lead_time: Some(5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_timeline() {
        let record = sample();
        let timeline = build_timeline(&record);

        assert_eq!(timeline.stages.len(), 5);
        let titles: Vec<_> = timeline.stages.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                "Implantação do Pedido",
                "Nota Fiscal Emitida",
                "Mercadoria Despachada",
                "Previsão de Entrega",
                "Entrega Realizada",
            ]
        );

        let invoice = timeline.stage(Stage::InvoiceIssued).unwrap();
        assert_eq!(invoice.date.as_deref(), Some("10/01/2024"));
        assert_eq!(invoice.duration.as_deref(), Some("3 dias"));

        let dispatched = timeline.stage(Stage::Dispatched).unwrap();
        assert_eq!(dispatched.duration.as_deref(), Some("2 dias"));

        let forecast = timeline.stage(Stage::DeliveryForecast).unwrap();
        assert_eq!(forecast.duration.as_deref(), Some("5 dias úteis"));

        let delivered = timeline.stage(Stage::Delivered).unwrap();
        assert!(delivered.completed);
        assert_eq!(delivered.duration.as_deref(), Some("7 dias úteis"));

        assert_eq!(timeline.total_elapsed_days, Some(14));
        assert_eq!(record.delivery_outcome(), DeliveryOutcome::OnTime);
    }

    #[test]
    fn test_order_stage_has_no_duration() {
        let mut record = sample();
        record.order_placed = DateCell::from_text("2024-01-08");
        let timeline = build_timeline(&record);
        let placed = timeline.stage(Stage::OrderPlaced).unwrap();
        assert!(placed.completed);
        assert_eq!(placed.duration, None);
        assert_eq!(timeline.completed_count(), 5);
    }

    #[test]
    fn test_missing_delivery_leaves_other_stages_intact() {
        let mut record = sample();
        record.delivery_date = DateCell::Missing;
        let timeline = build_timeline(&record);

        let delivered = timeline.stage(Stage::Delivered).unwrap();
        assert!(!delivered.completed);
        assert_eq!(delivered.duration, None);
        assert_eq!(delivered.caption(), "Não informado");
        assert_eq!(timeline.total_elapsed_days, None);
        assert!(timeline.stage(Stage::Dispatched).unwrap().completed);
    }

    #[test]
    fn test_unparseable_dispatch_blanks_only_dispatch() {
        let mut record = sample();
        record.dispatch_date = DateCell::from_text("sem registro");
        let timeline = build_timeline(&record);

        let dispatched = timeline.stage(Stage::Dispatched).unwrap();
        assert!(!dispatched.completed);
        assert_eq!(dispatched.duration, None);
        assert_eq!(timeline.total_elapsed_days, None);
        assert_eq!(
            timeline.stage(Stage::Delivered).unwrap().duration.as_deref(),
            Some("7 dias úteis")
        );
    }

    #[test]
    fn test_billing_days_shown_even_without_invoice_date() {
        let mut record = sample();
        record.invoice_date = DateCell::Missing;
        let timeline = build_timeline(&record);

        let invoice = timeline.stage(Stage::InvoiceIssued).unwrap();
        assert!(!invoice.completed);
        assert_eq!(invoice.duration.as_deref(), Some("3 dias"));
        assert_eq!(timeline.stage(Stage::Dispatched).unwrap().duration, None);
    }

    #[test]
    fn test_dispatch_before_invoice_is_negative() {
        let mut record = sample();
        record.dispatch_date = DateCell::from_text("2024-01-08");
        let timeline = build_timeline(&record);
        assert_eq!(
            timeline.stage(Stage::Dispatched).unwrap().duration.as_deref(),
            Some("-2 dias")
        );
        assert_eq!(timeline.total_elapsed_days, Some(3 - 2 + 9));
    }

    #[test]
    fn test_caption() {
        let timeline = build_timeline(&sample());
        assert_eq!(
            timeline.stage(Stage::Delivered).unwrap().caption(),
            "19/01/2024 • ⏱️ 7 dias úteis"
        );
    }

    #[test]
    fn test_oversized_billing_days_leave_total_unset() {
        let mut record = sample();
        record.billing_days = Some(1e300);
        let timeline = build_timeline(&record);
        assert_eq!(timeline.total_elapsed_days, None);
        assert_eq!(
            timeline.stage(Stage::Dispatched).unwrap().duration.as_deref(),
            Some("2 dias")
        );
    }
}
