//! Invoice lookup
//!
//! Searches the unfiltered table: the global filters never hide an invoice
//! from a direct lookup.

use serde::Serialize;

use crate::models::ShipmentRecord;
use crate::timeline::{build_timeline, DeliveryTimeline};

/// Records whose invoice number contains `query`, case-insensitively, in table order.
/// The query is matched as typed; an empty query matches nothing.
pub fn find_invoices<'a>(records: &'a [ShipmentRecord], query: &str) -> Vec<&'a ShipmentRecord> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|r| r.invoice_number.to_lowercase().contains(&needle))
        .collect()
}

/// Detail card shown for one looked-up invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetail {
    pub invoice_number: String,
    pub business_unit: String,
    pub manifest_number: String,
    pub carrier: String,
    pub status: String,
    /// `"N dias"` from `Lead Time`, or `N/A`.
    pub lead_time: String,
    /// `"N dias"` from the timeline total, or `N/A`.
    pub total_time: String,
    pub order_placed: String,
    pub invoice_date: String,
    pub dispatch_date: String,
    pub expected_delivery: String,
    pub delivery_date: String,
    pub timeline: DeliveryTimeline,
}

const NOT_AVAILABLE: &str = "N/A";

fn text_or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn days_or_na(days: Option<i64>) -> String {
    days.map(|d| format!("{} dias", d))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl InvoiceDetail {
    pub fn from_record(record: &ShipmentRecord) -> Self {
        let timeline = build_timeline(record);

        Self {
            invoice_number: record.invoice_number.clone(),
            business_unit: text_or_na(&record.business_unit),
            manifest_number: text_or_na(&record.manifest_number),
            carrier: text_or_na(&record.carrier),
            status: text_or_na(&record.status),
            lead_time: days_or_na(record.lead_time.map(|d| d.trunc() as i64)),
            total_time: days_or_na(timeline.total_elapsed_days),
            order_placed: record.order_placed.detail_format(),
            invoice_date: record.invoice_date.detail_format(),
            dispatch_date: record.dispatch_date.detail_format(),
            expected_delivery: record.expected_delivery.detail_format(),
            delivery_date: record.delivery_date.detail_format(),
            timeline,
        }
    }
}

/// Lookup plus detail rendering for every hit.
pub fn lookup_invoices(records: &[ShipmentRecord], query: &str) -> Vec<InvoiceDetail> {
    find_invoices(records, query)
        .into_iter()
        .map(InvoiceDetail::from_record)
        .collect()
}
