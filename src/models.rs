use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::DateCell;

/// Columns of the "Base" sheet that the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    InvoiceNumber,
    BusinessUnit,
    Carrier,
    DestState,
    Region,
    Status,
    Occurrence,
    OrderPlaced,
    InvoiceDate,
    DispatchDate,
    ExpectedDelivery,
    DeliveryDate,
    BillingDays,
    LeadTime,
    InvoiceValue,
    GrossWeight,
    WeightBracket,
    InvoiceMonth,
    ManifestNumber,
}

impl Column {
    pub const ALL: [Column; 19] = [
        Column::InvoiceNumber,
        Column::BusinessUnit,
        Column::Carrier,
        Column::DestState,
        Column::Region,
        Column::Status,
        Column::Occurrence,
        Column::OrderPlaced,
        Column::InvoiceDate,
        Column::DispatchDate,
        Column::ExpectedDelivery,
        Column::DeliveryDate,
        Column::BillingDays,
        Column::LeadTime,
        Column::InvoiceValue,
        Column::GrossWeight,
        Column::WeightBracket,
        Column::InvoiceMonth,
        Column::ManifestNumber,
    ];

    /// Header text as it appears in the exported sheet.
    pub fn header(&self) -> &'static str {
        match self {
            Column::InvoiceNumber => "Numero",
            Column::BusinessUnit => "Unid Negoc",
            Column::Carrier => "Transportador",
            Column::DestState => "Estado Destino",
            Column::Region => "Região",
            Column::Status => "Status",
            Column::Occurrence => "Ocorrência",
            Column::OrderPlaced => "Dt Implant Ped",
            Column::InvoiceDate => "Dt Nota Fiscal",
            Column::DispatchDate => "Data de Saída",
            Column::ExpectedDelivery => "Previsão de Entrega",
            Column::DeliveryDate => "Data de Entrega",
            Column::BillingDays => "Dias Faturamento",
            Column::LeadTime => "Lead Time",
            Column::InvoiceValue => "Valor NF",
            Column::GrossWeight => "Peso Bruto NF",
            Column::WeightBracket => "Faixa de Peso",
            Column::InvoiceMonth => "Mês Nota",
            Column::ManifestNumber => "Nr Romaneio",
        }
    }

    /// Resolve a sheet header, ignoring whitespace, letter case and accents
    /// (`Previsão de Entrega` and `PrevisaoDeEntrega` are the same column).
    pub fn from_header(header: &str) -> Option<Column> {
        let wanted = normalize_header(header);
        Column::ALL
            .into_iter()
            .find(|c| normalize_header(c.header()) == wanted)
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' => 'a',
        'é' | 'ê' => 'e',
        'í' => 'i',
        'ó' | 'ô' | 'õ' => 'o',
        'ú' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// Columns checked when a workbook is loaded; missing ones are reported, not fatal.
pub const ESSENTIAL_COLUMNS: [Column; 7] = [
    Column::InvoiceNumber,
    Column::Status,
    Column::Carrier,
    Column::DeliveryDate,
    Column::ExpectedDelivery,
    Column::InvoiceDate,
    Column::BusinessUnit,
];

/// One row of the "Base" sheet, resolved into typed fields at load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShipmentRecord {
    /// 0-based data row index in the source sheet (header excluded).
    pub row: usize,
    pub invoice_number: String,
    pub business_unit: Option<String>,
    pub carrier: Option<String>,
    pub dest_state: Option<String>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub occurrence: Option<String>,
    pub order_placed: DateCell,
    pub invoice_date: DateCell,
    pub dispatch_date: DateCell,
    pub expected_delivery: DateCell,
    pub delivery_date: DateCell,
    pub billing_days: Option<f64>,
    pub lead_time: Option<f64>,
    pub invoice_value: Option<f64>,
    pub gross_weight: Option<f64>,
    pub weight_bracket: Option<String>,
    pub invoice_month: Option<String>,
    pub manifest_number: Option<String>,
}

/// SLA classification of a single shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Delivered on or before the promised date.
    OnTime,
    /// Delivered after the promised date.
    Late,
    /// No usable delivery date yet.
    Undelivered,
    /// Delivered, but there is no usable promised date to compare against.
    NoForecast,
}

impl ShipmentRecord {
    pub fn delivery_outcome(&self) -> DeliveryOutcome {
        let Some(delivered) = self.delivery_date.parsed() else {
            return DeliveryOutcome::Undelivered;
        };
        match self.expected_delivery.parsed() {
            Some(expected) if delivered <= expected => DeliveryOutcome::OnTime,
            Some(_) => DeliveryOutcome::Late,
            None => DeliveryOutcome::NoForecast,
        }
    }

    pub fn invoice_day(&self) -> Option<NaiveDate> {
        self.invoice_date.date()
    }
}

/// Categorical axes the dashboard ranks and groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Carrier,
    State,
    Region,
    Status,
    Occurrence,
    WeightBracket,
    BusinessUnit,
    Month,
}

impl Dimension {
    /// The record's value on this axis; blank text never reaches here (see loader).
    pub fn value<'a>(&self, record: &'a ShipmentRecord) -> Option<&'a str> {
        let value = match self {
            Dimension::Carrier => &record.carrier,
            Dimension::State => &record.dest_state,
            Dimension::Region => &record.region,
            Dimension::Status => &record.status,
            Dimension::Occurrence => &record.occurrence,
            Dimension::WeightBracket => &record.weight_bracket,
            Dimension::BusinessUnit => &record.business_unit,
            Dimension::Month => &record.invoice_month,
        };
        value.as_deref()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Carrier => "carrier",
            Dimension::State => "state",
            Dimension::Region => "region",
            Dimension::Status => "status",
            Dimension::Occurrence => "occurrence",
            Dimension::WeightBracket => "weight-bracket",
            Dimension::BusinessUnit => "business-unit",
            Dimension::Month => "month",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carrier" => Ok(Dimension::Carrier),
            "state" => Ok(Dimension::State),
            "region" => Ok(Dimension::Region),
            "status" => Ok(Dimension::Status),
            "occurrence" => Ok(Dimension::Occurrence),
            "weight-bracket" => Ok(Dimension::WeightBracket),
            "business-unit" => Ok(Dimension::BusinessUnit),
            "month" => Ok(Dimension::Month),
            other => Err(format!("unknown dimension '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(delivery: &str, expected: &str) -> ShipmentRecord {
        ShipmentRecord {
            delivery_date: DateCell::from_text(delivery),
            expected_delivery: DateCell::from_text(expected),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_resolution_ignores_spacing_and_case() {
        assert_eq!(Column::from_header("Dt Nota Fiscal"), Some(Column::InvoiceDate));
        assert_eq!(Column::from_header("DtNotaFiscal"), Some(Column::InvoiceDate));
        assert_eq!(Column::from_header(" lead time "), Some(Column::LeadTime));
        assert_eq!(Column::from_header("MêsNota"), Some(Column::InvoiceMonth));
        assert_eq!(Column::from_header("DataDeSaida"), Some(Column::DispatchDate));
        assert_eq!(Column::from_header("PrevisaoDeEntrega"), Some(Column::ExpectedDelivery));
        assert_eq!(Column::from_header("Observação"), None);
    }

    #[test]
    fn test_delivery_outcome() {
        assert_eq!(record("2024-01-19", "2024-01-20").delivery_outcome(), DeliveryOutcome::OnTime);
        assert_eq!(record("2024-01-20", "2024-01-20").delivery_outcome(), DeliveryOutcome::OnTime);
        assert_eq!(record("2024-01-21", "2024-01-20").delivery_outcome(), DeliveryOutcome::Late);
        assert_eq!(record("", "2024-01-20").delivery_outcome(), DeliveryOutcome::Undelivered);
        assert_eq!(record("em rota", "2024-01-20").delivery_outcome(), DeliveryOutcome::Undelivered);
        assert_eq!(record("2024-01-21", "").delivery_outcome(), DeliveryOutcome::NoForecast);
    }

    #[test]
    fn test_dimension_round_trips_through_path_names() {
        for dim in [Dimension::Carrier, Dimension::WeightBracket, Dimension::BusinessUnit] {
            assert_eq!(dim.as_str().parse::<Dimension>(), Ok(dim));
        }
        assert!("lane".parse::<Dimension>().is_err());
    }
}
