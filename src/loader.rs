//! Workbook loading
//!
//! Reads the shipment sheet of an Excel export into [`ShipmentRecord`]s.
//! Only file-level problems fail the load; a bad cell becomes an absent value
//! and is logged at debug level.

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::calendar::DateCell;
use crate::display::format_integral;
use crate::models::{Column, ShipmentRecord};

const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: '{0}' (expected .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFormat(String),

    #[error("workbook could not be read: {0}")]
    Workbook(String),

    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("sheet '{0}' has no header row")]
    EmptySheet(String),
}

/// The parsed shipment sheet.
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub sheet_name: String,
    /// Header cells in sheet order, as written in the file.
    pub headers: Vec<String>,
    pub records: Vec<ShipmentRecord>,
}

impl LoadedTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.headers.iter().any(|h| Column::from_header(h) == Some(column))
    }
}

/// Load `sheet` from a workbook on disk.
pub fn load_workbook(path: impl AsRef<Path>, sheet: &str) -> Result<LoadedTable, LoadError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(LoadError::UnsupportedFormat(ext));
    }

    info!("Loading workbook {}", path.display());
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;
    read_sheet(&mut workbook, sheet)
}

/// Load `sheet` from an uploaded workbook held in memory. The format is sniffed
/// from the content.
pub fn load_workbook_bytes(bytes: Vec<u8>, sheet: &str) -> Result<LoadedTable, LoadError> {
    info!("Loading uploaded workbook ({} bytes)", bytes.len());
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| LoadError::Workbook(e.to_string()))?;
    read_sheet(&mut workbook, sheet)
}

fn read_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>, sheet: &str) -> Result<LoadedTable, LoadError> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoadError::SheetNotFound(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| LoadError::EmptySheet(sheet.to_string()))?;
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string().trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptySheet(sheet.to_string()));
    }

    let layout = ColumnLayout::new(&headers);
    let records: Vec<ShipmentRecord> = rows
        .enumerate()
        .filter(|(_, cells)| !cells.iter().all(|c| matches!(c, Data::Empty)))
        .map(|(row, cells)| layout.record(row, cells))
        .collect();

    info!(
        "Loaded {} records and {} columns from sheet '{}'",
        records.len(),
        headers.len(),
        sheet
    );

    Ok(LoadedTable {
        sheet_name: sheet.to_string(),
        headers,
        records,
    })
}

/// Where each known column sits in the sheet.
struct ColumnLayout {
    positions: Vec<(Column, usize)>,
}

impl ColumnLayout {
    fn new(headers: &[String]) -> Self {
        let mut positions: Vec<(Column, usize)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let Some(column) = Column::from_header(header) else { continue };
            if positions.iter().any(|(c, _)| *c == column) {
                debug!("Duplicate header '{}' at column {} ignored", header, idx);
                continue;
            }
            positions.push((column, idx));
        }
        Self { positions }
    }

    fn cell<'a>(&self, cells: &'a [Data], column: Column) -> &'a Data {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, idx)| cells.get(*idx))
            .unwrap_or(&Data::Empty)
    }

    fn record(&self, row: usize, cells: &[Data]) -> ShipmentRecord {
        let row_cells = RowCells { layout: self, cells, row };

        ShipmentRecord {
            row,
            invoice_number: row_cells.text(Column::InvoiceNumber).unwrap_or_default(),
            business_unit: row_cells.text(Column::BusinessUnit),
            carrier: row_cells.text(Column::Carrier),
            dest_state: row_cells.text(Column::DestState),
            region: row_cells.text(Column::Region),
            status: row_cells.text(Column::Status),
            occurrence: row_cells.text(Column::Occurrence),
            order_placed: row_cells.date(Column::OrderPlaced),
            invoice_date: row_cells.date(Column::InvoiceDate),
            dispatch_date: row_cells.date(Column::DispatchDate),
            expected_delivery: row_cells.date(Column::ExpectedDelivery),
            delivery_date: row_cells.date(Column::DeliveryDate),
            billing_days: row_cells.number(Column::BillingDays),
            lead_time: row_cells.number(Column::LeadTime),
            invoice_value: row_cells.number(Column::InvoiceValue),
            gross_weight: row_cells.number(Column::GrossWeight),
            weight_bracket: row_cells.text(Column::WeightBracket),
            invoice_month: row_cells.text(Column::InvoiceMonth),
            manifest_number: row_cells.text(Column::ManifestNumber),
        }
    }
}

struct RowCells<'a> {
    layout: &'a ColumnLayout,
    cells: &'a [Data],
    row: usize,
}

impl RowCells<'_> {
    fn text(&self, column: Column) -> Option<String> {
        cell_text(self.layout.cell(self.cells, column))
    }

    fn number(&self, column: Column) -> Option<f64> {
        let cell = self.layout.cell(self.cells, column);
        let value = cell_number(cell);
        if value.is_none() && !is_blank(cell) {
            debug!(row = self.row, column = column.header(), "non-numeric value '{}' ignored", cell);
        }
        value
    }

    fn date(&self, column: Column) -> DateCell {
        let value = cell_date(self.layout.cell(self.cells, column));
        if let DateCell::Unparseable(raw) = &value {
            debug!(row = self.row, column = column.header(), "unparseable date '{}'", raw);
        }
        value
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text form of a cell. Whole numbers print without a decimal part, so an
/// invoice number stored as `123456.0` reads back as `123456`.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Float(f) => Some(format_integral(*f)),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => {
            let s = s.trim();
            s.parse::<f64>()
                .or_else(|_| s.replace(',', ".").parse::<f64>())
                .ok()
                .filter(|v| v.is_finite())
        }
        _ => None,
    }
}

pub fn cell_date(cell: &Data) -> DateCell {
    match cell {
        Data::Empty => DateCell::Missing,
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(DateCell::Parsed)
            .unwrap_or_else(|| DateCell::from_excel_serial(dt.as_f64())),
        Data::Float(f) => DateCell::from_excel_serial(*f),
        Data::Int(i) => DateCell::from_excel_serial(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => DateCell::from_text(s),
        other => DateCell::Unparseable(other.to_string()),
    }
}
