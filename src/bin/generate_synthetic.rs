//! Synthetic shipment workbook generator
//!
//! Writes a "Base" sheet with the columns of the real export, for demos and
//! manual testing of the dashboard.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --rows <N>          Shipments to generate (default: 2000)
//!   --start <DATE>      First invoice date (default: 2024-01-01)
//!   --days <N>          Invoice dates spread over this many days (default: 365)
//!   --undelivered <F>   Share of shipments without delivery (default: 0.08)
//!   --late <F>          Share of delivered shipments that arrive late (default: 0.12)
//!   --seed <N>          Random seed for reproducibility (optional)
//!   --output <PATH>     Output workbook (default: data/base.xlsx)

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::Parser;
use freight_sla::calendar::month_label;
use freight_sla::config::DEFAULT_SHEET_NAME;
use freight_sla::models::Column;
use rand::prelude::*;
use rand::rngs::StdRng;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic shipment workbook")]
struct Args {
    /// Number of shipments
    #[arg(long, default_value = "2000")]
    rows: u32,

    /// First invoice date
    #[arg(long, default_value = "2024-01-01")]
    start: NaiveDate,

    /// Invoice dates are spread over this many days
    #[arg(long, default_value = "365")]
    days: i64,

    /// Probability that a shipment has no delivery yet
    #[arg(long, default_value = "0.08")]
    undelivered: f64,

    /// Probability that a delivered shipment is late
    #[arg(long, default_value = "0.12")]
    late: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output workbook path
    #[arg(long, default_value = "data/base.xlsx")]
    output: PathBuf,
}

const CARRIERS: [(&str, u32); 8] = [
    ("BRASPRESS TRANSPORTES URGENTES", 30),
    ("JADLOG LOGISTICA", 20),
    ("PATRUS TRANSPORTES", 15),
    ("RODONAVES TRANSPORTES E ENCOMENDAS", 12),
    ("TNT MERCURIO CARGAS", 10),
    ("ATUAL CARGAS", 6),
    ("EXPRESSO SAO MIGUEL", 5),
    ("TRANSPORTADORA PEQUENA LTDA", 2),
];

const STATES: [(&str, &str, u32); 10] = [
    ("SP", "SUDESTE", 35),
    ("MG", "SUDESTE", 14),
    ("RJ", "SUDESTE", 10),
    ("PR", "SUL", 9),
    ("RS", "SUL", 8),
    ("SC", "SUL", 6),
    ("BA", "NORDESTE", 6),
    ("PE", "NORDESTE", 4),
    ("GO", "CENTRO-OESTE", 5),
    ("AM", "NORTE", 3),
];

const BUSINESS_UNITS: [(&str, u32); 6] = [
    ("010", 40),
    ("020", 30),
    ("030", 20),
    ("070", 4),
    ("080", 3),
    ("720", 3),
];

const OCCURRENCES: [&str; 4] = [
    "CLIENTE AUSENTE",
    "ENDERECO NAO LOCALIZADO",
    "AVARIA NA MERCADORIA",
    "RECUSA DO DESTINATARIO",
];

const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

fn pick<'a, T>(items: &'a [T], weight: impl Fn(&T) -> u32, rng: &mut impl Rng) -> &'a T {
    let total: u32 = items.iter().map(&weight).sum();
    let mut roll = rng.gen_range(0..total);
    for item in items {
        let w = weight(item);
        if roll < w {
            return item;
        }
        roll -= w;
    }
    &items[items.len() - 1]
}

fn add_business_days(mut date: NaiveDate, days: i64) -> NaiveDate {
    let mut remaining = days;
    while remaining > 0 {
        date += Duration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2)
        .unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

fn weight_bracket(weight: f64) -> &'static str {
    match weight {
        w if w <= 10.0 => "ATE 10 KG",
        w if w <= 50.0 => "11 A 50 KG",
        w if w <= 200.0 => "51 A 200 KG",
        w if w <= 1000.0 => "201 A 1000 KG",
        _ => "ACIMA DE 1000 KG",
    }
}

struct Shipment {
    invoice_number: u32,
    business_unit: &'static str,
    carrier: &'static str,
    state: &'static str,
    region: &'static str,
    status: &'static str,
    occurrence: Option<&'static str>,
    order_placed: NaiveDate,
    invoice_date: NaiveDate,
    dispatch_date: Option<NaiveDate>,
    expected_delivery: NaiveDate,
    delivery_date: Option<NaiveDate>,
    billing_days: i64,
    lead_time: i64,
    invoice_value: f64,
    gross_weight: f64,
    manifest_number: u32,
}

fn generate_shipment(index: u32, args: &Args, rng: &mut impl Rng) -> Shipment {
    let invoice_date = args.start + Duration::days(rng.gen_range(0..args.days.max(1)));
    let billing_days = rng.gen_range(0..=4);
    let order_placed = invoice_date - Duration::days(billing_days);
    let lead_time = rng.gen_range(2..=10);
    let expected_delivery = add_business_days(invoice_date, lead_time);

    let undelivered = rng.gen_bool(args.undelivered.clamp(0.0, 1.0));
    let dispatch_date = if undelivered && rng.gen_bool(0.3) {
        None
    } else {
        Some(invoice_date + Duration::days(rng.gen_range(0..=3)))
    };

    let delivery_date = if undelivered {
        None
    } else if rng.gen_bool(args.late.clamp(0.0, 1.0)) {
        Some(expected_delivery + Duration::days(rng.gen_range(1..=7)))
    } else {
        let earliest = dispatch_date.unwrap_or(invoice_date);
        let slack = (expected_delivery - earliest).num_days().max(0);
        Some(expected_delivery - Duration::days(rng.gen_range(0..=slack.min(3))))
    };

    let status = match (delivery_date, dispatch_date) {
        (Some(_), _) => "ENTREGUE",
        (None, Some(_)) => "EM TRANSITO",
        (None, None) => "AGUARDANDO COLETA",
    };
    let occurrence = if rng.gen_bool(0.1) {
        OCCURRENCES.choose(rng).copied()
    } else {
        None
    };

    let (state, region, _) = *pick(&STATES, |s| s.2, rng);
    let gross_weight = (rng.gen::<f64>().powi(3) * 2500.0 + 0.5).round();

    Shipment {
        invoice_number: 100_000 + index,
        business_unit: pick(&BUSINESS_UNITS, |b| b.1, rng).0,
        carrier: pick(&CARRIERS, |c| c.1, rng).0,
        state,
        region,
        status,
        occurrence,
        order_placed,
        invoice_date,
        dispatch_date,
        expected_delivery,
        delivery_date,
        billing_days,
        lead_time,
        invoice_value: (gross_weight * rng.gen_range(8.0..40.0) * 100.0).round() / 100.0,
        gross_weight,
        manifest_number: rng.gen_range(10_000..99_999),
    }
}

fn write_date(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<NaiveDate>,
    date_format: &Format,
) -> Result<(), XlsxError> {
    if let Some(d) = value {
        sheet.write_number_with_format(row, col, excel_serial(d), date_format)?;
    }
    Ok(())
}

fn write_row(sheet: &mut Worksheet, row: u32, s: &Shipment, date_format: &Format) -> Result<(), XlsxError> {
    for (col, column) in Column::ALL.iter().enumerate() {
        let col = col as u16;
        match column {
            Column::InvoiceNumber => {
                sheet.write_number(row, col, s.invoice_number as f64)?;
            }
            Column::BusinessUnit => {
                sheet.write_string(row, col, s.business_unit)?;
            }
            Column::Carrier => {
                sheet.write_string(row, col, s.carrier)?;
            }
            Column::DestState => {
                sheet.write_string(row, col, s.state)?;
            }
            Column::Region => {
                sheet.write_string(row, col, s.region)?;
            }
            Column::Status => {
                sheet.write_string(row, col, s.status)?;
            }
            Column::Occurrence => {
                if let Some(text) = s.occurrence {
                    sheet.write_string(row, col, text)?;
                }
            }
            Column::OrderPlaced => write_date(sheet, row, col, Some(s.order_placed), date_format)?,
            Column::InvoiceDate => write_date(sheet, row, col, Some(s.invoice_date), date_format)?,
            Column::DispatchDate => write_date(sheet, row, col, s.dispatch_date, date_format)?,
            Column::ExpectedDelivery => write_date(sheet, row, col, Some(s.expected_delivery), date_format)?,
            Column::DeliveryDate => write_date(sheet, row, col, s.delivery_date, date_format)?,
            Column::BillingDays => {
                sheet.write_number(row, col, s.billing_days as f64)?;
            }
            Column::LeadTime => {
                sheet.write_number(row, col, s.lead_time as f64)?;
            }
            Column::InvoiceValue => {
                sheet.write_number(row, col, s.invoice_value)?;
            }
            Column::GrossWeight => {
                sheet.write_number(row, col, s.gross_weight)?;
            }
            Column::WeightBracket => {
                sheet.write_string(row, col, weight_bracket(s.gross_weight))?;
            }
            Column::InvoiceMonth => {
                if let Some(label) = month_label(s.invoice_date.month()) {
                    sheet.write_string(row, col, label)?;
                }
            }
            Column::ManifestNumber => {
                sheet.write_number(row, col, s.manifest_number as f64)?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Synthetic Shipment Workbook");
    println!("{}", "=".repeat(60));
    println!("Output:       {}", args.output.display());
    println!("Rows:         {}", args.rows);
    println!("Period:       {} + {} days", args.start, args.days);
    println!("Undelivered:  {:.1}%", args.undelivered * 100.0);
    println!("Late:         {:.1}%", args.late * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:  {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    let sheet = workbook.add_worksheet();
    sheet.set_name(DEFAULT_SHEET_NAME)?;
    for (col, column) in Column::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, column.header(), &header_format)?;
    }

    let (mut undelivered, mut late) = (0, 0);
    for i in 0..args.rows {
        let shipment = generate_shipment(i, &args, &mut rng);
        match shipment.delivery_date {
            None => undelivered += 1,
            Some(d) if d > shipment.expected_delivery => late += 1,
            Some(_) => {}
        }
        write_row(sheet, i + 1, &shipment, &date_format)?;
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    workbook
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Generated {} shipments ({} undelivered, {} late)", args.rows, undelivered, late);
    println!("Saved to {}", args.output.display());

    Ok(())
}
