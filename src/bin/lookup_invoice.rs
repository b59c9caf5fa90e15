//! Invoice lookup with the delivery timeline
//! Run: ./target/release/lookup_invoice --file data/base.xlsx 123456
//!
//! The global filters do not apply: every record of the workbook is searched.

use anyhow::{Context, Result};
use clap::Parser;
use freight_sla::config::ConfigArgs;
use freight_sla::lookup::InvoiceDetail;
use freight_sla::{logging, DashboardConfig, DashboardSession};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lookup_invoice")]
#[command(about = "Find invoices by number and show their delivery timeline")]
struct Args {
    /// Full or partial invoice number
    query: String,

    /// Path to the .xlsx/.xls export
    #[arg(long, short = 'f', default_value = "data/base.xlsx")]
    file: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn print_detail(detail: &InvoiceDetail) {
    println!("\n{}", "=".repeat(64));
    println!("  Nota Fiscal: {}", detail.invoice_number);
    println!("{}", "=".repeat(64));
    println!("  Unid. Negócio:   {:20} Romaneio:      {}", detail.business_unit, detail.manifest_number);
    println!("  Transportador:   {:20} Status:        {}", detail.carrier, detail.status);
    println!("  Lead Time:       {:20} Tempo total:   {}", detail.lead_time, detail.total_time);
    println!();
    println!("  Implantação:     {}", detail.order_placed);
    println!("  Nota Fiscal:     {}", detail.invoice_date);
    println!("  Saída:           {}", detail.dispatch_date);
    println!("  Previsão:        {}", detail.expected_delivery);
    println!("  Entrega:         {}", detail.delivery_date);

    println!("\n  TIMELINE");
    println!("  {}", "-".repeat(60));
    for stage in &detail.timeline.stages {
        let marker = if stage.completed { "[x]" } else { "[ ]" };
        println!("  {} {:24} {}", marker, stage.title, stage.caption());
    }
    if let Some(total) = detail.timeline.total_elapsed_days {
        println!("\n  Total elapsed: {} days", total);
    }
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let session = DashboardSession::open(&args.file, DashboardConfig::from(args.config))
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let hits = session.lookup(&args.query);
    if hits.is_empty() {
        println!("No invoice found matching '{}'.", args.query);
        return Ok(());
    }

    println!("{} invoice(s) found for '{}'", hits.len(), args.query);
    for detail in &hits {
        print_detail(detail);
    }
    println!();

    Ok(())
}
