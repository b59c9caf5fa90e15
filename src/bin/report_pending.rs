//! Pending shipments: never delivered, or delivered after the promised date
//! Run: ./target/release/report_pending --file data/base.xlsx [--csv pending.csv]

use anyhow::{Context, Result};
use clap::Parser;
use freight_sla::config::{ConfigArgs, FilterArgs};
use freight_sla::display::format_count;
use freight_sla::{logging, DashboardConfig, DashboardSession, DeliveryOutcome};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "report_pending")]
#[command(about = "List undelivered and late shipments")]
struct Args {
    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Rows to print (the CSV always gets all of them)
    #[arg(long, default_value = "20")]
    limit: usize,

    /// Also write every pending shipment to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut session = DashboardSession::open(&args.filters.file, DashboardConfig::from(args.config))
        .with_context(|| format!("failed to load {}", args.filters.file.display()))?;
    session.set_filters(args.filters.selection());

    let report = session.pending();

    println!("\n{}", "=".repeat(80));
    println!("                           PENDING MANAGEMENT");
    println!("{}\n", "=".repeat(80));

    if report.is_empty() {
        println!("No pending shipments in the current selection.");
        return Ok(());
    }

    println!("  No delivery date:     {}", format_count(report.undelivered.len() as u64));
    println!("  Delivered late:       {}", format_count(report.delivered_late.len() as u64));
    println!("  Total:                {}", format_count(report.total() as u64));

    println!("\nBY CARRIER");
    println!("{}", "-".repeat(50));
    for (carrier, count) in &report.by_carrier {
        println!("  {:36} {:>8}", carrier, format_count(*count as u64));
    }

    let rows = report.rows();
    println!("\nSHIPMENTS (first {})", args.limit.min(rows.len()));
    println!("{}", "-".repeat(80));
    println!("  {:12} {:24} {:>12} {:>12}  {}", "Invoice", "Carrier", "Forecast", "Delivered", "Situation");
    for row in rows.iter().take(args.limit) {
        let situation = match row.outcome {
            DeliveryOutcome::Undelivered => "no delivery date",
            DeliveryOutcome::Late => "late",
            DeliveryOutcome::OnTime | DeliveryOutcome::NoForecast => "",
        };
        println!(
            "  {:12} {:24} {:>12} {:>12}  {}",
            row.invoice_number,
            row.carrier.as_deref().unwrap_or("N/A"),
            row.expected_delivery,
            row.delivery_date,
            situation
        );
    }
    println!();

    if let Some(path) = &args.csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("Wrote {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}
