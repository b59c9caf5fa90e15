//! SLA attainment per carrier
//! Run: ./target/release/report_carriers --file data/base.xlsx [--csv carriers.csv]

use anyhow::{Context, Result};
use clap::Parser;
use freight_sla::config::{ConfigArgs, FilterArgs};
use freight_sla::metrics::PerformanceBand;
use freight_sla::{logging, DashboardConfig, DashboardSession};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "report_carriers")]
#[command(about = "On-time performance per carrier")]
struct Args {
    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Also write the table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut session = DashboardSession::open(&args.filters.file, DashboardConfig::from(args.config))
        .with_context(|| format!("failed to load {}", args.filters.file.display()))?;
    session.set_filters(args.filters.selection());

    let min = session.config().min_carrier_deliveries;
    let table = session.carrier_attainment();

    println!("\n{}", "=".repeat(72));
    println!("                     SLA BY CARRIER (min {} deliveries)", min);
    println!("{}\n", "=".repeat(72));

    if table.is_empty() {
        println!("No carrier has at least {} evaluated deliveries.", min);
        return Ok(());
    }

    println!("  {:32} {:>8} {:>8} {:>8} {:>8}  {}", "Carrier", "On time", "Late", "Total", "SLA %", "Band");
    println!("  {}", "-".repeat(76));
    for row in &table {
        println!(
            "  {:32} {:>8} {:>8} {:>8} {:>7.1}%  {}",
            row.carrier,
            row.on_time,
            row.late,
            row.total,
            row.sla_percent,
            PerformanceBand::from_rate(row.sla_percent).label()
        );
    }
    println!();

    if let Some(path) = &args.csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        for row in &table {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("Wrote {} rows to {}", table.len(), path.display());
    }

    Ok(())
}
