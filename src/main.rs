//! Load a shipment workbook and log what the dashboard would show.
//!
//! Usage:
//!   freight_sla --file data/base.xlsx [--bu 010,020] [--carrier NAME] [--from YYYY-MM-DD] [--to YYYY-MM-DD]

use anyhow::{Context, Result};
use clap::Parser;
use freight_sla::config::{ConfigArgs, FilterArgs};
use freight_sla::{logging, DashboardConfig, DashboardSession, Dimension};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "freight_sla")]
#[command(about = "Load a shipment export and summarise delivery performance")]
struct Args {
    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let config = DashboardConfig::from(args.config);
    let mut session = DashboardSession::open(&args.filters.file, config)
        .with_context(|| format!("failed to load {}", args.filters.file.display()))?;

    let preview = session.preview();
    info!(
        "Loaded {} records, {} columns, period {}",
        preview.total_records, preview.column_count, preview.period
    );
    if !preview.is_complete() {
        warn!("Missing essential columns: {}", preview.columns_missing.join(", "));
    }

    session.set_filters(args.filters.selection());
    let summary = session.filter_summary();
    if summary.is_empty {
        warn!("No records match the selected filters");
        return Ok(());
    }

    let overview = session.overview();
    let sla = overview.sla;
    info!(
        "SLA {:.1}% ({} on time of {} evaluated) - {}",
        sla.summary.rate_percent,
        sla.summary.on_time,
        sla.summary.evaluated,
        sla.band.label()
    );

    for dimension in [Dimension::Carrier, Dimension::State] {
        let ranking = session.ranking(dimension, Some(3));
        if let Some(leader) = ranking.leader() {
            info!("Top {}: {} ({:.1}%)", dimension, leader.label, leader.percent);
        }
    }

    let pending = session.pending();
    info!(
        "Pending: {} undelivered, {} delivered late",
        pending.undelivered.len(),
        pending.delivered_late.len()
    );

    Ok(())
}
