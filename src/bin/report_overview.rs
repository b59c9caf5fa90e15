//! Dashboard overview as a terminal report
//! Run: ./target/release/report_overview --file data/base.xlsx

use anyhow::{Context, Result};
use clap::Parser;
use freight_sla::chart::axis_label;
use freight_sla::config::{ConfigArgs, FilterArgs};
use freight_sla::display::{format_count, format_currency, format_mean_weight, format_weight};
use freight_sla::metrics::Ranking;
use freight_sla::{logging, DashboardConfig, DashboardSession, Dimension};

#[derive(Parser, Debug)]
#[command(name = "report_overview")]
#[command(about = "Print totals, SLA gauge, rankings and monthly volume")]
struct Args {
    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    config: ConfigArgs,
}

fn print_ranking(title: &str, ranking: &Ranking) {
    println!("\n{}", title);
    println!("{}", "-".repeat(60));
    if ranking.entries.is_empty() {
        println!("  (no data)");
        return;
    }
    for (i, entry) in ranking.entries.iter().enumerate() {
        println!(
            "  {:>2}. {:32} {:>8} {:>7.1}%",
            i + 1,
            axis_label(&entry.label),
            format_count(entry.count as u64),
            entry.percent
        );
    }
    println!("  Top 3 share: {:.1}%", ranking.top_share(3));
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut session = DashboardSession::open(&args.filters.file, DashboardConfig::from(args.config))
        .with_context(|| format!("failed to load {}", args.filters.file.display()))?;
    for warning in session.set_filters(args.filters.selection()) {
        println!("Note: {}", warning);
    }

    println!("\n{}", "=".repeat(60));
    println!("                 DELIVERY PERFORMANCE OVERVIEW");
    println!("{}\n", "=".repeat(60));

    let summary = session.filter_summary();
    println!("Records:    {} of {}", format_count(summary.filtered_records as u64), format_count(summary.total_records as u64));
    if let Some(period) = &summary.period {
        println!("Period:     {}", period);
    }
    if let Some(bus) = &summary.business_units {
        println!("BUs:        {}", bus);
    }
    if let Some(carriers) = &summary.carriers {
        println!("Carriers:   {}", carriers);
    }
    if summary.is_empty {
        println!("\nNo records match the selected filters.");
        return Ok(());
    }

    let ov = session.overview();
    println!("\nKEY FIGURES");
    println!("{}", "-".repeat(60));
    println!("  Invoices:            {}", format_count(ov.total_invoices as u64));
    println!("  Gross weight:        {}", format_weight(ov.total_weight));
    println!("  Mean weight:         {}", format_mean_weight(ov.mean_weight));
    println!("  Invoice value:       {}", format_currency(ov.total_value));
    match ov.mean_lead_time {
        Some(lt) => println!("  Mean lead time:      {:.1} days", lt),
        None => println!("  Mean lead time:      N/A"),
    }
    println!("  Carriers:            {}", ov.carrier_count);
    println!("  Destination states:  {}", ov.state_count);
    if let Some(ci) = ov.concentration_index {
        println!("  Concentration index: {:.1}%", ci);
    }

    let gauge = ov.sla;
    println!("\nSLA");
    println!("{}", "-".repeat(60));
    println!(
        "  Attainment: {:.1}% ({}) - target {:.0}%",
        gauge.summary.rate_percent,
        gauge.band.label(),
        gauge.target_percent
    );
    println!(
        "  On time: {}   Late: {}   Evaluated: {}",
        gauge.summary.on_time, gauge.summary.late, gauge.summary.evaluated
    );
    match (gauge.gap_percent, gauge.margin_percent) {
        (Some(gap), _) => println!(
            "  Gap: {:.1} points (~{} deliveries to recover)",
            gap, gauge.deliveries_to_recover
        ),
        (None, Some(margin)) => println!("  Margin above target: {:.1} points", margin),
        (None, None) => {}
    }

    let limit = session.config().ranking_limit;
    print_ranking("TOP CARRIERS", &session.ranking(Dimension::Carrier, Some(limit)));
    print_ranking("TOP DESTINATION STATES", &session.ranking(Dimension::State, Some(limit)));
    print_ranking("STATUS", &session.ranking(Dimension::Status, Some(limit)));
    print_ranking("OCCURRENCES", &session.ranking(Dimension::Occurrence, Some(limit)));
    print_ranking("WEIGHT BRACKETS", &session.ranking(Dimension::WeightBracket, Some(limit)));

    println!("\nMONTHLY VOLUME");
    println!("{}", "-".repeat(60));
    for (month, count) in session.monthly_volume() {
        println!("  {:12} {:>8}", month, format_count(count as u64));
    }
    println!();

    Ok(())
}
