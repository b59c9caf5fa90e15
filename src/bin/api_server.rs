//! REST API server for the freight SLA dashboard
//!
//! Usage:
//!   ./target/release/api_server [--port 8080] [--file data/base.xlsx]
//!
//! REST endpoints:
//!   GET  /api/v1/health                 - Health check
//!   POST /api/v1/dataset                - Upload an .xlsx workbook (raw body)
//!   GET  /api/v1/dataset                - Preview of the loaded workbook
//!   GET  /api/v1/filters                - Filter options and current selection
//!   PUT  /api/v1/filters                - Replace the filter selection
//!   GET  /api/v1/overview               - Totals and SLA gauge
//!   GET  /api/v1/rankings/:dimension    - Top values (?limit=N)
//!   GET  /api/v1/volume/monthly         - Invoices per month
//!   GET  /api/v1/sla/carriers           - SLA per carrier
//!   GET  /api/v1/pending                - Undelivered and late shipments
//!   GET  /api/v1/invoices?q=NUMBER      - Invoice lookup (ignores filters)

use anyhow::Result;
use clap::Parser;
use freight_sla::api::{create_router, DashboardService};
use freight_sla::config::ConfigArgs;
use freight_sla::{logging, DashboardConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve the SLA dashboard over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Workbook to load at startup; otherwise wait for an upload
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

fn print_banner(port: u16) {
    println!("============================================================");
    println!("              FREIGHT SLA DASHBOARD API");
    println!("============================================================");
    println!();
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!();
    println!("Endpoints:");
    println!("  GET  /api/v1/health              Health check");
    println!("  POST /api/v1/dataset             Upload workbook");
    println!("  GET  /api/v1/dataset             Dataset preview");
    println!("  GET  /api/v1/filters             Filter options");
    println!("  PUT  /api/v1/filters             Set filters");
    println!("  GET  /api/v1/overview            Overview + SLA");
    println!("  GET  /api/v1/rankings/:dim       Rankings");
    println!("  GET  /api/v1/volume/monthly      Monthly volume");
    println!("  GET  /api/v1/sla/carriers        SLA by carrier");
    println!("  GET  /api/v1/pending             Pending shipments");
    println!("  GET  /api/v1/invoices?q=         Invoice lookup");
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    print_banner(args.port);

    let service = Arc::new(DashboardService::new(DashboardConfig::from(args.config)));

    if let Some(path) = &args.file {
        match service.load_path(path).await {
            Ok(preview) => tracing::info!(
                "Preloaded {} ({} records)",
                preview.source,
                preview.total_records
            ),
            Err(e) => tracing::error!("Could not preload {}: {}", path.display(), e),
        }
    }

    let app = create_router(service);
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
