//! Dashboard settings and the command-line groups shared by the binaries

use chrono::NaiveDate;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chart::DEFAULT_THRESHOLD_PERCENT;
use crate::filters::FilterSelection;

pub const DEFAULT_SHEET_NAME: &str = "Base";
pub const DEFAULT_EXCLUDED_BUS: [&str; 3] = ["070", "080", "720"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Worksheet that holds the shipment table.
    pub sheet_name: String,
    /// Business units removed from the selectable universe and from the analysis.
    pub excluded_business_units: Vec<String>,
    pub sla_target_percent: f64,
    /// Carriers with fewer evaluated deliveries are left out of the attainment table.
    pub min_carrier_deliveries: usize,
    /// Bars in the dashboard rankings.
    pub ranking_limit: usize,
    /// Bars in the volumetry and pending-by-carrier views.
    pub volume_limit: usize,
    pub label_threshold_percent: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            excluded_business_units: DEFAULT_EXCLUDED_BUS.iter().map(|s| s.to_string()).collect(),
            sla_target_percent: 95.0,
            min_carrier_deliveries: 10,
            ranking_limit: 8,
            volume_limit: 10,
            label_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

/// Dashboard settings as command-line options; flatten into a binary's `Parser`.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Worksheet to read from the workbook
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet: String,

    /// Business units to exclude from the analysis (repeatable)
    #[arg(long = "exclude-bu", value_delimiter = ',', default_values_t = DEFAULT_EXCLUDED_BUS.map(String::from))]
    pub exclude_bu: Vec<String>,

    /// SLA target percentage
    #[arg(long, default_value = "95.0")]
    pub sla_target: f64,

    /// Minimum evaluated deliveries for a carrier to be ranked
    #[arg(long, default_value = "10")]
    pub min_deliveries: usize,

    /// Number of entries in dashboard rankings
    #[arg(long, default_value = "8")]
    pub ranking_limit: usize,

    /// Number of entries in volumetry tables
    #[arg(long, default_value = "10")]
    pub volume_limit: usize,
}

impl From<ConfigArgs> for DashboardConfig {
    fn from(args: ConfigArgs) -> Self {
        Self {
            sheet_name: args.sheet,
            excluded_business_units: args.exclude_bu,
            sla_target_percent: args.sla_target,
            min_carrier_deliveries: args.min_deliveries,
            ranking_limit: args.ranking_limit,
            volume_limit: args.volume_limit,
            ..Default::default()
        }
    }
}

/// Input workbook plus the global filters, shared by the report binaries.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Path to the .xlsx/.xls export
    #[arg(long, short = 'f', default_value = "data/base.xlsx")]
    pub file: PathBuf,

    /// Business units to keep (repeatable or comma separated); empty = all
    #[arg(long = "bu", value_delimiter = ',')]
    pub business_units: Vec<String>,

    /// Carriers to keep (repeatable); empty = all
    #[arg(long = "carrier")]
    pub carriers: Vec<String>,

    /// First invoice date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last invoice date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            business_units: self.business_units.clone(),
            carriers: self.carriers.clone(),
            start: self.from,
            end: self.to,
        }
    }
}
