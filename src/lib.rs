//! Freight SLA dashboard
//!
//! Loads a shipment export, applies the global filters and computes the
//! delivery-performance views: SLA attainment, rankings, monthly volume,
//! pending shipments and per-invoice delivery timelines.

pub mod api;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod display;
pub mod filters;
pub mod loader;
pub mod logging;
pub mod lookup;
pub mod metrics;
pub mod models;
pub mod session;
pub mod timeline;

pub use config::DashboardConfig;
pub use loader::LoadError;
pub use models::{DeliveryOutcome, Dimension, ShipmentRecord};
pub use session::DashboardSession;
