//! Dashboard service shared by the REST handlers
//!
//! Holds at most one loaded session. Loading a new workbook replaces it.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::DashboardConfig;
use crate::filters::{FilterOptions, FilterSelection, FilterSummary, FilterWarning};
use crate::loader::LoadError;
use crate::lookup::InvoiceDetail;
use crate::metrics::{CarrierAttainment, Overview, PendingRow, Ranking};
use crate::models::Dimension;
use crate::session::{DashboardSession, DatasetPreview};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("no dataset loaded; upload a workbook first")]
    NoDataset,

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Options, current selection and what the filters did, in one view.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub summary: FilterSummary,
    pub warnings: Vec<FilterWarning>,
}

#[derive(Debug, Clone)]
pub struct PendingOverview {
    pub undelivered: usize,
    pub delivered_late: usize,
    pub by_carrier: Vec<(String, usize)>,
    pub shipments: Vec<PendingRow>,
}

pub struct DashboardService {
    config: DashboardConfig,
    session: Arc<RwLock<Option<DashboardSession>>>,
}

impl DashboardService {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub async fn load_path(&self, path: impl AsRef<Path>) -> Result<DatasetPreview, ServiceError> {
        let session = DashboardSession::open(path, self.config.clone())?;
        Ok(self.replace(session).await)
    }

    pub async fn load_bytes(&self, bytes: Vec<u8>, source: &str) -> Result<DatasetPreview, ServiceError> {
        let session = DashboardSession::from_bytes(bytes, source, self.config.clone())?;
        Ok(self.replace(session).await)
    }

    async fn replace(&self, session: DashboardSession) -> DatasetPreview {
        let preview = session.preview();
        info!(
            "Dataset '{}' loaded: {} records, period {}",
            preview.source, preview.total_records, preview.period
        );

        let mut slot = self.session.write().await;
        *slot = Some(session);
        preview
    }

    /// Run `f` against the loaded session.
    async fn read<T>(&self, f: impl FnOnce(&DashboardSession) -> T) -> Result<T, ServiceError> {
        let slot = self.session.read().await;
        slot.as_ref().map(f).ok_or(ServiceError::NoDataset)
    }

    pub async fn preview(&self) -> Result<DatasetPreview, ServiceError> {
        self.read(DashboardSession::preview).await
    }

    pub async fn filters(&self) -> Result<FilterState, ServiceError> {
        self.read(filter_state).await
    }

    pub async fn set_filters(&self, selection: FilterSelection) -> Result<FilterState, ServiceError> {
        let mut slot = self.session.write().await;
        let session = slot.as_mut().ok_or(ServiceError::NoDataset)?;
        session.set_filters(selection);
        Ok(filter_state(session))
    }

    pub async fn overview(&self) -> Result<Overview, ServiceError> {
        self.read(DashboardSession::overview).await
    }

    pub async fn ranking(&self, dimension: Dimension, limit: Option<usize>) -> Result<Ranking, ServiceError> {
        self.read(|s| s.ranking(dimension, limit)).await
    }

    pub async fn monthly_volume(&self) -> Result<Vec<(String, usize)>, ServiceError> {
        self.read(DashboardSession::monthly_volume).await
    }

    pub async fn carrier_attainment(&self) -> Result<Vec<CarrierAttainment>, ServiceError> {
        self.read(DashboardSession::carrier_attainment).await
    }

    pub async fn pending(&self) -> Result<PendingOverview, ServiceError> {
        self.read(|s| {
            let report = s.pending();
            PendingOverview {
                undelivered: report.undelivered.len(),
                delivered_late: report.delivered_late.len(),
                by_carrier: report.by_carrier.clone(),
                shipments: report.rows(),
            }
        })
        .await
    }

    pub async fn lookup(&self, query: &str) -> Result<Vec<InvoiceDetail>, ServiceError> {
        self.read(|s| s.lookup(query)).await
    }
}

fn filter_state(session: &DashboardSession) -> FilterState {
    FilterState {
        options: session.options().clone(),
        selection: session.selection().clone(),
        summary: session.filter_summary(),
        warnings: session.filters().warnings.clone(),
    }
}
