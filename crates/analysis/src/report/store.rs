//! Report facade over the catalog store

use journalscope_common::catalog::{CatalogStore, NewReport, Report, ReportId, UserId, Viewer};
use journalscope_common::errors::{AppError, Result};
use journalscope_common::{metrics, Cancellation};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Report persistence over a `CatalogStore`.
///
/// Listings are newest first with ties broken by id descending, whatever
/// order the backing store returns.
#[derive(Clone)]
pub struct ReportStore {
    store: Arc<dyn CatalogStore>,
}

impl ReportStore {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, report, cancel), fields(title = %report.title, kind = %report.scope.kind()))]
    pub async fn save(&self, report: NewReport, cancel: &Cancellation) -> Result<ReportId> {
        let id = cancel.guard(self.store.save_report(report)).await?;
        metrics::record_report("save");
        info!(report_id = id, "Report saved");
        Ok(id)
    }

    pub async fn get(&self, id: ReportId, cancel: &Cancellation) -> Result<Report> {
        cancel
            .guard(self.store.get_report(id))
            .await?
            .ok_or(AppError::ReportNotFound { id })
    }

    pub async fn list_by_owner(&self, owner: UserId, cancel: &Cancellation) -> Result<Vec<Report>> {
        self.list(Some(owner), cancel).await
    }

    pub async fn list_all(&self, cancel: &Cancellation) -> Result<Vec<Report>> {
        self.list(None, cancel).await
    }

    /// Admins see every report, users their own, anonymous callers nothing
    pub async fn list_visible(&self, viewer: Viewer, cancel: &Cancellation) -> Result<Vec<Report>> {
        match viewer {
            Viewer::Anonymous => Ok(Vec::new()),
            Viewer::User(id) => self.list_by_owner(id, cancel).await,
            Viewer::Admin(_) => self.list_all(cancel).await,
        }
    }

    /// `false` when no report had the id
    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, id: ReportId, cancel: &Cancellation) -> Result<bool> {
        let removed = cancel.guard(self.store.delete_report(id)).await?;
        if removed {
            metrics::record_report("delete");
            info!(report_id = id, "Report deleted");
        } else {
            debug!(report_id = id, "Delete of unknown report");
        }
        Ok(removed)
    }

    async fn list(&self, owner: Option<UserId>, cancel: &Cancellation) -> Result<Vec<Report>> {
        let mut reports = cancel.guard(self.store.list_reports(owner)).await?;
        sort_newest_first(&mut reports);
        Ok(reports)
    }
}

pub fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
