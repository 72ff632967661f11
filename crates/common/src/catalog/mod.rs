//! Catalog store contract
//!
//! The analysis engine reads journals and articles and persists reports
//! through this trait only. Implementations:
//! - `db::Repository` (sea-orm, SQL database)
//! - in-memory catalogs used by tests and demos

mod filter;
mod model;

pub use filter::JournalFilter;
pub use model::{
    Article, ArticleId, Journal, JournalId, JournalSet, NewReport, Report, ReportId, ReportKind,
    ReportScope, UserId, Viewer,
};

use crate::cancel::Cancellation;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::sync::Arc;

/// One page of a journal's articles
#[derive(Debug, Clone, Default)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    /// Whether a later page may hold more articles
    pub has_more: bool,
}

/// Trait for catalog access
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Find a journal by id
    async fn get_journal(&self, id: JournalId) -> Result<Option<Journal>>;

    /// Fetch one page of a journal's articles, ordered by article id.
    /// Pages are zero-based.
    async fn list_articles_page(
        &self,
        journal_id: JournalId,
        page: u64,
        page_size: u64,
    ) -> Result<ArticlePage>;

    /// List journals matching the filter, ordered by journal id
    async fn list_journals(&self, filter: &JournalFilter) -> Result<Vec<Journal>>;

    /// Persist a report and return its id
    async fn save_report(&self, report: NewReport) -> Result<ReportId>;

    /// Find a report by id
    async fn get_report(&self, id: ReportId) -> Result<Option<Report>>;

    /// List reports, optionally restricted to one creator
    async fn list_reports(&self, owner: Option<UserId>) -> Result<Vec<Report>>;

    /// Delete a report, returning whether it existed
    async fn delete_report(&self, id: ReportId) -> Result<bool>;
}

/// Stream every article of a journal page by page.
///
/// Each page fetch is raced against `cancel`; the stream ends with an
/// `AppError::Cancelled` item if the token fires between or during fetches.
pub fn article_stream(
    store: Arc<dyn CatalogStore>,
    journal_id: JournalId,
    page_size: u64,
    cancel: Cancellation,
) -> impl Stream<Item = Result<Vec<Article>>> + Send {
    let page_size = page_size.max(1);

    stream::try_unfold(Some(0u64), move |next| {
        let store = Arc::clone(&store);
        let cancel = cancel.clone();
        async move {
            let Some(page) = next else {
                return Ok::<_, AppError>(None);
            };

            let fetched = cancel
                .guard(store.list_articles_page(journal_id, page, page_size))
                .await?;

            tracing::trace!(
                journal_id,
                page,
                count = fetched.articles.len(),
                "Fetched article page"
            );

            if fetched.articles.is_empty() {
                return Ok(None);
            }

            let next = if fetched.has_more { Some(page + 1) } else { None };
            Ok(Some((fetched.articles, next)))
        }
    })
}
