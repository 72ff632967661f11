//! Repository pattern for catalog operations
//!
//! Implements `CatalogStore` over sea-orm. Transient connection failures are
//! retried with exponential backoff inside the configured time budget; all
//! other database errors surface immediately as `StoreUnavailable`.

use crate::catalog::{
    ArticlePage, CatalogStore, Journal, JournalFilter, JournalId, NewReport, Report, ReportId,
    UserId,
};
use crate::config::DatabaseConfig;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Repository for catalog access
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
    retry_budget: Duration,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            retry_budget: Duration::from_millis(config.retry_budget_ms),
        }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Run a query, retrying connection-level failures
    async fn with_retry<T, F, Fut>(&self, op: &'static str, query: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, DbErr>>,
    {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(50))
            .with_max_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(self.retry_budget))
            .build();

        backoff::future::retry(policy, || {
            let attempt = query();
            async move {
                attempt.await.map_err(|e| {
                    if is_transient(&e) {
                        warn!(op, error = %e, "Transient catalog error, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
        .map_err(|e| {
            warn!(op, error = %e, "Catalog query failed");
            AppError::from(e)
        })
    }

    fn journal_condition(filter: &JournalFilter) -> Condition {
        let mut condition = Condition::all();

        if let Some(keyword) = &filter.keyword {
            condition = condition.add(
                Condition::any()
                    .add(JournalColumn::Name.contains(keyword.as_str()))
                    .add(JournalColumn::Issn.contains(keyword.as_str()))
                    .add(JournalColumn::Publisher.contains(keyword.as_str())),
            );
        }

        if let Some(country) = &filter.country {
            condition = condition.add(JournalColumn::Country.eq(country.as_str()));
        }

        if let Some(category) = &filter.category {
            condition = condition.add(JournalColumn::Category.eq(category.as_str()));
        }

        condition
    }
}

fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

#[async_trait]
impl CatalogStore for Repository {
    async fn get_journal(&self, id: JournalId) -> Result<Option<Journal>> {
        let row = self
            .with_retry("get_journal", || JournalEntity::find_by_id(id).one(self.conn()))
            .await?;

        Ok(row.map(Journal::from))
    }

    async fn list_articles_page(
        &self,
        journal_id: JournalId,
        page: u64,
        page_size: u64,
    ) -> Result<ArticlePage> {
        // One extra row tells us whether another page exists
        let mut rows = self
            .with_retry("list_articles_page", || {
                ArticleEntity::find()
                    .filter(ArticleColumn::JournalId.eq(journal_id))
                    .order_by_asc(ArticleColumn::Id)
                    .offset(page * page_size)
                    .limit(page_size + 1)
                    .all(self.conn())
            })
            .await?;

        let has_more = rows.len() as u64 > page_size;
        rows.truncate(page_size as usize);

        debug!(journal_id, page, count = rows.len(), has_more, "Loaded article page");

        Ok(ArticlePage {
            articles: rows.into_iter().map(Into::into).collect(),
            has_more,
        })
    }

    async fn list_journals(&self, filter: &JournalFilter) -> Result<Vec<Journal>> {
        let condition = Self::journal_condition(filter);

        let rows = self
            .with_retry("list_journals", || {
                JournalEntity::find()
                    .filter(condition.clone())
                    .order_by_asc(JournalColumn::Id)
                    .all(self.conn())
            })
            .await?;

        Ok(rows.into_iter().map(Journal::from).collect())
    }

    async fn save_report(&self, report: NewReport) -> Result<ReportId> {
        let model = ReportActiveModel {
            title: Set(report.title),
            report_type: Set(report.scope.kind().as_str().to_string()),
            journal_id: Set(report.scope.journal_id()),
            journal_ids: Set(report.scope.journal_ids().map(|set| set.to_storage())),
            content: Set(report.content),
            created_by: Set(report.created_by),
            create_time: Set(report.created_at.naive_utc()),
            update_time: Set(report.updated_at.naive_utc()),
            ..Default::default()
        };

        // Inserts are not retried: a lost acknowledgement would duplicate the report
        let saved = model.insert(self.conn()).await?;

        Ok(saved.id)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        let row = self
            .with_retry("get_report", || ReportEntity::find_by_id(id).one(self.conn()))
            .await?;

        row.map(Report::try_from).transpose()
    }

    async fn list_reports(&self, owner: Option<UserId>) -> Result<Vec<Report>> {
        let rows = self
            .with_retry("list_reports", || {
                let mut query = ReportEntity::find();
                if let Some(owner) = owner {
                    query = query.filter(ReportColumn::CreatedBy.eq(owner));
                }
                query
                    .order_by_desc(ReportColumn::CreateTime)
                    .order_by_desc(ReportColumn::Id)
                    .all(self.conn())
            })
            .await?;

        rows.into_iter().map(Report::try_from).collect()
    }

    async fn delete_report(&self, id: ReportId) -> Result<bool> {
        let result = self
            .with_retry("delete_report", || ReportEntity::delete_by_id(id).exec(self.conn()))
            .await?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_transient() {
        assert!(is_transient(&DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "reset".into()
        ))));
        assert!(!is_transient(&DbErr::Custom("bad column".into())));
        assert!(!is_transient(&DbErr::RecordNotFound("report".into())));
    }
}
