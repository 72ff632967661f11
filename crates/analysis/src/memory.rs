//! In-memory catalog store
//!
//! Holds journals, articles, and reports in process memory. Used by the
//! test suites and by the CLI's demo mode.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use journalscope_common::catalog::{
    Article, ArticlePage, CatalogStore, Journal, JournalFilter, JournalId, NewReport, Report,
    ReportId, UserId,
};
use journalscope_common::errors::Result;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    journals: BTreeMap<JournalId, Journal>,
    articles: BTreeMap<i64, Article>,
    reports: BTreeMap<ReportId, Report>,
    next_report_id: ReportId,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    tables: RwLock<Tables>,
    report_writes: AtomicU64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_journal(&self, journal: Journal) {
        self.write().journals.insert(journal.id, journal);
    }

    pub fn insert_article(&self, article: Article) {
        self.write().articles.insert(article.id, article);
    }

    pub fn remove_journal(&self, id: JournalId) -> bool {
        self.write().journals.remove(&id).is_some()
    }

    /// Number of report saves and deletes served so far
    pub fn report_writes(&self) -> u64 {
        self.report_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_journal(&self, id: JournalId) -> Result<Option<Journal>> {
        Ok(self.read().journals.get(&id).cloned())
    }

    async fn list_articles_page(
        &self,
        journal_id: JournalId,
        page: u64,
        page_size: u64,
    ) -> Result<ArticlePage> {
        let tables = self.read();
        let mut matching = tables
            .articles
            .values()
            .filter(|a| a.journal_id == journal_id)
            .skip((page * page_size) as usize);

        let articles: Vec<Article> = matching.by_ref().take(page_size as usize).cloned().collect();
        let has_more = matching.next().is_some();

        Ok(ArticlePage { articles, has_more })
    }

    async fn list_journals(&self, filter: &JournalFilter) -> Result<Vec<Journal>> {
        Ok(self
            .read()
            .journals
            .values()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect())
    }

    async fn save_report(&self, report: NewReport) -> Result<ReportId> {
        let mut tables = self.write();
        tables.next_report_id += 1;
        let id = tables.next_report_id;
        tables.reports.insert(id, Report::from_new(id, report));
        self.report_writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        Ok(self.read().reports.get(&id).cloned())
    }

    async fn list_reports(&self, owner: Option<UserId>) -> Result<Vec<Report>> {
        Ok(self
            .read()
            .reports
            .values()
            .filter(|r| owner.map_or(true, |o| r.created_by == o))
            .cloned()
            .collect())
    }

    async fn delete_report(&self, id: ReportId) -> Result<bool> {
        let removed = self.write().reports.remove(&id).is_some();
        self.report_writes.fetch_add(1, Ordering::SeqCst);
        Ok(removed)
    }
}

/// A journal with only a name set
pub fn sample_journal(id: JournalId, name: &str) -> Journal {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    Journal {
        id,
        name: name.to_string(),
        issn: None,
        publisher: None,
        country: None,
        language: None,
        category: None,
        impact_factor: None,
        frequency: None,
        description: None,
        official_url: None,
        created_at: stamp,
        updated_at: stamp,
    }
}

/// An article with only a title set
pub fn sample_article(id: i64, journal_id: JournalId) -> Article {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    Article {
        id,
        journal_id,
        title: format!("Article {}", id),
        authors: None,
        abstract_text: None,
        keywords: None,
        doi: None,
        publish_date: None,
        volume: None,
        issue: None,
        pages: None,
        citation_count: None,
        created_at: stamp,
        updated_at: stamp,
    }
}

/// A small catalog of domestic and international journals for demos
pub fn demo_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();

    let journals = [
        (1, "Chinese Journal of Computers", "China", "Computer Science", 3.2),
        (2, "Journal of Software", "China", "Computer Science", 2.1),
        (3, "Communications of the ACM", "USA", "Computer Science", 11.1),
        (4, "Machine Learning", "Netherlands", "Computer Science", 7.5),
    ];
    for (id, name, country, category, impact) in journals {
        let mut journal = sample_journal(id, name);
        journal.country = Some(country.to_string());
        journal.category = Some(category.to_string());
        journal.impact_factor = Some(impact);
        catalog.insert_journal(journal);
    }

    let articles = [
        (1, 1, "knowledge graph; deep learning", "Wang Fang, Li Ming", 2021, 12),
        (2, 1, "deep learning; federated learning", "Li Ming", 2022, 30),
        (3, 2, "software testing; program repair", "Chen Jie, Zhao Lei", 2022, 8),
        (4, 2, "program repair; large language models", "Zhao Lei", 2023, 21),
        (5, 3, "large language models; ethics", "Jane Smith, Raj Patel", 2023, 140),
        (6, 3, "deep learning; hardware", "Raj Patel", 2021, 75),
        (7, 4, "reinforcement learning; deep learning", "Anna Berg", 2020, 60),
        (8, 4, "federated learning; privacy", "Anna Berg, Tom Vos", 2022, 33),
    ];
    for (id, journal_id, keywords, authors, year, citations) in articles {
        let mut article = sample_article(id, journal_id);
        article.keywords = Some(keywords.to_string());
        article.authors = Some(authors.to_string());
        article.publish_date = NaiveDate::from_ymd_opt(year, 6, 1);
        article.citation_count = Some(citations);
        catalog.insert_article(article);
    }

    catalog
}

/// Wraps a catalog and runs a callback after every article page it serves
#[cfg(test)]
pub(crate) struct PageHookCatalog {
    inner: std::sync::Arc<InMemoryCatalog>,
    on_page: Box<dyn Fn(&InMemoryCatalog, JournalId, u64) + Send + Sync>,
}

#[cfg(test)]
impl PageHookCatalog {
    pub(crate) fn new(
        inner: std::sync::Arc<InMemoryCatalog>,
        on_page: impl Fn(&InMemoryCatalog, JournalId, u64) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            on_page: Box::new(on_page),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl CatalogStore for PageHookCatalog {
    async fn get_journal(&self, id: JournalId) -> Result<Option<Journal>> {
        self.inner.get_journal(id).await
    }

    async fn list_articles_page(
        &self,
        journal_id: JournalId,
        page: u64,
        page_size: u64,
    ) -> Result<ArticlePage> {
        let served = self.inner.list_articles_page(journal_id, page, page_size).await?;
        (self.on_page)(&self.inner, journal_id, page);
        Ok(served)
    }

    async fn list_journals(&self, filter: &JournalFilter) -> Result<Vec<Journal>> {
        self.inner.list_journals(filter).await
    }

    async fn save_report(&self, report: NewReport) -> Result<ReportId> {
        self.inner.save_report(report).await
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        self.inner.get_report(id).await
    }

    async fn list_reports(&self, owner: Option<UserId>) -> Result<Vec<Report>> {
        self.inner.list_reports(owner).await
    }

    async fn delete_report(&self, id: ReportId) -> Result<bool> {
        self.inner.delete_report(id).await
    }
}
