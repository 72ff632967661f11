//! Per-journal statistics
//!
//! Streams a journal's full article set from the catalog page by page and
//! folds it into counts, trends, and top-N entity lists.

use crate::result::{CitationStats, JournalAnalysis, JournalSummary, YearCount};
use crate::text::{top_terms, Tokenizer};
use chrono::Datelike;
use futures::TryStreamExt;
use journalscope_common::catalog::{
    article_stream, Article, CatalogStore, Journal, JournalFilter, JournalId,
};
use journalscope_common::config::AnalysisConfig;
use journalscope_common::errors::{AppError, Result};
use journalscope_common::{metrics, Cancellation};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Running totals over a stream of articles
#[derive(Debug, Clone, Default)]
pub struct ArticleTally {
    pub(crate) article_count: u64,
    pub(crate) years: BTreeMap<i32, u64>,
    pub(crate) undated: u64,
    pub(crate) keywords: HashMap<String, u64>,
    pub(crate) authors: HashMap<String, u64>,
    pub(crate) cited_articles: u64,
    pub(crate) citation_sum: i64,
    pub(crate) citation_max: Option<i64>,
}

impl ArticleTally {
    /// Fold one article in. Repeated tokens within one article count once.
    pub fn add(&mut self, article: &Article, keywords: &Tokenizer, authors: &Tokenizer) {
        self.article_count += 1;

        match article.publish_date {
            Some(date) => *self.years.entry(date.year()).or_default() += 1,
            None => self.undated += 1,
        }

        if let Some(field) = &article.keywords {
            let distinct: HashSet<String> = keywords.tokens(field).collect();
            for term in distinct {
                *self.keywords.entry(term).or_default() += 1;
            }
        }

        if let Some(field) = &article.authors {
            let distinct: HashSet<String> = authors.tokens(field).collect();
            for name in distinct {
                *self.authors.entry(name).or_default() += 1;
            }
        }

        if let Some(citations) = article.citation_count {
            self.cited_articles += 1;
            self.citation_sum = self.citation_sum.saturating_add(citations);
            self.citation_max = Some(self.citation_max.map_or(citations, |m| m.max(citations)));
        }
    }

    pub fn citation_stats(&self) -> CitationStats {
        let mean = if self.cited_articles > 0 {
            Some(self.citation_sum as f64 / self.cited_articles as f64)
        } else {
            None
        };

        CitationStats {
            articles_with_citations: self.cited_articles,
            sum: self.citation_sum,
            mean,
            max: self.citation_max,
        }
    }

    pub fn summarize(&self, journal: &Journal, top_n: usize) -> JournalAnalysis {
        JournalAnalysis {
            journal: JournalSummary::from(journal),
            article_count: self.article_count,
            yearly_stats: self
                .years
                .iter()
                .map(|(&year, &count)| YearCount { year, count })
                .collect(),
            undated: self.undated,
            top_keywords: top_terms(&self.keywords, top_n),
            top_authors: top_terms(&self.authors, top_n),
            distinct_keywords: self.keywords.len() as u64,
            distinct_authors: self.authors.len() as u64,
            citation_stats: self.citation_stats(),
        }
    }
}

/// Computes `JournalAnalysis` for one journal at a time
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn CatalogStore>,
    top_n: usize,
    page_size: u64,
    keywords: Tokenizer,
    authors: Tokenizer,
}

impl Aggregator {
    pub fn new(store: Arc<dyn CatalogStore>, config: &AnalysisConfig) -> Result<Self> {
        if config.article_page_size == 0 {
            return Err(AppError::Configuration {
                message: "analysis.article_page_size must be positive".to_string(),
            });
        }

        Ok(Self {
            store,
            top_n: config.top_n,
            page_size: config.article_page_size,
            keywords: Tokenizer::keywords()?,
            authors: Tokenizer::authors()?,
        })
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub async fn resolve(&self, journal_id: JournalId, cancel: &Cancellation) -> Result<Option<Journal>> {
        cancel.guard(self.store.get_journal(journal_id)).await
    }

    pub async fn journals(&self, filter: &JournalFilter, cancel: &Cancellation) -> Result<Vec<Journal>> {
        cancel.guard(self.store.list_journals(filter)).await
    }

    /// Analyze a journal by id; `JournalNotFound` if it does not resolve
    #[instrument(skip(self, cancel))]
    pub async fn analyze(&self, journal_id: JournalId, cancel: &Cancellation) -> Result<JournalAnalysis> {
        let journal = self
            .resolve(journal_id, cancel)
            .await?
            .ok_or(AppError::JournalNotFound { id: journal_id })?;

        self.analyze_journal(&journal, cancel).await
    }

    /// Analyze an already resolved journal
    pub async fn analyze_journal(&self, journal: &Journal, cancel: &Cancellation) -> Result<JournalAnalysis> {
        let tally = self.tally(journal.id, cancel).await?;
        Ok(tally.summarize(journal, self.top_n))
    }

    /// Stream and fold every article of a journal
    pub async fn tally(&self, journal_id: JournalId, cancel: &Cancellation) -> Result<ArticleTally> {
        let pages = article_stream(
            Arc::clone(&self.store),
            journal_id,
            self.page_size,
            cancel.clone(),
        );
        let mut pages = std::pin::pin!(pages);

        let mut tally = ArticleTally::default();
        while let Some(page) = pages.try_next().await? {
            cancel.check()?;
            for article in &page {
                tally.add(article, &self.keywords, &self.authors);
            }
        }

        debug!(journal_id, articles = tally.article_count, "Article set folded");
        metrics::record_articles_scanned(tally.article_count);

        Ok(tally)
    }
}
