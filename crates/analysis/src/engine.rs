//! Caller-facing analysis surface
//!
//! `AnalysisEngine` wires the aggregator, comparator, cohort classifier and
//! report facade to one catalog store. It holds no mutable state, so a
//! single instance can serve concurrent requests.

use crate::aggregator::Aggregator;
use crate::cohort::{CohortClassifier, CohortPredicate, CountryPredicate};
use crate::comparator::Comparator;
use crate::report::{build_report, ReportDraft, ReportStore};
use crate::result::{AnalysisResult, CatalogOverview, CountryCount};
use journalscope_common::catalog::{
    CatalogStore, JournalFilter, JournalId, Report, ReportId, UserId, Viewer,
};
use journalscope_common::config::AnalysisConfig;
use journalscope_common::errors::{AppError, Result};
use journalscope_common::metrics::AnalysisTimer;
use journalscope_common::Cancellation;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const UNKNOWN_COUNTRY: &str = "unknown";

#[derive(Clone)]
pub struct AnalysisEngine {
    store: Arc<dyn CatalogStore>,
    config: AnalysisConfig,
    aggregator: Aggregator,
    comparator: Comparator,
    classifier: CohortClassifier,
    reports: ReportStore,
}

impl AnalysisEngine {
    pub fn new(store: Arc<dyn CatalogStore>, config: AnalysisConfig) -> Result<Self> {
        let aggregator = Aggregator::new(Arc::clone(&store), &config)?;

        Ok(Self {
            comparator: Comparator::new(aggregator.clone()),
            classifier: CohortClassifier::new(aggregator.clone()),
            reports: ReportStore::new(Arc::clone(&store)),
            aggregator,
            store,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[instrument(skip(self, cancel))]
    pub async fn analyze_journal(&self, journal_id: JournalId, cancel: &Cancellation) -> Result<AnalysisResult> {
        timed("journal", async {
            let analysis = self.aggregator.analyze(journal_id, cancel).await?;
            Ok(AnalysisResult::Journal(analysis))
        })
        .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn compare_journals(&self, journal_ids: &[JournalId], cancel: &Cancellation) -> Result<AnalysisResult> {
        timed("comparison", async {
            let comparison = self.comparator.compare(journal_ids, cancel).await?;
            Ok(AnalysisResult::Comparison(comparison))
        })
        .await
    }

    /// Compare the journals matching `predicate` (cohort A) against the rest
    pub async fn compare_cohorts(
        &self,
        predicate: &dyn CohortPredicate,
        label_a: &str,
        label_b: &str,
        scope: &JournalFilter,
        cancel: &Cancellation,
    ) -> Result<AnalysisResult> {
        timed("cohort", async {
            let cohorts = self
                .classifier
                .compare_cohorts(predicate, label_a, label_b, scope, cancel)
                .await?;
            Ok(AnalysisResult::Cohort(cohorts))
        })
        .await
    }

    /// Domestic against international journals, using the configured country set and labels
    pub async fn compare_domestic_international(
        &self,
        scope: &JournalFilter,
        cancel: &Cancellation,
    ) -> Result<AnalysisResult> {
        let predicate = CountryPredicate::from_config(&self.config);
        self.compare_cohorts(
            &predicate,
            &self.config.domestic_label,
            &self.config.international_label,
            scope,
            cancel,
        )
        .await
    }

    /// Build a report around `result` and store it
    #[instrument(skip(self, draft, result, cancel), fields(kind = %draft.scope.kind(), author = draft.author))]
    pub async fn generate_report(
        &self,
        draft: ReportDraft,
        result: &AnalysisResult,
        cancel: &Cancellation,
    ) -> Result<ReportId> {
        let report = build_report(draft, result)?;
        self.reports.save(report, cancel).await
    }

    pub async fn get_report(&self, id: ReportId, cancel: &Cancellation) -> Result<Report> {
        self.reports.get(id, cancel).await
    }

    pub async fn list_reports_for_user(&self, user_id: UserId, cancel: &Cancellation) -> Result<Vec<Report>> {
        self.reports.list_by_owner(user_id, cancel).await
    }

    pub async fn list_all_reports(&self, cancel: &Cancellation) -> Result<Vec<Report>> {
        self.reports.list_all(cancel).await
    }

    pub async fn list_visible_reports(&self, viewer: Viewer, cancel: &Cancellation) -> Result<Vec<Report>> {
        self.reports.list_visible(viewer, cancel).await
    }

    pub async fn delete_report(&self, id: ReportId, cancel: &Cancellation) -> Result<bool> {
        self.reports.delete(id, cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn catalog_overview(&self, cancel: &Cancellation) -> Result<CatalogOverview> {
        let journals = cancel.guard(self.store.list_journals(&JournalFilter::all())).await?;

        let mut by_country: BTreeMap<String, u64> = BTreeMap::new();
        for journal in &journals {
            let country = journal
                .country
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(UNKNOWN_COUNTRY);
            *by_country.entry(country.to_string()).or_default() += 1;
        }

        let mut countries: Vec<CountryCount> = by_country
            .into_iter()
            .map(|(country, journal_count)| CountryCount { country, journal_count })
            .collect();
        countries.sort_by(|a, b| {
            b.journal_count
                .cmp(&a.journal_count)
                .then_with(|| a.country.cmp(&b.country))
        });

        Ok(CatalogOverview {
            journal_count: journals.len() as u64,
            countries,
        })
    }
}

async fn timed<T, F>(kind: &'static str, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let timer = AnalysisTimer::start(kind);
    let out = work.await;

    match &out {
        Ok(_) => {
            info!(kind, "Analysis completed");
            timer.finish("ok");
        }
        Err(e) if e.is_server_error() => {
            error!(kind, error = %e, "Analysis failed");
            timer.finish("error");
        }
        Err(e) => {
            warn!(kind, error = %e, code = e.code().as_code(), "Analysis rejected");
            timer.finish(outcome_label(e));
        }
    }

    out
}

fn outcome_label(e: &AppError) -> &'static str {
    match e {
        AppError::Cancelled { .. } => "cancelled",
        AppError::PartialNotFound { .. } => "partial",
        e if e.is_not_found() => "not_found",
        _ => "invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{demo_catalog, sample_article, sample_journal, InMemoryCatalog, PageHookCatalog};
    use journalscope_common::catalog::{ReportKind, ReportScope};
    use rand::seq::SliceRandom;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn engine(catalog: Arc<InMemoryCatalog>) -> AnalysisEngine {
        AnalysisEngine::new(catalog, AnalysisConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_repeated_analysis_is_byte_identical() {
        let engine = engine(Arc::new(demo_catalog()));
        let cancel = Cancellation::none();

        let first = engine.analyze_journal(1, &cancel).await.unwrap().to_canonical_json().unwrap();
        let second = engine.analyze_journal(1, &cancel).await.unwrap().to_canonical_json().unwrap();
        assert_eq!(first, second);

        let cmp_a = engine.compare_journals(&[4, 1, 3], &cancel).await.unwrap();
        let cmp_b = engine.compare_journals(&[3, 4, 1, 1], &cancel).await.unwrap();
        assert_eq!(cmp_a.to_canonical_json().unwrap(), cmp_b.to_canonical_json().unwrap());
    }

    #[tokio::test]
    async fn test_insertion_order_does_not_matter() {
        let mut articles: Vec<_> = (1..=40)
            .map(|id| {
                let mut article = sample_article(id, 1);
                article.keywords = Some(format!("k{}; k{}", id % 7, id % 3));
                article.authors = Some(format!("Author {}", id % 5));
                article
            })
            .collect();

        let mut outputs = Vec::new();
        for _ in 0..3 {
            articles.shuffle(&mut rand::thread_rng());
            let catalog = InMemoryCatalog::new();
            catalog.insert_journal(sample_journal(1, "Shuffled"));
            for article in &articles {
                catalog.insert_article(article.clone());
            }
            let result = engine(Arc::new(catalog))
                .analyze_journal(1, &Cancellation::none())
                .await
                .unwrap();
            outputs.push(result.to_canonical_json().unwrap());
        }

        assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_report_round_trip() {
        let engine = engine(Arc::new(demo_catalog()));
        let cancel = Cancellation::none();

        let result = engine.analyze_journal(3, &cancel).await.unwrap();
        let draft = ReportDraft::from_parts("ACM review", ReportKind::Single, Some(3), None, 11).unwrap();
        let id = assert_ok!(engine.generate_report(draft, &result, &cancel).await);

        let report = engine.get_report(id, &cancel).await.unwrap();
        assert_eq!(report.scope, ReportScope::Single { journal_id: 3 });
        assert_eq!(AnalysisResult::from_json(&report.content).unwrap(), result);

        assert_eq!(engine.list_reports_for_user(11, &cancel).await.unwrap().len(), 1);
        assert!(engine.list_reports_for_user(12, &cancel).await.unwrap().is_empty());
        assert!(engine.delete_report(id, &cancel).await.unwrap());
        assert!(engine.list_all_reports(&cancel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_report_rejects_malformed_scope() {
        let result = engine(Arc::new(demo_catalog()))
            .analyze_journal(1, &Cancellation::none())
            .await
            .unwrap();
        assert!(matches!(result, AnalysisResult::Journal(_)));

        let err = assert_err!(ReportDraft::from_parts("T", ReportKind::Single, None, Some("1,2"), 1));
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_comparison_report() {
        let catalog = Arc::new(demo_catalog());
        let engine = engine(Arc::clone(&catalog));
        let cancel = Cancellation::none();

        let result = engine.compare_journals(&[2, 1], &cancel).await.unwrap();
        let draft = ReportDraft::from_parts("Domestic peers", ReportKind::Compare, None, Some("1,2"), 3).unwrap();
        let id = engine.generate_report(draft, &result, &cancel).await.unwrap();

        let visible = engine.list_visible_reports(Viewer::Admin(1), &cancel).await.unwrap();
        assert_eq!(visible[0].id, id);
        assert_eq!(catalog.report_writes(), 1);
    }

    #[tokio::test]
    async fn test_domestic_international_defaults() {
        let engine = engine(Arc::new(demo_catalog()));
        let result = engine
            .compare_domestic_international(&JournalFilter::all(), &Cancellation::none())
            .await
            .unwrap();

        match result {
            AnalysisResult::Cohort(cohorts) => {
                assert_eq!(cohorts.cohort_a.label, "domestic");
                assert_eq!(cohorts.cohort_b.label, "international");
            }
            other => panic!("unexpected result: {}", other.kind_name()),
        }
    }

    #[tokio::test]
    async fn test_catalog_overview() {
        let catalog = demo_catalog();
        catalog.insert_journal(sample_journal(9, "No Country"));
        let overview = engine(Arc::new(catalog))
            .catalog_overview(&Cancellation::none())
            .await
            .unwrap();

        assert_eq!(overview.journal_count, 5);
        let countries: Vec<(&str, u64)> = overview
            .countries
            .iter()
            .map(|c| (c.country.as_str(), c.journal_count))
            .collect();
        assert_eq!(
            countries,
            vec![("China", 2), ("Netherlands", 1), ("USA", 1), ("unknown", 1)]
        );
    }

    #[tokio::test]
    async fn test_cancelled_operations_return_no_result() {
        let engine = engine(Arc::new(demo_catalog()));
        let (handle, cancel) = Cancellation::new();
        handle.cancel();

        for err in [
            engine.analyze_journal(1, &cancel).await.unwrap_err(),
            engine.compare_journals(&[1, 2], &cancel).await.unwrap_err(),
            engine.catalog_overview(&cancel).await.unwrap_err(),
        ] {
            assert!(matches!(err, AppError::Cancelled { .. }));
        }
    }

    #[tokio::test]
    async fn test_expired_deadline() {
        let engine = engine(Arc::new(demo_catalog()));
        let cancel = Cancellation::none().with_timeout(Duration::ZERO);

        let err = engine.analyze_journal(1, &cancel).await.unwrap_err();
        match err {
            AppError::Cancelled { reason } => assert_eq!(reason, "deadline exceeded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_over_shared_journals() {
        let engine = engine(Arc::new(demo_catalog()));
        let cancel = Cancellation::none();

        let expected_single = engine.analyze_journal(1, &cancel).await.unwrap().to_canonical_json().unwrap();
        let expected_cmp = engine
            .compare_journals(&[1, 2, 3], &cancel)
            .await
            .unwrap()
            .to_canonical_json()
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                let cancel = Cancellation::none();
                let result = if i % 2 == 0 {
                    engine.analyze_journal(1, &cancel).await
                } else {
                    engine.compare_journals(&[3, 2, 1], &cancel).await
                };
                (i, result.unwrap().to_canonical_json().unwrap())
            }));
        }

        for task in tasks {
            let (i, json) = task.await.unwrap();
            if i % 2 == 0 {
                assert_eq!(json, expected_single);
            } else {
                assert_eq!(json, expected_cmp);
            }
        }
    }

    #[tokio::test]
    async fn test_writes_during_analysis_do_not_fail_it() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.insert_journal(sample_journal(1, "Busy Journal"));
        for id in 1..=5 {
            catalog.insert_article(sample_article(id, 1));
        }

        let store = PageHookCatalog::new(Arc::clone(&catalog), |inner, journal_id, page| {
            if page == 0 {
                inner.insert_article(sample_article(100, journal_id));
                inner.insert_article(sample_article(101, journal_id));
                inner.remove_journal(journal_id);
            }
        });
        let config = AnalysisConfig {
            article_page_size: 2,
            ..AnalysisConfig::default()
        };
        let engine = AnalysisEngine::new(Arc::new(store), config).unwrap();

        let result = engine.analyze_journal(1, &Cancellation::none()).await.unwrap();
        match result {
            AnalysisResult::Journal(analysis) => {
                assert_eq!(analysis.journal.id, 1);
                assert!((5..=7).contains(&analysis.article_count));
            }
            other => panic!("unexpected result: {}", other.kind_name()),
        }

        let err = engine.analyze_journal(1, &Cancellation::none()).await.unwrap_err();
        assert!(matches!(err, AppError::JournalNotFound { id: 1 }));
    }

    #[tokio::test]
    async fn test_missing_journal_is_not_a_zero_count() {
        let engine = engine(Arc::new(demo_catalog()));
        let err = engine.analyze_journal(404, &Cancellation::none()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(outcome_label(&err), "not_found");
    }
}
