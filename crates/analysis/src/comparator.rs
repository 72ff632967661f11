//! Cross-journal comparison
//!
//! Runs the aggregator over every resolvable journal in a request and
//! derives rankings and keyword overlap from the per-journal results.

use crate::aggregator::Aggregator;
use crate::result::{
    ComparisonAnalysis, JournalAnalysis, MetricComparison, SkippedJournal, TopicComparison,
    TopicEntry,
};
use journalscope_common::catalog::{Journal, JournalId};
use journalscope_common::errors::{AppError, Result};
use journalscope_common::Cancellation;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument, warn};

const UNKNOWN_COUNTRY: &str = "unknown";

#[derive(Clone)]
pub struct Comparator {
    aggregator: Aggregator,
}

impl Comparator {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    /// Compare two or more distinct journals.
    ///
    /// Unresolvable ids are skipped and recorded in the result. A single
    /// resolvable journal fails with `PartialNotFound`, none at all with
    /// `JournalsNotFound`.
    #[instrument(skip(self, journal_ids, cancel), fields(requested = journal_ids.len()))]
    pub async fn compare(
        &self,
        journal_ids: &[JournalId],
        cancel: &Cancellation,
    ) -> Result<ComparisonAnalysis> {
        let requested: BTreeSet<JournalId> = journal_ids.iter().copied().collect();
        if requested.len() < 2 {
            return Err(AppError::invalid(
                "journal_ids",
                format!(
                    "a comparison needs at least 2 distinct journals, got {}",
                    requested.len()
                ),
            ));
        }

        let mut resolved: Vec<Journal> = Vec::with_capacity(requested.len());
        let mut skipped = Vec::new();
        for &id in &requested {
            match self.aggregator.resolve(id, cancel).await? {
                Some(journal) => resolved.push(journal),
                None => skipped.push(SkippedJournal {
                    journal_id: id,
                    reason: "journal not found".to_string(),
                }),
            }
        }

        if resolved.is_empty() {
            return Err(AppError::JournalsNotFound {
                ids: skipped.iter().map(|s| s.journal_id).collect(),
            });
        }

        if resolved.len() < 2 {
            return Err(AppError::PartialNotFound {
                missing: skipped.iter().map(|s| s.journal_id).collect(),
                resolved: resolved.len(),
            });
        }

        if !skipped.is_empty() {
            warn!(
                skipped = skipped.len(),
                resolved = resolved.len(),
                "Comparison degraded, some journals did not resolve"
            );
        }

        let mut analyses = BTreeMap::new();
        for journal in &resolved {
            let analysis = self.aggregator.analyze_journal(journal, cancel).await?;
            analyses.insert(journal.id, analysis);
        }

        info!(journals = analyses.len(), "Comparison computed");

        Ok(build_comparison(requested.into_iter().collect(), skipped, analyses))
    }
}

/// Derive the cross-journal views from per-journal analyses
pub fn build_comparison(
    requested: Vec<JournalId>,
    skipped: Vec<SkippedJournal>,
    journals: BTreeMap<JournalId, JournalAnalysis>,
) -> ComparisonAnalysis {
    let impact_factor_comparison = metric_comparison(&journals, |a| a.journal.impact_factor);
    let article_count_comparison = metric_comparison(&journals, |a| Some(a.article_count as f64));
    let citation_comparison = metric_comparison(&journals, |a| {
        (a.citation_stats.articles_with_citations > 0).then_some(a.citation_stats.sum as f64)
    });

    let trend_comparison = journals
        .iter()
        .map(|(&id, a)| (id, a.yearly_stats.clone()))
        .collect();

    let mut country_distribution: BTreeMap<String, Vec<JournalId>> = BTreeMap::new();
    for (&id, analysis) in &journals {
        let country = analysis
            .journal
            .country
            .clone()
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());
        country_distribution.entry(country).or_default().push(id);
    }

    ComparisonAnalysis {
        requested,
        complete: skipped.is_empty(),
        skipped,
        impact_factor_comparison,
        article_count_comparison,
        citation_comparison,
        topic_comparison: topic_comparison(&journals),
        trend_comparison,
        country_distribution,
        journals,
    }
}

/// Collect one scalar per journal and rank descending; missing values rank last
pub fn metric_comparison<F>(journals: &BTreeMap<JournalId, JournalAnalysis>, metric: F) -> MetricComparison
where
    F: Fn(&JournalAnalysis) -> Option<f64>,
{
    let values: BTreeMap<JournalId, Option<f64>> =
        journals.iter().map(|(&id, a)| (id, metric(a))).collect();

    let mut ranking: Vec<(JournalId, Option<f64>)> = values.iter().map(|(&id, &v)| (id, v)).collect();
    ranking.sort_by(|(id_a, a), (id_b, b)| {
        let by_value = match (a, b) {
            (Some(a), Some(b)) => b.total_cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_value.then_with(|| id_a.cmp(id_b))
    });

    MetricComparison {
        values,
        ranking: ranking.into_iter().map(|(id, _)| id).collect(),
    }
}

fn topic_comparison(journals: &BTreeMap<JournalId, JournalAnalysis>) -> TopicComparison {
    let mut presence: BTreeMap<&str, (BTreeSet<JournalId>, u64)> = BTreeMap::new();
    for (&id, analysis) in journals {
        for keyword in &analysis.top_keywords {
            let entry = presence.entry(keyword.term.as_str()).or_default();
            entry.0.insert(id);
            entry.1 += keyword.count;
        }
    }

    let mut topics: Vec<TopicEntry> = presence
        .iter()
        .map(|(term, (ids, total))| TopicEntry {
            term: term.to_string(),
            journals: ids.iter().copied().collect(),
            total_count: *total,
        })
        .collect();
    topics.sort_by(|a, b| {
        b.journals
            .len()
            .cmp(&a.journals.len())
            .then_with(|| a.term.cmp(&b.term))
    });

    let shared = presence
        .iter()
        .filter(|(_, (ids, _))| ids.len() == journals.len())
        .map(|(term, _)| term.to_string())
        .collect();

    let mut unique: BTreeMap<JournalId, Vec<String>> =
        journals.keys().map(|&id| (id, Vec::new())).collect();
    for (term, (ids, _)) in &presence {
        if ids.len() == 1 {
            if let Some(&id) = ids.iter().next() {
                unique.entry(id).or_default().push(term.to_string());
            }
        }
    }

    TopicComparison {
        topics,
        shared,
        unique,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{sample_article, sample_journal, InMemoryCatalog};
    use journalscope_common::catalog::CatalogStore;
    use journalscope_common::config::AnalysisConfig;
    use std::sync::Arc;

    fn journal_with_impact(id: JournalId, impact: Option<f64>, country: &str) -> Journal {
        let mut journal = sample_journal(id, &format!("Journal {}", id));
        journal.impact_factor = impact;
        journal.country = Some(country.to_string());
        journal
    }

    fn comparator(catalog: InMemoryCatalog) -> Comparator {
        let store: Arc<dyn CatalogStore> = Arc::new(catalog);
        Comparator::new(Aggregator::new(store, &AnalysisConfig::default()).unwrap())
    }

    fn two_journal_catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog.insert_journal(journal_with_impact(1, Some(3.0), "China"));
        catalog.insert_journal(journal_with_impact(2, Some(5.0), "USA"));

        let mut a = sample_article(1, 1);
        a.keywords = Some("ai; ml".to_string());
        a.citation_count = Some(9);
        catalog.insert_article(a);

        let mut b = sample_article(2, 2);
        b.keywords = Some("ai; robotics".to_string());
        catalog.insert_article(b);

        let mut c = sample_article(3, 2);
        c.keywords = Some("vision".to_string());
        c.citation_count = Some(2);
        catalog.insert_article(c);

        catalog
    }

    #[tokio::test]
    async fn test_impact_factor_ranking() {
        let result = comparator(two_journal_catalog())
            .compare(&[1, 2], &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(result.impact_factor_comparison.ranking, vec![2, 1]);
        assert_eq!(result.impact_factor_comparison.values[&1], Some(3.0));
        assert_eq!(result.article_count_comparison.ranking, vec![2, 1]);
        assert_eq!(result.citation_comparison.ranking, vec![1, 2]);
        assert!(result.complete);
        assert!(result.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_topic_overlap() {
        let result = comparator(two_journal_catalog())
            .compare(&[2, 1], &Cancellation::none())
            .await
            .unwrap();

        let topics = &result.topic_comparison;
        assert_eq!(topics.topics[0].term, "ai");
        assert_eq!(topics.topics[0].journals, vec![1, 2]);
        assert_eq!(topics.topics[0].total_count, 2);
        assert_eq!(topics.shared, vec!["ai".to_string()]);
        assert_eq!(topics.unique[&1], vec!["ml".to_string()]);
        assert_eq!(topics.unique[&2], vec!["robotics".to_string(), "vision".to_string()]);
        assert_eq!(result.country_distribution["USA"], vec![2]);
    }

    #[tokio::test]
    async fn test_duplicates_collapse_before_cardinality_check() {
        let err = comparator(two_journal_catalog())
            .compare(&[1, 1, 1], &Cancellation::none())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));

        let ok = comparator(two_journal_catalog())
            .compare(&[1, 2, 2, 1], &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(ok.requested, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_partial_comparison_is_annotated() {
        let catalog = two_journal_catalog();
        catalog.insert_journal(journal_with_impact(3, None, "Germany"));

        let result = comparator(catalog)
            .compare(&[1, 2, 3, 42], &Cancellation::none())
            .await
            .unwrap();

        assert!(!result.complete);
        assert_eq!(
            result.skipped,
            vec![SkippedJournal {
                journal_id: 42,
                reason: "journal not found".to_string()
            }]
        );
        assert_eq!(result.journals.len(), 3);
        // Journal 3 has no impact factor and ranks last
        assert_eq!(result.impact_factor_comparison.ranking, vec![2, 1, 3]);
        assert_eq!(result.impact_factor_comparison.values[&3], None);
    }

    #[tokio::test]
    async fn test_too_few_resolved_journals() {
        let err = comparator(two_journal_catalog())
            .compare(&[1, 77, 78], &Cancellation::none())
            .await
            .unwrap_err();

        match err {
            AppError::PartialNotFound { missing, resolved } => {
                assert_eq!(missing, vec![77, 78]);
                assert_eq!(resolved, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_requested_journal_exists() {
        let err = comparator(two_journal_catalog())
            .compare(&[78, 77], &Cancellation::none())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!err.is_recoverable());
        match err {
            AppError::JournalsNotFound { ids } => assert_eq!(ids, vec![77, 78]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ranking_ties_break_by_id() {
        let mut journals = BTreeMap::new();
        for id in [5, 3, 9] {
            let catalog_journal = journal_with_impact(id, Some(1.5), "China");
            let analysis = crate::aggregator::ArticleTally::default().summarize(&catalog_journal, 10);
            journals.insert(id, analysis);
        }

        let comparison = metric_comparison(&journals, |a| a.journal.impact_factor);
        assert_eq!(comparison.ranking, vec![3, 5, 9]);
    }
}
