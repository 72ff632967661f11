//! Cohort classification
//!
//! Splits the journals in scope into two disjoint cohorts with a pluggable
//! predicate and summarizes each cohort's per-journal statistics.

use crate::aggregator::Aggregator;
use crate::result::{CohortAnalysis, CohortSummary, MetricSummary};
use crate::text::top_terms;
use journalscope_common::catalog::{Journal, JournalFilter, JournalId};
use journalscope_common::config::AnalysisConfig;
use journalscope_common::errors::{AppError, Result};
use journalscope_common::Cancellation;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument};

const TIE_TOLERANCE: f64 = 1e-9;

/// Decides which cohort a journal belongs to. Matching journals form cohort A.
pub trait CohortPredicate: Send + Sync {
    fn matches(&self, journal: &Journal) -> bool;

    /// Human-readable description recorded in the result
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

impl<F> CohortPredicate for F
where
    F: Fn(&Journal) -> bool + Send + Sync,
{
    fn matches(&self, journal: &Journal) -> bool {
        self(journal)
    }
}

/// Journals whose country is in a fixed set, compared case-insensitively
#[derive(Debug, Clone)]
pub struct CountryPredicate {
    countries: Vec<String>,
}

impl CountryPredicate {
    pub fn new<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut countries: Vec<String> = countries
            .into_iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        countries.sort();
        countries.dedup();
        Self { countries }
    }

    /// The domestic country set from configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(&config.domestic_countries)
    }
}

impl CohortPredicate for CountryPredicate {
    fn matches(&self, journal: &Journal) -> bool {
        journal
            .country
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .is_some_and(|c| self.countries.contains(&c))
    }

    fn describe(&self) -> String {
        format!("country in [{}]", self.countries.join(", "))
    }
}

/// Journals accepted by a `JournalFilter`
#[derive(Debug, Clone)]
pub struct FilterPredicate(pub JournalFilter);

impl CohortPredicate for FilterPredicate {
    fn matches(&self, journal: &Journal) -> bool {
        self.0.matches(journal)
    }

    fn describe(&self) -> String {
        describe_filter(&self.0)
    }
}

fn describe_filter(filter: &JournalFilter) -> String {
    let parts: Vec<String> = [
        ("keyword", &filter.keyword),
        ("country", &filter.country),
        ("category", &filter.category),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}={}", name, v)))
    .collect();

    if parts.is_empty() {
        "all journals".to_string()
    } else {
        parts.join(" ")
    }
}

/// One journal's contribution to its cohort's metrics
struct JournalMetrics {
    values: BTreeMap<&'static str, Option<f64>>,
}

#[derive(Clone)]
pub struct CohortClassifier {
    aggregator: Aggregator,
}

impl CohortClassifier {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    #[instrument(skip(self, predicate, scope, cancel), fields(predicate = %predicate.describe()))]
    pub async fn compare_cohorts(
        &self,
        predicate: &dyn CohortPredicate,
        label_a: &str,
        label_b: &str,
        scope: &JournalFilter,
        cancel: &Cancellation,
    ) -> Result<CohortAnalysis> {
        let label_a = label_a.trim();
        let label_b = label_b.trim();
        if label_a.is_empty() || label_b.is_empty() {
            return Err(AppError::invalid("label", "cohort labels must not be empty"));
        }
        if label_a == label_b {
            return Err(AppError::invalid(
                "label",
                format!("cohort labels must differ, both are '{}'", label_a),
            ));
        }

        let journals = self.aggregator.journals(scope, cancel).await?;
        let (cohort_a, cohort_b): (Vec<Journal>, Vec<Journal>) =
            journals.into_iter().partition(|j| predicate.matches(j));

        info!(
            cohort_a = cohort_a.len(),
            cohort_b = cohort_b.len(),
            "Journals partitioned"
        );

        for (label, cohort) in [(label_a, &cohort_a), (label_b, &cohort_b)] {
            if cohort.is_empty() {
                return Err(AppError::invalid(
                    "predicate",
                    format!("cohort '{}' is empty", label),
                ));
            }
        }

        let summary_a = self.summarize(label_a, &cohort_a, cancel).await?;
        let summary_b = self.summarize(label_b, &cohort_b, cancel).await?;

        let mut description = predicate.describe();
        if !scope.is_unrestricted() {
            description = format!("{} within {}", description, describe_filter(scope));
        }

        Ok(CohortAnalysis {
            predicate: description,
            comparison_summary: comparison_summary(&summary_a, &summary_b),
            cohort_a: summary_a,
            cohort_b: summary_b,
        })
    }

    async fn summarize(
        &self,
        label: &str,
        journals: &[Journal],
        cancel: &Cancellation,
    ) -> Result<CohortSummary> {
        let mut per_journal = Vec::with_capacity(journals.len());
        let mut keywords: HashMap<String, u64> = HashMap::new();
        let mut journal_ids: Vec<JournalId> = Vec::with_capacity(journals.len());

        for journal in journals {
            let tally = self.aggregator.tally(journal.id, cancel).await?;
            let citations = tally.citation_stats();

            let mut values = BTreeMap::new();
            values.insert("articleCount", Some(tally.article_count as f64));
            values.insert("impactFactor", journal.impact_factor);
            values.insert(
                "citationSum",
                (citations.articles_with_citations > 0).then_some(citations.sum as f64),
            );
            values.insert("citationMean", citations.mean);
            values.insert("undated", Some(tally.undated as f64));
            per_journal.push(JournalMetrics { values });

            for (term, count) in &tally.keywords {
                *keywords.entry(term.clone()).or_default() += count;
            }
            journal_ids.push(journal.id);
        }
        journal_ids.sort_unstable();

        let mut metrics = BTreeMap::new();
        for name in ["articleCount", "impactFactor", "citationSum", "citationMean", "undated"] {
            let values: Vec<f64> = per_journal
                .iter()
                .filter_map(|m| m.values.get(name).copied().flatten())
                .collect();
            metrics.insert(name.to_string(), metric_summary(values));
        }

        Ok(CohortSummary {
            label: label.to_string(),
            journal_count: journals.len() as u64,
            journal_ids,
            metrics,
            top_keywords: top_terms(&keywords, self.aggregator.top_n()),
        })
    }
}

/// Mean and median over the values that are present
pub fn metric_summary(mut values: Vec<f64>) -> MetricSummary {
    if values.is_empty() {
        return MetricSummary::default();
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };

    MetricSummary {
        count: n as u64,
        mean: Some(mean),
        median: Some(median),
    }
}

/// One clause per metric, in metric name order, naming the cohort with the higher mean
pub fn comparison_summary(a: &CohortSummary, b: &CohortSummary) -> String {
    let clauses: Vec<String> = a
        .metrics
        .iter()
        .map(|(name, metric_a)| {
            let mean_b = b.metrics.get(name).and_then(|m| m.mean);
            match (metric_a.mean, mean_b) {
                (Some(x), Some(y)) if (x - y).abs() <= TIE_TOLERANCE => {
                    format!("{}: tie at {:.2}", name, x)
                }
                (Some(x), Some(y)) if x > y => {
                    format!("{}: {} leads ({:.2} vs {:.2})", name, a.label, x, y)
                }
                (Some(x), Some(y)) => {
                    format!("{}: {} leads ({:.2} vs {:.2})", name, b.label, y, x)
                }
                _ => format!("{}: insufficient data", name),
            }
        })
        .collect();

    clauses.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{demo_catalog, InMemoryCatalog};
    use journalscope_common::catalog::CatalogStore;
    use std::sync::Arc;

    fn classifier(catalog: Arc<InMemoryCatalog>) -> CohortClassifier {
        let store: Arc<dyn CatalogStore> = catalog;
        CohortClassifier::new(Aggregator::new(store, &AnalysisConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_domestic_international_split() {
        let catalog = Arc::new(demo_catalog());
        let predicate = CountryPredicate::from_config(&AnalysisConfig::default());

        let result = classifier(Arc::clone(&catalog))
            .compare_cohorts(
                &predicate,
                "domestic",
                "international",
                &JournalFilter::all(),
                &Cancellation::none(),
            )
            .await
            .unwrap();

        assert_eq!(result.cohort_a.journal_ids, vec![1, 2]);
        assert_eq!(result.cohort_b.journal_ids, vec![3, 4]);

        let impact_a = &result.cohort_a.metrics["impactFactor"];
        assert_eq!(impact_a.count, 2);
        assert!((impact_a.mean.unwrap() - 2.65).abs() < 1e-9);
        assert!((result.cohort_b.metrics["impactFactor"].median.unwrap() - 9.3).abs() < 1e-9);

        assert!(result
            .comparison_summary
            .contains("impactFactor: international leads (9.30 vs 2.65)"));
        assert!(result.comparison_summary.contains("articleCount: tie at 2.00"));
        assert_eq!(result.cohort_a.top_keywords[0].term, "deep learning");
        assert_eq!(catalog.report_writes(), 0);
    }

    #[tokio::test]
    async fn test_empty_cohort_rejected_without_writes() {
        let catalog = Arc::new(demo_catalog());
        let predicate = CountryPredicate::new(["Japan"]);

        let err = classifier(Arc::clone(&catalog))
            .compare_cohorts(&predicate, "japan", "rest", &JournalFilter::all(), &Cancellation::none())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidArgument { .. }));
        assert_eq!(catalog.report_writes(), 0);
    }

    #[tokio::test]
    async fn test_scope_can_empty_a_cohort() {
        let catalog = Arc::new(demo_catalog());
        let predicate = CountryPredicate::new(["china"]);

        let err = classifier(catalog)
            .compare_cohorts(
                &predicate,
                "domestic",
                "international",
                &JournalFilter::all().country("China"),
                &Cancellation::none(),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("international"));
    }

    #[tokio::test]
    async fn test_labels_validated() {
        let catalog = Arc::new(demo_catalog());
        let predicate = CountryPredicate::new(["China"]);
        let classifier = classifier(catalog);

        for (a, b) in [("", "other"), ("same", "same"), ("  ", "x")] {
            let err = classifier
                .compare_cohorts(&predicate, a, b, &JournalFilter::all(), &Cancellation::none())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument { .. }));
        }
    }

    #[tokio::test]
    async fn test_closure_predicate() {
        let catalog = Arc::new(demo_catalog());
        let high_impact = |journal: &Journal| journal.impact_factor.unwrap_or(0.0) > 5.0;

        let result = classifier(catalog)
            .compare_cohorts(&high_impact, "high", "low", &JournalFilter::all(), &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(result.predicate, "custom predicate");
        assert_eq!(result.cohort_a.journal_ids, vec![3, 4]);
        assert_eq!(result.cohort_b.journal_count, 2);
    }

    #[test]
    fn test_metric_summary_median() {
        let odd = metric_summary(vec![5.0, 1.0, 3.0]);
        assert_eq!(odd.median, Some(3.0));
        assert_eq!(odd.mean, Some(3.0));

        let even = metric_summary(vec![4.0, 1.0, 3.0, 2.0]);
        assert_eq!(even.median, Some(2.5));

        let empty = metric_summary(vec![]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
    }

    #[test]
    fn test_filter_predicate_description() {
        let predicate = FilterPredicate(JournalFilter::all().category("Physics").country("USA"));
        assert_eq!(predicate.describe(), "country=USA category=Physics");
        assert_eq!(CountryPredicate::new(["CN", "China", "cn"]).describe(), "country in [china, cn]");
    }
}
