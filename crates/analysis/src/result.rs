//! Analysis result structures
//!
//! Every result serializes with camelCase keys; maps are `BTreeMap`s and
//! lists carry an explicit ordering, so equal inputs give equal bytes.

use journalscope_common::catalog::{Journal, JournalId};
use journalscope_common::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of any analysis operation, externally tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisResult {
    Journal(JournalAnalysis),
    Comparison(ComparisonAnalysis),
    Cohort(CohortAnalysis),
}

impl AnalysisResult {
    /// Canonical JSON: object keys sorted, no insignificant whitespace
    pub fn to_canonical_json(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string(&value)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AnalysisResult::Journal(_) => "journal",
            AnalysisResult::Comparison(_) => "comparison",
            AnalysisResult::Cohort(_) => "cohort",
        }
    }
}

/// Identifying fields of the analyzed journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSummary {
    pub id: JournalId,
    pub name: String,
    pub issn: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub impact_factor: Option<f64>,
}

impl From<&Journal> for JournalSummary {
    fn from(journal: &Journal) -> Self {
        Self {
            id: journal.id,
            name: journal.name.clone(),
            issn: journal.issn.clone(),
            country: journal.country.clone(),
            category: journal.category.clone(),
            impact_factor: journal.impact_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationStats {
    /// Articles with a recorded citation count
    pub articles_with_citations: u64,
    pub sum: i64,
    /// Absent when no article has citation data
    pub mean: Option<f64>,
    pub max: Option<i64>,
}

/// Statistics for one journal's article set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalAnalysis {
    pub journal: JournalSummary,
    pub article_count: u64,
    /// Year ascending
    pub yearly_stats: Vec<YearCount>,
    /// Articles without a publish date
    pub undated: u64,
    pub top_keywords: Vec<TermCount>,
    pub top_authors: Vec<TermCount>,
    pub distinct_keywords: u64,
    pub distinct_authors: u64,
    pub citation_stats: CitationStats,
}

/// A scalar metric across journals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    /// Null when the journal has no value for the metric
    pub values: BTreeMap<JournalId, Option<f64>>,
    /// Descending by value, ties by id ascending, missing values last
    pub ranking: Vec<JournalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    pub term: String,
    /// Journals whose top keywords include the term, ascending
    pub journals: Vec<JournalId>,
    /// Summed count over those journals
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicComparison {
    /// Presence count descending, then term ascending
    pub topics: Vec<TopicEntry>,
    /// Terms in every journal's top keywords, ascending
    pub shared: Vec<String>,
    /// Terms only one journal exhibits, per journal, ascending
    pub unique: BTreeMap<JournalId, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedJournal {
    pub journal_id: JournalId,
    pub reason: String,
}

/// Cross-journal comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonAnalysis {
    /// Distinct requested ids, ascending
    pub requested: Vec<JournalId>,
    /// False when some requested journals were skipped
    pub complete: bool,
    pub skipped: Vec<SkippedJournal>,
    pub journals: BTreeMap<JournalId, JournalAnalysis>,
    pub impact_factor_comparison: MetricComparison,
    pub article_count_comparison: MetricComparison,
    pub citation_comparison: MetricComparison,
    pub topic_comparison: TopicComparison,
    pub trend_comparison: BTreeMap<JournalId, Vec<YearCount>>,
    /// Country to journal ids; journals without a country are under "unknown"
    pub country_distribution: BTreeMap<String, Vec<JournalId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    /// Journals contributing a value
    pub count: u64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub label: String,
    pub journal_count: u64,
    pub journal_ids: Vec<JournalId>,
    pub metrics: BTreeMap<String, MetricSummary>,
    /// Keyword counts merged over every article in the cohort
    pub top_keywords: Vec<TermCount>,
}

/// Cohort against cohort comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortAnalysis {
    pub predicate: String,
    pub cohort_a: CohortSummary,
    pub cohort_b: CohortSummary,
    pub comparison_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    pub country: String,
    pub journal_count: u64,
}

/// Catalog-wide statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverview {
    pub journal_count: u64,
    /// Count descending, then country ascending
    pub countries: Vec<CountryCount>,
}
