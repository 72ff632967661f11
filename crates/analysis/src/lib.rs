//! JournalScope analysis engine
//!
//! Per-journal statistics, cross-journal comparison, cohort comparison and
//! report generation over a journal catalog:
//! - `aggregator`: statistics for one journal's article set
//! - `comparator`: rankings and keyword overlap across journals
//! - `cohort`: predicate-based cohort against cohort comparison
//! - `report`: report building and the report store facade
//! - `engine`: the caller-facing surface tying these together

pub mod aggregator;
pub mod cli;
pub mod cohort;
pub mod comparator;
pub mod engine;
pub mod memory;
pub mod report;
pub mod result;
pub mod text;

pub use aggregator::Aggregator;
pub use cohort::{CohortClassifier, CohortPredicate, CountryPredicate, FilterPredicate};
pub use comparator::Comparator;
pub use engine::AnalysisEngine;
pub use memory::InMemoryCatalog;
pub use report::{ReportDraft, ReportStore};
pub use result::AnalysisResult;
