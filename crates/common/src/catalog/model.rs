//! Domain records exchanged with the catalog store

use crate::errors::{AppError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub type JournalId = i64;
pub type ArticleId = i64;
pub type ReportId = i64;
pub type UserId = i64;

/// A catalogued journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    pub name: String,
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub impact_factor: Option<f64>,
    pub frequency: Option<String>,
    pub description: Option<String>,
    pub official_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An article published in exactly one journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub journal_id: JournalId,
    pub title: String,
    /// Ordered author list as delimited text
    pub authors: Option<String>,
    pub abstract_text: Option<String>,
    /// Keyword set as delimited text
    pub keywords: Option<String>,
    pub doi: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub volume: Option<i32>,
    pub issue: Option<i32>,
    pub pages: Option<String>,
    pub citation_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage tag of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    Single,
    Compare,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Single => "SINGLE",
            ReportKind::Compare => "COMPARE",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(ReportKind::Single),
            "COMPARE" => Ok(ReportKind::Compare),
            other => Err(AppError::invalid(
                "kind",
                format!("unknown report kind '{}', expected SINGLE or COMPARE", other),
            )),
        }
    }
}

/// At least two distinct journal ids, kept in ascending order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<JournalId>", into = "Vec<JournalId>")]
pub struct JournalSet(Vec<JournalId>);

impl JournalSet {
    pub fn new(ids: impl IntoIterator<Item = JournalId>) -> Result<Self> {
        let distinct: BTreeSet<JournalId> = ids.into_iter().collect();
        if distinct.len() < 2 {
            return Err(AppError::invalid(
                "journal_ids",
                format!("a comparison needs at least 2 distinct journals, got {}", distinct.len()),
            ));
        }
        Ok(Self(distinct.into_iter().collect()))
    }

    /// Parse the comma separated storage form
    pub fn parse(text: &str) -> Result<Self> {
        let ids = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<JournalId>()
                    .map_err(|_| AppError::invalid("journal_ids", format!("'{}' is not a journal id", s)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(ids)
    }

    pub fn ids(&self) -> &[JournalId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma separated storage form
    pub fn to_storage(&self) -> String {
        self.0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
    }
}

impl TryFrom<Vec<JournalId>> for JournalSet {
    type Error = AppError;

    fn try_from(ids: Vec<JournalId>) -> Result<Self> {
        Self::new(ids)
    }
}

impl From<JournalSet> for Vec<JournalId> {
    fn from(set: JournalSet) -> Self {
        set.0
    }
}

/// What a report is about. The variant fixes the payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportScope {
    Single { journal_id: JournalId },
    Compare { journal_ids: JournalSet },
}

impl ReportScope {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportScope::Single { .. } => ReportKind::Single,
            ReportScope::Compare { .. } => ReportKind::Compare,
        }
    }

    /// Rebuild a scope from the loosely typed storage columns
    pub fn from_parts(
        kind: ReportKind,
        journal_id: Option<JournalId>,
        journal_ids: Option<&str>,
    ) -> Result<Self> {
        let journal_ids = journal_ids.filter(|s| !s.trim().is_empty());
        match (kind, journal_id, journal_ids) {
            (ReportKind::Single, Some(id), None) => Ok(ReportScope::Single { journal_id: id }),
            (ReportKind::Single, None, _) => Err(AppError::invalid(
                "journal_id",
                "a SINGLE report requires a journal id",
            )),
            (ReportKind::Single, Some(_), Some(_)) => Err(AppError::invalid(
                "journal_ids",
                "a SINGLE report must not carry a journal id set",
            )),
            (ReportKind::Compare, None, Some(ids)) => Ok(ReportScope::Compare {
                journal_ids: JournalSet::parse(ids)?,
            }),
            (ReportKind::Compare, Some(_), _) => Err(AppError::invalid(
                "journal_id",
                "a COMPARE report must not carry a single journal id",
            )),
            (ReportKind::Compare, None, None) => Err(AppError::invalid(
                "journal_ids",
                "a COMPARE report requires a journal id set",
            )),
        }
    }

    pub fn journal_id(&self) -> Option<JournalId> {
        match self {
            ReportScope::Single { journal_id } => Some(*journal_id),
            ReportScope::Compare { .. } => None,
        }
    }

    pub fn journal_ids(&self) -> Option<&JournalSet> {
        match self {
            ReportScope::Single { .. } => None,
            ReportScope::Compare { journal_ids } => Some(journal_ids),
        }
    }
}

/// A report that has been built but not yet stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub scope: ReportScope,
    /// Canonical JSON of the analysis result
    pub content: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub scope: ReportScope,
    pub content: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn from_new(id: ReportId, report: NewReport) -> Self {
        Self {
            id,
            title: report.title,
            scope: report.scope,
            content: report.content,
            created_by: report.created_by,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.scope.kind()
    }
}

/// Who is asking to see reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(UserId),
    Admin(UserId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_set_dedups_and_sorts() {
        let set = JournalSet::new([5, 2, 5, 9]).unwrap();
        assert_eq!(set.ids(), &[2, 5, 9]);
        assert_eq!(set.to_storage(), "2,5,9");
    }

    #[test]
    fn test_journal_set_rejects_single_distinct_id() {
        let err = JournalSet::new([4, 4, 4]).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn test_journal_set_parse() {
        let set = JournalSet::parse(" 3, 1 ,,3").unwrap();
        assert_eq!(set.ids(), &[1, 3]);
        assert!(JournalSet::parse("1,x").is_err());
    }

    #[test]
    fn test_scope_from_parts() {
        let single = ReportScope::from_parts(ReportKind::Single, Some(7), None).unwrap();
        assert_eq!(single.journal_id(), Some(7));

        let err = ReportScope::from_parts(ReportKind::Single, None, Some("1,2")).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));

        let compare = ReportScope::from_parts(ReportKind::Compare, None, Some("2,1")).unwrap();
        assert_eq!(compare.kind(), ReportKind::Compare);
        assert_eq!(compare.journal_ids().unwrap().ids(), &[1, 2]);

        assert!(ReportScope::from_parts(ReportKind::Compare, Some(1), Some("1,2")).is_err());
        assert!(ReportScope::from_parts(ReportKind::Compare, None, Some("1")).is_err());
    }

    #[test]
    fn test_report_kind_parse() {
        assert_eq!("single".parse::<ReportKind>().unwrap(), ReportKind::Single);
        assert_eq!(ReportKind::Compare.to_string(), "COMPARE");
        assert!("DIFF".parse::<ReportKind>().is_err());
    }
}
