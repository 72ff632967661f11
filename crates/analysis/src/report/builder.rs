//! Report drafts and their conversion into storable reports
//!
//! Titles are validated before anything is stored, and a single-journal
//! draft must wrap an analysis of that same journal.

use crate::result::AnalysisResult;
use chrono::{DateTime, Utc};
use journalscope_common::catalog::{JournalId, NewReport, ReportKind, ReportScope, UserId};
use journalscope_common::errors::{AppError, Result};
use validator::Validate;

/// Caller-supplied report metadata
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ReportDraft {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub scope: ReportScope,
    pub author: UserId,
}

impl ReportDraft {
    pub fn new(title: impl Into<String>, scope: ReportScope, author: UserId) -> Self {
        Self {
            title: title.into().trim().to_string(),
            scope,
            author,
        }
    }

    /// Build from the loose request shape: a kind plus either a journal id
    /// or a comma-separated id list
    pub fn from_parts(
        title: impl Into<String>,
        kind: ReportKind,
        journal_id: Option<JournalId>,
        journal_ids: Option<&str>,
        author: UserId,
    ) -> Result<Self> {
        let scope = ReportScope::from_parts(kind, journal_id, journal_ids)?;
        Ok(Self::new(title, scope, author))
    }
}

/// Wrap `result` into a report stamped with the current time
pub fn build_report(draft: ReportDraft, result: &AnalysisResult) -> Result<NewReport> {
    build_report_at(draft, result, Utc::now())
}

pub fn build_report_at(
    draft: ReportDraft,
    result: &AnalysisResult,
    now: DateTime<Utc>,
) -> Result<NewReport> {
    draft.validate()?;

    if let (ReportScope::Single { journal_id }, AnalysisResult::Journal(analysis)) =
        (&draft.scope, result)
    {
        if analysis.journal.id != *journal_id {
            return Err(AppError::invalid(
                "journal_id",
                format!(
                    "report references journal {} but the analysis is of journal {}",
                    journal_id, analysis.journal.id
                ),
            ));
        }
    }

    Ok(NewReport {
        title: draft.title,
        scope: draft.scope,
        content: result.to_canonical_json()?,
        created_by: draft.author,
        created_at: now,
        updated_at: now,
    })
}
