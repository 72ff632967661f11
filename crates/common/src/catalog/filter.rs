//! Composable journal filter
//!
//! The same filter is evaluated in memory by `matches` and translated into a
//! SQL condition by the sea-orm repository.

use super::model::Journal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalFilter {
    /// Substring of name, ISSN or publisher (case-insensitive)
    pub keyword: Option<String>,
    /// Exact country
    pub country: Option<String>,
    /// Exact category
    pub category: Option<String>,
}

impl JournalFilter {
    /// Matches every journal
    pub fn all() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = non_blank(keyword.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = non_blank(country.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(category.into());
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.keyword.is_none() && self.country.is_none() && self.category.is_none()
    }

    pub fn matches(&self, journal: &Journal) -> bool {
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let hit = [Some(&journal.name), journal.issn.as_ref(), journal.publisher.as_ref()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(country) = &self.country {
            if journal.country.as_deref() != Some(country.as_str()) {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if journal.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
