//! Analysis report entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analysis_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// SINGLE or COMPARE
    pub report_type: String,

    /// Set only for SINGLE reports
    pub journal_id: Option<i64>,

    /// Comma separated ids, set only for COMPARE reports
    #[sea_orm(column_type = "Text", nullable)]
    pub journal_ids: Option<String>,

    /// Canonical JSON of the analysis result
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_by: i64,

    pub create_time: DateTime,

    pub update_time: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for crate::catalog::Report {
    type Error = crate::errors::AppError;

    fn try_from(row: Model) -> Result<Self, Self::Error> {
        let kind: crate::catalog::ReportKind = row.report_type.parse()?;
        let scope = crate::catalog::ReportScope::from_parts(
            kind,
            row.journal_id,
            row.journal_ids.as_deref(),
        )?;

        Ok(Self {
            id: row.id,
            title: row.title,
            scope,
            content: row.content,
            created_by: row.created_by,
            created_at: row.create_time.and_utc(),
            updated_at: row.update_time.and_utc(),
        })
    }
}
