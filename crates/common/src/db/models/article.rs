//! Article entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub journal_id: i64,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Delimited author list
    #[sea_orm(column_type = "Text", nullable)]
    pub authors: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub abstract_text: Option<String>,

    /// Delimited keyword list
    #[sea_orm(column_type = "Text", nullable)]
    pub keywords: Option<String>,

    #[sea_orm(nullable)]
    pub doi: Option<String>,

    pub publish_date: Option<Date>,

    pub volume: Option<i32>,

    pub issue: Option<i32>,

    #[sea_orm(nullable)]
    pub pages: Option<String>,

    pub citation_count: Option<i64>,

    pub create_time: DateTime,

    pub update_time: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // No cascade: deleting a journal leaves its articles in place
    #[sea_orm(
        belongs_to = "super::journal::Entity",
        from = "Column::JournalId",
        to = "super::journal::Column::Id"
    )]
    Journal,
}

impl Related<super::journal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::catalog::Article {
    fn from(row: Model) -> Self {
        Self {
            id: row.id,
            journal_id: row.journal_id,
            title: row.title,
            authors: row.authors,
            abstract_text: row.abstract_text,
            keywords: row.keywords,
            doi: row.doi,
            publish_date: row.publish_date,
            volume: row.volume,
            issue: row.issue,
            pages: row.pages,
            citation_count: row.citation_count,
            created_at: row.create_time.and_utc(),
            updated_at: row.update_time.and_utc(),
        }
    }
}
