//! Journal entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(nullable)]
    pub issn: Option<String>,

    #[sea_orm(nullable)]
    pub publisher: Option<String>,

    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub language: Option<String>,

    #[sea_orm(nullable)]
    pub category: Option<String>,

    #[sea_orm(column_type = "Double", nullable)]
    pub impact_factor: Option<f64>,

    #[sea_orm(nullable)]
    pub frequency: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub official_url: Option<String>,

    pub create_time: DateTime,

    pub update_time: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::catalog::Journal {
    fn from(row: Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            issn: row.issn,
            publisher: row.publisher,
            country: row.country,
            language: row.language,
            category: row.category,
            impact_factor: row.impact_factor,
            frequency: row.frequency,
            description: row.description,
            official_url: row.official_url,
            created_at: row.create_time.and_utc(),
            updated_at: row.update_time.and_utc(),
        }
    }
}
