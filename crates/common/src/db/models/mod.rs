//! SeaORM entity models
//!
//! Database entities for the journal catalog

mod journal;
mod article;
mod analysis_report;

pub use journal::{
    Entity as JournalEntity,
    Column as JournalColumn,
};

pub use article::{
    Entity as ArticleEntity,
    Column as ArticleColumn,
};

pub use analysis_report::{
    Entity as ReportEntity,
    ActiveModel as ReportActiveModel,
    Column as ReportColumn,
};
