//! Report construction and persistence
//!
//! `builder` turns an analysis result into a storable report with a
//! validated title and a scope consistent with its content. `store` is the
//! facade over the catalog's report table.

pub mod builder;
pub mod store;

pub use builder::{build_report, build_report_at, ReportDraft};
pub use store::ReportStore;
