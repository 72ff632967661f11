//! Command-line interface argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use journalscope_common::catalog::{JournalFilter, JournalId, ReportId, ReportKind, UserId, Viewer};
use std::path::PathBuf;

/// JournalScope - statistics and comparison reports over a journal catalog
///
/// Examples:
///   journalscope --demo analyze 1
///   journalscope compare 3,7,9
///   journalscope cohorts --category "Computer Science"
///   journalscope report generate --title "Q3 review" --kind single --journal-id 7 --author 42
#[derive(Parser, Debug)]
#[command(name = "journalscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use the built-in demo catalog instead of the database
    #[arg(long, global = true)]
    pub demo: bool,

    /// Path to a configuration file
    #[arg(short, long, value_name = "FILE", env = "JOURNALSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Abort the command after this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Statistics for one journal
    Analyze {
        journal_id: JournalId,
    },

    /// Compare two or more journals
    Compare {
        /// Comma-separated journal ids
        #[arg(value_delimiter = ',', num_args = 1.., required = true)]
        journal_ids: Vec<JournalId>,
    },

    /// Compare journals in a country set against all others
    Cohorts {
        /// Countries forming the first cohort (defaults to the configured domestic set)
        #[arg(long, value_delimiter = ',')]
        countries: Option<Vec<String>>,

        /// Label of the first cohort
        #[arg(long)]
        label_a: Option<String>,

        /// Label of the second cohort
        #[arg(long)]
        label_b: Option<String>,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,

        /// Restrict to journals whose name, ISSN or publisher contains this text
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Catalog-wide journal counts
    Overview,

    /// Stored reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Analyze and store a new report
    Generate {
        #[arg(long)]
        title: String,

        #[arg(long, value_enum)]
        kind: KindArg,

        /// Journal of a single-journal report
        #[arg(long)]
        journal_id: Option<JournalId>,

        /// Comma-separated journals of a comparison report
        #[arg(long)]
        journal_ids: Option<String>,

        #[arg(long)]
        author: UserId,
    },

    /// Show one report
    Get { id: ReportId },

    /// List reports visible to a user, or all reports with --admin
    List {
        #[arg(long)]
        user: Option<UserId>,

        #[arg(long)]
        admin: bool,
    },

    /// Delete a report
    Delete { id: ReportId },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Single,
    Compare,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Single => ReportKind::Single,
            KindArg::Compare => ReportKind::Compare,
        }
    }
}

/// Who a `report list` runs as
pub fn viewer(user: Option<UserId>, admin: bool) -> Viewer {
    match (user, admin) {
        (Some(id), true) => Viewer::Admin(id),
        (None, true) => Viewer::Admin(0),
        (Some(id), false) => Viewer::User(id),
        (None, false) => Viewer::Anonymous,
    }
}

pub fn scope_filter(category: Option<String>, keyword: Option<String>) -> JournalFilter {
    let mut filter = JournalFilter::all();
    if let Some(category) = category {
        filter = filter.category(category);
    }
    if let Some(keyword) = keyword {
        filter = filter.keyword(keyword);
    }
    filter
}
