//! JournalScope command-line entry point
//!
//! Runs one engine operation against the catalog database (or the demo
//! catalog) and prints the JSON result to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use journalscope_analysis::cli::{self, Cli, Commands, ReportCommand};
use journalscope_analysis::memory::demo_catalog;
use journalscope_analysis::{AnalysisEngine, AnalysisResult, CountryPredicate, ReportDraft};
use journalscope_common::catalog::{CatalogStore, ReportKind, ReportScope};
use journalscope_common::config::{AppConfig, ObservabilityConfig};
use journalscope_common::errors::{AppError, ErrorDetails};
use journalscope_common::{metrics, Cancellation, DbPool, Repository};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(&path.to_string_lossy()),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&config.observability, cli.verbose);
    info!(
        service = %config.observability.service_name,
        "Starting JournalScope v{}",
        journalscope_common::VERSION
    );

    metrics::register_metrics();

    let store: Arc<dyn CatalogStore> = if cli.demo {
        info!("Using demo catalog");
        Arc::new(demo_catalog())
    } else {
        info!("Connecting to database...");
        let pool = DbPool::new(&config.database)
            .await
            .context("Failed to connect to the catalog database")?;
        let repository = Repository::new(pool, &config.database);
        repository.ping().await.context("Catalog database is not reachable")?;
        Arc::new(repository)
    };

    let engine = AnalysisEngine::new(store, config.analysis.clone())?;

    let (handle, mut cancel) = Cancellation::new();
    if let Some(secs) = cli.timeout_secs {
        cancel = cancel.with_timeout(Duration::from_secs(secs));
    }
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling");
            handle.cancel();
        }
    });

    let output = match run(&engine, cli.command, &cancel).await {
        Ok(output) => output,
        Err(err) => match err.downcast_ref::<AppError>() {
            Some(app_err) => report_failure(app_err, cli.pretty),
            None => return Err(err),
        },
    };
    print_json(&output, cli.pretty)?;

    Ok(())
}

/// Print an engine error as a JSON payload on stderr and exit
fn report_failure(err: &AppError, pretty: bool) -> ! {
    if err.is_server_error() {
        error!(code = ?err.code(), error = %err, "Command failed");
    } else {
        warn!(code = ?err.code(), error = %err, "Command rejected");
    }

    let details = serde_json::to_value(ErrorDetails::from(err))
        .unwrap_or_else(|_| serde_json::json!({ "message": err.to_string() }));
    let rendered = if pretty {
        serde_json::to_string_pretty(&details)
    } else {
        serde_json::to_string(&details)
    };
    eprintln!("{}", rendered.unwrap_or_default());

    std::process::exit(if err.is_client_error() { 2 } else { 1 })
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(engine: &AnalysisEngine, command: Commands, cancel: &Cancellation) -> Result<serde_json::Value> {
    match command {
        Commands::Analyze { journal_id } => to_json(&engine.analyze_journal(journal_id, cancel).await?),
        Commands::Compare { journal_ids } => to_json(&engine.compare_journals(&journal_ids, cancel).await?),
        Commands::Cohorts {
            countries,
            label_a,
            label_b,
            category,
            keyword,
        } => {
            let analysis = engine.config();
            let predicate = match countries {
                Some(countries) => CountryPredicate::new(countries),
                None => CountryPredicate::from_config(analysis),
            };
            let label_a = label_a.unwrap_or_else(|| analysis.domestic_label.clone());
            let label_b = label_b.unwrap_or_else(|| analysis.international_label.clone());
            let scope = cli::scope_filter(category, keyword);

            let result = engine
                .compare_cohorts(&predicate, &label_a, &label_b, &scope, cancel)
                .await?;
            to_json(&result)
        }
        Commands::Overview => to_json(&engine.catalog_overview(cancel).await?),
        Commands::Report(command) => run_report(engine, command, cancel).await,
    }
}

async fn run_report(engine: &AnalysisEngine, command: ReportCommand, cancel: &Cancellation) -> Result<serde_json::Value> {
    match command {
        ReportCommand::Generate {
            title,
            kind,
            journal_id,
            journal_ids,
            author,
        } => {
            let draft = ReportDraft::from_parts(
                title,
                ReportKind::from(kind),
                journal_id,
                journal_ids.as_deref(),
                author,
            )?;

            let result: AnalysisResult = match &draft.scope {
                ReportScope::Single { journal_id } => engine.analyze_journal(*journal_id, cancel).await?,
                ReportScope::Compare { journal_ids } => engine.compare_journals(journal_ids.ids(), cancel).await?,
            };

            let id = engine.generate_report(draft, &result, cancel).await?;
            Ok(serde_json::json!({ "id": id }))
        }
        ReportCommand::Get { id } => to_json(&engine.get_report(id, cancel).await?),
        ReportCommand::List { user, admin } => {
            to_json(&engine.list_visible_reports(cli::viewer(user, admin), cancel).await?)
        }
        ReportCommand::Delete { id } => {
            let deleted = engine.delete_report(id, cancel).await?;
            Ok(serde_json::json!({ "id": id, "deleted": deleted }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
