use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use regex::Regex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kpi_transformer::catalog;
use kpi_transformer::config::{Config, LoggingConfig};
use kpi_transformer::models::Category;
use kpi_transformer::services::{
    db, load_table_list, MySqlDestinationStore, MySqlSourceStore, OperatorMap, Transformer,
};
use kpi_transformer::{TransformError, TransformResult};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CategoryArg {
    FiveMin,
    FifteenMin,
    Mgw,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::FiveMin => Category::FiveMinute,
            CategoryArg::FifteenMin => Category::FifteenMinute,
            CategoryArg::Mgw => Category::Gateway,
        }
    }
}

#[derive(Parser)]
#[command(name = "kpi-transformer", about = "Counter-to-KPI aggregation engine")]
struct Cli {
    /// Restrict the run to specific categories (default: all enabled ones)
    #[arg(long = "category", value_enum)]
    categories: Vec<CategoryArg>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load()?;
    let _guard = init_tracing(&config.logging)?;

    let selected: Vec<Category> = if cli.categories.is_empty() {
        Category::ALL.to_vec()
    } else {
        cli.categories.iter().map(|c| Category::from(*c)).collect()
    };

    let config = Arc::new(config);
    let mut workers = Vec::new();
    for category in selected {
        if !config.categories.get(category).enabled {
            tracing::info!("Category {} is disabled, skipping", category);
            continue;
        }
        let config = Arc::clone(&config);
        workers.push((category, tokio::spawn(run_category(config, category))));
    }
    let total = workers.len();

    let mut failed = Vec::new();
    for (category, worker) in workers {
        match worker.await {
            Ok(Ok(())) => tracing::info!("Completed processing for {} data", category),
            Ok(Err(e)) => {
                tracing::error!("Error processing {} data: {}", category, e);
                failed.push(category);
            },
            Err(e) => {
                tracing::error!("Worker for {} data panicked: {}", category, e);
                failed.push(category);
            },
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} of {} workers failed", failed.len(), total);
    }
    tracing::info!("All workers completed");
    Ok(())
}

/// Run one category worker to completion. Failures here are isolated:
/// sibling workers keep running.
async fn run_category(config: Arc<Config>, category: Category) -> TransformResult<()> {
    let catalog = catalog::for_category(category)?;
    if catalog.is_empty() {
        tracing::warn!("Skipping {} processing: empty KPI catalog", category);
        return Ok(());
    }

    let category_config = config.categories.get(category);
    let tables = load_table_list(&category_config.table_list)?;
    if tables.is_empty() {
        tracing::warn!("Skipping {} processing: no tables to process", category);
        return Ok(());
    }
    let node_pattern = Regex::new(&category_config.node_pattern)
        .map_err(|e| TransformError::config(format!("invalid node pattern: {}", e)))?;

    tracing::info!("Starting processing for {} data", category);
    let source_pool =
        db::connect_with_retry(db::source_opts(&config.source), "source").await?;
    let destination_pool = db::connect_with_retry(
        db::destination_opts(&config.destination, &category_config.database),
        "destination",
    )
    .await?;

    let transformer = Transformer::new(
        category,
        catalog,
        OperatorMap::from_config(&config.operators.mapping),
        node_pattern,
        tables,
        MySqlSourceStore::new(source_pool),
        MySqlDestinationStore::new(destination_pool),
    );
    let result = transformer.process().await;

    let (source, destination) = transformer.into_stores();
    source.disconnect().await;
    destination.disconnect().await;
    result
}

fn init_tracing(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let stdout_layer = tracing_subscriber::fmt::layer();

    if let Some(file) = &config.file {
        let path = Path::new(file);
        let directory = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let file_name =
            path.file_name().and_then(|n| n.to_str()).unwrap_or("transformer.log");
        let appender = tracing_appender::rolling::daily(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
        tracing_subscriber::registry().with(filter).with(stdout_layer).with(file_layer).init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry().with(filter).with(stdout_layer).init();
        Ok(None)
    }
}
