mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use serde_json::Value;

use catalog::{CatalogModule, CatalogServices};
use repokit::RepositoryRegistry;
use repokit::bootstrap::init_logging;
use repokit_db::connect;

use crate::commands::CourseListArgs;
use crate::config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Browse and seed the dance-course catalog
#[derive(Parser, Debug)]
#[command(name = "catalog-cli")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Insert a small demo data set
    SeedDemo,
    #[command(subcommand)]
    Instructors(InstructorCommands),
    #[command(subcommand)]
    Courses(CourseCommands),
    /// Print the canonical form and cache key of a JSON document
    CacheKey { json: String },
}

#[derive(Subcommand, Debug)]
enum InstructorCommands {
    /// One page of instructors
    List(ListArgs),
    /// First instructor whose field equals the value
    Get { field: String, value: String },
}

#[derive(Subcommand, Debug)]
enum CourseCommands {
    /// One page of courses
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Resolve titles for this locale
        #[arg(long)]
        locale: Option<String>,
        /// Attach every translation row
        #[arg(long)]
        all_translations: bool,
        /// Relations to load, comma separated
        #[arg(long, value_delimiter = ',')]
        with: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    /// URL-encoded `filter`, `sort`, `page` and `limit` parameters
    #[arg(short, long, default_value = "")]
    query: String,
}

fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn services(cfg: &AppConfig) -> Result<CatalogServices> {
    let db = connect(&cfg.database)
        .await
        .with_context(|| format!("connecting to {}", cfg.database.redacted_url()))?;
    let registry = Arc::new(RepositoryRegistry::new());
    CatalogModule::init_with_limits(&db, &registry, &cfg.catalog, cfg.query).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&cfg.logging, cli.verbose);

    if cli.print_config {
        return print(&serde_json::to_value(&cfg)?);
    }

    let Some(command) = cli.command else {
        tracing::info!("no command given, nothing to do");
        return Ok(());
    };

    let output = match command {
        Commands::CacheKey { json } => commands::cache_key_for(&json)?,
        Commands::Migrate => {
            let db = connect(&cfg.database).await?;
            CatalogModule::migrate(&db).await?;
            serde_json::json!({ "migrated": true })
        }
        Commands::SeedDemo => commands::seed_demo(&services(&cfg).await?).await?,
        Commands::Instructors(InstructorCommands::List(list)) => {
            commands::list_instructors(&services(&cfg).await?, &cfg.query, &list.query).await?
        }
        Commands::Instructors(InstructorCommands::Get { field, value }) => {
            commands::get_instructor(&services(&cfg).await?, &field, &value).await?
        }
        Commands::Courses(CourseCommands::List {
            list,
            locale,
            all_translations,
            with,
        }) => {
            let args = CourseListArgs {
                query: &list.query,
                locale: locale.as_deref(),
                all_translations,
                with: &with,
            };
            commands::list_courses(&services(&cfg).await?, &cfg.query, args).await?
        }
    };
    print(&output)
}
