//! Foodgram maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! # Load the ingredient catalog (JSON array or headerless CSV)
//! DATABASE_URL=postgres://... foodgram-admin load-ingredients --file data/ingredients.csv
//!
//! # Insert the default tag set
//! DATABASE_URL=postgres://... foodgram-admin create-tags
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::Database;
use serde::Deserialize;

use foodgram::infra::db::{DbIngredientRepository, DbTagRepository};
use foodgram::usecase::catalog::{CreateDefaultTagsUseCase, LoadIngredientsUseCase};
use foodgram_core::config::Config;
use foodgram_core::tracing::init_tracing;

mod loader;

#[derive(Parser)]
#[command(about = "Foodgram data maintenance")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load ingredients, skipping pairs that already exist
    LoadIngredients {
        /// `.json` file with `[{name, measurement_unit}]`, or CSV rows `name,measurement_unit`
        #[arg(long)]
        file: PathBuf,
    },
    /// Insert the default tags, skipping existing slugs
    CreateTags,
}

#[derive(Deserialize)]
struct AdminConfig {
    database_url: String,
}

impl Config for AdminConfig {}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = AdminConfig::try_from_env().context("read DATABASE_URL")?;
    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    match args.command {
        Command::LoadIngredients { file } => {
            let raw = tokio::fs::read(&file)
                .await
                .with_context(|| format!("read {}", file.display()))?;
            let rows = loader::parse(&file, &raw)?;
            let total = rows.len();
            let usecase = LoadIngredientsUseCase {
                repo: DbIngredientRepository { db },
            };
            let inserted = usecase.execute(rows).await?;
            tracing::info!(total, inserted, "ingredients loaded");
            println!("Loaded {inserted} new ingredient(s) from {total} row(s)");
        }
        Command::CreateTags => {
            let usecase = CreateDefaultTagsUseCase {
                repo: DbTagRepository { db },
            };
            let inserted = usecase.execute().await?;
            tracing::info!(inserted, "default tags created");
            println!("Created {inserted} tag(s)");
        }
    }
    Ok(())
}
