use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use foreflow_core::config::{load_config, HeadcountConfig};
use foreflow_core::{db, schema, telemetry};

#[derive(Parser, Debug)]
#[command(about = "Create the staging and summary tables when absent")]
struct Cli {
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config: HeadcountConfig = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    telemetry::init(&config.logging.level);

    let storage = db::connect(&config.database).await?;
    let result = schema::ensure_schema(storage.as_ref(), &config.adp).await;
    storage.close().await;
    result?;
    Ok(())
}
