use clap::Parser;
use contentgen_cache::cli::{self, Cli};
use contentgen_cache::config::AppConfig;
use contentgen_cache::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let cli = Cli::parse();
    cli::run(cli, config).await
}
