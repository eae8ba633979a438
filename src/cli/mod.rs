//! Operator CLI for the response cache
//!
//! Small shell surface over a cache directory: store and look up
//! prompt/response pairs, print statistics, wipe the cache. Useful for
//! inspecting a deployment's cache without going through the application.

use chrono::DateTime;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::cache::CacheLookup;
use crate::domain::request::GenerationRequest;
use crate::infrastructure::services::ResponseCacheService;

/// contentgen-cache - two-tier response cache tooling
#[derive(Parser)]
#[command(name = "contentgen-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print store and counter statistics
    Stats,

    /// Remove every cached entry
    Clear,

    /// Look up a prompt in the cache
    Lookup(PromptArgs),

    /// Cache a response for a prompt
    Store(StoreArgs),
}

#[derive(Args)]
pub struct PromptArgs {
    /// User prompt text
    pub prompt: String,

    /// System instruction
    #[arg(long, default_value = "")]
    pub system: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,
}

impl PromptArgs {
    fn to_request(&self) -> GenerationRequest {
        GenerationRequest::builder()
            .system(self.system.clone())
            .user(self.prompt.clone())
            .temperature(self.temperature)
            .build()
    }
}

#[derive(Args)]
pub struct StoreArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Response text to cache
    pub response: String,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let cache = ResponseCacheService::new(config.cache);

    match cli.command {
        Command::Stats => stats(&cache).await,
        Command::Clear => {
            cache.clear().await;
            println!("cache cleared");
            Ok(())
        }
        Command::Lookup(args) => lookup(&cache, &args).await,
        Command::Store(args) => store(&cache, &args).await,
    }
}

async fn stats(cache: &ResponseCacheService) -> anyhow::Result<()> {
    if !cache.is_enabled() {
        println!("cache disabled (directory not writable)");
        return Ok(());
    }

    match cache.store_stats().await {
        Some(stats) => {
            println!("entries:     {}", stats.entries);
            println!("total bytes: {}", stats.total_bytes);
            println!("oldest:      {}", format_timestamp(stats.oldest));
            println!("newest:      {}", format_timestamp(stats.newest));
        }
        None => println!("store statistics unavailable"),
    }

    match cache.similarity_size().await {
        Some(size) => println!("similarity index: {size} keys (in-memory, this process only)"),
        None => println!("similarity index: disabled"),
    }

    let counters = serde_json::to_string_pretty(&cache.statistics())?;
    println!("session counters: {counters}");

    Ok(())
}

async fn lookup(cache: &ResponseCacheService, args: &PromptArgs) -> anyhow::Result<()> {
    match cache.get(&args.to_request()).await {
        CacheLookup::Hit(hit) => {
            println!("hit ({})", hit.source);
            println!("{}", hit.response);
        }
        CacheLookup::Miss => println!("miss"),
    }

    Ok(())
}

async fn store(cache: &ResponseCacheService, args: &StoreArgs) -> anyhow::Result<()> {
    cache.put(&args.prompt.to_request(), &args.response).await;
    println!("stored");
    Ok(())
}

fn format_timestamp(secs: Option<u64>) -> String {
    secs.and_then(|s| DateTime::from_timestamp(s as i64, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".to_string())
}
