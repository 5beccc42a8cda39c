use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use videofinder::discovery::{cache_key, FileCacheStore};
use videofinder::Config;

#[derive(Parser)]
#[command(name = "cache-manager")]
#[command(about = "Search result cache management utility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache directory (defaults to the configured one)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all cached pages
    List,
    /// Get cache statistics
    Stats,
    /// Show the cached page for a tag
    Show {
        /// Search tag (e.g., "osmosis")
        tag: String,
        /// Page token, omit for the first page
        #[arg(long)]
        page_token: Option<String>,
    },
    /// Invalidate the cached page for a tag
    Invalidate {
        tag: String,
        #[arg(long)]
        page_token: Option<String>,
    },
    /// Invalidate a cache entry by its raw key
    InvalidateKey {
        /// Cache key to invalidate
        cache_key: String,
    },
    /// Clear all cache entries
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();

    let cache_dir = match cli.cache_dir {
        Some(dir) => dir,
        None => Config::load()?.cache.dir,
    };
    let store = FileCacheStore::new(cache_dir);

    match cli.command {
        Commands::List => {
            let entries = store.list_entries().await?;

            if entries.is_empty() {
                info!("📭 No cached pages found in {}", store.cache_dir().display());
                return Ok(());
            }

            info!("📚 Found {} cached pages:", entries.len());

            for entry in entries {
                let cached_at = entry
                    .cached_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string());
                info!(
                    "  {} - {} / {}: {} videos, more: {}, cached {}",
                    entry.key,
                    entry.tag.as_deref().unwrap_or("?"),
                    entry.page_token.as_deref().unwrap_or("first"),
                    entry.video_count,
                    entry.has_next_page,
                    cached_at
                );
            }
        }

        Commands::Stats => {
            let stats = store.stats().await?;
            info!("📊 Cache Statistics:");
            info!("  Total files: {}", stats.total_files);
            info!("  Valid files: {}", stats.valid_files);
            info!("  Unreadable files: {}", stats.unreadable_files);
            info!("  Total videos: {}", stats.total_videos);
            info!("  Size on disk: {} bytes", stats.total_bytes);
        }

        Commands::Show { tag, page_token } => {
            let key = cache_key(&tag, page_token.as_deref());
            match store.get_by_key(&key).await {
                Some(page) => println!("{}", serde_json::to_string_pretty(&page)?),
                None => warn!("⚠️ No cached page for {} ({})", tag, key),
            }
        }

        Commands::Invalidate { tag, page_token } => {
            if store.invalidate(&tag, page_token.as_deref()).await? {
                info!("✅ Successfully invalidated cache for: {}", tag);
            } else {
                warn!("⚠️ No cache found for: {}", tag);
            }
        }

        Commands::InvalidateKey { cache_key } => {
            if store.invalidate_key(&cache_key).await? {
                info!("✅ Successfully invalidated cache for: {}", cache_key);
            } else {
                warn!("⚠️ Cache key not found: {}", cache_key);
            }
        }

        Commands::Clear => {
            let count = store.clear_all().await?;
            info!("🧹 Cleared {} cache files", count);
        }
    }

    Ok(())
}
