use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info, warn};
use uuid::Uuid;

use trendfeed::config::{Config, ErrorPolicy};
use trendfeed::logging;
use trendfeed::pipeline::detect::PlatformSignal;
use trendfeed::pipeline::normalize::{NormalizeOptions, NormalizePipeline};
use trendfeed::pipeline::validate;
use trendfeed::storage::{FeedItemFilters, FeedItemStore, InMemoryFeedItemStore};
use trendfeed::FeedItem;

#[derive(Parser)]
#[command(name = "trendfeed")]
#[command(about = "Cross-platform product signal normalizer")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw payloads from a JSON file (one object or an array)
    Normalize {
        /// Path to the raw payload file
        input: PathBuf,
        /// Force a platform instead of detecting it.
        /// Available: marketplace, short_video, long_video, forum, micro_post, search
        #[arg(long)]
        platform: Option<String>,
        /// Pretty-print the canonical records
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a canonical feed item candidate against the schema
    Validate {
        /// Path to the candidate JSON file
        input: PathBuf,
    },
    /// Run built-in sample payloads through the whole pipeline
    Demo,
}

fn load_payloads(path: &PathBuf) -> anyhow::Result<Vec<Value>> {
    let data = std::fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&data)?;
    Ok(match json {
        Value::Array(items) => items,
        single => vec![single],
    })
}

fn print_item(item: &FeedItem, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(item)?
    } else {
        serde_json::to_string(item)?
    };
    println!("{rendered}");
    Ok(())
}

fn run_normalize(input: PathBuf, platform: Option<String>, pretty: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let pretty = pretty || config.ingest.pretty;

    let hint = platform
        .map(|p| p.parse::<PlatformSignal>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let options = NormalizeOptions {
        platform_hint: hint,
        ..Default::default()
    };

    let payloads = load_payloads(&input)?;
    info!("normalizing {} payload(s) from {}", payloads.len(), input.display());

    let pipeline = NormalizePipeline::new();
    let mut normalized = 0usize;
    let mut skipped = 0usize;

    match config.ingest.on_error {
        // fail-fast: the first bad payload aborts the run with no output
        ErrorPolicy::Halt => {
            let items = pipeline.normalize_many(&payloads, &options)?;
            for item in &items {
                print_item(item, pretty)?;
            }
            normalized = items.len();
        }
        // log-and-skip: keep going, report what was dropped
        ErrorPolicy::Skip => {
            for (index, payload) in payloads.iter().enumerate() {
                match pipeline.normalize(payload, &options) {
                    Ok(item) => {
                        print_item(&item, pretty)?;
                        normalized += 1;
                    }
                    Err(e) => {
                        warn!("skipping payload {index}: {e}");
                        skipped += 1;
                    }
                }
            }
        }
    }

    info!("done: {normalized} normalized, {skipped} skipped");
    Ok(())
}

fn run_validate(input: PathBuf) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(&input)?;
    let candidate: Value = serde_json::from_str(&data)?;

    let outcome = validate::safe_validate_feed_item(candidate);
    if outcome.success {
        println!("valid");
        Ok(())
    } else {
        let error = outcome.error.expect("failed outcome carries an error");
        eprintln!("invalid:");
        for violation in &error.violations {
            eprintln!("- {violation}");
        }
        std::process::exit(1)
    }
}

async fn run_demo() -> anyhow::Result<()> {
    let pipeline = NormalizePipeline::new();
    let payloads = sample_payloads();

    let options = NormalizeOptions::default();
    let items = pipeline.normalize_many(&payloads, &options)?;

    // exercise the storage seam the way an ingestion service would
    let store = InMemoryFeedItemStore::new();
    let owner = Uuid::new_v4();
    for item in &items {
        store.create_feed_item(owner, item).await?;
    }
    let stored = store
        .list_feed_items(owner, &FeedItemFilters::default(), 50)
        .await?;

    println!("📊 Normalized {} sample payloads:", stored.len());
    for item in &stored {
        println!(
            "   [{}] {} (engagement {})",
            item.source_platform.as_str(),
            item.display.title,
            item.metrics.engagement_score
        );
    }
    Ok(())
}

fn sample_payloads() -> Vec<Value> {
    vec![
        serde_json::json!({
            "asin": "B09XS7JWHH",
            "title": "Sony WH-1000XM5 Wireless Premium Noise Canceling Overhead Headphones",
            "description": "Industry-leading noise canceling with Dual Noise Sensor technology.",
            "imageUrl": "https://m.media-amazon.com/images/I/61SUj2aKoEL._AC_SL1500_.jpg",
            "productUrl": "https://amazon.com/dp/B09XS7JWHH",
            "price": 348.00,
            "originalPrice": 399.00,
            "currency": "USD",
            "rating": 4.8,
            "reviewCount": 10420,
            "tags": ["electronics", "headphones"]
        }),
        serde_json::json!({
            "videoId": "7234567890123456789",
            "videoUrl": "https://tiktok.com/@user/video/7234567890123456789",
            "title": "Best Headphones for Work",
            "caption": "These headphones changed my life!",
            "thumbnailUrl": "https://p16-sign-va.tiktokcdn.com/example.jpg",
            "viewCount": 1500000,
            "likeCount": 125000,
            "commentCount": 8500,
            "shareCount": 3200,
            "tags": ["headphones", "tech"]
        }),
        serde_json::json!({
            "postId": "/r/headphones/comments/abc123/sony_wh1000xm5_review",
            "postUrl": "https://reddit.com/r/headphones/comments/abc123/sony_wh1000xm5_review",
            "title": "Sony WH-1000XM5 Review - My honest thoughts after 3 months",
            "selftext": "I've been using these headphones for 3 months now...",
            "thumbnailUrl": "https://example.com/reddit-thumb.jpg",
            "upvotes": 1250,
            "downvotes": 50,
            "commentCount": 340,
            "subreddit": "headphones"
        }),
    ]
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Normalize {
            input,
            platform,
            pretty,
        } => run_normalize(input, platform, pretty),
        Commands::Validate { input } => run_validate(input),
        Commands::Demo => run_demo().await,
    };

    if let Err(e) = result {
        error!("command failed: {e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
