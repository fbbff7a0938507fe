use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use douban_meta_core::{
    bootstrap::{init_services, load_config, Services},
    logging,
    models::IdMapping,
    provider::UserImageConfig,
};

/// Douban metadata and artwork resolver
#[derive(Debug, Parser)]
#[command(name = "douban-meta", version, about)]
struct Cli {
    /// Image settings as stored per user (JSON with `imageProviders`)
    #[arg(long, global = true, env = "DOUBAN_META_USER_CONFIG")]
    user_config: Option<PathBuf>,

    /// User id exposed to proxy templates as `userId`
    #[arg(long, global = true, default_value = "anonymous")]
    user_id: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve poster, background and logo for one Douban subject
    Images {
        douban_id: u64,
        /// Known TMDB id of the subject
        #[arg(long)]
        tmdb_id: Option<u64>,
        /// Known IMDb id of the subject
        #[arg(long)]
        imdb_id: Option<String>,
    },
    /// List one page of a Douban subject collection
    Collection {
        collection_id: String,
        /// Number of items to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// Also resolve artwork for every item
        #[arg(long)]
        with_images: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config()?;
    logging::init_logging(&config.logging)?;

    let services = init_services(&config)?;
    let user_config = load_user_config(cli.user_config.as_deref())?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding requests");
            on_signal.cancel();
        }
    });

    let output = match cli.command {
        Command::Images {
            douban_id,
            tmdb_id,
            imdb_id,
        } => {
            images(
                &services,
                &user_config,
                &cli.user_id,
                douban_id,
                tmdb_id,
                imdb_id,
                &cancel,
            )
            .await?
        }
        Command::Collection {
            collection_id,
            skip,
            with_images,
        } => {
            collection(
                &services,
                &user_config,
                &cli.user_id,
                &collection_id,
                skip,
                with_images,
                &cancel,
            )
            .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_user_config(path: Option<&std::path::Path>) -> Result<UserImageConfig> {
    let Some(path) = path else {
        return Ok(UserImageConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read user config {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid user config {}", path.display()))
}

async fn images(
    services: &Services,
    user_config: &UserImageConfig,
    user_id: &str,
    douban_id: u64,
    tmdb_id: Option<u64>,
    imdb_id: Option<String>,
    cancel: &CancellationToken,
) -> Result<serde_json::Value> {
    if tmdb_id.is_some() || imdb_id.is_some() {
        services
            .id_mappings
            .upsert(IdMapping {
                douban_id,
                tmdb_id,
                imdb_id,
                trakt_id: None,
                calibrated: true,
            })
            .await?;
    }

    let detail = services
        .douban
        .subject_detail(douban_id, cancel)
        .await?
        .with_context(|| format!("Douban subject {douban_id} not found"))?;
    let source = detail
        .source_info()
        .with_context(|| format!("Douban subject {douban_id} is a {}", detail.subject_type))?;

    info!(douban_id, title = %detail.title, "Resolving images");
    let urls = services
        .resolve_images(&source, user_config, user_id, cancel)
        .await?;

    Ok(json!({
        "id": detail.id,
        "title": detail.title,
        "type": detail.subject_type,
        "images": urls,
    }))
}

async fn collection(
    services: &Services,
    user_config: &UserImageConfig,
    user_id: &str,
    collection_id: &str,
    skip: u32,
    with_images: bool,
    cancel: &CancellationToken,
) -> Result<serde_json::Value> {
    let page = services
        .douban
        .subject_collection(collection_id, skip, cancel)
        .await?
        .with_context(|| format!("Douban collection {collection_id} not found"))?;

    let mut items = Vec::with_capacity(page.subject_collection_items.len());
    for item in &page.subject_collection_items {
        let mut entry = json!({
            "id": item.id,
            "title": item.title,
            "type": item.subject_type,
            "year": item.year,
        });

        if with_images {
            if let Some(source) = item.source_info() {
                let urls = services
                    .resolve_images(&source, user_config, user_id, cancel)
                    .await?;
                entry["images"] = serde_json::to_value(urls)?;
            }
        }
        items.push(entry);
    }

    Ok(json!({
        "total": page.total,
        "start": page.start,
        "hasMore": page.has_more(),
        "items": items,
    }))
}
