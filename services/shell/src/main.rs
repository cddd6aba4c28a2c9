use std::path::PathBuf;
use std::sync::Arc;

use market_data::clock::SystemClock;
use market_data::metrics::AlertThresholds;
use market_data::EngineConfig;
use persistence::{FileStore, KeyValueStore, MemoryStore};
use shell::AppContext;

fn load_config() -> Result<EngineConfig, anyhow::Error> {
    match std::env::var("WM_FEED_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            tracing::info!(%path, "Loading feed config");
            Ok(EngineConfig::from_json_or_default(&json))
        }
        Err(_) => Ok(EngineConfig::default()),
    }
}

fn open_store() -> Result<Arc<dyn KeyValueStore>, anyhow::Error> {
    match std::env::var("WM_FLAGS_PATH") {
        Ok(path) => Ok(Arc::new(FileStore::open(PathBuf::from(path))?)),
        Err(_) => Ok(Arc::new(MemoryStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!(version = market_data::SERVICE_VERSION, "Starting whales-feed");

    let config = load_config()?;
    let store = open_store()?;
    let mut ctx = AppContext::create(store, config, Arc::new(SystemClock))?;
    if let Ok(seed) = std::env::var("WM_FEED_SEED") {
        ctx = ctx.with_feed_seed(seed.parse()?);
    }

    let page = std::env::var("WM_PAGE").unwrap_or_else(|_| "/".to_string());
    ctx.navigate(&page)?;

    let Some(feeds) = ctx.home_feeds().map(|f| (f.live().subscribe(), f.activities().subscribe()))
    else {
        return stream_premarket(&mut ctx).await;
    };
    let (mut live, mut activities) = feeds;

    loop {
        tokio::select! {
            snap = live.changed() => {
                let Some(snap) = snap else { break };
                for row in snap.iter() {
                    tracing::info!(
                        version = snap.version(),
                        symbol = %row.identity.symbol,
                        price = row.last_price,
                        change = row.price_change_pct,
                        "live"
                    );
                }
            }
            snap = activities.changed() => {
                let Some(snap) = snap else { break };
                if let Some(latest) = snap.get(0) {
                    tracing::info!(
                        side = ?latest.side,
                        token = %latest.token_name,
                        collateral = latest.collateral,
                        tier = ?latest.tier,
                        "activity"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    shutdown(&mut ctx);
    Ok(())
}

fn shutdown(ctx: &mut AppContext) {
    for alert in ctx.metrics().check_thresholds(&AlertThresholds::default()) {
        tracing::warn!(level = ?alert.level, metric = %alert.metric, "{}", alert.message);
    }
    tracing::info!(metrics = ?ctx.metrics().export(), "Shutting down");
    ctx.dispose();
}

async fn stream_premarket(ctx: &mut AppContext) -> Result<(), anyhow::Error> {
    let Some(feeds) = ctx.premarket_feeds() else {
        tracing::warn!(route = ?ctx.route(), "Page has no feeds, nothing to stream");
        return Ok(());
    };
    let mut stats = feeds.stats().subscribe();
    let mut live = feeds.live().subscribe();

    loop {
        tokio::select! {
            snap = stats.changed() => {
                let Some(snap) = snap else { break };
                for stat in snap.iter() {
                    tracing::info!(key = ?stat.key, value = stat.value, "stat");
                }
            }
            snap = live.changed() => {
                let Some(snap) = snap else { break };
                tracing::info!(version = snap.version(), checksum = %snap.checksum(), "premarket live");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    shutdown(ctx);
    Ok(())
}
