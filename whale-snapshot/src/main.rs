use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use whale_analytics::{
    Dataset, Whale,
    format::{format_amount, truncate_address},
};
use whale_data::{ApiClient, ApiConfig, DataSource, DatasetSession, DatasetView, RecordCache};

/// Snapshot of every dataset view, printed as JSON
#[derive(Debug, Serialize)]
struct Snapshot {
    generated_at: DateTime<Utc>,
    api_online: bool,
    datasets: Vec<DatasetView>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    let config = ApiConfig::from_env();
    info!("Starting whale snapshot against {}", config.base_url);

    // Number of trade pages to pull, configurable via TRADE_PAGES env var (default: 2)
    let trade_pages = std::env::var("TRADE_PAGES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(2)
        .max(1);

    // Rows kept per dataset in the printed snapshot, via SNAPSHOT_ROWS (default: 10)
    let snapshot_rows = std::env::var("SNAPSHOT_ROWS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10);

    let client = match ApiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Invalid API configuration: {}", e);
            std::process::exit(1);
        }
    };

    let api_online = match client.status().await {
        Ok(status) if status.is_online() => {
            info!("API online");
            true
        }
        Ok(status) => {
            warn!("API reports offline: {:?}", status.online);
            false
        }
        Err(e) => {
            warn!("API status check failed: {}", e);
            false
        }
    };

    let cache = RecordCache::new();
    let mut markets = DatasetSession::new(Dataset::Markets);
    let mut whales = DatasetSession::new(Dataset::Whales);
    let mut trades = DatasetSession::new(Dataset::Trades);

    let (markets_result, whales_result, trades_result) = futures::join!(
        markets.load(&client, &cache),
        whales.load(&client, &cache),
        trades.load(&client, &cache),
    );

    for (dataset, result) in [
        (Dataset::Markets, markets_result),
        (Dataset::Whales, whales_result),
        (Dataset::Trades, trades_result),
    ] {
        if let Err(e) = result {
            error!("Failed to load {}: {}", dataset, e);
        }
    }

    for _ in 1..trade_pages {
        if !trades.has_more() {
            break;
        }
        if let Err(e) = trades.fetch_next_page(&client).await {
            error!("Failed to fetch next trades page: {}", e);
            break;
        }
    }

    log_summaries(&markets, &whales, &trades);

    let snapshot = Snapshot {
        generated_at: Utc::now(),
        api_online,
        datasets: [&markets, &whales, &trades]
            .into_iter()
            .map(|session| {
                let mut view = session.view();
                view.rows.truncate(snapshot_rows);
                view
            })
            .collect(),
    };

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialise snapshot: {}", e),
    }
}

fn log_summaries(markets: &DatasetSession, whales: &DatasetSession, trades: &DatasetSession) {
    let summary = markets.summary();
    info!(
        "MARKETS count {} total volume {} max {} avg {}",
        summary.count,
        format_amount(summary.total),
        format_amount(summary.max),
        format_amount(summary.average),
    );

    let summary = whales.summary();
    info!(
        "WHALES count {} total volume {} avg {}",
        summary.count,
        format_amount(summary.total),
        format_amount(summary.average),
    );
    let whale_view = whales.view();
    if let Some(top) = whale_view.rows.first().map(Whale::from_record) {
        info!(
            "TOP WHALE {} ({}) volume {} realised pnl {}",
            top.display_name(),
            truncate_address(&top.address),
            format_amount(top.total_volume),
            format_amount(top.total_r_pnl),
        );
    }

    if let Some(stats) = trades.view().trade_stats {
        info!(
            "TRADES count {} notional {} buys {} sells {} more pages {}",
            stats.count,
            format_amount(stats.notional),
            stats.buys,
            stats.sells,
            trades.has_more(),
        );
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
