use std::sync::Arc;

use adapters::deriv::{DerivFeedClient, FeedEvent, MarketFeed};
use adapters::telegram::TelegramClient;
use backend::{
    api,
    config::AppConfig,
    context::AppContext,
    feed::FeedPump,
    logger::init_tracing,
    notify::NotificationService,
};
use market::manager::MarketManager;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const FEED_EVENT_CAPACITY: usize = 1024;

fn build_notifications(cfg: &AppConfig) -> anyhow::Result<NotificationService> {
    let Some(tg) = &cfg.telegram else {
        warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set; notifications disabled");
        return Ok(NotificationService::disabled());
    };

    let client = TelegramClient::new(tg.api_url.clone(), tg.bot_token.clone(), cfg.notify_timeout())?;
    Ok(NotificationService::new(
        Arc::new(client),
        tg.chat_id.clone(),
        cfg.notify_timeout(),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env();
    init_tracing(cfg.json_logs);

    info!("Starting volatility signal desk...");

    let instrument = cfg.default_instrument();
    let (signal_tx, signal_rx) = mpsc::channel(cfg.notify_queue_capacity);
    let market = Arc::new(MarketManager::new(instrument, Some(signal_tx)));

    let notifications = Arc::new(build_notifications(&cfg)?);
    tokio::spawn(notifications.clone().run_dispatcher(signal_rx));

    // Feed: the first subscription is queued until the socket is up.
    let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(FEED_EVENT_CAPACITY);
    let (client, handle) = DerivFeedClient::new(cfg.deriv_ws_url.clone(), cfg.feed_policy(), event_tx);
    handle.subscribe(instrument.symbol).await?;

    tokio::spawn(async move {
        match client.run().await {
            Ok(()) => info!("feed client stopped"),
            Err(e) => error!(error = %e, "feed client gave up; API stays up without live data"),
        }
    });

    let feed: Arc<dyn MarketFeed> = Arc::new(handle);
    let ctx = AppContext::new(market, feed, notifications);

    tokio::spawn(FeedPump::new(ctx.clone()).run(event_rx));

    let addr = cfg.socket_addr()?;
    info!(%addr, symbol = %instrument.symbol, "http api listening");

    tokio::select! {
        _ = warp::serve(api::routes(ctx)).run(addr) => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutting down");
        }
    }

    Ok(())
}
