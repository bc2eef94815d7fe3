//! Feed pump: applies feed events to the market.
//!
//! Ticks go straight into the `MarketManager`. Connectivity changes update the
//! connected flag. An `InvalidSymbol` rejection of the active instrument
//! triggers the family fallback and a fresh subscription.

use adapters::deriv::fallback::fallback_instrument;
use adapters::deriv::{FeedErrorCode, FeedEvent};
use market::MarketError;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, instrument, warn};

use crate::context::AppContext;

pub struct FeedPump {
    ctx: AppContext,
}

impl FeedPump {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip_all)]
    pub async fn run(self, mut events: Receiver<FeedEvent>) {
        info!("feed pump started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        self.ctx.market.set_connected(false);
        info!("feed event stream closed; pump stopping");
    }

    pub async fn handle(&self, event: FeedEvent) {
        match event {
            FeedEvent::Tick(tick) => match self.ctx.market.ingest_tick(&tick) {
                Ok(_) => {}
                Err(MarketError::StaleTick { active, received }) => {
                    debug!(%active, %received, "dropping stale tick")
                }
                Err(e) => warn!(error = %e, symbol = %tick.symbol, "tick rejected"),
            },

            FeedEvent::Connected => {
                self.ctx.market.set_connected(true);
                let instrument = self.ctx.market.active_instrument();
                let notifications = self.ctx.notifications.clone();
                tokio::spawn(async move { notifications.announce_connected(instrument).await });
            }

            FeedEvent::Disconnected => self.ctx.market.set_connected(false),

            FeedEvent::Subscribed { symbol } => info!(%symbol, "streaming ticks"),

            FeedEvent::Unsubscribed => debug!("previous subscriptions dropped"),

            FeedEvent::Error {
                code: FeedErrorCode::InvalidSymbol,
                message,
                symbol,
            } => self.on_invalid_symbol(symbol, &message).await,

            FeedEvent::Error {
                code: FeedErrorCode::Other(code),
                message,
                symbol,
            } => error!(%code, %message, ?symbol, "feed reported an error"),
        }
    }

    async fn on_invalid_symbol(&self, symbol: Option<String>, message: &str) {
        let switch = self.ctx.begin_switch().await;
        let active = self.ctx.market.active_instrument();

        if symbol.as_deref().is_some_and(|s| s != active.symbol) {
            debug!(?symbol, active = %active.symbol, "invalid-symbol error for an inactive instrument");
            return;
        }

        let Some(next) = fallback_instrument(active) else {
            warn!(symbol = %active.symbol, %message, "symbol rejected and no fallback exists");
            return;
        };

        warn!(from = %active.symbol, to = %next.symbol, %message, "symbol rejected; falling back");

        if let Err(e) = switch.apply(Some(next.family), next.level).await {
            error!(error = %e, "fallback switch failed");
        }
    }
}
