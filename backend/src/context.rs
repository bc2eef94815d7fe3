use std::sync::Arc;

use adapters::deriv::MarketFeed;
use market::catalog;
use market::manager::MarketManager;
use market::types::{Family, InstrumentSpec};
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::error::ApiError;
use crate::notify::NotificationService;

/// Handles shared by the API and the feed pump.
#[derive(Clone)]
pub struct AppContext {
    pub market: Arc<MarketManager>,
    pub feed: Arc<dyn MarketFeed>,
    pub notifications: Arc<NotificationService>,
    switching: Arc<Mutex<()>>,
}

impl AppContext {
    pub fn new(
        market: Arc<MarketManager>,
        feed: Arc<dyn MarketFeed>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            market,
            feed,
            notifications,
            switching: Arc::new(Mutex::new(())),
        }
    }

    /// Exclusive right to change the active instrument.
    ///
    /// Held across the market switch and the feed subscription so the feed
    /// always ends up streaming the instrument the market considers active.
    pub async fn begin_switch(&self) -> InstrumentSwitch<'_> {
        InstrumentSwitch {
            ctx: self,
            _held: self.switching.lock().await,
        }
    }
}

pub struct InstrumentSwitch<'a> {
    ctx: &'a AppContext,
    _held: MutexGuard<'a, ()>,
}

impl InstrumentSwitch<'_> {
    /// Make `(family, level)` active and point the feed at it.
    ///
    /// Fails without touching the market when the instrument is unknown or
    /// the feed has stopped for good.
    pub async fn apply(
        &self,
        family: Option<Family>,
        level: u32,
    ) -> Result<&'static InstrumentSpec, ApiError> {
        let market = &self.ctx.market;
        let family = family.unwrap_or_else(|| market.active_instrument().family);
        catalog::lookup(family, level)?;

        if !self.ctx.feed.is_available() {
            return Err(ApiError::FeedUnavailable);
        }

        let spec = market.switch_instrument(Some(family), level)?;

        // The feed can still stop between the check and the send.
        if let Err(e) = self.ctx.feed.subscribe(spec.symbol).await {
            warn!(error = %e, symbol = %spec.symbol, "re-subscription failed");
        }
        Ok(spec)
    }
}
