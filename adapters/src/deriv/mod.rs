//! Deriv websocket tick feed.
//!
//! The feed owns its connection lifecycle. The core only sees [`FeedEvent`]s
//! on a channel and drives subscriptions through the [`MarketFeed`] seam.

pub mod client;
pub mod connection;
pub mod fallback;
pub mod parser;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{DerivFeedClient, FeedHandle};
pub use connection::{Backoff, ConnectionMachine, ConnectionState, ReconnectPolicy};
pub use types::{FeedCommand, FeedErrorCode, FeedEvent};

pub const DEFAULT_DERIV_WS_URL: &str = "wss://ws.binaryws.com/websockets/v3?app_id=1089";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed feed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed channel closed")]
    ChannelClosed,

    #[error("gave up after {attempts} reconnect attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Subscription control consumed by the core.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Replace any active subscription with a tick stream for `symbol`.
    async fn subscribe(&self, symbol: &str) -> Result<(), FeedError>;

    async fn unsubscribe_all(&self) -> Result<(), FeedError>;

    /// Whether subscription commands can still reach the feed.
    fn is_available(&self) -> bool {
        true
    }
}
