use market::types::Tick;
use serde::Deserialize;
use serde_json::Value;

/// Normalized event emitted by the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Tick(Tick),
    Connected,
    Disconnected,
    /// First tick received for a freshly requested symbol.
    Subscribed { symbol: String },
    /// `forget_all` acknowledged by the server.
    Unsubscribed,
    Error {
        code: FeedErrorCode,
        message: String,
        /// Symbol named in the rejected request, when the server echoes it.
        symbol: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedErrorCode {
    InvalidSymbol,
    Other(String),
}

impl From<&str> for FeedErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "InvalidSymbol" => Self::InvalidSymbol,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Requests sent from [`super::FeedHandle`] to the running client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    Subscribe(String),
    UnsubscribeAll,
}

// --- wire format ---

#[derive(Debug, Deserialize)]
pub(crate) struct DerivResponse {
    #[serde(default)]
    pub msg_type: Option<String>,
    #[serde(default)]
    pub tick: Option<WireTick>,
    #[serde(default)]
    pub error: Option<WireError>,
    #[serde(default)]
    pub echo_req: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTick {
    pub quote: f64,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    pub epoch: i64,
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    pub code: String,
    pub message: String,
}

impl From<WireTick> for Tick {
    fn from(w: WireTick) -> Self {
        Tick {
            price: w.quote,
            bid: w.bid,
            ask: w.ask,
            symbol: w.symbol,
            epoch_seconds: w.epoch,
        }
    }
}
