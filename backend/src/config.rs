use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use adapters::deriv::{Backoff, DEFAULT_DERIV_WS_URL, ReconnectPolicy};
use adapters::telegram::DEFAULT_TELEGRAM_API_URL;
use market::catalog;
use market::types::{Family, InstrumentSpec};
use tracing::warn;

/// Bot API credentials. Present only when both token and chat id are set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    // =========================
    // HTTP API
    // =========================
    /// Address the API listens on.
    pub bind_address: String,

    pub port: u16,

    // =========================
    // Market feed
    // =========================
    /// Deriv websocket endpoint, including the `app_id` query parameter.
    pub deriv_ws_url: String,

    /// Family of the instrument monitored at startup.
    pub default_family: Family,

    /// Volatility level of the instrument monitored at startup.
    ///
    /// An unknown `(family, level)` pair falls back to Vol 75 (1s).
    pub default_level: u32,

    /// Consecutive failed reconnects tolerated before the feed gives up.
    ///
    /// The counter resets on every successful connection.
    pub feed_max_reconnect_attempts: u32,

    /// Base delay between reconnect attempts, in milliseconds.
    pub feed_reconnect_backoff_ms: u64,

    /// `fixed` waits the base delay every time; `exponential` doubles it per attempt.
    pub feed_backoff: Backoff,

    // =========================
    // Notifications
    // =========================
    /// `None` disables delivery; signals are still produced and logged.
    pub telegram: Option<TelegramConfig>,

    /// Upper bound on one delivery, in milliseconds.
    ///
    /// Deliveries never block tick processing; this only bounds how long
    /// the dispatcher waits before moving on to the next signal.
    pub notify_timeout_ms: u64,

    /// Capacity of the queue between the signal engine and the dispatcher.
    ///
    /// When full, new notifications are dropped (and counted) rather than
    /// stalling ingestion.
    pub notify_queue_capacity: usize,

    // =========================
    // Logging
    // =========================
    /// JSON log lines instead of pretty output.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Missing keys take their default;
    /// malformed values take their default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_url: get("TELEGRAM_API_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            }),
            _ => None,
        };

        let app_env = get("APP_ENV").unwrap_or_default();
        let json_logs = app_env == "production" || get("LOG_JSON").is_some_and(|v| v == "1");

        Self {
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 3000),

            deriv_ws_url: get("DERIV_WS_URL").unwrap_or_else(|| DEFAULT_DERIV_WS_URL.to_string()),
            default_family: parse_or("DEFAULT_FAMILY", get("DEFAULT_FAMILY"), Family::HighFrequency),
            default_level: parse_or("DEFAULT_LEVEL", get("DEFAULT_LEVEL"), 75),
            feed_max_reconnect_attempts: parse_or(
                "FEED_MAX_RECONNECT_ATTEMPTS",
                get("FEED_MAX_RECONNECT_ATTEMPTS"),
                5,
            ),
            feed_reconnect_backoff_ms: parse_or(
                "FEED_RECONNECT_BACKOFF_MS",
                get("FEED_RECONNECT_BACKOFF_MS"),
                5_000,
            ),
            feed_backoff: parse_or("FEED_BACKOFF", get("FEED_BACKOFF"), Backoff::Fixed),

            telegram,
            notify_timeout_ms: parse_or("NOTIFY_TIMEOUT_MS", get("NOTIFY_TIMEOUT_MS"), 5_000),
            notify_queue_capacity: parse_or(
                "NOTIFY_QUEUE_CAPACITY",
                get("NOTIFY_QUEUE_CAPACITY"),
                64,
            )
            .max(1),

            json_logs,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind_address, self.port).parse()
    }

    pub fn feed_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.feed_max_reconnect_attempts,
            base_delay: Duration::from_millis(self.feed_reconnect_backoff_ms),
            backoff: self.feed_backoff,
        }
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    /// Instrument monitored at startup.
    pub fn default_instrument(&self) -> &'static InstrumentSpec {
        catalog::lookup(self.default_family, self.default_level).unwrap_or_else(|e| {
            warn!(error = %e, "configured default instrument unknown; using Vol 75 (1s)");
            catalog::default_instrument()
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!(key, value = %v, "malformed configuration value; using default");
            default
        }),
    }
}
