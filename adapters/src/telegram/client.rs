use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::notifier::{Notifier, NotifierError};

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client delivering Markdown messages through `sendMessage`.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifierError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    #[instrument(skip(self, text), fields(chat_id = %recipient, len = text.len()), level = "debug")]
    async fn deliver(&self, recipient: &str, text: &str) -> Result<(), NotifierError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let body = SendMessage {
            chat_id: recipient,
            text,
            parse_mode: "Markdown",
        };

        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        let api: Option<ApiResponse> = resp.json().await.ok();

        match api {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!("telegram message delivered");
                Ok(())
            }
            other => Err(NotifierError::Rejected {
                status: status.as_u16(),
                description: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| status.to_string()),
            }),
        }
    }
}
