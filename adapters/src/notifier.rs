use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("notifier is not configured")]
    NotConfigured,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery rejected ({status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound message channel for rendered signal text.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, recipient: &str, text: &str) -> Result<(), NotifierError>;
}
