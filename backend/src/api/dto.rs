use market::types::Family;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/set-instrument`. `family` defaults to the active one.
#[derive(Debug, Clone, Deserialize)]
pub struct SetInstrumentRequest {
    pub level: u32,
    #[serde(default)]
    pub family: Option<Family>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetInstrumentResponse {
    pub success: bool,
    pub symbol: &'static str,
    pub name: &'static str,
    pub family: Family,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
