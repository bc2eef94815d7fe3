pub mod client;
pub mod render;

pub use client::TelegramClient;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
