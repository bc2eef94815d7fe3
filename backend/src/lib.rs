pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod feed;
pub mod logger;
pub mod notify;
