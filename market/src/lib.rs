pub mod catalog;
pub mod counters;
pub mod error;
pub mod indicators;
pub mod manager;
pub mod rolling_window;
pub mod signal;
pub mod state;
pub mod time;
pub mod types;

pub use error::MarketError;
