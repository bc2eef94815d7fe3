pub mod analysis;
pub mod engine;
pub mod log;
pub mod types;

pub use engine::{EngineClock, SignalEngine};
pub use log::SignalLog;
pub use types::{Evaluation, Signal};
