pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileStateStore, ManualClock, MemoryStateStore, SystemClock};
pub use core::{api_client::HttpRvcClient, state::AppState};
pub use utils::error::{Result, RvcError};
