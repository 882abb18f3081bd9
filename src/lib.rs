pub mod config;
pub mod error;
pub mod observability;
pub mod output;
pub mod price_infra;
pub mod store;
pub mod types;
pub mod utils;

// Window length of the reference deployment
pub const DEFAULT_WINDOW_SECS: u64 = 60;
