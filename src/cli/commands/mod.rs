//! CLI command implementations.

mod config;
mod search;
mod serve;

pub use config::run_config;
pub use search::{run_search, SearchOptions};
pub use serve::run_serve;
