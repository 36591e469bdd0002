//! Relay gateway between clients and the upstream summarization service.
//!
//! The gateway validates input, forwards each call through one shared
//! keep-alive pool, and turns every upstream failure into a structured
//! [`ErrorBody`]. It never retries.

mod server;
mod upstream;

pub use server::{router, ErrorBody};
pub use upstream::UpstreamClient;
