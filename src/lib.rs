//! Recap - keyword news and video summaries, re-summarized on demand.
//!
//! # Overview
//!
//! Recap sits between a user and an upstream summarization service:
//! - The **gateway** relays news, video, re-summarize, and audio requests to
//!   the upstream service over one pooled connection set, turning every
//!   upstream failure into a structured error body.
//! - The **client** searches a keyword, renders both result lists as they
//!   arrive, tracks which items are selected, requests one consolidated
//!   summary of the selected originals, and attaches any synthesized audio.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `models` - Items, requests, and replies shared by both sides
//! - `gateway` - Relay server and upstream client
//! - `client` - Session state, search dispatch, re-summarization, audio
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::client::{Dispatcher, HttpGateway, ListKind, Orchestrator, SessionState};
//! use recap::models::SortMode;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Arc::new(HttpGateway::new("http://127.0.0.1:3000")?);
//!     let dispatcher = Dispatcher::new(api.clone());
//!     let orchestrator = Orchestrator::new(api);
//!     let mut session = SessionState::new();
//!
//!     dispatcher.search(&mut session, "sports", SortMode::Relevance).await?;
//!     orchestrator.select_all(&mut session, ListKind::Videos);
//!     let outcome = orchestrator.resummarize(&mut session).await?;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;

pub use error::{RecapError, Result};
