//! Keyword search dispatch.
//!
//! A search issues the news and video fetches together and renders each
//! list as soon as its own fetch settles. Every search bumps the session
//! generation; a response tagged with an older generation is discarded.

use super::api::GatewayApi;
use super::session::{ListKind, SessionState};
use crate::error::Result;
use crate::models::{SearchQuery, SortMode};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Issues the per-search fetches.
pub struct Dispatcher {
    api: Arc<dyn GatewayApi>,
}

/// Result of delivering one settled fetch to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied(ListKind),
    /// A newer search started after this fetch was issued.
    Discarded(ListKind),
}

type Fetch = BoxFuture<'static, (ListKind, Result<Value>)>;

/// Fetches issued by one search that have not settled yet.
pub struct PendingSearch {
    generation: u64,
    inflight: FuturesUnordered<Fetch>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn GatewayApi>) -> Self {
        Self { api }
    }

    /// Start a search: clear the session and issue both fetches.
    ///
    /// A blank keyword sets the session prompt and issues nothing.
    #[instrument(skip(self, session))]
    pub fn begin(
        &self,
        session: &mut SessionState,
        keyword: &str,
        sort: SortMode,
    ) -> Result<PendingSearch> {
        let query = match SearchQuery::new(keyword, sort) {
            Ok(query) => query,
            Err(e) => {
                session.prompt = Some(e.to_string());
                return Err(e);
            }
        };

        let generation = session.start_search(&query.keyword);
        info!(generation, keyword = %query.keyword, "search started");

        let inflight = FuturesUnordered::new();
        let api = Arc::clone(&self.api);
        let news_query = query.clone();
        inflight.push(Box::pin(async move {
            (ListKind::News, api.news_summaries(&news_query).await)
        }) as Fetch);

        let api = Arc::clone(&self.api);
        inflight.push(Box::pin(async move {
            (ListKind::Videos, api.video_summaries(&query.keyword).await)
        }) as Fetch);

        Ok(PendingSearch {
            generation,
            inflight,
        })
    }

    /// Run a whole search, rendering each list as it arrives.
    pub async fn search(
        &self,
        session: &mut SessionState,
        keyword: &str,
        sort: SortMode,
    ) -> Result<()> {
        let pending = self.begin(session, keyword, sort)?;
        pending.finish(session).await;
        Ok(())
    }
}

impl PendingSearch {
    /// Generation this search was tagged with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of fetches still outstanding.
    pub fn remaining(&self) -> usize {
        self.inflight.len()
    }

    /// Wait for the next fetch to settle and deliver it.
    ///
    /// Returns `None` once both fetches have been delivered.
    pub async fn next(&mut self, session: &mut SessionState) -> Option<Delivery> {
        let (kind, result) = self.inflight.next().await?;
        let applied = match kind {
            ListKind::News => session.apply_news(self.generation, result),
            ListKind::Videos => session.apply_videos(self.generation, result),
        };

        if applied {
            Some(Delivery::Applied(kind))
        } else {
            debug!(
                generation = self.generation,
                current = session.generation(),
                "discarding stale {} response",
                kind
            );
            Some(Delivery::Discarded(kind))
        }
    }

    /// Deliver every outstanding fetch.
    pub async fn finish(mut self, session: &mut SessionState) {
        while self.next(session).await.is_some() {}
    }
}
