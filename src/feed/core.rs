use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ArcStr;
use crate::feed::data::{FeedCache, FeedError, FeedResult, normalize_projects};
use crate::feed::message::Message;
use crate::log::Log;
use crate::net::Net;

const SCOPE: &str = "feed";

/// Core implementation of the feed actor.
///
/// Fetches the configured JSON endpoint, normalizes the payload into the
/// uniform project list shape and keeps the last non-empty result in a
/// TTL-bounded cache.
pub struct Core {
    /// Networking actor used to reach the endpoint
    net: Net,
    /// Logging actor
    log: Log,
    /// The endpoint serving the project list
    url: ArcStr,
    /// Cache of the last successful, non-empty result
    cache: FeedCache,
}

impl Core {
    /// Creates a new feed core.
    pub fn new(net: Net, log: Log, url: ArcStr, ttl: Duration) -> Self {
        Self {
            net,
            log,
            url,
            cache: FeedCache::new(ttl),
        }
    }

    /// Spawns the actor and returns the public interface and join handle.
    pub fn spawn(self) -> (super::Feed, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            let mut core = self;
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Fetch { tx } => {
                        let _ = tx.send(core.handle_fetch().await);
                    }
                    Message::Invalidate { tx } => {
                        core.cache.clear();
                        let _ = tx.send(());
                    }
                }
            }
        });
        (super::Feed::Actual(tx), handle)
    }

    /// Serves from the cache when it is still valid, otherwise performs a
    /// fresh fetch. Failures become a displayable result and never touch
    /// the cache.
    async fn handle_fetch(&mut self) -> FeedResult {
        if let Some(cached) = self.cache.get() {
            return cached.clone();
        }

        match self.fetch_remote().await {
            Ok(result) => {
                // Only non-empty lists are worth remembering.
                if result.list.as_ref().is_some_and(|list| !list.is_empty()) {
                    self.cache.set(result.clone());
                }
                result
            }
            Err(err) => {
                self.log.warn(SCOPE, format!("fetch failed: {}", err));
                FeedResult {
                    list: None,
                    ts: Utc::now(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn fetch_remote(&self) -> Result<FeedResult, FeedError> {
        let response = self
            .net
            .get(self.url.clone())
            .await
            .map_err(|err| FeedError::Transport(err.root_cause().to_string()))?;

        if !response.is_success() {
            return Err(FeedError::Status(response.status));
        }

        let json: serde_json::Value =
            serde_json::from_str(&response.body).map_err(|err| FeedError::Parse(err.to_string()))?;
        let list = normalize_projects(&json);

        self.log
            .info(SCOPE, format!("fetched {} project(s)", list.len()));

        Ok(FeedResult {
            list: Some(list),
            ts: response.last_modified.unwrap_or_else(Utc::now),
            error: None,
        })
    }
}
