use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::Mutex;

mod core;
pub mod data;
pub mod message;

#[cfg(test)]
mod tests;

use crate::ArcStr;
use crate::log::Log;
use crate::net::Net;
use message::Message;

pub use data::{FeedCache, FeedError, FeedResult, Project, normalize_projects};

/// The feed actor: fetches the project list, normalizes it and caches the
/// last non-empty result for the configured TTL.
///
/// Cloning is cheap as it only copies the channel sender or the mock
/// reference.
#[derive(Debug, Clone)]
pub enum Feed {
    Actual(tokio::sync::mpsc::Sender<Message>),
    Mock(Arc<Mutex<MockData>>),
}

/// Canned behavior for the mock feed, with counters tests can assert on.
#[derive(Debug)]
pub struct MockData {
    pub result: FeedResult,
    pub fetches: usize,
    pub invalidations: usize,
}

impl Feed {
    /// Spawns a new feed actor.
    pub fn spawn(net: Net, log: Log, url: ArcStr, ttl: Duration) -> Self {
        let (feed, _) = core::Core::new(net, log, url, ttl).spawn();
        feed
    }

    /// Creates a mock feed that always serves `result`.
    pub fn mock(result: FeedResult) -> Self {
        Self::Mock(Arc::new(Mutex::new(MockData {
            result,
            fetches: 0,
            invalidations: 0,
        })))
    }

    /// Returns the cached result when valid, otherwise fetches the endpoint.
    /// Never fails: fetch errors are folded into the result.
    pub async fn fetch(&self) -> FeedResult {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Fetch { tx })
                    .await
                    .context("Sending message to Feed actor")
                    .expect("Feed actor died");
                rx.await
                    .context("Awaiting response from Feed actor")
                    .expect("Feed actor died")
            }
            Self::Mock(data) => {
                let mut data = data.lock().await;
                data.fetches += 1;
                data.result.clone()
            }
        }
    }

    /// Explicitly drops the cached result (the manual refresh path).
    pub async fn invalidate(&self) {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Invalidate { tx })
                    .await
                    .context("Sending message to Feed actor")
                    .expect("Feed actor died");
                rx.await
                    .context("Awaiting response from Feed actor")
                    .expect("Feed actor died")
            }
            Self::Mock(data) => {
                data.lock().await.invalidations += 1;
            }
        }
    }
}
