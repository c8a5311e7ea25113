use crate::feed::data::FeedResult;

/// Messages that can be sent to the feed actor.
#[derive(Debug)]
pub enum Message {
    /// Returns the cached result when valid, otherwise fetches anew.
    Fetch {
        tx: tokio::sync::oneshot::Sender<FeedResult>,
    },
    /// Drops the cached result. Acknowledged so callers can order a fetch
    /// strictly after the invalidation.
    Invalidate {
        tx: tokio::sync::oneshot::Sender<()>,
    },
}
