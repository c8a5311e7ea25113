use chrono::{DateTime, Utc};

use crate::ArcStr;

/// Messages that can be sent to the networking actor.
#[derive(Debug)]
pub enum Message {
    Get {
        url: ArcStr,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<Response>>,
    },
}

/// What the networking actor hands back for a completed request, success
/// or not.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: ArcStr,
    /// Parsed `Last-Modified` header, when present and valid
    pub last_modified: Option<DateTime<Utc>>,
}

impl Response {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
