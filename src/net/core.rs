use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::{Client, header};
use tokio::task::JoinHandle;

use crate::{
    ArcStr,
    log::Log,
    net::{
        Net,
        message::{Message, Response},
    },
};

const SCOPE: &str = "net";

/// The core of the networking actor, wrapping the reqwest HTTP client.
/// All requests are handled sequentially by the actor task.
#[derive(Debug)]
pub struct Core {
    /// Logging interface for operation logging
    log: Log,
    /// HTTP client for making requests
    client: Client,
}

impl Core {
    /// Creates a new networking instance with a fresh HTTP client.
    pub fn new(log: Log) -> Self {
        Self {
            log,
            client: Client::new(),
        }
    }

    /// Transforms the networking core instance into an actor.
    pub fn spawn(self) -> (Net, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Get { url, tx } => {
                        let response = self
                            .handle_get_request(url.clone())
                            .await
                            .with_context(|| format!("GET request failed for URL: {}", url));
                        if let Err(err) = &response {
                            self.log.warn(SCOPE, format!("{err:#}"));
                        }
                        let _ = tx.send(response);
                    }
                }
            }
        });

        (Net::Actual(tx), handle)
    }

    /// Performs the GET request. Asks for JSON and disables transport-level
    /// caching so a refresh always observes the current resource.
    async fn handle_get_request(&self, url: ArcStr) -> anyhow::Result<Response> {
        self.log.info(SCOPE, format!("GET {}", url));

        let response = self
            .client
            .get(&*url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .context("Sending GET request")?;

        let status = response.status().as_u16();
        let last_modified = response
            .headers()
            .get(header::LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_http_date);
        let body = response.text().await.context("Reading response body")?;

        Ok(Response {
            status,
            body: ArcStr::from(body),
            last_modified,
        })
    }
}

/// Parses an HTTP date header (RFC 2822 format) into a UTC timestamp.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_dates_parse_to_utc() {
        let parsed = parse_http_date("Sat, 30 Aug 2026 12:00:00 GMT").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-08-30T12:00:00+00:00");
        assert!(parse_http_date("not a date").is_none());
    }
}
