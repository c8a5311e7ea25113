use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{
    ArcStr,
    log::Log,
    net::{core::Core, message::Message},
};

mod core;
pub mod message;
pub mod mock;

pub use message::Response;

/// The networking actor that provides a thread-safe interface for HTTP
/// operations.
///
/// This enum represents either a real networking actor or a mock
/// implementation for testing. Cloning is cheap as it only copies the
/// channel sender or the mock reference.
#[derive(Debug, Clone)]
pub enum Net {
    /// A real networking actor that performs HTTP requests
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(mock::Mock),
}

impl Net {
    /// Creates a new networking instance and spawns its actor.
    pub fn spawn(log: Log) -> Self {
        let (net, _) = Core::new(log).spawn();
        net
    }

    /// Performs an HTTP GET request to the specified URL.
    ///
    /// The request always asks for JSON and disables transport-level
    /// caching. Non-success statuses are not an error at this layer: the
    /// response is returned with its status so the caller can classify it.
    ///
    /// # Returns
    /// The response status, body and parsed `Last-Modified` header, or an
    /// error if the request could not be performed at all.
    pub async fn get(&self, url: ArcStr) -> anyhow::Result<Response> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Get { url, tx })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.get(url),
        }
    }
}
