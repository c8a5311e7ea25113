use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ArcStr;
use crate::net::message::Response;

/// Mock implementation of the networking actor.
///
/// Returns predefined responses keyed by URL and records every request it
/// receives, so tests can assert how often the network was actually hit.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    responses: Arc<Mutex<HashMap<ArcStr, Response>>>,
    requests: Arc<Mutex<Vec<ArcStr>>>,
}

impl Mock {
    /// Creates a mock seeded with a URL-to-response map.
    pub fn new(responses: HashMap<ArcStr, Response>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock with no responses; every request fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replaces the response for a URL.
    pub fn set_response(&self, url: ArcStr, response: Response) {
        self.responses
            .lock()
            .expect("net mock poisoned")
            .insert(url, response);
    }

    /// Number of requests performed against this mock.
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("net mock poisoned").len()
    }

    pub(super) fn get(&self, url: ArcStr) -> anyhow::Result<Response> {
        self.requests
            .lock()
            .expect("net mock poisoned")
            .push(url.clone());
        self.responses
            .lock()
            .expect("net mock poisoned")
            .get(&url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no mock response for {}", url))
    }
}
