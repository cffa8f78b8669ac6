//! Remote endpoint access
//!
//! `Remote` is the seam between option sources and the network. The
//! production implementation wraps a blocking HTTP client; [`MockRemote`]
//! serves canned bodies and records requests, so downstream tests never
//! touch the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::OptionsError;

/// Fetches the body of a remote options endpoint
pub trait Remote {
    /// GET the URL and return the response body
    fn get(&self, url: &str) -> Result<String, OptionsError>;
}

/// Production remote over a blocking HTTP client
pub struct HttpRemote {
    client: reqwest::blocking::Client,
}

impl HttpRemote {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl Remote for HttpRemote {
    fn get(&self, url: &str) -> Result<String, OptionsError> {
        tracing::debug!(url = %url, "Fetching remote options");

        let body = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .text()?;

        Ok(body)
    }
}

/// Mock remote that returns predefined bodies
///
/// Unknown URLs fail the fetch. Requests are recorded for assertions, which
/// is how cache idempotence is tested: the second `options()` call must not
/// add a request.
#[derive(Default)]
pub struct MockRemote {
    /// url → response body
    responses: HashMap<String, String>,
    /// Track all requested URLs (for assertions)
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response body for a URL
    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    /// All URLs requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Handle shared with the source, so assertions survive moving the
    /// mock into a `Box<dyn Remote>`
    pub fn request_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }
}

impl Remote for MockRemote {
    fn get(&self, url: &str) -> Result<String, OptionsError> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.responses.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(OptionsError::Fetch(Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no mock response for '{url}'"),
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_serves_registered_bodies() {
        let remote = MockRemote::new().with_response("https://api.test/options", "[1, 2]");

        assert_eq!(remote.get("https://api.test/options").unwrap(), "[1, 2]");
    }

    #[test]
    fn mock_fails_unknown_urls() {
        let remote = MockRemote::new();
        assert!(matches!(
            remote.get("https://api.test/missing"),
            Err(OptionsError::Fetch(_))
        ));
    }

    #[test]
    fn mock_records_requests() {
        let remote = MockRemote::new().with_response("https://api.test/a", "{}");

        let _ = remote.get("https://api.test/a");
        let _ = remote.get("https://api.test/b");

        assert_eq!(remote.request_count(), 2);
        assert_eq!(
            remote.requests(),
            vec!["https://api.test/a", "https://api.test/b"]
        );
    }
}
