use async_trait::async_trait;
use paybridge::modules::transport::{HttpRequest, Transport};
use paybridge::Result;
use std::sync::{Arc, Mutex};

/// In-memory transport: records every request and answers with a canned body
#[derive(Clone)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    response: String,
}

impl RecordingTransport {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response: response.into(),
        }
    }

    /// Answers every call with a bare wallet-style success document
    pub fn succeeding() -> Self {
        Self::new("<xml><return_code>SUCCESS</return_code><result_code>SUCCESS</result_code></xml>")
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}
