use crate::core::Result;
use crate::modules::transport::models::HttpRequest;
use async_trait::async_trait;

/// Sends one request and returns the raw response body
///
/// Implementations surface network/TLS failures as `AppError::Transport` and
/// non-2xx answers as `AppError::Gateway`. They must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<String>;
}
