use super::transport_trait::Transport;
use crate::config::ClientConfig;
use crate::core::{AppError, Result};
use crate::modules::transport::models::{HttpMethod, HttpRequest, TlsOptions};
use async_trait::async_trait;
use reqwest::{Client, Identity};
use std::time::Duration;
use tracing::debug;

/// `reqwest` transport on the rustls backend
///
/// Plain calls share one pooled client. Calls that present a client
/// certificate or relax server verification get a dedicated client, since
/// both settings are fixed per `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.timeout)
    }

    fn client_for(&self, tls: &TlsOptions) -> Result<Client> {
        if tls.client_certificate.is_none() && tls.verify_server_cert {
            return Ok(self.client.clone());
        }

        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!tls.verify_server_cert);

        if let Some(certificate) = &tls.client_certificate {
            let identity = Identity::from_pem(&certificate.identity_pem()).map_err(|e| {
                AppError::configuration(format!("Client certificate rejected: {}", e))
            })?;
            builder = builder.identity(identity);
        }

        builder
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build TLS client: {}", e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<String> {
        let client = self.client_for(&request.tls)?;

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            url = %request.url.split('?').next().unwrap_or_default(),
            status = status.as_u16(),
            bytes = body.len(),
            "Gateway responded"
        );

        if !status.is_success() {
            return Err(AppError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
