use crate::config::ClientCertificate;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// TLS settings for a single request
#[derive(Debug, Clone)]
pub struct TlsOptions {
    /// Presented to the server on mutually-authenticated calls
    pub client_certificate: Option<ClientCertificate>,
    pub verify_server_cert: bool,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            client_certificate: None,
            verify_server_cert: true,
        }
    }
}

/// Fully assembled outbound request handed to a [`Transport`](crate::modules::transport::Transport)
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub tls: TlsOptions,
    /// Per-call override of the transport's default timeout
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            tls: TlsOptions::default(),
            timeout: None,
        }
    }

    pub fn post(url: impl Into<String>, body: String, content_type: &str) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            body: Some(body),
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            tls: TlsOptions::default(),
            timeout: None,
        }
    }

    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
