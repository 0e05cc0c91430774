use std::fmt;

/// Library-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Missing credential or certificate material; raised before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A declared-required field is absent from the merged parameter set
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network or TLS failure reaching the gateway
    #[error("Transport error: {0}")]
    Transport(String),

    /// Gateway answered with a non-success HTTP status
    #[error("Gateway error: HTTP {status} ({body})")]
    Gateway { status: u16, body: String },

    /// Response body is not valid in the expected wire format
    #[error("Response parse error: {0}")]
    ResponseParse(String),

    /// Response signature does not match the locally computed one
    #[error("Signature mismatch: {0}")]
    SignatureMismatch(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system errors while loading certificate material
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// The URL is dropped: OAuth calls carry the app secret in the query string.
impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if let Some(status) = e.status() {
            return AppError::Gateway {
                status: status.as_u16(),
                body: e.to_string(),
            };
        }

        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_builder() {
            "invalid request"
        } else {
            "request failed"
        };
        AppError::Transport(format!("{}: {}", kind, e))
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(e: quick_xml::Error) -> Self {
        AppError::ResponseParse(format!("malformed XML: {}", e))
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        AppError::Transport(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        AppError::ResponseParse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Transport failures and 5xx gateway answers may succeed on a later attempt.
    /// This crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Transport(_) => true,
            AppError::Gateway { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Errors the caller fixes by changing setup or input rather than retrying
    pub fn is_setup_error(&self) -> bool {
        matches!(self, AppError::Configuration(_) | AppError::Validation(_))
    }

    /// Short machine-readable category, used as a tracing field
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Transport(_) | AppError::Gateway { .. } => ErrorKind::Transport,
            AppError::ResponseParse(_) | AppError::Json(_) => ErrorKind::ResponseParse,
            AppError::SignatureMismatch(_) => ErrorKind::SignatureMismatch,
            AppError::Io(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Transport,
    ResponseParse,
    SignatureMismatch,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::ResponseParse => write!(f, "response_parse"),
            ErrorKind::SignatureMismatch => write!(f, "signature_mismatch"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}
