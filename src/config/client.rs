use crate::core::{AppError, Result};
use std::str::FromStr;
use std::time::Duration;

/// What to do when a declared-required field is missing from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredFieldPolicy {
    /// Reject the call with `AppError::Validation` before anything is sent
    #[default]
    FailFast,
    /// Log a warning per missing field and send the request anyway
    WarnAndContinue,
}

impl FromStr for RequiredFieldPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "strict" => Ok(Self::FailFast),
            "warn" | "warn-and-continue" | "warn_and_continue" => Ok(Self::WarnAndContinue),
            other => Err(AppError::configuration(format!(
                "Invalid required field policy '{}', expected 'fail-fast' or 'warn'",
                other
            ))),
        }
    }
}

/// Whether signed gateway responses are checked before being handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseVerification {
    #[default]
    Enforce,
    Skip,
}

impl FromStr for ResponseVerification {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforce" | "on" | "true" => Ok(Self::Enforce),
            "skip" | "off" | "false" => Ok(Self::Skip),
            other => Err(AppError::configuration(format!(
                "Invalid response verification mode '{}', expected 'enforce' or 'skip'",
                other
            ))),
        }
    }
}

/// Behaviour shared by every gateway client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub log_level: String,
    pub required_field_policy: RequiredFieldPolicy,
    pub response_verification: ResponseVerification,
    pub verify_server_cert: bool,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            required_field_policy: RequiredFieldPolicy::default(),
            response_verification: ResponseVerification::default(),
            verify_server_cert: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub(crate) fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            required_field_policy: lookup("PAY_REQUIRED_FIELD_POLICY")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.required_field_policy),
            response_verification: lookup("PAY_RESPONSE_VERIFICATION")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.response_verification),
            verify_server_cert: lookup("PAY_VERIFY_SERVER_CERT")
                .map(|v| {
                    v.parse::<bool>().map_err(|_| {
                        AppError::configuration("Invalid PAY_VERIFY_SERVER_CERT")
                    })
                })
                .transpose()?
                .unwrap_or(defaults.verify_server_cert),
            timeout: lookup("PAY_HTTP_TIMEOUT_SECS")
                .map(|v| {
                    v.parse::<u64>()
                        .map(Duration::from_secs)
                        .map_err(|_| AppError::configuration("Invalid PAY_HTTP_TIMEOUT_SECS"))
                })
                .transpose()?
                .unwrap_or(defaults.timeout),
        })
    }

    pub fn with_required_field_policy(mut self, policy: RequiredFieldPolicy) -> Self {
        self.required_field_policy = policy;
        self
    }

    pub fn with_response_verification(mut self, mode: ResponseVerification) -> Self {
        self.response_verification = mode;
        self
    }
}
