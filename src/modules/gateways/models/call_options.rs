use crate::config::ClientCertificate;
use crate::modules::envelope::ResultEnvelope;
use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

/// Outcome handed to a completion hook
#[derive(Debug, Clone, Copy)]
pub enum Completed<'a> {
    Envelope(&'a ResultEnvelope),
    /// Operations whose body is returned verbatim, like bill downloads
    Raw(&'a str),
}

/// Runs once after a successful call, before the result is returned
pub type CompletionHook = Box<dyn FnOnce(Completed<'_>) + Send + Sync>;

/// Per-call overrides of the configured account.
///
/// Every field is optional; anything left unset falls back to the client's
/// configuration.
#[derive(Default)]
pub struct CallOptions {
    pub account_id: Option<String>,
    pub secondary_account_id: Option<String>,
    pub secret: Option<SecretString>,
    pub certificate: Option<ClientCertificate>,
    pub timeout: Option<Duration>,
    pub verify_server_cert: Option<bool>,
    on_complete: Option<CompletionHook>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_id(mut self, id: impl Into<String>) -> Self {
        self.account_id = Some(id.into());
        self
    }

    pub fn secondary_account_id(mut self, id: impl Into<String>) -> Self {
        self.secondary_account_id = Some(id.into());
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn certificate(mut self, certificate: ClientCertificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn verify_server_cert(mut self, verify: bool) -> Self {
        self.verify_server_cert = Some(verify);
        self
    }

    pub fn on_complete(mut self, hook: impl FnOnce(Completed<'_>) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub(crate) fn complete(self, outcome: Completed<'_>) {
        if let Some(hook) = self.on_complete {
            hook(outcome);
        }
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("account_id", &self.account_id)
            .field("secondary_account_id", &self.secondary_account_id)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("certificate", &self.certificate.is_some())
            .field("timeout", &self.timeout)
            .field("verify_server_cert", &self.verify_server_cert)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
