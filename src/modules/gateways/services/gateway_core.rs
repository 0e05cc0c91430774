use crate::config::{ClientConfig, Credentials, RequiredFieldPolicy, ResponseVerification};
use crate::core::{nonce, AppError, ParameterSet, Result};
use crate::modules::envelope::{self, ResultEnvelope};
use crate::modules::gateways::models::{CallOptions, Completed, GatewayProfile, OperationSpec};
use crate::modules::signing::{DigestKind, SignatureEngine};
use crate::modules::transport::{HttpRequest, TlsOptions, Transport};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Request pipeline shared by every gateway client.
///
/// A call goes: defaults, caller fields, derived fields, certificate and
/// required-field checks, signing, encoding, one transport round trip,
/// decoding, response verification, completion hook.
pub struct GatewayCore {
    profile: &'static GatewayProfile,
    engine: SignatureEngine,
    credentials: Credentials,
    base_url: String,
    client: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl GatewayCore {
    pub fn new(
        profile: &'static GatewayProfile,
        credentials: Credentials,
        base_url: impl Into<String>,
        client: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            profile,
            engine: SignatureEngine::new(&profile.signing),
            credentials,
            base_url: base_url.into(),
            client,
            transport,
        }
    }

    pub fn profile(&self) -> &'static GatewayProfile {
        self.profile
    }

    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Fields every request of `op` starts from: account ids, fixed values
    /// and a fresh nonce.
    pub fn defaults(&self, op: &OperationSpec, options: &CallOptions) -> ParameterSet {
        let mut params = ParameterSet::new();

        if let Some(field) = op.account_fields.primary {
            let id = options
                .account_id
                .clone()
                .unwrap_or_else(|| self.credentials.account_id.clone());
            params.insert(field, id);
        }
        if let Some(field) = op.account_fields.secondary {
            let id = options
                .secondary_account_id
                .clone()
                .or_else(|| self.credentials.secondary_account_id.clone());
            if let Some(id) = id {
                params.insert(field, id);
            }
        }
        for (key, value) in op.fixed {
            params.insert(*key, *value);
        }
        if let Some(field) = self.profile.nonce_field.filter(|_| op.nonce) {
            params.insert(field, nonce::generate());
        }

        params
    }

    /// Merge defaults, client extras and caller fields (later wins), then
    /// fill derived fields and check the required ones.
    pub fn prepare(
        &self,
        op: &OperationSpec,
        extras: ParameterSet,
        params: ParameterSet,
        options: &CallOptions,
    ) -> Result<ParameterSet> {
        let mut merged = self.defaults(op, options).merge(extras).merge(params);

        for (target, source) in op.derived {
            if !merged.contains(target) {
                if let Some(value) = merged.get(source).cloned() {
                    merged.insert(*target, value);
                }
            }
        }

        self.check_required(op, &merged)?;
        Ok(merged)
    }

    pub fn check_required(&self, op: &OperationSpec, params: &ParameterSet) -> Result<()> {
        let mut missing: Vec<String> = op
            .required
            .iter()
            .filter(|field| !params.contains(field))
            .map(|field| field.to_string())
            .collect();
        for group in op.one_of {
            if !group.iter().any(|field| params.contains(field)) {
                missing.push(group.join(" or "));
            }
        }

        if missing.is_empty() {
            return Ok(());
        }

        match self.client.required_field_policy {
            RequiredFieldPolicy::FailFast => Err(AppError::validation(format!(
                "{} {}: missing required field(s): {}",
                self.profile.name,
                op.name,
                missing.join(", ")
            ))),
            RequiredFieldPolicy::WarnAndContinue => {
                for field in &missing {
                    warn!(
                        gateway = %self.profile.name,
                        operation = %op.name,
                        field = %field,
                        "Missing required field, sending anyway"
                    );
                }
                Ok(())
            }
        }
    }

    /// Per-call secret, else the configured one. Empty secrets are refused.
    pub fn resolve_secret(&self, options: &CallOptions) -> Result<SecretString> {
        let secret = options
            .secret
            .clone()
            .unwrap_or_else(|| self.credentials.shared_secret().clone());
        if secret.expose_secret().is_empty() {
            return Err(AppError::configuration(format!(
                "{} shared secret is not configured",
                self.profile.name
            )));
        }
        Ok(secret)
    }

    /// TLS settings for `op`; certificate-bound operations without a
    /// certificate fail here, before any request is built.
    pub fn tls_for(&self, op: &OperationSpec, options: &CallOptions) -> Result<TlsOptions> {
        let verify_server_cert = options
            .verify_server_cert
            .unwrap_or(self.client.verify_server_cert);

        if !op.requires_certificate {
            return Ok(TlsOptions {
                client_certificate: None,
                verify_server_cert,
            });
        }

        let certificate = options
            .certificate
            .clone()
            .or_else(|| self.credentials.certificate.clone())
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "{} {} requires a client certificate",
                    self.profile.name, op.name
                ))
            })?;

        Ok(TlsOptions {
            client_certificate: Some(certificate),
            verify_server_cert,
        })
    }

    /// Drop the reserved secret field, sign, and store the signature under
    /// the gateway's signature field. Returns the digest used.
    pub fn sign(&self, params: &mut ParameterSet, secret: &SecretString) -> Result<DigestKind> {
        self.sign_into(params, self.profile.signing.signature_field, secret)
    }

    /// Like [`sign`](Self::sign) but stores the signature under `field`
    pub fn sign_into(
        &self,
        params: &mut ParameterSet,
        field: &str,
        secret: &SecretString,
    ) -> Result<DigestKind> {
        params.remove(self.profile.signing.secret_field);
        let digest = self.engine.resolve_digest(params)?;
        let signature = self.engine.generate_with(params, secret, digest)?;
        params.insert(field, signature);
        Ok(digest)
    }

    /// Assemble and sign a payload that the caller hands to a client app
    /// instead of sending it.
    pub fn sign_locally(
        &self,
        op: &OperationSpec,
        extras: ParameterSet,
        params: ParameterSet,
        options: &CallOptions,
    ) -> Result<ParameterSet> {
        let secret = self.resolve_secret(options)?;
        let mut payload = self.prepare(op, extras, params, options)?;
        self.sign(&mut payload, &secret)?;
        debug!(gateway = %self.profile.name, operation = %op.name, "Signed client payload");
        Ok(payload)
    }

    /// Run `op` and return the verified, normalized response
    pub async fn execute(
        &self,
        op: &OperationSpec,
        extras: ParameterSet,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        let result = self.dispatch(op, extras, params, &options).await.and_then(
            |(body, digest, secret)| self.open(&body, digest, &secret),
        );

        match result {
            Ok(envelope) => {
                info!(
                    gateway = %self.profile.name,
                    operation = %op.name,
                    success = envelope.is_success(),
                    "Gateway call completed"
                );
                options.complete(Completed::Envelope(&envelope));
                Ok(envelope)
            }
            Err(e) => Err(self.log_failure(op, e)),
        }
    }

    /// Run `op` and return the response body untouched
    pub async fn execute_raw(
        &self,
        op: &OperationSpec,
        extras: ParameterSet,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<String> {
        match self.dispatch(op, extras, params, &options).await {
            Ok((body, _, _)) => {
                info!(
                    gateway = %self.profile.name,
                    operation = %op.name,
                    bytes = body.len(),
                    "Gateway call completed"
                );
                options.complete(Completed::Raw(&body));
                Ok(body)
            }
            Err(e) => Err(self.log_failure(op, e)),
        }
    }

    async fn dispatch(
        &self,
        op: &OperationSpec,
        extras: ParameterSet,
        params: ParameterSet,
        options: &CallOptions,
    ) -> Result<(String, DigestKind, SecretString)> {
        let secret = self.resolve_secret(options)?;
        let tls = self.tls_for(op, options)?;
        let mut payload = self.prepare(op, extras, params, options)?;
        let wire = self.profile.wire_format;
        wire.check_field_names(&payload)?;
        let digest = self.sign(&mut payload, &secret)?;

        let body = wire.encode(&payload)?;
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), op.path);

        info!(
            gateway = %self.profile.name,
            operation = %op.name,
            mutual_tls = tls.client_certificate.is_some(),
            "Calling gateway"
        );

        let request = HttpRequest::post(url, body, wire.content_type())
            .with_tls(tls)
            .with_timeout(options.timeout);
        let body = self.transport.send(request).await?;

        Ok((body, digest, secret))
    }

    /// Decode a response body and check its signature
    pub fn open(
        &self,
        body: &str,
        digest: DigestKind,
        secret: &SecretString,
    ) -> Result<ResultEnvelope> {
        let fields = envelope::decode(body)?;
        let envelope = ResultEnvelope::new(self.profile.name, fields, self.profile.success_rule);
        self.verify_response(&envelope, digest, secret)?;
        Ok(envelope)
    }

    fn verify_response(
        &self,
        envelope: &ResultEnvelope,
        digest: DigestKind,
        secret: &SecretString,
    ) -> Result<()> {
        if !self.profile.signs_responses
            || self.client.response_verification == ResponseVerification::Skip
        {
            return Ok(());
        }

        let field = self.profile.signing.signature_field;
        let Some(claimed) = envelope.signature(field) else {
            debug!(gateway = %self.profile.name, "Response carries no signature");
            return Ok(());
        };

        if self
            .engine
            .verify_with(&envelope.to_parameter_set(), claimed, secret, digest)
        {
            Ok(())
        } else {
            Err(AppError::SignatureMismatch(format!(
                "{} response signature does not match",
                self.profile.name
            )))
        }
    }

    /// Check a signed payload pushed by the gateway, such as a payment notification
    pub fn verify_notification(&self, params: &ParameterSet) -> bool {
        let field = self.profile.signing.signature_field;
        match params.get(field) {
            Some(claimed) => {
                self.engine
                    .verify(params, &claimed.to_string(), self.credentials.shared_secret())
            }
            None => false,
        }
    }

    fn log_failure(&self, op: &OperationSpec, e: AppError) -> AppError {
        error!(
            gateway = %self.profile.name,
            operation = %op.name,
            kind = %e.kind(),
            error = %e,
            "Gateway call failed"
        );
        e
    }
}
