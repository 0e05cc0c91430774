use crate::core::{AppError, ParameterSet, Result};
use crate::modules::signing::models::{DigestKind, HexCase, SecretPlacement, SigningRules};
use hmac::{Hmac, Mac};
use md5::Md5;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes and checks gateway signatures.
///
/// Signing input: every field except the signature, the reserved secret
/// field and the gateway's excluded fields, minus empty values, sorted by key
/// bytes, joined as `k=v` with `&`, then the secret placed per the gateway's
/// rules. The digest is rendered as hex in the gateway's case.
#[derive(Debug, Clone, Copy)]
pub struct SignatureEngine {
    rules: &'static SigningRules,
}

impl SignatureEngine {
    pub const fn new(rules: &'static SigningRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static SigningRules {
        self.rules
    }

    /// Sorted `k=v&k=v` string without the secret
    pub fn canonical_string(&self, params: &ParameterSet) -> String {
        let mut fields: Vec<(&str, String)> = params
            .iter()
            .filter(|(k, _)| !self.rules.is_unsigned(k))
            .map(|(k, v)| (k, v.to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        fields.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn signing_input(&self, params: &ParameterSet, secret: &str) -> String {
        let canonical = self.canonical_string(params);
        match self.rules.secret_placement {
            SecretPlacement::KeyValueSuffix(name) => format!("{}&{}={}", canonical, name, secret),
            SecretPlacement::Appended => format!("{}{}", canonical, secret),
        }
    }

    /// Digest selected by the sign-type field when present, else the gateway default
    pub fn resolve_digest(&self, params: &ParameterSet) -> Result<DigestKind> {
        match self.rules.sign_type_field.and_then(|f| params.get(f)) {
            Some(label) => DigestKind::from_label(&label.to_string()),
            None => Ok(self.rules.default_digest),
        }
    }

    pub fn generate(&self, params: &ParameterSet, secret: &SecretString) -> Result<String> {
        let digest = self.resolve_digest(params)?;
        self.generate_with(params, secret, digest)
    }

    pub fn generate_with(
        &self,
        params: &ParameterSet,
        secret: &SecretString,
        digest: DigestKind,
    ) -> Result<String> {
        let secret = secret.expose_secret();
        let input = self.signing_input(params, secret);

        let raw = match digest {
            DigestKind::Md5 => Md5::digest(input.as_bytes()).to_vec(),
            DigestKind::HmacSha256 => {
                let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                    .map_err(|e| AppError::internal(format!("HMAC key rejected: {}", e)))?;
                mac.update(input.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
        };

        Ok(match self.rules.hex_case {
            HexCase::Upper => hex::encode_upper(raw),
            HexCase::Lower => hex::encode(raw),
        })
    }

    /// Recompute over `params` (any signature field in it is ignored) and
    /// compare with `claimed` in constant time.
    pub fn verify(&self, params: &ParameterSet, claimed: &str, secret: &SecretString) -> bool {
        match self.resolve_digest(params) {
            Ok(digest) => self.verify_with(params, claimed, secret, digest),
            Err(_) => false,
        }
    }

    pub fn verify_with(
        &self,
        params: &ParameterSet,
        claimed: &str,
        secret: &SecretString,
        digest: DigestKind,
    ) -> bool {
        let mut unsigned = params.clone();
        unsigned.remove(self.rules.signature_field);

        match self.generate_with(&unsigned, secret, digest) {
            Ok(expected) => expected.as_bytes().ct_eq(claimed.as_bytes()).into(),
            Err(_) => false,
        }
    }

    /// Sign `params` and store the signature under the gateway's signature field
    pub fn sign_in_place(&self, params: &mut ParameterSet, secret: &SecretString) -> Result<String> {
        let signature = self.generate(params, secret)?;
        params.insert(self.rules.signature_field, signature.clone());
        Ok(signature)
    }
}
