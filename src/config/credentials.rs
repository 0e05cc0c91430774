use crate::core::{AppError, Result};
use base64::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

/// Account identifiers and secrets for one gateway merchant account
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: String,
    pub secondary_account_id: Option<String>,
    shared_secret: SecretString,
    pub certificate: Option<ClientCertificate>,
}

impl Credentials {
    pub fn new(account_id: impl Into<String>, shared_secret: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            secondary_account_id: None,
            shared_secret: SecretString::from(shared_secret.into()),
            certificate: None,
        }
    }

    pub fn with_secondary_account_id(mut self, id: impl Into<String>) -> Self {
        self.secondary_account_id = Some(id.into());
        self
    }

    pub fn with_certificate(mut self, certificate: ClientCertificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn shared_secret(&self) -> &SecretString {
        &self.shared_secret
    }
}

/// Client certificate and private key presented on mutually-authenticated calls
#[derive(Debug, Clone)]
pub struct ClientCertificate {
    cert_pem: String,
    key_pem: SecretString,
}

impl ClientCertificate {
    /// Build from PEM text. Both blocks are parsed up front so a broken
    /// certificate fails at configuration time rather than mid-request.
    pub fn from_pem(cert_pem: impl Into<String>, key_pem: impl Into<String>) -> Result<Self> {
        let cert_pem = cert_pem.into();
        let key_pem = key_pem.into();

        let certs = rustls_pemfile::certs(&mut cert_pem.as_bytes())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::configuration(format!("Unreadable client certificate: {}", e)))?;
        if certs.is_empty() {
            return Err(AppError::configuration(
                "Client certificate PEM contains no CERTIFICATE block",
            ));
        }

        rustls_pemfile::private_key(&mut key_pem.as_bytes())
            .map_err(|e| AppError::configuration(format!("Unreadable client private key: {}", e)))?
            .ok_or_else(|| {
                AppError::configuration("Client key PEM contains no private key block")
            })?;

        Ok(Self {
            cert_pem,
            key_pem: SecretString::from(key_pem),
        })
    }

    pub fn from_pem_files(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<Self> {
        let cert_pem = std::fs::read_to_string(cert_path)?;
        let key_pem = std::fs::read_to_string(key_path)?;
        Self::from_pem(cert_pem, key_pem)
    }

    /// Split a passphrase-protected PKCS#12 bundle into certificate and key.
    ///
    /// Only the legacy PKCS#12 PBE schemes (SHA1 with 3DES or RC2) and a
    /// SHA1 MAC are understood. Bundles written with OpenSSL 3 defaults
    /// (PBES2/AES) are rejected; re-export them with `openssl pkcs12 -export
    /// -legacy` or `-certpbe PBE-SHA1-3DES -keypbe PBE-SHA1-3DES -macalg sha1`.
    pub fn from_pkcs12(der: &[u8], passphrase: &str) -> Result<Self> {
        let pfx = p12::PFX::parse(der)
            .map_err(|e| AppError::configuration(format!("Invalid PKCS#12 bundle: {:?}", e)))?;

        if !pfx.verify_mac(passphrase) {
            return Err(AppError::configuration(
                "PKCS#12 passphrase does not match bundle",
            ));
        }

        let cert_der = pfx
            .cert_x509_bags(passphrase)
            .map_err(|e| AppError::configuration(format!("Unreadable PKCS#12 certificate: {:?}", e)))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::configuration("PKCS#12 bundle contains no certificate"))?;

        let key_der = pfx
            .key_bags(passphrase)
            .map_err(|e| AppError::configuration(format!("Unreadable PKCS#12 private key: {:?}", e)))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::configuration("PKCS#12 bundle contains no private key"))?;

        Self::from_pem(
            pem_block("CERTIFICATE", &cert_der),
            pem_block("PRIVATE KEY", &key_der),
        )
    }

    pub fn from_pkcs12_file(path: impl AsRef<Path>, passphrase: &str) -> Result<Self> {
        let der = std::fs::read(path)?;
        Self::from_pkcs12(&der, passphrase)
    }

    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// Key followed by certificate, the layout `reqwest::Identity::from_pem` reads
    pub fn identity_pem(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.cert_pem.len() + 2048);
        buf.extend_from_slice(self.key_pem.expose_secret().as_bytes());
        if !buf.ends_with(b"\n") {
            buf.push(b'\n');
        }
        buf.extend_from_slice(self.cert_pem.as_bytes());
        buf
    }
}

fn pem_block(label: &str, der: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(der);
    let mut out = format!("-----BEGIN {}-----\n", label);
    for line in encoded.as_bytes().chunks(64) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}
