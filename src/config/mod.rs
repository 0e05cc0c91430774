use crate::core::{AppError, Result};
use secrecy::SecretString;
use std::env;

pub mod client;
pub mod credentials;

pub use client::{ClientConfig, RequiredFieldPolicy, ResponseVerification};
pub use credentials::{ClientCertificate, Credentials};

pub const WECHAT_BASE_URL: &str = "https://api.mch.weixin.qq.com";
pub const SHENGPAY_BASE_URL: &str = "https://mas.shengpay.com";
pub const ALIPAY_BASE_URL: &str = "https://mapi.alipay.com";

/// Main library configuration.
///
/// Built once at startup and handed to each client; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub client: ClientConfig,
    pub wechat: Option<WechatConfig>,
    pub shengpay: Option<ShengpayConfig>,
    pub alipay: Option<AlipayConfig>,
}

/// Wallet gateway account
#[derive(Debug, Clone)]
pub struct WechatConfig {
    /// `account_id` is the app id, `secondary_account_id` the merchant id
    pub credentials: Credentials,
    /// OAuth app secret, only needed for the authorize/authenticate calls
    pub app_secret: Option<SecretString>,
    pub base_url: String,
}

/// Bank-card gateway account
#[derive(Debug, Clone)]
pub struct ShengpayConfig {
    pub credentials: Credentials,
    pub name: String,
    pub payment_version: String,
    pub exchange_rate_version: String,
    pub charset: String,
    pub sign_type: String,
    pub base_url: String,
}

/// Mobile-wallet gateway account
#[derive(Debug, Clone)]
pub struct AlipayConfig {
    /// `account_id` is the partner id, `secondary_account_id` the seller id
    pub credentials: Credentials,
    pub charset: String,
    pub base_url: String,
}

impl WechatConfig {
    pub fn new(app_id: impl Into<String>, mch_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(app_id, key).with_secondary_account_id(mch_id),
            app_secret: None,
            base_url: WECHAT_BASE_URL.to_string(),
        }
    }
}

impl ShengpayConfig {
    pub fn new(merchant_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(merchant_id, key),
            name: "B2CPayment".to_string(),
            payment_version: "V4.1.1.1.1".to_string(),
            exchange_rate_version: "V4.1.1.1.1".to_string(),
            charset: "UTF-8".to_string(),
            sign_type: "MD5".to_string(),
            base_url: SHENGPAY_BASE_URL.to_string(),
        }
    }
}

impl AlipayConfig {
    pub fn new(partner: impl Into<String>, key: impl Into<String>) -> Self {
        let partner = partner.into();
        Self {
            credentials: Credentials::new(partner.clone(), key).with_secondary_account_id(partner),
            charset: "utf-8".to_string(),
            base_url: ALIPAY_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::Configuration(format!("{} not set", key)))
        };

        let wechat = match lookup("WECHAT_APP_ID") {
            Some(app_id) => {
                let mut credentials = Credentials::new(app_id, required("WECHAT_KEY")?)
                    .with_secondary_account_id(required("WECHAT_MCH_ID")?);
                credentials.certificate = load_certificate(&lookup, "WECHAT")?;
                Some(WechatConfig {
                    credentials,
                    app_secret: lookup("WECHAT_APP_SECRET").map(SecretString::from),
                    base_url: lookup("WECHAT_BASE_URL")
                        .unwrap_or_else(|| WECHAT_BASE_URL.to_string()),
                })
            }
            None => None,
        };

        let shengpay = match lookup("SHENGPAY_MERCHANT_ID") {
            Some(merchant_id) => {
                let defaults = ShengpayConfig::new(merchant_id, required("SHENGPAY_KEY")?);
                let mut credentials = defaults.credentials;
                credentials.certificate = load_certificate(&lookup, "SHENGPAY")?;
                Some(ShengpayConfig {
                    credentials,
                    name: lookup("SHENGPAY_NAME").unwrap_or(defaults.name),
                    payment_version: lookup("SHENGPAY_PAYMENT_VERSION")
                        .unwrap_or(defaults.payment_version),
                    exchange_rate_version: lookup("SHENGPAY_EXCHANGE_RATE_VERSION")
                        .unwrap_or(defaults.exchange_rate_version),
                    charset: lookup("SHENGPAY_CHARSET").unwrap_or(defaults.charset),
                    sign_type: lookup("SHENGPAY_SIGN_TYPE").unwrap_or(defaults.sign_type),
                    base_url: lookup("SHENGPAY_BASE_URL").unwrap_or(defaults.base_url),
                })
            }
            None => None,
        };

        let alipay = match lookup("ALIPAY_PARTNER") {
            Some(partner) => {
                let seller_id = lookup("ALIPAY_SELLER_ID").unwrap_or_else(|| partner.clone());
                let mut credentials =
                    Credentials::new(partner, required("ALIPAY_KEY")?).with_secondary_account_id(seller_id);
                credentials.certificate = load_certificate(&lookup, "ALIPAY")?;
                Some(AlipayConfig {
                    credentials,
                    charset: lookup("ALIPAY_CHARSET").unwrap_or_else(|| "utf-8".to_string()),
                    base_url: lookup("ALIPAY_BASE_URL")
                        .unwrap_or_else(|| ALIPAY_BASE_URL.to_string()),
                })
            }
            None => None,
        };

        let config = Config {
            client: ClientConfig::from_lookup(&lookup)?,
            wechat,
            shengpay,
            alipay,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.client.timeout.is_zero() {
            return Err(AppError::Configuration(
                "HTTP timeout must be greater than 0".to_string(),
            ));
        }

        let accounts = [
            ("wechat", self.wechat.as_ref().map(|c| (&c.credentials, &c.base_url))),
            ("shengpay", self.shengpay.as_ref().map(|c| (&c.credentials, &c.base_url))),
            ("alipay", self.alipay.as_ref().map(|c| (&c.credentials, &c.base_url))),
        ];

        for (name, account) in accounts {
            let Some((credentials, base_url)) = account else {
                continue;
            };
            if credentials.account_id.trim().is_empty() {
                return Err(AppError::Configuration(format!("{} account id is empty", name)));
            }
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(AppError::Configuration(format!(
                    "{} base url must be http(s): {}",
                    name, base_url
                )));
            }
        }

        if self.wechat.is_none() && self.shengpay.is_none() && self.alipay.is_none() {
            tracing::warn!("No gateway account configured");
        }

        Ok(())
    }
}

/// Certificate from `<PREFIX>_CERT_PATH`+`<PREFIX>_KEY_PATH` (PEM) or
/// `<PREFIX>_PKCS12_PATH`+`<PREFIX>_PKCS12_PASSWORD`
fn load_certificate(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
) -> Result<Option<ClientCertificate>> {
    let var = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix));

    if let (Some(cert_path), Some(key_path)) = (var("CERT_PATH"), var("KEY_PATH")) {
        return ClientCertificate::from_pem_files(cert_path, key_path).map(Some);
    }

    if let Some(bundle_path) = var("PKCS12_PATH") {
        let passphrase = var("PKCS12_PASSWORD").ok_or_else(|| {
            AppError::Configuration(format!("{}_PKCS12_PASSWORD not set", prefix))
        })?;
        return ClientCertificate::from_pkcs12_file(bundle_path, &passphrase).map(Some);
    }

    Ok(None)
}
