use super::gateway_core::GatewayCore;
use super::gateway_trait::PaymentGateway;
use crate::config::{ClientConfig, WechatConfig};
use crate::core::{nonce, AppError, GatewayClock, ParameterSet, Result};
use crate::modules::envelope::{self, ResultEnvelope, SuccessRule};
use crate::modules::gateways::models::{
    gateway_profile, AccountFields, CallOptions, Completed, GatewayProfile, OperationSpec,
};
use crate::modules::signing::DigestKind;
use crate::modules::transport::{HttpRequest, TlsOptions, Transport};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::info;

/// Host of the OAuth token endpoints
pub const OAUTH_API_URL: &str = "https://api.weixin.qq.com";
/// Host of the user-facing authorization page
pub const OAUTH_OPEN_URL: &str = "https://open.weixin.qq.com";

const MERCHANT: AccountFields = AccountFields::both("appid", "mch_id");

pub static UNIFIED_ORDER: OperationSpec = OperationSpec::new("unified_order", "/pay/unifiedorder")
    .accounts(MERCHANT)
    .required(&["body", "out_trade_no", "total_fee", "spbill_create_ip", "notify_url", "trade_type"]);

pub static MICROPAY: OperationSpec = OperationSpec::new("micropay", "/pay/micropay")
    .accounts(MERCHANT)
    .required(&["body", "out_trade_no", "total_fee", "spbill_create_ip", "auth_code"]);

pub static ORDER_QUERY: OperationSpec = OperationSpec::new("order_query", "/pay/orderquery")
    .accounts(MERCHANT)
    .one_of(&[&["transaction_id", "out_trade_no"]]);

pub static CLOSE_ORDER: OperationSpec = OperationSpec::new("close_order", "/pay/closeorder")
    .accounts(MERCHANT)
    .required(&["out_trade_no"]);

pub static REFUND: OperationSpec = OperationSpec::new("refund", "/secapi/pay/refund")
    .accounts(MERCHANT)
    .required(&["out_refund_no", "total_fee", "refund_fee", "op_user_id"])
    .one_of(&[&["out_trade_no", "transaction_id"]])
    .derived(&[("op_user_id", "mch_id")])
    .with_certificate();

pub static REFUND_QUERY: OperationSpec = OperationSpec::new("refund_query", "/pay/refundquery")
    .accounts(MERCHANT)
    .one_of(&[&["transaction_id", "out_trade_no", "out_refund_no", "refund_id"]]);

pub static REVERSE: OperationSpec = OperationSpec::new("reverse", "/secapi/pay/reverse")
    .accounts(MERCHANT)
    .one_of(&[&["out_trade_no", "transaction_id"]])
    .with_certificate();

pub static TRANSFER: OperationSpec =
    OperationSpec::new("transfer", "/mmpaymkttransfers/promotion/transfers")
        .accounts(AccountFields::both("mch_appid", "mchid"))
        .required(&["partner_trade_no", "openid", "check_name", "amount", "desc", "spbill_create_ip"])
        .with_certificate();

pub static TRANSFER_INFO: OperationSpec =
    OperationSpec::new("transfer_info", "/mmpaymkttransfers/gettransferinfo")
        .accounts(MERCHANT)
        .required(&["partner_trade_no"])
        .with_certificate();

pub static DOWNLOAD_BILL: OperationSpec = OperationSpec::new("download_bill", "/pay/downloadbill")
    .accounts(MERCHANT)
    .required(&["bill_date", "bill_type"]);

pub static SEND_REDPACK: OperationSpec =
    OperationSpec::new("send_redpack", "/mmpaymkttransfers/sendredpack")
        .accounts(AccountFields::both("wxappid", "mch_id"))
        .required(&[
            "mch_billno",
            "send_name",
            "re_openid",
            "total_amount",
            "total_num",
            "wishing",
            "client_ip",
            "act_name",
            "remark",
        ])
        .with_certificate();

pub static SEND_GROUP_REDPACK: OperationSpec =
    OperationSpec::new("send_group_redpack", "/mmpaymkttransfers/sendgroupredpack")
        .accounts(AccountFields::both("wxappid", "mch_id"))
        .required(&[
            "mch_billno",
            "send_name",
            "re_openid",
            "total_amount",
            "total_num",
            "amount_type",
            "wishing",
            "act_name",
            "remark",
        ])
        .with_certificate();

pub static APP_PAY_REQUEST: OperationSpec = OperationSpec::new("app_pay_request", "")
    .accounts(AccountFields::both("appid", "partnerid"))
    .fixed(&[("package", "Sign=WXPay")])
    .required(&["prepayid", "noncestr"])
    .without_nonce();

pub static JS_PAY_REQUEST: OperationSpec = OperationSpec::new("js_pay_request", "")
    .required(&["prepayid", "noncestr"])
    .without_nonce();

/// Wallet gateway client
///
/// Payment calls are XML over HTTPS signed with the merchant key. The OAuth
/// helpers talk to the public account API with the app secret instead.
pub struct WechatPayClient {
    core: GatewayCore,
    app_secret: Option<SecretString>,
    oauth_api_url: String,
    oauth_open_url: String,
}

impl WechatPayClient {
    pub fn new(config: WechatConfig, client: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            core: GatewayCore::new(
                &gateway_profile::WECHAT,
                config.credentials,
                config.base_url,
                client,
                transport,
            ),
            app_secret: config.app_secret,
            oauth_api_url: OAUTH_API_URL.to_string(),
            oauth_open_url: OAUTH_OPEN_URL.to_string(),
        }
    }

    /// Point the OAuth helpers at other hosts
    pub fn with_oauth_urls(mut self, api_url: impl Into<String>, open_url: impl Into<String>) -> Self {
        self.oauth_api_url = api_url.into();
        self.oauth_open_url = open_url.into();
        self
    }

    pub fn core(&self) -> &GatewayCore {
        &self.core
    }

    async fn call(
        &self,
        op: &OperationSpec,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.core.execute(op, ParameterSet::new(), params, options).await
    }

    pub async fn unified_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&UNIFIED_ORDER, params, options).await
    }

    /// Charge a barcode scanned from the payer's device
    pub async fn micropay(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&MICROPAY, params, options).await
    }

    pub async fn order_query(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&ORDER_QUERY, params, options).await
    }

    pub async fn close_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&CLOSE_ORDER, params, options).await
    }

    /// `op_user_id` defaults to the merchant id
    pub async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&REFUND, params, options).await
    }

    pub async fn refund_query(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&REFUND_QUERY, params, options).await
    }

    /// Cancel a barcode payment
    pub async fn reverse(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&REVERSE, params, options).await
    }

    /// Pay out to a user's wallet balance
    pub async fn transfer(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&TRANSFER, params, options).await
    }

    pub async fn transfer_info(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&TRANSFER_INFO, params, options).await
    }

    pub async fn send_redpack(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.call(&SEND_REDPACK, params, options).await
    }

    pub async fn send_group_redpack(
        &self,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.call(&SEND_GROUP_REDPACK, params, options).await
    }

    /// Statement download. The gateway answers with a CSV-like document, so
    /// the body is returned as is.
    pub async fn download_bill(&self, params: ParameterSet, options: CallOptions) -> Result<String> {
        self.core
            .execute_raw(&DOWNLOAD_BILL, ParameterSet::new(), params, options)
            .await
    }

    /// Signed payload for the native app SDK
    pub fn app_pay_request(&self, params: ParameterSet, options: &CallOptions) -> Result<ParameterSet> {
        let extras = ParameterSet::new().with("timestamp", GatewayClock::unix_seconds(Utc::now()));
        self.core.sign_locally(&APP_PAY_REQUEST, extras, params, options)
    }

    /// Signed payload for the in-browser bridge; the signature goes in `paySign`
    pub fn js_pay_request(&self, params: ParameterSet, options: &CallOptions) -> Result<ParameterSet> {
        self.core.check_required(&JS_PAY_REQUEST, &params)?;

        let mut caller = params;
        let app_id = options
            .account_id
            .clone()
            .unwrap_or_else(|| self.core.credentials().account_id.clone());

        let mut payload = ParameterSet::new().with("appId", app_id);
        if let Some(prepay_id) = caller.remove("prepayid") {
            payload.insert("package", format!("prepay_id={}", prepay_id));
        }
        if let Some(nonce_str) = caller.remove("noncestr") {
            payload.insert("nonceStr", nonce_str);
        }
        payload.insert("timeStamp", GatewayClock::unix_seconds(Utc::now()));
        payload.insert("signType", DigestKind::Md5.label());
        let mut payload = payload.merge(caller);

        let secret = self.core.resolve_secret(options)?;
        payload.remove(self.core.profile().signing.secret_field);
        let digest = match payload.get("signType") {
            Some(label) => DigestKind::from_label(&label.to_string())?,
            None => DigestKind::Md5,
        };
        let signature = self.core.engine().generate_with(&payload, &secret, digest)?;
        payload.insert("paySign", signature);

        Ok(payload)
    }

    /// OAuth2 authorization page url for the public account. A random
    /// `state` is used when none is given.
    pub fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<String> {
        let state = state.map(str::to_string).unwrap_or_else(nonce::generate);
        let base = format!("{}/connect/oauth2/authorize", self.oauth_open_url.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &base,
            &[
                ("appid", self.core.credentials().account_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", "snsapi_base"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AppError::configuration(format!("Invalid OAuth url: {}", e)))?;

        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token and openid
    pub async fn authenticate(&self, code: &str, options: CallOptions) -> Result<ResultEnvelope> {
        self.oauth_exchange("authenticate", "/sns/oauth2/access_token", ("code", code), options)
            .await
    }

    /// Exchange a mini program login code for a session key and openid
    pub async fn authenticate_mini_program(
        &self,
        js_code: &str,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.oauth_exchange(
            "authenticate_mini_program",
            "/sns/jscode2session",
            ("js_code", js_code),
            options,
        )
        .await
    }

    async fn oauth_exchange(
        &self,
        operation: &str,
        path: &str,
        code: (&str, &str),
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        let secret = self.app_secret.as_ref().ok_or_else(|| {
            AppError::configuration("wechat app secret is required for OAuth calls")
        })?;
        let app_id = options
            .account_id
            .clone()
            .unwrap_or_else(|| self.core.credentials().account_id.clone());

        let base = format!("{}{}", self.oauth_api_url.trim_end_matches('/'), path);
        let url = Url::parse_with_params(
            &base,
            &[
                ("appid", app_id.as_str()),
                ("secret", secret.expose_secret()),
                code,
                ("grant_type", "authorization_code"),
            ],
        )
        .map_err(|e| AppError::configuration(format!("Invalid OAuth url: {}", e)))?;

        let tls = TlsOptions {
            client_certificate: None,
            verify_server_cert: options
                .verify_server_cert
                .unwrap_or(self.core.client_config().verify_server_cert),
        };
        let request = HttpRequest::get(url.to_string())
            .with_tls(tls)
            .with_timeout(options.timeout);

        info!(gateway = "wechat", operation = %operation, "Calling gateway");
        let body = self.core.transport().send(request).await?;
        let envelope = ResultEnvelope::new(
            self.core.profile().name,
            envelope::decode(&body)?,
            SuccessRule::NoErrorCode("errcode"),
        );
        info!(
            gateway = "wechat",
            operation = %operation,
            success = envelope.is_success(),
            "Gateway call completed"
        );

        options.complete(Completed::Envelope(&envelope));
        Ok(envelope)
    }
}

#[async_trait]
impl PaymentGateway for WechatPayClient {
    fn name(&self) -> &'static str {
        self.core.profile().name
    }

    fn profile(&self) -> &'static GatewayProfile {
        self.core.profile()
    }

    async fn create_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.unified_order(params, options).await
    }

    async fn query_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.order_query(params, options).await
    }

    async fn close_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        WechatPayClient::close_order(self, params, options).await
    }

    async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        WechatPayClient::refund(self, params, options).await
    }

    fn verify_notification(&self, params: &ParameterSet) -> bool {
        self.core.verify_notification(params)
    }
}
