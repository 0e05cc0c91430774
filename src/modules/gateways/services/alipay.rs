use super::gateway_core::GatewayCore;
use super::gateway_trait::PaymentGateway;
use crate::config::{AlipayConfig, ClientConfig};
use crate::core::{GatewayClock, ParameterSet, Result};
use crate::modules::envelope::{ResultEnvelope, WireFormat};
use crate::modules::gateways::models::{
    gateway_profile, AccountFields, CallOptions, GatewayProfile, OperationSpec,
};
use crate::modules::transport::Transport;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

const GATEWAY_PATH: &str = "/gateway.do";
const PARTNER: AccountFields = AccountFields::primary("partner");

pub static PRECREATE: OperationSpec = OperationSpec::new("precreate", GATEWAY_PATH)
    .accounts(PARTNER)
    .fixed(&[("service", "alipay.acquire.precreate"), ("product_code", "QR_CODE_OFFLINE")])
    .required(&["out_trade_no", "subject", "total_fee", "notify_url"]);

pub static MOBILE_PAY_REQUEST: OperationSpec = OperationSpec::new("mobile_pay_request", "")
    .accounts(AccountFields::both("partner", "seller_id"))
    .fixed(&[("service", "mobile.securitypay.pay"), ("payment_type", "1")])
    .required(&["out_trade_no", "subject", "total_fee", "notify_url"]);

pub static SINGLE_TRADE_QUERY: OperationSpec = OperationSpec::new("single_trade_query", GATEWAY_PATH)
    .accounts(PARTNER)
    .fixed(&[("service", "single_trade_query")])
    .one_of(&[&["out_trade_no", "trade_no"]]);

pub static CLOSE_TRADE: OperationSpec = OperationSpec::new("close_trade", GATEWAY_PATH)
    .accounts(PARTNER)
    .fixed(&[("service", "close_trade")])
    .one_of(&[&["out_order_no", "trade_no"]]);

pub static REFUND: OperationSpec = OperationSpec::new("refund", GATEWAY_PATH)
    .accounts(PARTNER)
    .fixed(&[("service", "refund_fastpay_by_platform_nopwd")])
    .required(&["batch_no", "batch_num", "detail_data"])
    .with_certificate();

pub static TRANSFER: OperationSpec = OperationSpec::new("transfer", GATEWAY_PATH)
    .accounts(PARTNER)
    .fixed(&[("service", "batch_trans_notify")])
    .required(&["batch_no", "batch_num", "batch_fee", "email", "account_name", "pay_date", "detail_data"])
    .with_certificate();

/// Mobile-wallet gateway client
///
/// Requests are form-encoded against a single gateway endpoint; the
/// `service` field selects the operation.
pub struct AlipayClient {
    core: GatewayCore,
    charset: String,
}

impl AlipayClient {
    pub fn new(config: AlipayConfig, client: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            core: GatewayCore::new(
                &gateway_profile::ALIPAY,
                config.credentials,
                config.base_url,
                client,
                transport,
            ),
            charset: config.charset,
        }
    }

    pub fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn common(&self) -> ParameterSet {
        ParameterSet::new()
            .with("_input_charset", self.charset.as_str())
            .with("sign_type", "MD5")
    }

    /// Pre-create a QR code order
    pub async fn precreate(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.core.execute(&PRECREATE, self.common(), params, options).await
    }

    /// Signed order fields for the mobile SDK
    pub fn mobile_pay_request(&self, params: ParameterSet, options: &CallOptions) -> Result<ParameterSet> {
        self.core
            .sign_locally(&MOBILE_PAY_REQUEST, self.common(), params, options)
    }

    /// [`mobile_pay_request`](Self::mobile_pay_request) rendered as the
    /// order string the SDK expects
    pub fn mobile_pay_order_string(&self, params: ParameterSet, options: &CallOptions) -> Result<String> {
        WireFormat::Form.encode(&self.mobile_pay_request(params, options)?)
    }

    pub async fn single_trade_query(
        &self,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.core
            .execute(&SINGLE_TRADE_QUERY, self.common(), params, options)
            .await
    }

    pub async fn close_trade(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.core.execute(&CLOSE_TRADE, self.common(), params, options).await
    }

    /// Batch refund without payer confirmation; `refund_date` defaults to now
    pub async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        let extras = self
            .common()
            .with("refund_date", GatewayClock::readable(Utc::now()));
        self.core.execute(&REFUND, extras, params, options).await
    }

    /// Batch payout to wallet accounts
    pub async fn transfer(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.core.execute(&TRANSFER, self.common(), params, options).await
    }
}

#[async_trait]
impl PaymentGateway for AlipayClient {
    fn name(&self) -> &'static str {
        self.core.profile().name
    }

    fn profile(&self) -> &'static GatewayProfile {
        self.core.profile()
    }

    async fn create_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.precreate(params, options).await
    }

    async fn query_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.single_trade_query(params, options).await
    }

    async fn close_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        self.close_trade(params, options).await
    }

    async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        AlipayClient::refund(self, params, options).await
    }

    fn verify_notification(&self, params: &ParameterSet) -> bool {
        self.core.verify_notification(params)
    }
}
