use super::gateway_core::GatewayCore;
use super::gateway_trait::PaymentGateway;
use crate::config::{ClientConfig, ShengpayConfig};
use crate::core::{GatewayClock, ParameterSet, Result};
use crate::modules::envelope::ResultEnvelope;
use crate::modules::gateways::models::{
    gateway_profile, AccountFields, CallOptions, GatewayProfile, OperationSpec,
};
use crate::modules::transport::Transport;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

const SENDER: AccountFields = AccountFields::primary("MsgSender");

pub static CREATE_ORDER: OperationSpec =
    OperationSpec::new("create_order", "/api-acquire-channel/services/createOrderService")
        .accounts(SENDER)
        .required(&["OrderNo", "OrderAmount", "OrderTime", "Currency", "PageUrl", "NotifyUrl", "BuyerIp"]);

pub static QUERY_ORDER: OperationSpec =
    OperationSpec::new("query_order", "/api-acquire-channel/services/queryOrderService")
        .accounts(SENDER)
        .required(&["OrderNo"]);

pub static CLOSE_ORDER: OperationSpec =
    OperationSpec::new("close_order", "/api-acquire-channel/services/closeOrderService")
        .accounts(SENDER)
        .required(&["OrderNo"]);

pub static REFUND: OperationSpec =
    OperationSpec::new("refund", "/api-acquire-channel/services/refundService")
        .accounts(SENDER)
        .required(&["OrderNo", "RefundOrderNo", "RefundAmount", "NotifyUrl"])
        .with_certificate();

pub static EXCHANGE_RATE_QUERY: OperationSpec =
    OperationSpec::new("exchange_rate_query", "/api-acquire-channel/services/exchangeRateService")
        .accounts(SENDER)
        .required(&["Currency"]);

/// Bank-card gateway client
pub struct ShengpayClient {
    core: GatewayCore,
    name: String,
    payment_version: String,
    exchange_rate_version: String,
    charset: String,
    sign_type: String,
}

impl ShengpayClient {
    pub fn new(config: ShengpayConfig, client: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            core: GatewayCore::new(
                &gateway_profile::SHENGPAY,
                config.credentials,
                config.base_url,
                client,
                transport,
            ),
            name: config.name,
            payment_version: config.payment_version,
            exchange_rate_version: config.exchange_rate_version,
            charset: config.charset,
            sign_type: config.sign_type,
        }
    }

    pub fn core(&self) -> &GatewayCore {
        &self.core
    }

    /// Header fields every message carries
    fn message_header(&self, version: &str) -> ParameterSet {
        ParameterSet::new()
            .with("Name", self.name.as_str())
            .with("Version", version)
            .with("Charset", self.charset.as_str())
            .with("SignType", self.sign_type.as_str())
            .with("SendTime", GatewayClock::compact(Utc::now()))
    }

    /// `OrderTime` defaults to now
    pub async fn create_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        let extras = self
            .message_header(&self.payment_version)
            .with("OrderTime", GatewayClock::compact(Utc::now()));
        self.core.execute(&CREATE_ORDER, extras, params, options).await
    }

    pub async fn query_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        let extras = self.message_header(&self.payment_version);
        self.core.execute(&QUERY_ORDER, extras, params, options).await
    }

    pub async fn close_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        let extras = self.message_header(&self.payment_version);
        self.core.execute(&CLOSE_ORDER, extras, params, options).await
    }

    pub async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        let extras = self.message_header(&self.payment_version);
        self.core.execute(&REFUND, extras, params, options).await
    }

    /// Current settlement rate for a foreign currency
    pub async fn exchange_rate_query(
        &self,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        let extras = self.message_header(&self.exchange_rate_version);
        self.core
            .execute(&EXCHANGE_RATE_QUERY, extras, params, options)
            .await
    }
}

#[async_trait]
impl PaymentGateway for ShengpayClient {
    fn name(&self) -> &'static str {
        self.core.profile().name
    }

    fn profile(&self) -> &'static GatewayProfile {
        self.core.profile()
    }

    async fn create_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        ShengpayClient::create_order(self, params, options).await
    }

    async fn query_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        ShengpayClient::query_order(self, params, options).await
    }

    async fn close_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        ShengpayClient::close_order(self, params, options).await
    }

    async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope> {
        ShengpayClient::refund(self, params, options).await
    }

    fn verify_notification(&self, params: &ParameterSet) -> bool {
        self.core.verify_notification(params)
    }
}
