use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use super::alipay::AlipayClient;
use super::gateway_trait::PaymentGateway;
use super::shengpay::ShengpayClient;
use super::wechat::WechatPayClient;
use crate::config::Config;
use crate::core::{AppError, ParameterSet, Result};
use crate::modules::envelope::{ResultEnvelope, WireFormat};
use crate::modules::gateways::models::CallOptions;
use crate::modules::transport::Transport;

/// Order lifecycle step routed through [`GatewayService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Create,
    Query,
    Close,
    Refund,
}

impl OrderAction {
    fn label(&self) -> &'static str {
        match self {
            OrderAction::Create => "create_order",
            OrderAction::Query => "query_order",
            OrderAction::Close => "close_order",
            OrderAction::Refund => "refund",
        }
    }
}

/// Service for managing and routing to payment gateways
pub struct GatewayService {
    gateways: HashMap<String, Arc<dyn PaymentGateway>>,
}

impl GatewayService {
    pub fn new() -> Self {
        Self {
            gateways: HashMap::new(),
        }
    }

    /// Register a client for every gateway present in `config`, all sharing one transport
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let mut service = Self::new();

        if let Some(wechat) = &config.wechat {
            service.register_gateway(Arc::new(WechatPayClient::new(
                wechat.clone(),
                config.client.clone(),
                transport.clone(),
            )));
        }
        if let Some(shengpay) = &config.shengpay {
            service.register_gateway(Arc::new(ShengpayClient::new(
                shengpay.clone(),
                config.client.clone(),
                transport.clone(),
            )));
        }
        if let Some(alipay) = &config.alipay {
            service.register_gateway(Arc::new(AlipayClient::new(
                alipay.clone(),
                config.client.clone(),
                transport,
            )));
        }

        service
    }

    /// Register a gateway, replacing any previous one with the same name
    pub fn register_gateway(&mut self, gateway: Arc<dyn PaymentGateway>) {
        let name = gateway.name().to_string();
        info!(gateway = %name, "Registered payment gateway");
        self.gateways.insert(name, gateway);
    }

    /// Get a gateway by name
    pub fn get_gateway(&self, name: &str) -> Result<Arc<dyn PaymentGateway>> {
        self.gateways
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::configuration(format!("Gateway '{}' is not configured", name)))
    }

    pub async fn create_order(
        &self,
        gateway_name: &str,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.dispatch(gateway_name, OrderAction::Create, params, options).await
    }

    pub async fn query_order(
        &self,
        gateway_name: &str,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.dispatch(gateway_name, OrderAction::Query, params, options).await
    }

    pub async fn close_order(
        &self,
        gateway_name: &str,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.dispatch(gateway_name, OrderAction::Close, params, options).await
    }

    pub async fn refund(
        &self,
        gateway_name: &str,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        self.dispatch(gateway_name, OrderAction::Refund, params, options).await
    }

    /// Run `action` on the named gateway
    pub async fn dispatch(
        &self,
        gateway_name: &str,
        action: OrderAction,
        params: ParameterSet,
        options: CallOptions,
    ) -> Result<ResultEnvelope> {
        info!(
            gateway = %gateway_name,
            action = action.label(),
            fields = params.len(),
            "Routing order request to gateway"
        );

        let gateway = self.get_gateway(gateway_name)?;

        let result = match action {
            OrderAction::Create => gateway.create_order(params, options).await,
            OrderAction::Query => gateway.query_order(params, options).await,
            OrderAction::Close => gateway.close_order(params, options).await,
            OrderAction::Refund => gateway.refund(params, options).await,
        };

        match result {
            Ok(envelope) => {
                info!(
                    gateway = %gateway_name,
                    action = action.label(),
                    success = envelope.is_success(),
                    "Gateway request finished"
                );
                Ok(envelope)
            }
            Err(e) => {
                error!(
                    gateway = %gateway_name,
                    action = action.label(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Gateway request failed"
                );
                Err(e)
            }
        }
    }

    /// Check a pushed notification against the named gateway's signature rules
    pub fn verify_notification(&self, gateway_name: &str, params: &ParameterSet) -> Result<bool> {
        Ok(self.get_gateway(gateway_name)?.verify_notification(params))
    }

    /// List all registered gateways, sorted by name
    pub fn list_gateways(&self) -> Vec<GatewayInfo> {
        let mut gateways: Vec<GatewayInfo> = self
            .gateways
            .values()
            .map(|gateway| {
                let profile = gateway.profile();
                GatewayInfo {
                    name: gateway.name().to_string(),
                    wire_format: match profile.wire_format {
                        WireFormat::Xml { .. } => "xml".to_string(),
                        WireFormat::Form => "form".to_string(),
                    },
                    signature_field: profile.signing.signature_field.to_string(),
                    signs_responses: profile.signs_responses,
                }
            })
            .collect();
        gateways.sort_by(|a, b| a.name.cmp(&b.name));
        gateways
    }
}

impl Default for GatewayService {
    fn default() -> Self {
        Self::new()
    }
}

/// Gateway information for listing
#[derive(Debug, Clone, Serialize)]
pub struct GatewayInfo {
    pub name: String,
    pub wire_format: String,
    pub signature_field: String,
    pub signs_responses: bool,
}
