use crate::core::{ParameterSet, Result};
use crate::modules::envelope::ResultEnvelope;
use crate::modules::gateways::models::{CallOptions, GatewayProfile};
use async_trait::async_trait;

/// Order lifecycle shared by every gateway client
///
/// Each client also exposes its gateway-specific operations as inherent
/// methods; this trait covers what callers can route by gateway name.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Get gateway name
    fn name(&self) -> &'static str;

    /// Signing, wire format and success rule of the gateway
    fn profile(&self) -> &'static GatewayProfile;

    /// Place an order with the gateway
    async fn create_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope>;

    async fn query_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope>;

    async fn close_order(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope>;

    /// Refund a paid order; needs the client certificate
    async fn refund(&self, params: ParameterSet, options: CallOptions) -> Result<ResultEnvelope>;

    /// Verify the signature of a payload pushed by the gateway
    fn verify_notification(&self, params: &ParameterSet) -> bool;
}
