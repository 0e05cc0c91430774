// Gateway clients and routing

pub mod models;
pub mod services;

pub use models::{
    gateway_profile, AccountFields, CallOptions, Completed, CompletionHook, GatewayProfile,
    OperationSpec,
};
pub use services::{
    AlipayClient, GatewayCore, GatewayInfo, GatewayService, OrderAction, PaymentGateway,
    ShengpayClient, WechatPayClient,
};
