pub mod alipay;
pub mod gateway_core;
pub mod gateway_service;
pub mod gateway_trait;
pub mod shengpay;
pub mod wechat;

pub use alipay::AlipayClient;
pub use gateway_core::GatewayCore;
pub use gateway_service::{GatewayInfo, GatewayService, OrderAction};
pub use gateway_trait::PaymentGateway;
pub use shengpay::ShengpayClient;
pub use wechat::WechatPayClient;
