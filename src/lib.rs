//! Paybridge: signed request clients for wallet, bank-card and
//! mobile-wallet payment gateways.
//!
//! Every client turns a [`ParameterSet`](crate::core::ParameterSet) into a signed
//! request, sends it through a [`Transport`](modules::transport::Transport),
//! and hands back a [`ResultEnvelope`](modules::envelope::ResultEnvelope).

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use config::{ClientCertificate, ClientConfig, Config, Credentials};
pub use crate::core::{AppError, ParamValue, ParameterSet, Result};
pub use modules::envelope::ResultEnvelope;
pub use modules::gateways::{
    AlipayClient, CallOptions, Completed, GatewayService, PaymentGateway, ShengpayClient,
    WechatPayClient,
};
pub use modules::signing::SignatureEngine;
pub use modules::transport::{ReqwestTransport, Transport};
